use clap::Parser;
use helm_viv::cli::Cli;
use std::process;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    if let Err(e) = helm_viv::run_command(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
