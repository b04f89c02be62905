use crate::config;
use crate::helm::{HelmCommand, helm_version};

/// Forward a command helm-viv does not handle itself.
pub fn handle_passthrough(args: Vec<String>) -> crate::Result<()> {
    let config = config::load_config(None)?;
    HelmCommand::new(&config.engine.helm_bin, args).run()
}

pub fn handle_version() -> crate::Result<()> {
    println!("helm-viv {}", crate::VERSION);

    let config = config::load_config(None)?;
    match helm_version(&config.engine.helm_bin) {
        Some(version) => println!("helm {version}"),
        None => println!("helm: not found ({})", config.engine.helm_bin),
    }
    Ok(())
}
