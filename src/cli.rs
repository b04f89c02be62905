use clap::{Args, Parser, Subcommand};

use crate::config::{DEBUG_ENV, parse_bool};

const USAGE: &str = "Helm plugin to use variables in values.

Renders every template under a chart's `vivs/` directory (and those of its sub-charts)
against the chart's values, nests each result under the sub-chart it belongs to, and
passes the files to helm as extra `-f` value layers.

Examples:
  $ helm viv install releaseName ./chart -n namespace
  $ helm viv upgrade releaseName ./chart -n namespace";

#[derive(Parser)]
#[command(name = "helm-viv", bin_name = "helm viv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Helm plugin to use variables in values")]
#[command(long_about = USAGE)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render overrides and run `helm install`
    #[command(disable_help_flag = true)]
    Install(HelmArgs),

    /// Render overrides and run `helm upgrade`
    #[command(disable_help_flag = true)]
    Upgrade(HelmArgs),

    /// Render overrides and run `helm lint`
    #[command(disable_help_flag = true)]
    Lint(HelmArgs),

    /// Render overrides and run `helm template`
    #[command(disable_help_flag = true)]
    Template(HelmArgs),

    /// Show the plugin and helm versions
    Version,

    /// Any other helm command is forwarded unchanged
    #[command(external_subcommand)]
    External(Vec<String>),
}

/// Arguments forwarded to helm verbatim.
#[derive(Args, Debug, Clone)]
pub struct HelmArgs {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub args: Vec<String>,
}

impl Commands {
    /// The helm subcommand name for render commands.
    pub fn render_command(&self) -> Option<(&'static str, &HelmArgs)> {
        match self {
            Commands::Install(a) => Some(("install", a)),
            Commands::Upgrade(a) => Some(("upgrade", a)),
            Commands::Lint(a) => Some(("lint", a)),
            Commands::Template(a) => Some(("template", a)),
            Commands::Version | Commands::External(_) => None,
        }
    }
}

impl Cli {
    /// `--debug` among the forwarded arguments, or helm's debug environment variable.
    pub fn debug_requested(&self) -> bool {
        let env_debug = std::env::var(DEBUG_ENV)
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(false);
        let args: &[String] = match &self.command {
            Commands::External(args) => args,
            other => other.render_command().map(|(_, a)| a.args.as_slice()).unwrap_or(&[]),
        };
        env_debug || args.iter().any(|a| a == "--debug" || a == "--debug=true")
    }

    /// Initialize logging based on the debug flag
    pub fn init_logging(&self) {
        let level = if self.debug_requested() {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
