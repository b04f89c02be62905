//! # helm-viv
//!
//! A Helm plugin that lets value files use variables.
//!
//! Charts (and their sub-charts) may ship templates under a reserved `vivs/`
//! directory. Before helm runs, each of them is rendered against the chart's
//! resolved values, nested under the address of the sub-chart it lives in and
//! written to a working directory. The resulting files are passed to helm as
//! additional `-f` layers, so their keys land in the right sub-chart scope.
//!
//! ## Example
//!
//! ```rust,no_run
//! use helm_viv::chart::load_chart;
//! use helm_viv::engine::{Engine, EngineConfig};
//! use helm_viv::values::{ReleaseOptions, to_render_values};
//! use std::path::Path;
//!
//! # fn main() -> helm_viv::Result<()> {
//! let chart = load_chart(Path::new("./simple-example"))?;
//! let values = to_render_values(&chart, serde_yaml::Value::Null, &ReleaseOptions::default());
//! let mut engine = Engine::new(EngineConfig::new(chart, values));
//! let files = engine.render_to_temp()?;
//! for file in &files {
//!     println!("-f {}", file.display());
//! }
//! engine.clear()?;
//! # Ok(())
//! # }
//! ```

pub mod chart;
pub mod cli;
pub mod common;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod helm;
pub mod values;

// Re-export commonly used types and functions
pub use engine::{Engine, EngineConfig, NestedTree, NodeAddress, resolve_address};
pub use error::{Result, VivError};
use cli::Commands;

/// The current version of the plugin
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Install(helm) => handlers::handle_render("install", helm.args),
        Commands::Upgrade(helm) => handlers::handle_render("upgrade", helm.args),
        Commands::Lint(helm) => handlers::handle_render("lint", helm.args),
        Commands::Template(helm) => handlers::handle_render("template", helm.args),
        Commands::Version => handlers::handle_version(),
        Commands::External(args) => handlers::handle_passthrough(args),
    }
}
