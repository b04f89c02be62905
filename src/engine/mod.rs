//! Override rendering engine.
//!
//! Walks a chart and its sub-charts, renders every file under the reserved override
//! directory against one value context, nests the result under the sub-chart's
//! address and writes it to a working directory:
//!
//! ```text
//! simple-example/charts/ingressAlias/vivs/values.yaml
//!   -> address .ingressAlias
//!   -> <work_dir>/_charts_ingressAlias_vivs_values.yaml
//!      ingressAlias:
//!        <rendered keys>
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use helm_viv::chart::load_chart;
//! use helm_viv::engine::{Engine, EngineConfig};
//!
//! let chart = load_chart(Path::new("./simple-example"))?;
//! let mut engine = Engine::new(EngineConfig::new(chart, values));
//! let files = engine.render_to_temp()?;
//! let _cleanup = engine.cleanup_guard(false);
//! ```

pub mod address;
mod filters;
pub mod template;
pub mod tree;
pub mod walker;
pub mod writer;

pub use address::{NodeAddress, resolve_address};
pub use template::TemplateRenderer;
pub use tree::NestedTree;
pub use walker::{CleanupGuard, DEFAULT_OVERRIDE_DIR, DEFAULT_WORK_DIR, Engine, EngineConfig};
pub use writer::{OverrideWriter, flatten_path};
