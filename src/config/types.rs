use serde::{Deserialize, Serialize};

use crate::engine::{DEFAULT_OVERRIDE_DIR, DEFAULT_WORK_DIR};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSettings,
    /// Keep rendered files and log at debug level
    #[serde(default)]
    pub debug: bool,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Directory prefix marking override templates inside a chart
    pub override_dir: String,
    /// Where rendered files go, relative to the chart directory unless absolute
    pub work_dir: String,
    /// The helm executable commands are forwarded to
    pub helm_bin: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            override_dir: DEFAULT_OVERRIDE_DIR.to_string(),
            work_dir: DEFAULT_WORK_DIR.to_string(),
            helm_bin: "helm".to_string(),
        }
    }
}
