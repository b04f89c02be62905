pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VivError};

pub use types::{Config, EngineSettings};

const CONFIG_FILE_NAME: &str = ".helm-viv.toml";

/// Environment variable overriding the helm executable.
pub const HELMBIN_ENV: &str = "HELM_VIV_HELMBIN";
/// Environment variable overriding the working directory.
pub const WORKDIR_ENV: &str = "HELM_VIV_WORKDIR";
/// Set by helm for plugins when `--debug` is active.
pub const DEBUG_ENV: &str = "HELM_DEBUG";

/// Get the global config file path (~/.helm-viv.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Get the local config file path (chart/.helm-viv.toml)
pub fn local_config_path(chart_path: &Path) -> PathBuf {
    chart_path.join(CONFIG_FILE_NAME)
}

/// Load configuration from file or use defaults
/// Checks local config first, then global config
pub fn load_config(chart_path: Option<&Path>) -> Result<Config> {
    let mut config = read_first([chart_path.map(local_config_path), global_config_path()])
        .unwrap_or_default();
    apply_env(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn read_first(candidates: [Option<PathBuf>; 2]) -> Option<Config> {
    candidates
        .into_iter()
        .flatten()
        .filter(|path| path.exists())
        .find_map(|path| {
            let content = fs::read_to_string(&path).ok()?;
            parse_config(&content).ok()
        })
}

/// Apply environment overrides on top of file configuration.
pub fn apply_env(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(bin) = var(HELMBIN_ENV).filter(|v| !v.is_empty()) {
        config.engine.helm_bin = bin;
    }
    if let Some(dir) = var(WORKDIR_ENV).filter(|v| !v.is_empty()) {
        config.engine.work_dir = dir;
    }
    if let Some(debug) = var(DEBUG_ENV) {
        config.debug = parse_bool(&debug).unwrap_or(config.debug);
    }
}

/// Parse a configuration file's content.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| VivError::Config(e.to_string()))
}

/// Boolean parsing accepted by helm for flags and environment variables.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.override_dir, "vivs");
        assert_eq!(config.engine.work_dir, "vivTemp");
        assert_eq!(config.engine.helm_bin, "helm");
        assert!(!config.debug);
    }

    #[test]
    fn test_partial_file() {
        let config = parse_config("[engine]\nwork_dir = \"/tmp/viv\"\n").unwrap();
        assert_eq!(config.engine.work_dir, "/tmp/viv");
        assert_eq!(config.engine.override_dir, "vivs");
        assert!(parse_config("engine = 3").is_err());
    }

    #[test]
    fn test_local_file_wins() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            local_config_path(tmp.path()),
            "debug = true\n[engine]\noverride_dir = \"overrides\"\n",
        )
        .unwrap();

        let config = read_first([Some(local_config_path(tmp.path())), None]).unwrap();
        assert_eq!(config.engine.override_dir, "overrides");
        assert!(config.debug);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (HELMBIN_ENV, "/usr/local/bin/helm3"),
            (WORKDIR_ENV, ""),
            (DEBUG_ENV, "true"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.engine.helm_bin, "/usr/local/bin/helm3");
        assert_eq!(config.engine.work_dir, "vivTemp");
        assert!(config.debug);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
