use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::chart::{check_installable, load_chart};
use crate::config::{self, Config};
use crate::engine::{Engine, EngineConfig};
use crate::error::{Result, VivError};
use crate::helm::{HelmCommand, HelmFlags, name_and_chart, positional_args};
use crate::values::{self, ReleaseOptions, ValueOptions};

/// Everything derived from one helm command line before rendering starts.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub command: String,
    pub args: Vec<String>,
    pub chart_dir: PathBuf,
    pub release: ReleaseOptions,
    pub value_options: ValueOptions,
    pub debug: bool,
}

impl RenderRequest {
    /// Interpret `helm <command> <args...>`.
    pub fn from_args(command: &str, args: Vec<String>) -> Result<Self> {
        let flags = HelmFlags::parse(&args);
        let positional = positional_args(&args);
        let (name, chart_ref) = name_and_chart(&positional, flags.get_bool("generate-name"))
            .ok_or_else(|| VivError::Helm(format!("\"helm {command}\" requires a chart argument")))?;

        let is_upgrade = command == "upgrade";
        let defaults = ReleaseOptions::default();
        let release = ReleaseOptions {
            name: name.unwrap_or(defaults.name),
            namespace: flags
                .get_string(&["n", "namespace"])
                .or_else(|| std::env::var("HELM_NAMESPACE").ok().filter(|v| !v.is_empty()))
                .unwrap_or(defaults.namespace),
            is_install: !is_upgrade,
            is_upgrade,
            ..defaults
        };

        let value_options = ValueOptions {
            value_files: flags
                .get_string_slice(&["f", "values"])
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            values: flags.get_string_slice(&["set"]),
            string_values: flags.get_string_slice(&["set-string"]),
            file_values: flags.get_string_slice(&["set-file"]),
            json_values: flags.get_string_slice(&["set-json"]),
        };

        Ok(Self {
            command: command.to_string(),
            chart_dir: PathBuf::from(chart_ref),
            release,
            value_options,
            debug: flags.get_bool("debug"),
            args,
        })
    }
}

/// Render override files for the chart named on the command line, then run helm with
/// them appended as `-f` layers. Rendered files are removed afterwards unless debugging.
pub fn handle_render(command: &str, args: Vec<String>) -> Result<()> {
    let request = RenderRequest::from_args(command, args)?;
    let config = config::load_config(Some(&request.chart_dir))?;
    let debug = config.debug || request.debug;

    let mut engine = build_engine(&request, &config)?;
    let rendered = engine.render_to_temp();
    let _cleanup = engine.cleanup_guard(debug);
    let files = rendered.inspect_err(|e| {
        if let Some(content) = e.offending_content() {
            debug!("offending content:\n{}", String::from_utf8_lossy(content));
        }
    })?;

    let mut helm_args = vec![request.command.clone()];
    helm_args.extend(request.args.iter().cloned());
    HelmCommand::new(&config.engine.helm_bin, helm_args)
        .with_value_files(&files)
        .run()
}

/// Load the chart, resolve values and build the engine for a request.
pub fn build_engine(request: &RenderRequest, config: &Config) -> Result<Engine> {
    let chart_dir = resolve_chart_dir(&request.chart_dir)?;
    debug!("CHART PATH: {}", chart_dir.display());

    let mut chart = load_chart(&chart_dir)?;
    if request.command != "lint" {
        check_installable(&chart)?;
    }
    if chart.metadata.is_deprecated() {
        warn!("This chart is deprecated");
    }

    let user_values = request.value_options.merge_values()?;
    let mut merged = values::coalesce_values(&chart);
    values::merge(&mut merged, user_values.clone());
    values::process_dependencies(&mut chart, &merged);

    let context = values::to_render_values(&chart, user_values, &request.release);
    let engine_config = EngineConfig::new(chart, context)
        .with_work_dir(&config.engine.work_dir)
        .with_override_dir(&config.engine.override_dir);
    Ok(Engine::new(engine_config))
}

fn resolve_chart_dir(chart_ref: &Path) -> Result<PathBuf> {
    if chart_ref.is_dir() {
        return Ok(std::path::absolute(chart_ref)?);
    }
    Err(VivError::Helm(format!(
        "chart {} is not a local chart directory; fetch it with \"helm pull --untar\" first",
        chart_ref.display()
    )))
}
