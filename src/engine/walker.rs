//! Chart tree traversal: discovers override files and turns each into an output file.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_yaml::Value;

use super::address::{NodeAddress, resolve_address};
use super::template::TemplateRenderer;
use super::tree::NestedTree;
use super::writer::OverrideWriter;
use crate::chart::{CHARTS_DIR, Chart};
use crate::error::Result;

/// Reserved directory holding override templates inside each chart.
pub const DEFAULT_OVERRIDE_DIR: &str = "vivs";

/// Working directory used by [`Engine::render_to_temp`] unless configured otherwise.
pub const DEFAULT_WORK_DIR: &str = "vivTemp";

/// Everything one engine needs, fixed at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root of the chart tree
    pub chart: Chart,
    /// Value context templates are rendered against
    pub values: Value,
    /// Directory relative destinations are resolved against, normally the chart directory
    pub base_dir: PathBuf,
    /// Destination used by `render_to_temp`
    pub work_dir: PathBuf,
    /// Prefix identifying override files
    pub override_dir: String,
}

impl EngineConfig {
    pub fn new(chart: Chart, values: Value) -> Self {
        let base_dir = chart.directory().to_path_buf();
        Self {
            chart,
            values,
            base_dir,
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            override_dir: DEFAULT_OVERRIDE_DIR.to_string(),
        }
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_override_dir(mut self, override_dir: impl Into<String>) -> Self {
        self.override_dir = override_dir.into();
        self
    }
}

/// Renders every override file of a chart tree into its own output document.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    renderer: TemplateRenderer,
    last: Option<OverrideWriter>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            renderer: TemplateRenderer::new(),
            last: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render into the configured working directory.
    pub fn render_to_temp(&mut self) -> Result<Vec<PathBuf>> {
        let dst = self.config.work_dir.clone();
        self.render_to(&dst)
    }

    /// Render every override file under `dst` and return the absolute output paths in
    /// discovery order: a chart's own files, then its dependencies depth first.
    ///
    /// Stops at the first failure. Files written before it stay on disk until
    /// [`Engine::clear`] is called.
    pub fn render_to(&mut self, dst: &Path) -> Result<Vec<PathBuf>> {
        let dst = if dst.is_absolute() {
            dst.to_path_buf()
        } else {
            self.config.base_dir.join(dst)
        };
        let writer = OverrideWriter::new(std::path::absolute(&dst)?);
        self.last = Some(writer.clone());

        let outputs = self.each_chart(&writer, &self.config.chart)?;
        debug!(
            "rendered {} override file(s) into {}",
            outputs.len(),
            writer.work_dir().display()
        );
        Ok(outputs)
    }

    /// The working directory of the most recent render, if any.
    pub fn work_dir(&self) -> Option<&Path> {
        self.last.as_ref().map(OverrideWriter::work_dir)
    }

    /// Remove everything the most recent render wrote. Safe to call repeatedly.
    pub fn clear(&self) -> Result<()> {
        if let Some(writer) = &self.last {
            writer.clear()?;
        }
        Ok(())
    }

    /// A guard that clears the most recent render's output when dropped, unless `debug`.
    pub fn cleanup_guard(&self, debug: bool) -> CleanupGuard {
        CleanupGuard {
            writer: self.last.clone(),
            debug,
        }
    }

    fn each_chart(&self, writer: &OverrideWriter, chart: &Chart) -> Result<Vec<PathBuf>> {
        let mut outputs = Vec::new();
        let root_path = self.config.chart.full_path();
        let chart_path = chart.full_path();
        let relative_dir = chart_path.strip_prefix(root_path).unwrap_or(chart_path);
        let depth = chart_path.matches(&format!("/{CHARTS_DIR}/")).count();

        for file in &chart.raw {
            if !file.name.starts_with(&self.config.override_dir) {
                continue;
            }
            if file.data.is_empty() {
                debug!("skipping empty override file {chart_path}/{}", file.name);
                continue;
            }

            let relative = join_relative(relative_dir, &file.name);
            let address = resolve_address(&format!("{chart_path}/{}", file.name));
            if address.segments().len() != depth {
                warn!(
                    "override file {relative} resolved to address \"{address}\" which skips a non-identifier chart name"
                );
            }
            if address.is_root() {
                debug!("override file {relative} -> root");
            } else {
                debug!("override file {relative} -> address \"{address}\"");
            }

            let output = writer.output_path(&relative);
            self.render_file(writer, &output, &relative, &address, &file.data)
                .map_err(|e| e.for_file(&relative))?;
            outputs.push(output);
        }

        for dep in chart.dependencies() {
            let sub_outputs = self
                .each_chart(writer, dep)
                .map_err(|e| e.in_subchart(dep.name()))?;
            outputs.extend(sub_outputs);
        }

        Ok(outputs)
    }

    fn render_file(
        &self,
        writer: &OverrideWriter,
        output: &Path,
        relative: &str,
        address: &NodeAddress,
        template: &[u8],
    ) -> Result<()> {
        let rendered = self
            .renderer
            .render(relative, template, &self.config.values)?;
        let document = NestedTree::wrap(address, &rendered)?.to_yaml()?;
        writer.write(output, document.as_bytes())?;
        Ok(())
    }
}

/// Clears a render's working directory when dropped, unless created in debug mode.
#[derive(Debug)]
#[must_use = "the working directory is cleared when the guard is dropped"]
pub struct CleanupGuard {
    writer: Option<OverrideWriter>,
    debug: bool,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let Some(writer) = &self.writer else {
            return;
        };
        if self.debug {
            debug!("debug mode: keeping {}", writer.work_dir().display());
            return;
        }
        if let Err(e) = writer.clear() {
            warn!("failed to remove {}: {e}", writer.work_dir().display());
        }
    }
}

/// `path.Join`-style join of a chart's relative directory and a file name.
fn join_relative(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartFile, parse_chart_yaml};
    use crate::error::VivError;
    use std::fs;
    use tempfile::TempDir;

    fn chart(name: &str, files: &[(&str, &str)]) -> Chart {
        let meta = parse_chart_yaml(&format!("name: {name}\nversion: 0.1.0\n"), Path::new("Chart.yaml"))
            .unwrap();
        let raw = files
            .iter()
            .map(|(n, d)| ChartFile::new(*n, d.as_bytes()))
            .collect();
        Chart::new(meta, "", raw)
    }

    fn values() -> Value {
        serde_yaml::from_str("Values:\n  host: example.com\n  port: 8080\n").unwrap()
    }

    fn read_yaml(path: &Path) -> Value {
        serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_discovery_order_and_addresses() {
        let mut service = chart("service", &[("vivs/values.yaml", "port: {{ Values.port }}\n")]);
        service.raw.push(ChartFile::new("templates/svc.yaml", "kind: Service"));
        let mut ingress = chart("ingress", &[("vivs/values.yaml", "host: {{ Values.host }}\n")]);
        ingress.add_dependency(service);
        let mut root = chart("simple-example", &[("vivs/values.yaml", "root: true\n")]);
        root.add_dependency(ingress);
        root.dependencies_mut()[0].set_name("ingressAlias");

        let tmp = TempDir::new().unwrap();
        let mut engine = Engine::new(EngineConfig::new(root, values()));
        let outputs = engine.render_to(tmp.path()).unwrap();

        let names: Vec<_> = outputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "vivs_values.yaml",
                "_charts_ingressAlias_vivs_values.yaml",
                "_charts_ingressAlias_charts_service_vivs_values.yaml",
            ]
        );
        assert!(outputs.iter().all(|p| p.is_absolute()));

        let nested: Value = serde_yaml::from_str("ingressAlias:\n  service:\n    port: 8080\n").unwrap();
        assert_eq!(read_yaml(&outputs[2]), nested);
        let root_doc: Value = serde_yaml::from_str("root: true\n").unwrap();
        assert_eq!(read_yaml(&outputs[0]), root_doc);
    }

    #[test]
    fn test_no_override_files() {
        let root = chart("plain", &[("values.yaml", "a: 1\n"), ("templates/x.yaml", "x: 1")]);
        let tmp = TempDir::new().unwrap();
        let dst = tmp.path().join("out");

        let mut engine = Engine::new(EngineConfig::new(root, values()));
        let outputs = engine.render_to(&dst).unwrap();

        assert!(outputs.is_empty());
        assert!(!dst.exists());
    }

    #[test]
    fn test_empty_and_prefixed_files() {
        let root = chart(
            "app",
            &[
                ("vivs/empty.yaml", ""),
                ("vivsextra.yaml", "a: 1\n"),
                ("notvivs/x.yaml", "b: 2\n"),
            ],
        );
        let tmp = TempDir::new().unwrap();
        let mut engine = Engine::new(EngineConfig::new(root, values()));
        let outputs = engine.render_to(tmp.path()).unwrap();

        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].ends_with("vivsextra.yaml"));
    }

    #[test]
    fn test_non_mapping_output_names_the_file() {
        let root = chart("app", &[("vivs/a.yaml", "a: 1\n"), ("vivs/b.yaml", "- x\n- y\n")]);
        let tmp = TempDir::new().unwrap();
        let mut engine = Engine::new(EngineConfig::new(root, values()));
        let err = engine.render_to(tmp.path()).unwrap_err();

        assert!(matches!(&err, VivError::File { path, .. } if path == "vivs/b.yaml"));
        assert!(err.to_string().contains("vivs/b.yaml"));
        assert_eq!(err.offending_content(), Some(&b"- x\n- y\n"[..]));
        assert!(tmp.path().join("vivs_a.yaml").exists());
    }

    #[test]
    fn test_subchart_failure_is_annotated_and_not_rolled_back() {
        let mut root = chart("app", &[("vivs/values.yaml", "ok: 1\n")]);
        root.add_dependency(chart("db", &[("vivs/values.yaml", "bad: {{ Values.port ")]));

        let tmp = TempDir::new().unwrap();
        let mut engine = Engine::new(EngineConfig::new(root, values()));
        let err = engine.render_to(tmp.path()).unwrap_err();

        match &err {
            VivError::Traversal { chart, source } => {
                assert_eq!(chart, "db");
                assert!(matches!(**source, VivError::Render { ref path, .. } if path == "/charts/db/vivs/values.yaml"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(tmp.path().join("vivs_values.yaml").exists());

        engine.clear().unwrap();
        assert!(!tmp.path().exists());
        engine.clear().unwrap();
    }

    #[test]
    fn test_relative_work_dir_and_guard() {
        let tmp = TempDir::new().unwrap();
        let root = chart("app", &[("vivs/values.yaml", "a: 1\n")]);
        let mut config = EngineConfig::new(root, values()).with_work_dir("tmpdir");
        config.base_dir = tmp.path().to_path_buf();

        let mut engine = Engine::new(config);
        let outputs = engine.render_to_temp().unwrap();
        assert_eq!(outputs[0], tmp.path().join("tmpdir").join("vivs_values.yaml"));

        drop(engine.cleanup_guard(true));
        assert!(outputs[0].exists());
        drop(engine.cleanup_guard(false));
        assert!(!tmp.path().join("tmpdir").exists());
    }
}
