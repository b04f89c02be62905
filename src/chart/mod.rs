//! Helm chart model and loading.
//!
//! A [`Chart`] is one node of the dependency tree: its metadata, the raw files it
//! ships, its default values and its ordered sub-charts.

pub mod loader;
pub mod metadata;

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;

pub use loader::{check_installable, load_chart};
pub use metadata::{ChartMetadata, ChartType, Dependency, parse_chart_yaml};

/// Directory under which sub-charts are nested.
pub const CHARTS_DIR: &str = "charts";

/// Chart loading errors.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart directory not found: {0}")]
    NotFound(String),

    #[error("Chart.yaml file is missing in {0}")]
    MissingChartYaml(String),

    #[error("{path}{}: {message}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Parse {
        path: String,
        line: Option<u32>,
        message: String,
    },

    #[error("{0} charts are not installable")]
    NotInstallable(String),

    #[error("failed to read chart: {0}")]
    Io(#[from] std::io::Error),
}

/// A file embedded in a chart, named relative to the chart root with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl ChartFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// One node of a chart dependency tree.
#[derive(Debug, Clone)]
pub struct Chart {
    pub metadata: ChartMetadata,
    /// Directory the chart was loaded from (empty for in-memory charts)
    pub directory: PathBuf,
    /// Every file in the chart, excluding nested sub-charts
    pub raw: Vec<ChartFile>,
    /// Defaults from values.yaml
    pub values: Value,
    name: String,
    full_path: String,
    dependencies: Vec<Chart>,
}

impl Chart {
    /// Build a chart node without touching the filesystem.
    pub fn new(metadata: ChartMetadata, directory: impl Into<PathBuf>, raw: Vec<ChartFile>) -> Self {
        let name = metadata.name.clone();
        Self {
            metadata,
            directory: directory.into(),
            raw,
            values: Value::Mapping(Mapping::new()),
            full_path: name.clone(),
            name,
            dependencies: Vec::new(),
        }
    }

    /// The name of this node, which is the dependency alias when one was declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of this node inside the tree, e.g. `parent/charts/child`.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn dependencies(&self) -> &[Chart] {
        &self.dependencies
    }

    /// Rename this node (used for aliased dependencies).
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        let parent = self
            .full_path
            .rsplit_once(&format!("/{CHARTS_DIR}/"))
            .map(|(parent, _)| parent.to_string());
        self.rebase(parent.as_deref());
    }

    /// Append a sub-chart, placing it under this node's path.
    pub fn add_dependency(&mut self, mut chart: Chart) {
        chart.rebase(Some(&self.full_path));
        self.dependencies.push(chart);
    }

    /// Keep only the sub-charts matching `keep`.
    pub fn retain_dependencies(&mut self, keep: impl FnMut(&Chart) -> bool) {
        self.dependencies.retain(keep);
    }

    pub fn dependencies_mut(&mut self) -> &mut [Chart] {
        &mut self.dependencies
    }

    fn rebase(&mut self, parent: Option<&str>) {
        self.full_path = match parent {
            Some(parent) => format!("{parent}/{CHARTS_DIR}/{}", self.name),
            None => self.name.clone(),
        };
        let full_path = self.full_path.clone();
        for dep in &mut self.dependencies {
            dep.rebase(Some(&full_path));
        }
    }
}
