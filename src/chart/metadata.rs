//! `Chart.yaml` fields the loader and value processing care about.

use std::path::Path;

use serde::Deserialize;

use super::ChartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Application,
    /// Only provides helpers to other charts; cannot be installed.
    Library,
}

/// An entry of the `dependencies` list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: Option<String>,
    pub repository: Option<String>,
    /// Comma-separated value paths; the first one set to a boolean enables or disables the sub-chart
    pub condition: Option<String>,
    /// Names looked up under the top-level `tags` value
    #[serde(default)]
    pub tags: Vec<String>,
    /// Name the sub-chart is known by inside its parent
    pub alias: Option<String>,
}

impl Dependency {
    pub fn effective_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub chart_type: ChartType,
    pub app_version: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl ChartMetadata {
    pub fn is_library(&self) -> bool {
        self.chart_type == ChartType::Library
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }
}

/// Parse `Chart.yaml` content. `path` only appears in error messages.
pub fn parse_chart_yaml(content: &str, path: &Path) -> Result<ChartMetadata, ChartError> {
    serde_yaml::from_str(content).map_err(|e| ChartError::Parse {
        path: path.display().to_string(),
        line: e.location().map(|l| l.line() as u32),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ChartMetadata {
        parse_chart_yaml(yaml, Path::new("Chart.yaml")).unwrap()
    }

    #[test]
    fn test_minimal_chart_defaults() {
        let chart = parse("apiVersion: v2\nname: test-chart\nversion: 0.1.0\n");
        assert_eq!(chart.name, "test-chart");
        assert_eq!(chart.version, "0.1.0");
        assert_eq!(chart.chart_type, ChartType::Application);
        assert!(!chart.is_deprecated());
        assert!(chart.dependencies.is_empty());
    }

    #[test]
    fn test_dependencies_with_alias_condition_and_tags() {
        let chart = parse(
            r#"
apiVersion: v2
name: simple-example
version: 1.0.0
dependencies:
  - name: ingress
    version: "0.1.0"
    alias: ingressAlias
  - name: redis
    version: "17.0.0"
    repository: https://charts.bitnami.com/bitnami
    condition: redis.enabled
    tags:
      - cache
"#,
        );
        assert_eq!(chart.dependencies.len(), 2);
        assert_eq!(chart.dependencies[0].effective_name(), "ingressAlias");
        assert!(chart.dependencies[0].tags.is_empty());

        let redis = &chart.dependencies[1];
        assert_eq!(redis.effective_name(), "redis");
        assert_eq!(redis.condition.as_deref(), Some("redis.enabled"));
        assert_eq!(redis.tags, vec!["cache"]);
    }

    #[test]
    fn test_library_and_deprecated() {
        let chart = parse("name: common\nversion: 1.0.0\ntype: library\ndeprecated: true\n");
        assert!(chart.is_library());
        assert!(chart.is_deprecated());
    }

    #[test]
    fn test_parse_error_reports_path() {
        let err = parse_chart_yaml("invalid: [yaml", Path::new("x/Chart.yaml")).unwrap_err();
        assert!(err.to_string().contains("x/Chart.yaml"));
    }
}
