//! Loads a chart tree from a local directory.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde_yaml::{Mapping, Value};
use walkdir::WalkDir;

use super::metadata::parse_chart_yaml;
use super::{CHARTS_DIR, Chart, ChartError, ChartFile};

const CHART_FILE: &str = "Chart.yaml";
const VALUES_FILE: &str = "values.yaml";

/// Load the chart in `dir` together with every unpacked sub-chart under `charts/`.
pub fn load_chart(dir: &Path) -> Result<Chart, ChartError> {
    let chart = load_dir(dir)?;
    debug!(
        "loaded chart {} ({} files, {} dependencies)",
        chart.full_path(),
        chart.raw.len(),
        chart.dependencies().len()
    );
    Ok(chart)
}

/// Only application charts can be installed.
pub fn check_installable(chart: &Chart) -> Result<(), ChartError> {
    if chart.metadata.is_library() {
        return Err(ChartError::NotInstallable("library".to_string()));
    }
    Ok(())
}

fn load_dir(dir: &Path) -> Result<Chart, ChartError> {
    if !dir.is_dir() {
        return Err(ChartError::NotFound(dir.display().to_string()));
    }

    let chart_yaml = dir.join(CHART_FILE);
    if !chart_yaml.is_file() {
        return Err(ChartError::MissingChartYaml(dir.display().to_string()));
    }
    let metadata = parse_chart_yaml(&fs::read_to_string(&chart_yaml)?, &chart_yaml)?;

    let raw = collect_files(dir)?;
    let values = match raw.iter().find(|f| f.name == VALUES_FILE) {
        Some(file) => parse_values(&file.data, &dir.join(VALUES_FILE))?,
        None => Value::Mapping(Mapping::new()),
    };

    let mut chart = Chart::new(metadata, dir, raw);
    chart.values = values;

    let mut loaded = load_subcharts(&dir.join(CHARTS_DIR))?;

    // Declared dependencies come first, in Chart.yaml order.
    let declared = chart.metadata.dependencies.clone();
    let mut used = vec![false; loaded.len()];
    for dep in &declared {
        let Some(idx) = loaded.iter().position(|c| c.metadata.name == dep.name) else {
            warn!(
                "dependency {} of chart {} is not present under {CHARTS_DIR}/",
                dep.name,
                chart.name()
            );
            continue;
        };
        used[idx] = true;
        let mut sub = loaded[idx].clone();
        if let Some(alias) = &dep.alias {
            sub.set_name(alias.clone());
        }
        chart.add_dependency(sub);
    }
    for (idx, sub) in loaded.drain(..).enumerate() {
        if !used[idx] {
            chart.add_dependency(sub);
        }
    }

    Ok(chart)
}

fn load_subcharts(charts_dir: &Path) -> Result<Vec<Chart>, ChartError> {
    if !charts_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<_> = fs::read_dir(charts_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    entries.sort();

    let mut charts = Vec::new();
    for path in entries {
        if path.is_dir() {
            if path.join(CHART_FILE).is_file() {
                charts.push(load_dir(&path)?);
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some("tgz") {
            warn!(
                "skipping packaged sub-chart {}: only unpacked chart directories are supported",
                path.display()
            );
        }
    }
    Ok(charts)
}

/// Every file of the chart with a `/`-separated relative name, excluding `charts/`.
fn collect_files(dir: &Path) -> Result<Vec<ChartFile>, ChartError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.depth() == 1 && e.file_type().is_dir() && e.file_name() == CHARTS_DIR));

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(ChartFile::new(name, fs::read(entry.path())?));
    }
    Ok(files)
}

fn parse_values(data: &[u8], path: &Path) -> Result<Value, ChartError> {
    let value: Value = serde_yaml::from_slice(data).map_err(|e| ChartError::Parse {
        path: path.display().to_string(),
        line: e.location().map(|l| l.line() as u32),
        message: e.to_string(),
    })?;
    Ok(match value {
        Value::Null => Value::Mapping(Mapping::new()),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_nested_chart_tree() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("simple-example");
        write(
            &root,
            "Chart.yaml",
            "apiVersion: v2\nname: simple-example\nversion: 0.1.0\ndependencies:\n  - name: ingress\n    alias: ingressAlias\n",
        );
        write(&root, "values.yaml", "replicaCount: 2\n");
        write(&root, "vivs/values.yaml", "a: 1\n");
        write(&root, "charts/ingress/Chart.yaml", "name: ingress\nversion: 0.1.0\n");
        write(&root, "charts/ingress/vivs/values.yaml", "b: 2\n");
        write(&root, "charts/ingress/charts/service/Chart.yaml", "name: service\nversion: 0.1.0\n");

        let chart = load_chart(&root).unwrap();
        assert_eq!(chart.name(), "simple-example");
        let names: Vec<_> = chart.raw.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Chart.yaml", "values.yaml", "vivs/values.yaml"]);
        assert_eq!(chart.values["replicaCount"], Value::from(2));

        let ingress = &chart.dependencies()[0];
        assert_eq!(ingress.name(), "ingressAlias");
        assert_eq!(ingress.full_path(), "simple-example/charts/ingressAlias");
        assert_eq!(
            ingress.dependencies()[0].full_path(),
            "simple-example/charts/ingressAlias/charts/service"
        );
    }

    #[test]
    fn test_declared_order_before_undeclared() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(
            root,
            "Chart.yaml",
            "name: parent\nversion: 0.1.0\ndependencies:\n  - name: zeta\n",
        );
        write(root, "charts/alpha/Chart.yaml", "name: alpha\nversion: 0.1.0\n");
        write(root, "charts/zeta/Chart.yaml", "name: zeta\nversion: 0.1.0\n");

        let chart = load_chart(root).unwrap();
        let deps: Vec<_> = chart.dependencies().iter().map(|c| c.name()).collect();
        assert_eq!(deps, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_missing_chart_yaml() {
        let tmp = TempDir::new().unwrap();
        let err = load_chart(tmp.path()).unwrap_err();
        assert!(matches!(err, ChartError::MissingChartYaml(_)));

        let err = load_chart(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, ChartError::NotFound(_)));
    }

    #[test]
    fn test_library_chart_not_installable() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "Chart.yaml", "name: common\nversion: 0.1.0\ntype: library\n");
        let chart = load_chart(tmp.path()).unwrap();
        assert!(matches!(
            check_installable(&chart),
            Err(ChartError::NotInstallable(_))
        ));
    }
}
