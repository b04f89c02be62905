//! Value context construction.
//!
//! Builds the value set override templates are rendered against: chart defaults
//! coalesced across the dependency tree, user supplied values on top, wrapped in the
//! `Values` / `Release` / `Chart` objects templates expect.

pub mod options;

use log::debug;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::chart::Chart;

pub use options::ValueOptions;

/// Release information exposed to templates as `Release`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReleaseOptions {
    pub name: String,
    pub namespace: String,
    pub revision: u32,
    pub is_install: bool,
    pub is_upgrade: bool,
    pub service: String,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self {
            name: "release-name".to_string(),
            namespace: "default".to_string(),
            revision: 1,
            is_install: true,
            is_upgrade: false,
            service: "Helm".to_string(),
        }
    }
}

/// Deep-merge `overlay` into `base`. Mappings merge key by key, anything else replaces.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Chart defaults with every sub-chart's defaults nested under its name.
///
/// Values set by a parent take precedence over the sub-chart's own defaults.
pub fn coalesce_values(chart: &Chart) -> Value {
    let mut values = match &chart.values {
        Value::Mapping(_) => chart.values.clone(),
        _ => Value::Mapping(Mapping::new()),
    };

    for dep in chart.dependencies() {
        let mut scoped = coalesce_values(dep);
        let key = Value::String(dep.name().to_string());
        if let Some(parent_set) = values.get(&key).cloned() {
            merge(&mut scoped, parent_set);
        }
        if let Some(map) = values.as_mapping_mut() {
            map.insert(key, scoped);
        }
    }
    values
}

/// Look up a dotted path such as `redis.enabled`.
pub fn lookup<'a>(values: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .try_fold(values, |current, segment| current.get(segment))
}

/// Drop sub-charts disabled by their `condition` or `tags`.
///
/// Conditions are resolved against the values scoped to the parent chart; a
/// comma-separated condition uses the first path that is set to a boolean. A resolved
/// condition wins over tags. Tags are looked up under the top-level `tags:` key: any
/// tag set to `true` enables the sub-chart, otherwise one set to `false` disables it.
pub fn process_dependencies(chart: &mut Chart, values: &Value) {
    let tags = values.get("tags").cloned().unwrap_or(Value::Null);
    prune_dependencies(chart, values, &tags);
}

fn prune_dependencies(chart: &mut Chart, values: &Value, tags: &Value) {
    let declared = chart.metadata.dependencies.clone();
    chart.retain_dependencies(|dep| {
        let Some(declaration) = declared.iter().find(|d| d.effective_name() == dep.name()) else {
            return true;
        };
        let enabled = declaration
            .condition
            .as_deref()
            .and_then(|condition| condition_state(values, condition))
            .or_else(|| tags_state(tags, &declaration.tags))
            .unwrap_or(true);
        if !enabled {
            debug!("sub-chart {} disabled by its condition or tags", dep.name());
        }
        enabled
    });

    for dep in chart.dependencies_mut() {
        let scoped = values.get(dep.name()).cloned().unwrap_or(Value::Null);
        prune_dependencies(dep, &scoped, tags);
    }
}

fn condition_state(values: &Value, condition: &str) -> Option<bool> {
    condition
        .split(',')
        .map(str::trim)
        .find_map(|path| lookup(values, path).and_then(Value::as_bool))
}

fn tags_state(tags: &Value, declared: &[String]) -> Option<bool> {
    let states: Vec<bool> = declared
        .iter()
        .filter_map(|tag| tags.get(tag.as_str()).and_then(Value::as_bool))
        .collect();
    if states.contains(&true) {
        Some(true)
    } else if states.contains(&false) {
        Some(false)
    } else {
        None
    }
}

/// Assemble the full value context passed to override templates.
pub fn to_render_values(chart: &Chart, user_values: Value, release: &ReleaseOptions) -> Value {
    let mut values = coalesce_values(chart);
    merge(&mut values, user_values);

    let mut chart_info = Mapping::new();
    chart_info.insert("Name".into(), chart.name().into());
    chart_info.insert("Version".into(), chart.metadata.version.clone().into());
    if let Some(app_version) = &chart.metadata.app_version {
        chart_info.insert("AppVersion".into(), app_version.clone().into());
    }
    if let Some(description) = &chart.metadata.description {
        chart_info.insert("Description".into(), description.clone().into());
    }

    let mut context = Mapping::new();
    context.insert("Values".into(), values);
    context.insert(
        "Release".into(),
        serde_yaml::to_value(release).unwrap_or(Value::Null),
    );
    context.insert("Chart".into(), Value::Mapping(chart_info));
    Value::Mapping(context)
}
