//! User supplied values: `-f` files and the `--set*` family of flags.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use super::merge;
use crate::error::{Result, VivError};

/// Values passed on the command line, applied in field order.
#[derive(Debug, Clone, Default)]
pub struct ValueOptions {
    /// `-f` / `--values` files
    pub value_files: Vec<PathBuf>,
    /// `--set key=value,...`
    pub values: Vec<String>,
    /// `--set-string key=value,...`
    pub string_values: Vec<String>,
    /// `--set-file key=path,...`
    pub file_values: Vec<String>,
    /// `--set-json key=json`
    pub json_values: Vec<String>,
}

impl ValueOptions {
    /// Merge every source into one mapping. Later sources win.
    pub fn merge_values(&self) -> Result<Value> {
        let mut base = Value::Mapping(Mapping::new());

        for path in &self.value_files {
            merge(&mut base, read_values_file(path)?);
        }

        for expr in &self.json_values {
            let (key, raw) = split_pair(expr)?;
            let json: serde_json::Value = serde_json::from_str(raw)
                .map_err(|e| VivError::Values(format!("failed parsing --set-json data {expr}: {e}")))?;
            let value = serde_yaml::to_value(json)?;
            set_path(&mut base, key, value);
        }

        for expr in &self.values {
            for pair in split_assignments(expr) {
                let (key, raw) = split_pair(&pair)?;
                set_path(&mut base, key, typed_value(raw));
            }
        }

        for expr in &self.string_values {
            for pair in split_assignments(expr) {
                let (key, raw) = split_pair(&pair)?;
                set_path(&mut base, key, Value::String(raw.to_string()));
            }
        }

        for expr in &self.file_values {
            for pair in split_assignments(expr) {
                let (key, path) = split_pair(&pair)?;
                let content = fs::read_to_string(path).map_err(|e| {
                    VivError::Values(format!("failed to read --set-file {key}={path}: {e}"))
                })?;
                set_path(&mut base, key, Value::String(content));
            }
        }

        Ok(base)
    }
}

fn read_values_file(path: &Path) -> Result<Value> {
    let content = fs::read(path)
        .map_err(|e| VivError::Values(format!("failed to read values file {}: {e}", path.display())))?;
    let value: Value = serde_yaml::from_slice(&content)
        .map_err(|e| VivError::Values(format!("failed to parse {}: {e}", path.display())))?;
    match value {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        Value::Mapping(_) => Ok(value),
        _ => Err(VivError::Values(format!(
            "values file {} must contain a mapping",
            path.display()
        ))),
    }
}

/// Split `a=1,b={x,y}` on top-level commas. `\,` escapes a comma.
fn split_assignments(expr: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = expr.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(VivError::Values(format!("key \"{pair}\" has no value"))),
    }
}

/// Helm typing rules: null, booleans and integers are recognised, everything else is a string.
fn typed_value(raw: &str) -> Value {
    if let Some(inner) = raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
        if inner.trim().is_empty() {
            return Value::Sequence(Vec::new());
        }
        return Value::Sequence(inner.split(',').map(|s| typed_value(s.trim())).collect());
    }

    match raw {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let leading_zero = digits.len() > 1 && digits.starts_with('0');
    if !leading_zero {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::from(n);
        }
    }
    Value::String(raw.to_string())
}

/// Set a dotted key, creating intermediate mappings as needed.
fn set_path(root: &mut Value, key: &str, value: Value) {
    let mut current = root;
    let mut segments = key.split('.').peekable();

    while let Some(segment) = segments.next() {
        if !current.is_mapping() {
            *current = Value::Mapping(Mapping::new());
        }
        let Some(map) = current.as_mapping_mut() else {
            return;
        };
        let segment_key = Value::String(segment.to_string());
        if segments.peek().is_none() {
            map.insert(segment_key, value);
            return;
        }
        current = map
            .entry(segment_key)
            .or_insert_with(|| Value::Mapping(Mapping::new()));
    }
}
