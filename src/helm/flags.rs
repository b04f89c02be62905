//! Permissive scanner for helm command-line flags.
//!
//! Arguments are forwarded to helm untouched, so this only needs to pull out the
//! handful of values the engine uses (`-f`, `--set`, `--debug`, ...).

use crate::config::parse_bool;

/// Helm flags that never take a value.
const BOOL_FLAGS: &[&str] = &[
    "atomic",
    "create-namespace",
    "debug",
    "dependency-update",
    "devel",
    "disable-openapi-validation",
    "dry-run",
    "force",
    "generate-name",
    "include-crds",
    "insecure-skip-tls-verify",
    "install",
    "no-hooks",
    "pass-credentials",
    "reset-values",
    "reuse-values",
    "skip-crds",
    "strict",
    "verify",
    "wait",
    "wait-for-jobs",
];

/// Flags and their values, in the order they were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelmFlags {
    entries: Vec<(String, Option<String>)>,
}

impl HelmFlags {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        let mut flags = Self::default();
        let mut pending: Option<String> = None;

        for arg in args.iter().map(AsRef::as_ref) {
            if !arg.starts_with('-') || arg == "-" {
                if let Some(key) = pending.take() {
                    flags.set(&key, Some(arg));
                }
                continue;
            }

            if let Some(key) = pending.take() {
                flags.set(&key, None);
            }

            let body = arg.trim_start_matches('-');
            if arg.starts_with("--") {
                if let Some((key, value)) = body.split_once('=') {
                    flags.set(key, Some(value));
                    continue;
                }
            }

            if BOOL_FLAGS.contains(&body) {
                flags.set(body, None);
            } else {
                pending = Some(body.to_string());
            }
        }

        if let Some(key) = pending {
            flags.set(&key, None);
        }
        flags
    }

    fn set(&mut self, key: &str, value: Option<&str>) {
        self.entries
            .push((key.to_string(), value.map(str::to_string)));
    }

    fn values<'a>(&'a self, keys: &'a [&str]) -> impl Iterator<Item = &'a String> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| keys.contains(&k.as_str()))
            .filter_map(|(_, v)| v.as_ref())
    }

    /// Every value given for any of `keys`, in command-line order.
    pub fn get_string_slice(&self, keys: &[&str]) -> Vec<String> {
        self.values(keys).cloned().collect()
    }

    /// First value given for any of `keys`.
    pub fn get_string(&self, keys: &[&str]) -> Option<String> {
        self.values(keys).next().cloned()
    }

    /// A bare flag is `true`; otherwise its value is parsed.
    pub fn get_bool(&self, key: &str) -> bool {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, value)| match value {
                Some(v) => parse_bool(v).unwrap_or(false),
                None => true,
            })
            .unwrap_or(false)
    }
}

/// Arguments before the first flag.
pub fn positional_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter()
        .map(AsRef::as_ref)
        .take_while(|a| !a.starts_with('-'))
        .map(str::to_string)
        .collect()
}

/// Split positional arguments into release name and chart reference.
pub fn name_and_chart(positional: &[String], generate_name: bool) -> Option<(Option<String>, String)> {
    match (positional, generate_name) {
        ([chart, ..], true) => Some((None, chart.clone())),
        ([name, chart, ..], false) => Some((Some(name.clone()), chart.clone())),
        ([chart], false) => Some((None, chart.clone())),
        _ => None,
    }
}
