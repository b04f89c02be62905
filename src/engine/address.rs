//! Node addresses: where in the output document an override file's content lives.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::chart::CHARTS_DIR;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]*$").expect("valid identifier regex"));

/// A dotted path of sub-chart names, e.g. `.ingressAlias.service`. Empty for the root chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    segments: Vec<String>,
}

impl NodeAddress {
    pub fn root() -> Self {
        Self::default()
    }

    /// Build an address from a dotted string; empty segments are ignored.
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

/// Derive the address of a file from its path inside the chart tree.
///
/// Every segment directly after a `charts` directory names one nesting level.
/// Segments that are not identifiers (letters, then letters or digits) are skipped.
pub fn resolve_address(path: &str) -> NodeAddress {
    let segments = path
        .split('/')
        .collect::<Vec<_>>()
        .windows(2)
        .filter(|pair| pair[0] == CHARTS_DIR && IDENTIFIER.is_match(pair[1]))
        .map(|pair| pair[1].to_string())
        .collect();
    NodeAddress { segments }
}
