//! Error types shared across the crate.

use thiserror::Error;

use crate::chart::ChartError;

/// Errors produced while loading charts, resolving values or rendering overrides.
#[derive(Debug, Error)]
pub enum VivError {
    /// A sub-chart failed; the inner error carries the original cause.
    #[error("subchart generate failed. {chart}: {source}")]
    Traversal {
        /// Name of the sub-chart that failed
        chart: String,
        #[source]
        source: Box<VivError>,
    },

    /// An override template could not be parsed or executed.
    #[error("vivfile generate failed. {path}: {message}")]
    Render {
        /// Chart-relative path of the override file
        path: String,
        /// Flattened template error chain
        message: String,
    },

    /// Writing or nesting the output of an override file failed.
    #[error("vivfile generate failed. {path}: {source}")]
    File {
        path: String,
        #[source]
        source: Box<VivError>,
    },

    /// Rendered content was not a YAML mapping.
    #[error("rendered document is not a valid mapping: {message}")]
    Serialization {
        message: String,
        /// The offending bytes, kept so callers can log them
        content: Vec<u8>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Values error: {0}")]
    Values(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Helm error: {0}")]
    Helm(String),
}

impl VivError {
    /// Wrap this error as the failure of sub-chart `chart`.
    pub fn in_subchart(self, chart: impl Into<String>) -> Self {
        Self::Traversal {
            chart: chart.into(),
            source: Box::new(self),
        }
    }

    /// Attach the chart-relative path of the override file being processed.
    ///
    /// Template errors already carry it and are returned unchanged.
    pub fn for_file(self, path: impl Into<String>) -> Self {
        match self {
            Self::Render { .. } | Self::File { .. } => self,
            other => Self::File {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// The rendered bytes that failed to deserialize, if this is a serialization error.
    ///
    /// Looks through any number of traversal wrappers.
    pub fn offending_content(&self) -> Option<&[u8]> {
        match self {
            Self::Serialization { content, .. } => Some(content),
            Self::Traversal { source, .. } | Self::File { source, .. } => source.offending_content(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VivError>;
