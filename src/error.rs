use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the analysis stages.
///
/// `Io`, `Csv`, `Shapefile`, `MissingColumn` and `MalformedValue` cover missing or
/// malformed inputs; `MissingIndicator` and `Convergence` cover the mixture fit;
/// `JoinMismatch` is only raised when the map join runs in strict mode.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("failed to read shapefile {}: {reason}", path.display())]
    Shapefile { path: PathBuf, reason: String },

    #[error("table operation failed: {0}")]
    Table(#[from] polars::error::PolarsError),

    #[error("missing column {0:?}")]
    MissingColumn(String),

    #[error("malformed value {value:?} in column {column:?} at row {row}")]
    MalformedValue { column: String, row: usize, value: String },

    #[error("indicator {column:?} is missing at row {row}; every record must be classified")]
    MissingIndicator { column: String, row: usize },

    #[error("mixture model with {components} components did not converge: {reason}")]
    Convergence { components: usize, reason: String },

    #[error("{} polygon(s) have no class assignment: {}", names.len(), names.join(", "))]
    JoinMismatch { names: Vec<String> },

    #[error("projection failed: {0}")]
    Projection(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn convergence(components: usize, reason: impl Into<String>) -> Self {
        Self::Convergence { components, reason: reason.into() }
    }
}
