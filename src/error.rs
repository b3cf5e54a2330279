use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort the cleaning of a single table.
///
/// Everything else that can go wrong with the data itself (duplicate rows,
/// missing non-key values, unparseable timestamps) is normalized by the
/// cleaning operations and never surfaces as an error.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("source {} is unavailable: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{role} column '{column}' not found (available: {})", available.join(", "))]
    MissingColumn {
        role: ColumnRole,
        column: String,
        available: Vec<String>,
    },

    #[error("columns '{first}' and '{second}' both normalize to '{normalized}'")]
    ColumnNameCollision {
        first: String,
        second: String,
        normalized: String,
    },
}

impl CleanError {
    /// True for the schema-violation family: the table is readable but does
    /// not have the shape its configuration declares.
    pub fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            CleanError::MissingColumn { .. } | CleanError::ColumnNameCollision { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Key,
    Timestamp,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColumnRole::Key => "key",
            ColumnRole::Timestamp => "timestamp",
        };
        write!(f, "{s}")
    }
}
