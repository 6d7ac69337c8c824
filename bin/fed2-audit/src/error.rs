use std::path::PathBuf;

use audit_config::AuditConfigError;
use query_plan_audit::{plan::PlanDecodeError, AuditError, NormalizeError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] AuditConfigError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error(transparent)]
    Decode(#[from] PlanDecodeError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
    #[error("Subgraph \"{subgraph}\" uses a {kind} schema source, only file sources are supported")]
    UnsupportedSchemaSource { subgraph: String, kind: &'static str },
    #[error("No operations to audit: set operations.file or pass --operations")]
    MissingOperations,
    #[error("No subgraphs configured")]
    MissingSubgraphs,
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CliError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Write {
            path: path.into(),
            source,
        }
    }
}
