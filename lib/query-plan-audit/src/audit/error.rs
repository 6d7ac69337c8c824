use crate::{
    engine::{CompositionError, FederationVersion, PlanningError},
    normalize::NormalizeError,
    plan::PlanDecodeError,
};
use serde::{Serialize, Serializer};

/// Errors that stop a whole audit run.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error(transparent)]
    Composition(#[from] CompositionError),
    #[error("Invalid query plan node kind: {kind}. This tool may need to update its {version} support.")]
    UnknownNodeKind {
        kind: String,
        version: FederationVersion,
    },
}

/// Why one engine could not produce a comparable plan for one operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error(transparent)]
    Planning(#[from] PlanningError),
    #[error(transparent)]
    InvalidPlan(PlanDecodeError),
    #[error(transparent)]
    Normalization(#[from] NormalizeError),
}

impl Serialize for OperationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
