use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter as FmtFormatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FederationVersion {
    One,
    Two,
}

impl FederationVersion {
    pub fn short_name(&self) -> &'static str {
        match self {
            FederationVersion::One => "fed1",
            FederationVersion::Two => "fed2",
        }
    }
}

impl Display for FederationVersion {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        match self {
            FederationVersion::One => write!(f, "Federation v1"),
            FederationVersion::Two => write!(f, "Federation v2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgraphDefinition {
    pub name: String,
    pub url: Option<String>,
    pub sdl: String,
}

/// A composed supergraph whose SDL is known to parse as a schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct Supergraph {
    version: FederationVersion,
    sdl: String,
}

impl Supergraph {
    pub fn new(version: FederationVersion, sdl: impl Into<String>) -> Result<Self, CompositionError> {
        let sdl = sdl.into();
        graphql_parser::parse_schema::<String>(&sdl).map_err(|err| {
            CompositionError::InvalidSupergraph {
                version,
                reason: err.to_string(),
            }
        })?;

        Ok(Supergraph { version, sdl })
    }

    /// The engine whose composition produced this supergraph.
    pub fn version(&self) -> FederationVersion {
        self.version
    }

    pub fn sdl(&self) -> &str {
        &self.sdl
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CompositionError {
    #[error("Schema did not compose with {version}:\n{}", .errors.join("\n\n"))]
    Failed {
        version: FederationVersion,
        errors: Vec<String>,
    },
    #[error("{version} supergraph could not be loaded: {reason}")]
    InvalidSupergraph {
        version: FederationVersion,
        reason: String,
    },
    #[error("{version} composition could not run: {reason}")]
    Unavailable {
        version: FederationVersion,
        reason: String,
    },
}

impl CompositionError {
    pub fn version(&self) -> FederationVersion {
        match self {
            CompositionError::Failed { version, .. }
            | CompositionError::InvalidSupergraph { version, .. }
            | CompositionError::Unavailable { version, .. } => *version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PlanningError {
    pub message: String,
}

impl PlanningError {
    pub fn new(message: impl Into<String>) -> Self {
        PlanningError {
            message: message.into(),
        }
    }
}

/// Composes subgraph schemas into a supergraph.
#[async_trait]
pub trait Composer: Send + Sync {
    fn version(&self) -> FederationVersion;

    async fn compose(
        &self,
        subgraphs: &[SubgraphDefinition],
    ) -> Result<Supergraph, CompositionError>;
}

/// Builds a query plan for one operation document.
///
/// The plan is returned in its JSON wire form and decoded by the caller with
/// the vocabulary of the engine it expects.
#[async_trait]
pub trait QueryPlanner: Send + Sync {
    async fn plan(
        &self,
        supergraph: &Supergraph,
        document: &str,
        operation_name: Option<&str>,
    ) -> Result<Value, PlanningError>;
}
