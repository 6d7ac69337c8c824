use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::primitives::file_path::FilePath;

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AuditSettings {
    /// Also plan every operation with the Federation v2 planner against the
    /// Federation v1 supergraph. This separates planner changes from
    /// composition changes in the report.
    ///
    /// Can also be set via the `AUDIT_HYBRID_COMPARISON` environment variable.
    #[serde(default)]
    pub hybrid_comparison: bool,

    /// Write a mermaid diagram next to each report.
    #[serde(default)]
    pub include_diagrams: bool,

    /// Directory the reports are written to, relative to the config file.
    /// Nothing is written when unset.
    ///
    /// Can also be set via the `AUDIT_OUT_DIR` environment variable.
    #[serde(default)]
    pub out: Option<FilePath>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct OperationsConfig {
    /// A JSON or YAML list of `{ queryId, queryName, querySignature }` records.
    ///
    /// Can also be set via the `AUDIT_OPERATIONS_FILE` environment variable.
    #[serde(default)]
    pub file: Option<FilePath>,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Fed2ReadinessConfig {
    /// The graph and variant the operations were recorded for, as
    /// `graph@variant`. Used to link reports to the registry.
    ///
    /// Can also be set via the `AUDIT_GRAPH_REF` environment variable.
    #[serde(alias = "graphref")]
    pub graph_ref: String,
}

impl Fed2ReadinessConfig {
    /// The graph id and the variant, `current` when the ref has none.
    pub fn graph_and_variant(&self) -> (&str, &str) {
        match self.graph_ref.split_once('@') {
            Some((graph, variant)) => (graph, variant),
            None => (self.graph_ref.as_str(), "current"),
        }
    }
}
