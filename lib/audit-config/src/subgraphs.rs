use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::primitives::file_path::FilePath;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SubgraphConfig {
    /// The URL the subgraph is served from. Passed to composition as is.
    #[serde(default)]
    pub routing_url: Option<String>,

    /// Where the subgraph schema comes from.
    pub schema: SchemaSource,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum SchemaSource {
    /// A local SDL file, relative to the config file.
    File(FileSchemaSource),
    /// A subgraph published to a schema registry.
    GraphRef(GraphRefSchemaSource),
    /// A running subgraph to introspect.
    SubgraphUrl(SubgraphUrlSchemaSource),
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FileSchemaSource {
    pub file: FilePath,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GraphRefSchemaSource {
    #[serde(alias = "graphref")]
    pub graph_ref: String,
    pub subgraph: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SubgraphUrlSchemaSource {
    pub subgraph_url: String,
}

impl SchemaSource {
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaSource::File(_) => "file",
            SchemaSource::GraphRef(_) => "graph_ref",
            SchemaSource::SubgraphUrl(_) => "subgraph_url",
        }
    }
}
