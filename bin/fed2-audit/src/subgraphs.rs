use audit_config::{subgraphs::SchemaSource, AuditConfig};
use query_plan_audit::SubgraphDefinition;
use tracing::debug;

use crate::error::CliError;

/// Reads every configured subgraph schema, in subgraph name order.
pub fn load_subgraphs(config: &AuditConfig) -> Result<Vec<SubgraphDefinition>, CliError> {
    if config.subgraphs.is_empty() {
        return Err(CliError::MissingSubgraphs);
    }

    config
        .subgraphs
        .iter()
        .map(|(name, subgraph)| {
            let file = match &subgraph.schema {
                SchemaSource::File(source) => &source.file,
                other => {
                    return Err(CliError::UnsupportedSchemaSource {
                        subgraph: name.clone(),
                        kind: other.kind(),
                    })
                }
            };

            debug!(subgraph = %name, path = %file, "reading subgraph schema");
            let sdl = std::fs::read_to_string(&file.absolute)
                .map_err(|err| CliError::read(&file.absolute, err))?;

            Ok(SubgraphDefinition {
                name: name.clone(),
                url: subgraph.routing_url.clone(),
                sdl,
            })
        })
        .collect()
}
