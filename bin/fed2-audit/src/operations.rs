use std::path::Path;

use query_plan_audit::Operation;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationsFormat {
    Json,
    Yaml,
}

impl OperationsFormat {
    /// JSON for `.json` files, YAML for anything else.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OperationsFormat::Json,
            _ => OperationsFormat::Yaml,
        }
    }
}

/// Valid operations of a list of records, and how many records were skipped.
#[derive(Debug, Default)]
pub struct LoadedOperations {
    pub operations: Vec<Operation>,
    pub skipped: usize,
}

pub fn parse_operations(raw: &str, format: OperationsFormat) -> Result<LoadedOperations, String> {
    let value: Value = match format {
        OperationsFormat::Json => serde_json::from_str(raw).map_err(|err| err.to_string())?,
        OperationsFormat::Yaml => serde_yaml::from_str(raw).map_err(|err| err.to_string())?,
    };

    let Value::Array(records) = value else {
        return Err("expected a list of operation records".to_string());
    };

    let mut loaded = LoadedOperations::default();
    for (index, record) in records.into_iter().enumerate() {
        match Operation::try_from(record) {
            Ok(operation) => loaded.operations.push(operation),
            Err(err) => {
                debug!(index, error = %err, "skipping operation record");
                loaded.skipped += 1;
            }
        }
    }

    Ok(loaded)
}

pub fn load_operations(path: &Path) -> Result<Vec<Operation>, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|err| CliError::read(path, err))?;
    let loaded =
        parse_operations(&raw, OperationsFormat::from_path(path)).map_err(|reason| {
            CliError::Parse {
                path: path.to_path_buf(),
                reason,
            }
        })?;

    if loaded.skipped > 0 {
        warn!(
            skipped = loaded.skipped,
            path = %path.display(),
            "ignored operation records without a queryId or querySignature"
        );
    }

    Ok(loaded.operations)
}
