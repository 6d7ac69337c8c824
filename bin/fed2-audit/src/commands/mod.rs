pub mod audit;
pub mod diff;
pub mod normalize;

use std::path::Path;

use serde_json::Value;

use crate::error::CliError;

fn read_plan_json(path: &Path) -> Result<Value, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|err| CliError::read(path, err))?;
    serde_json::from_str(&raw).map_err(|err| CliError::Parse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}
