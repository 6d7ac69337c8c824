use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recorded client operation to replay against both planners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub query_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_name: Option<String>,
    pub query_signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidOperationRecord {
    #[error("operation record is not an object")]
    NotAnObject,
    #[error("operation record has no non-empty string \"{field}\"")]
    MissingField { field: &'static str },
}

impl Operation {
    pub fn new(
        query_id: impl Into<String>,
        query_name: Option<String>,
        query_signature: impl Into<String>,
    ) -> Self {
        Operation {
            query_id: query_id.into(),
            query_name,
            query_signature: query_signature.into(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.query_name.as_deref().unwrap_or("Unnamed")
    }

    /// The first six characters of the query id, used in titles and file names.
    pub fn short_id(&self) -> String {
        self.query_id.chars().take(6).collect()
    }
}

impl TryFrom<Value> for Operation {
    type Error = InvalidOperationRecord;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut record) = value else {
            return Err(InvalidOperationRecord::NotAnObject);
        };

        let mut required = |field: &'static str| match record.remove(field) {
            Some(Value::String(value)) if !value.is_empty() => Ok(value),
            _ => Err(InvalidOperationRecord::MissingField { field }),
        };
        let query_id = required("queryId")?;
        let query_signature = required("querySignature")?;

        let query_name = match record.remove("queryName") {
            Some(Value::String(name)) => Some(name),
            _ => None,
        };

        Ok(Operation {
            query_id,
            query_name,
            query_signature,
        })
    }
}
