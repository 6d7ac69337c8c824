use super::{FlattenNode, FlattenPathSegment, PlanNode, PlanVocabulary, QueryPlan};
use crate::engine::FederationVersion;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanDecodeError {
    #[error("Invalid query plan node kind: {kind}. This tool may need to update its {version} support.")]
    UnknownNodeKind {
        kind: String,
        version: FederationVersion,
    },
    #[error("Query plan node is missing its \"kind\"")]
    MissingKind,
    #[error("Invalid {kind} node: {reason}")]
    InvalidNode { kind: String, reason: String },
}

/// Decodes the JSON form of a query plan using the node vocabulary `V`.
///
/// A `null` plan, or a plan without a `node`, decodes to an empty plan.
pub fn decode_query_plan<V: PlanVocabulary>(
    value: Value,
) -> Result<QueryPlan<V>, PlanDecodeError> {
    let mut object = match value {
        Value::Null => return Ok(QueryPlan::empty()),
        value => into_object("QueryPlan", value)?,
    };

    match object.get("kind").and_then(Value::as_str) {
        None | Some("QueryPlan") => {}
        Some(other) => {
            return Err(invalid(
                "QueryPlan",
                format!("expected kind \"QueryPlan\", found \"{other}\""),
            ))
        }
    }

    match object.remove("node") {
        None | Some(Value::Null) => Ok(QueryPlan::empty()),
        Some(node) => Ok(QueryPlan::new(decode_plan_node(node)?)),
    }
}

pub fn decode_plan_node<V: PlanVocabulary>(value: Value) -> Result<PlanNode<V>, PlanDecodeError> {
    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(PlanDecodeError::MissingKind)?;

    match kind.as_str() {
        "Fetch" => serde_json::from_value(value)
            .map(PlanNode::Fetch)
            .map_err(|err| invalid(&kind, err)),
        "Flatten" => {
            let mut object = into_object(&kind, value)?;
            let path = match object.remove("path") {
                Some(Value::Array(segments)) => segments
                    .iter()
                    .map(|segment| {
                        FlattenPathSegment::from_json(segment).ok_or_else(|| {
                            invalid(&kind, format!("invalid path segment {segment}"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                _ => return Err(invalid(&kind, "missing \"path\"")),
            };
            let node = take_node(&mut object, &kind, "node")?;

            Ok(PlanNode::Flatten(FlattenNode {
                path,
                node: Box::new(node),
            }))
        }
        "Parallel" => {
            let mut object = into_object(&kind, value)?;
            Ok(PlanNode::Parallel(take_nodes(&mut object, &kind, "nodes")?))
        }
        "Sequence" => {
            let mut object = into_object(&kind, value)?;
            Ok(PlanNode::Sequence(take_nodes(&mut object, &kind, "nodes")?))
        }
        _ => V::decode_node(&kind, value).map(PlanNode::Extension),
    }
}

pub(crate) fn encode_query_plan<V: PlanVocabulary>(
    plan: &QueryPlan<V>,
) -> Result<Value, serde_json::Error> {
    let mut object = Map::new();
    object.insert("kind".to_string(), Value::from("QueryPlan"));
    if let Some(node) = &plan.node {
        object.insert("node".to_string(), encode_plan_node(node)?);
    }

    Ok(Value::Object(object))
}

pub fn encode_plan_node<V: PlanVocabulary>(node: &PlanNode<V>) -> Result<Value, serde_json::Error> {
    match node {
        PlanNode::Fetch(fetch) => {
            let mut value = serde_json::to_value(fetch)?;
            if let Value::Object(object) = &mut value {
                object.insert("kind".to_string(), Value::from("Fetch"));
            }
            Ok(value)
        }
        PlanNode::Flatten(flatten) => {
            let mut object = tagged("Flatten");
            object.insert(
                "path".to_string(),
                Value::Array(flatten.path.iter().map(FlattenPathSegment::to_json).collect()),
            );
            object.insert("node".to_string(), encode_plan_node(&flatten.node)?);
            Ok(Value::Object(object))
        }
        PlanNode::Parallel(nodes) | PlanNode::Sequence(nodes) => {
            let mut object = tagged(node.kind());
            object.insert(
                "nodes".to_string(),
                Value::Array(nodes.iter().map(encode_plan_node).collect::<Result<_, _>>()?),
            );
            Ok(Value::Object(object))
        }
        PlanNode::Extension(extension) => V::encode_node(extension),
    }
}

pub(super) fn tagged(kind: &str) -> Map<String, Value> {
    let mut object = Map::new();
    object.insert("kind".to_string(), Value::from(kind));
    object
}

pub(super) fn invalid(kind: &str, reason: impl ToString) -> PlanDecodeError {
    PlanDecodeError::InvalidNode {
        kind: kind.to_string(),
        reason: reason.to_string(),
    }
}

pub(super) fn into_object(kind: &str, value: Value) -> Result<Map<String, Value>, PlanDecodeError> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(invalid(kind, format!("expected an object, found {other}"))),
    }
}

pub(super) fn take_node<V: PlanVocabulary>(
    object: &mut Map<String, Value>,
    kind: &str,
    field: &str,
) -> Result<PlanNode<V>, PlanDecodeError> {
    take_optional_node(object, field)?
        .ok_or_else(|| invalid(kind, format!("missing \"{field}\"")))
}

pub(super) fn take_optional_node<V: PlanVocabulary>(
    object: &mut Map<String, Value>,
    field: &str,
) -> Result<Option<PlanNode<V>>, PlanDecodeError> {
    match object.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(node) => decode_plan_node(node).map(Some),
    }
}

pub(super) fn take_nodes<V: PlanVocabulary>(
    object: &mut Map<String, Value>,
    kind: &str,
    field: &str,
) -> Result<Vec<PlanNode<V>>, PlanDecodeError> {
    match object.remove(field) {
        Some(Value::Array(nodes)) => nodes.into_iter().map(decode_plan_node).collect(),
        _ => Err(invalid(kind, format!("missing \"{field}\""))),
    }
}

/// Deserializes `field`, treating an absent field as `null`.
pub(super) fn take_field<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    kind: &str,
    field: &str,
) -> Result<T, PlanDecodeError> {
    serde_json::from_value(object.remove(field).unwrap_or(Value::Null))
        .map_err(|err| invalid(kind, format!("\"{field}\": {err}")))
}

pub(super) fn insert_optional_node<V: PlanVocabulary>(
    object: &mut Map<String, Value>,
    field: &str,
    node: Option<&PlanNode<V>>,
) -> Result<(), serde_json::Error> {
    if let Some(node) = node {
        object.insert(field.to_string(), encode_plan_node(node)?);
    }
    Ok(())
}
