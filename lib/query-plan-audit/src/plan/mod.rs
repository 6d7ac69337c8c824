mod codec;
mod fed1;
mod fed2;
mod requires;

pub use codec::{decode_plan_node, decode_query_plan, encode_plan_node, PlanDecodeError};
pub use fed1::{Fed1, NoExtension};
pub use fed2::{
    ConditionNode, DeferNode, DeferredDependency, DeferredNode, Fed2, Fed2Node,
    PrimaryDeferBlock, SubscriptionNode,
};
pub use requires::{RequiresField, RequiresInlineFragment, RequiresSelection};

use crate::{
    engine::FederationVersion,
    utils::pretty_display::{get_indent, write_indented_lines, PrettyDisplay},
};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt::{Debug, Display, Formatter as FmtFormatter, Result as FmtResult};

/// The node vocabulary emitted by one planning engine.
///
/// Both engines share `Fetch`, `Flatten`, `Parallel` and `Sequence`. Whatever
/// else an engine can emit lives in [`PlanVocabulary::Node`] and is carried by
/// [`PlanNode::Extension`], so code that only cares about the shared kinds is
/// written once and the engine-specific kinds are handled here.
pub trait PlanVocabulary: Sized + Clone + Debug + PartialEq + Send + Sync + 'static {
    type Node: Clone + Debug + PartialEq + Send + Sync;

    const VERSION: FederationVersion;

    /// Decodes a node whose `kind` is not one of the shared kinds.
    fn decode_node(kind: &str, value: Value) -> Result<Self::Node, PlanDecodeError>;

    fn encode_node(node: &Self::Node) -> Result<Value, serde_json::Error>;

    fn node_kind(node: &Self::Node) -> &'static str;

    /// Rebuilds `node` with every child plan node passed through `walk`.
    fn walk_children<E>(
        node: Self::Node,
        walk: &mut dyn FnMut(PlanNode<Self>) -> Result<PlanNode<Self>, E>,
    ) -> Result<Self::Node, E>;

    /// Labelled child plan nodes, in display order.
    fn children(node: &Self::Node) -> Vec<(&'static str, &PlanNode<Self>)>;

    fn pretty_fmt_node(node: &Self::Node, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult;
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan<V: PlanVocabulary> {
    pub node: Option<PlanNode<V>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode<V: PlanVocabulary> {
    Fetch(FetchNode),
    Flatten(FlattenNode<V>),
    Parallel(Vec<PlanNode<V>>),
    Sequence(Vec<PlanNode<V>>),
    Extension(V::Node),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    #[default]
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "mutation")]
    Mutation,
    #[serde(rename = "subscription")]
    Subscription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchNode {
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub variable_usages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<Vec<RequiresSelection>>,
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub operation_kind: OperationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlattenPathSegment {
    Field(String),
    /// `@` in the wire form: every item of a list.
    List,
    Index(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlattenNode<V: PlanVocabulary> {
    pub path: Vec<FlattenPathSegment>,
    pub node: Box<PlanNode<V>>,
}

impl<V: PlanVocabulary> QueryPlan<V> {
    pub fn new(node: PlanNode<V>) -> Self {
        QueryPlan { node: Some(node) }
    }

    pub fn empty() -> Self {
        QueryPlan { node: None }
    }

    pub fn version(&self) -> FederationVersion {
        V::VERSION
    }
}

impl<V: PlanVocabulary> PlanNode<V> {
    pub fn kind(&self) -> &'static str {
        match self {
            PlanNode::Fetch(_) => "Fetch",
            PlanNode::Flatten(_) => "Flatten",
            PlanNode::Parallel(_) => "Parallel",
            PlanNode::Sequence(_) => "Sequence",
            PlanNode::Extension(node) => V::node_kind(node),
        }
    }
}

impl FlattenPathSegment {
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(segment) if segment == "@" => Some(FlattenPathSegment::List),
            Value::String(segment) => Some(FlattenPathSegment::Field(segment.clone())),
            Value::Number(index) => index
                .as_u64()
                .and_then(|index| usize::try_from(index).ok())
                .map(FlattenPathSegment::Index),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FlattenPathSegment::Field(name) => Value::String(name.clone()),
            FlattenPathSegment::List => Value::String("@".to_string()),
            FlattenPathSegment::Index(index) => Value::from(*index),
        }
    }
}

impl Display for FlattenPathSegment {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        match self {
            FlattenPathSegment::Field(name) => write!(f, "{name}"),
            FlattenPathSegment::List => write!(f, "@"),
            FlattenPathSegment::Index(index) => write!(f, "{index}"),
        }
    }
}

impl<V: PlanVocabulary> FlattenNode<V> {
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|segment| segment.to_string())
            .collect::<Vec<String>>()
            .join(".")
    }
}

impl<V: PlanVocabulary> Serialize for QueryPlan<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        codec::encode_query_plan(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<V: PlanVocabulary> Serialize for PlanNode<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode_plan_node(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<V: PlanVocabulary> Display for QueryPlan<V> {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}

impl<V: PlanVocabulary> Display for PlanNode<V> {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}

impl Display for FetchNode {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        self.pretty_fmt(f, 0)
    }
}

impl<V: PlanVocabulary> PrettyDisplay for QueryPlan<V> {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        writeln!(f, "{indent}QueryPlan {{")?;
        if let Some(node) = &self.node {
            node.pretty_fmt(f, depth + 1)?;
        }
        writeln!(f, "{indent}}},")?;
        Ok(())
    }
}

impl PrettyDisplay for FetchNode {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        match &self.id {
            Some(id) => writeln!(
                f,
                "{indent}Fetch(service: \"{}\", id: {}) {{",
                self.service_name, id
            )?,
            None => writeln!(f, "{indent}Fetch(service: \"{}\") {{", self.service_name)?,
        }
        if let Some(requires) = &self.requires {
            writeln!(f, "{indent}  {{")?;
            for selection in requires {
                selection.pretty_fmt(f, depth + 2)?;
            }
            writeln!(f, "{indent}  }} =>")?;
        }
        write_indented_lines(f, &self.operation, depth + 1)?;
        writeln!(f, "{indent}}},")?;

        Ok(())
    }
}

impl<V: PlanVocabulary> PrettyDisplay for FlattenNode<V> {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        writeln!(f, "{indent}Flatten(path: \"{}\") {{", self.path_string())?;
        self.node.pretty_fmt(f, depth + 1)?;
        writeln!(f, "{indent}}},")?;

        Ok(())
    }
}

impl<V: PlanVocabulary> PrettyDisplay for PlanNode<V> {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        match self {
            PlanNode::Fetch(node) => node.pretty_fmt(f, depth),
            PlanNode::Flatten(node) => node.pretty_fmt(f, depth),
            PlanNode::Extension(node) => V::pretty_fmt_node(node, f, depth),
            PlanNode::Parallel(nodes) | PlanNode::Sequence(nodes) => {
                let indent = get_indent(depth);
                writeln!(f, "{indent}{} {{", self.kind())?;
                for node in nodes {
                    node.pretty_fmt(f, depth + 1)?;
                }
                writeln!(f, "{indent}}},")?;
                Ok(())
            }
        }
    }
}
