use super::{PlanDecodeError, PlanNode, PlanVocabulary};
use crate::engine::FederationVersion;
use serde_json::Value;
use std::fmt::{Formatter as FmtFormatter, Result as FmtResult};

/// Plans built by the Federation v1 query planner: only the shared node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fed1;

/// Uninhabited: a Federation v1 plan has no engine-specific nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoExtension {}

impl PlanVocabulary for Fed1 {
    type Node = NoExtension;

    const VERSION: FederationVersion = FederationVersion::One;

    fn decode_node(kind: &str, _value: Value) -> Result<Self::Node, PlanDecodeError> {
        Err(PlanDecodeError::UnknownNodeKind {
            kind: kind.to_string(),
            version: Self::VERSION,
        })
    }

    fn encode_node(node: &Self::Node) -> Result<Value, serde_json::Error> {
        match *node {}
    }

    fn node_kind(node: &Self::Node) -> &'static str {
        match *node {}
    }

    fn walk_children<E>(
        node: Self::Node,
        _walk: &mut dyn FnMut(PlanNode<Self>) -> Result<PlanNode<Self>, E>,
    ) -> Result<Self::Node, E> {
        match node {}
    }

    fn children(node: &Self::Node) -> Vec<(&'static str, &PlanNode<Self>)> {
        match *node {}
    }

    fn pretty_fmt_node(node: &Self::Node, _f: &mut FmtFormatter<'_>, _depth: usize) -> FmtResult {
        match *node {}
    }
}
