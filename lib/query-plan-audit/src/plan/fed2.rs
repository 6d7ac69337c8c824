use super::codec::{
    insert_optional_node, invalid, into_object, tagged, take_field, take_node,
    take_optional_node,
};
use super::{encode_plan_node, PlanDecodeError, PlanNode, PlanVocabulary};
use crate::{
    engine::FederationVersion,
    utils::pretty_display::{get_indent, write_indented_lines, PrettyDisplay},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Formatter as FmtFormatter, Result as FmtResult};

/// Plans built by the Federation v2 query planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fed2;

#[derive(Debug, Clone, PartialEq)]
pub enum Fed2Node {
    Condition(ConditionNode),
    Defer(DeferNode),
    Subscription(SubscriptionNode),
}

/// Branches on the value of a boolean variable (`@include`/`@skip`).
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionNode {
    pub condition: String,
    pub if_clause: Option<Box<PlanNode<Fed2>>>,
    pub else_clause: Option<Box<PlanNode<Fed2>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeferNode {
    pub primary: PrimaryDeferBlock,
    pub deferred: Vec<DeferredNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryDeferBlock {
    pub subselection: Option<String>,
    pub node: Option<Box<PlanNode<Fed2>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeferredNode {
    pub depends: Vec<DeferredDependency>,
    pub label: Option<String>,
    pub query_path: Vec<String>,
    pub subselection: Option<String>,
    pub node: Option<Box<PlanNode<Fed2>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeferredDependency {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defer_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionNode {
    pub primary: Box<PlanNode<Fed2>>,
    pub rest: Option<Box<PlanNode<Fed2>>>,
}

impl PlanVocabulary for Fed2 {
    type Node = Fed2Node;

    const VERSION: FederationVersion = FederationVersion::Two;

    fn decode_node(kind: &str, value: Value) -> Result<Self::Node, PlanDecodeError> {
        match kind {
            "Condition" => {
                let mut object = into_object(kind, value)?;
                let condition = take_field::<Option<String>>(&mut object, kind, "condition")?
                    .ok_or_else(|| invalid(kind, "missing \"condition\""))?;

                Ok(Fed2Node::Condition(ConditionNode {
                    condition,
                    if_clause: take_optional_node(&mut object, "ifClause")?.map(Box::new),
                    else_clause: take_optional_node(&mut object, "elseClause")?.map(Box::new),
                }))
            }
            "Defer" => {
                let mut object = into_object(kind, value)?;
                let mut primary = match object.remove("primary") {
                    Some(primary) => into_object(kind, primary)?,
                    None => Map::new(),
                };
                let deferred = match object.remove("deferred") {
                    Some(Value::Array(deferred)) => deferred
                        .into_iter()
                        .map(|deferred| decode_deferred(kind, deferred))
                        .collect::<Result<Vec<_>, _>>()?,
                    None | Some(Value::Null) => vec![],
                    Some(_) => return Err(invalid(kind, "\"deferred\" must be a list")),
                };

                Ok(Fed2Node::Defer(DeferNode {
                    primary: PrimaryDeferBlock {
                        subselection: take_field(&mut primary, kind, "subselection")?,
                        node: take_optional_node(&mut primary, "node")?.map(Box::new),
                    },
                    deferred,
                }))
            }
            "Subscription" => {
                let mut object = into_object(kind, value)?;

                Ok(Fed2Node::Subscription(SubscriptionNode {
                    primary: Box::new(take_node(&mut object, kind, "primary")?),
                    rest: take_optional_node(&mut object, "rest")?.map(Box::new),
                }))
            }
            _ => Err(PlanDecodeError::UnknownNodeKind {
                kind: kind.to_string(),
                version: Self::VERSION,
            }),
        }
    }

    fn encode_node(node: &Self::Node) -> Result<Value, serde_json::Error> {
        let mut object = tagged(Self::node_kind(node));
        match node {
            Fed2Node::Condition(condition) => {
                object.insert(
                    "condition".to_string(),
                    Value::from(condition.condition.clone()),
                );
                insert_optional_node(&mut object, "ifClause", condition.if_clause.as_deref())?;
                insert_optional_node(&mut object, "elseClause", condition.else_clause.as_deref())?;
            }
            Fed2Node::Defer(defer) => {
                let mut primary = Map::new();
                if let Some(subselection) = &defer.primary.subselection {
                    primary.insert("subselection".to_string(), Value::from(subselection.clone()));
                }
                insert_optional_node(&mut primary, "node", defer.primary.node.as_deref())?;
                object.insert("primary".to_string(), Value::Object(primary));
                object.insert(
                    "deferred".to_string(),
                    Value::Array(
                        defer
                            .deferred
                            .iter()
                            .map(encode_deferred)
                            .collect::<Result<_, _>>()?,
                    ),
                );
            }
            Fed2Node::Subscription(subscription) => {
                object.insert("primary".to_string(), encode_plan_node(&subscription.primary)?);
                insert_optional_node(&mut object, "rest", subscription.rest.as_deref())?;
            }
        }

        Ok(Value::Object(object))
    }

    fn node_kind(node: &Self::Node) -> &'static str {
        match node {
            Fed2Node::Condition(_) => "Condition",
            Fed2Node::Defer(_) => "Defer",
            Fed2Node::Subscription(_) => "Subscription",
        }
    }

    fn walk_children<E>(
        node: Self::Node,
        walk: &mut dyn FnMut(PlanNode<Self>) -> Result<PlanNode<Self>, E>,
    ) -> Result<Self::Node, E> {
        Ok(match node {
            Fed2Node::Condition(condition) => Fed2Node::Condition(ConditionNode {
                condition: condition.condition,
                if_clause: walk_optional(condition.if_clause, walk)?,
                else_clause: walk_optional(condition.else_clause, walk)?,
            }),
            Fed2Node::Defer(defer) => Fed2Node::Defer(DeferNode {
                primary: PrimaryDeferBlock {
                    subselection: defer.primary.subselection,
                    node: walk_optional(defer.primary.node, walk)?,
                },
                deferred: defer
                    .deferred
                    .into_iter()
                    .map(|deferred| {
                        Ok(DeferredNode {
                            node: walk_optional(deferred.node, walk)?,
                            ..deferred
                        })
                    })
                    .collect::<Result<_, E>>()?,
            }),
            Fed2Node::Subscription(subscription) => Fed2Node::Subscription(SubscriptionNode {
                primary: Box::new(walk(*subscription.primary)?),
                rest: walk_optional(subscription.rest, walk)?,
            }),
        })
    }

    fn children(node: &Self::Node) -> Vec<(&'static str, &PlanNode<Self>)> {
        match node {
            Fed2Node::Condition(condition) => {
                let mut children = vec![];
                if let Some(if_clause) = &condition.if_clause {
                    children.push(("If", if_clause.as_ref()));
                }
                if let Some(else_clause) = &condition.else_clause {
                    children.push(("Else", else_clause.as_ref()));
                }
                children
            }
            Fed2Node::Defer(defer) => defer
                .primary
                .node
                .iter()
                .map(|node| ("Primary", node.as_ref()))
                .chain(
                    defer
                        .deferred
                        .iter()
                        .filter_map(|deferred| deferred.node.as_deref())
                        .map(|node| ("Deferred", node)),
                )
                .collect(),
            Fed2Node::Subscription(subscription) => {
                let mut children = vec![("Primary", subscription.primary.as_ref())];
                if let Some(rest) = &subscription.rest {
                    children.push(("Rest", rest.as_ref()));
                }
                children
            }
        }
    }

    fn pretty_fmt_node(node: &Self::Node, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        match node {
            Fed2Node::Condition(condition) => condition.pretty_fmt(f, depth),
            Fed2Node::Defer(defer) => defer.pretty_fmt(f, depth),
            Fed2Node::Subscription(subscription) => subscription.pretty_fmt(f, depth),
        }
    }
}

fn walk_optional<E, F>(
    node: Option<Box<PlanNode<Fed2>>>,
    walk: &mut F,
) -> Result<Option<Box<PlanNode<Fed2>>>, E>
where
    F: FnMut(PlanNode<Fed2>) -> Result<PlanNode<Fed2>, E> + ?Sized,
{
    node.map(|node| walk(*node).map(Box::new)).transpose()
}

fn decode_deferred(kind: &str, value: Value) -> Result<DeferredNode, PlanDecodeError> {
    let mut object = into_object(kind, value)?;

    Ok(DeferredNode {
        depends: take_field::<Option<_>>(&mut object, kind, "depends")?.unwrap_or_default(),
        label: take_field(&mut object, kind, "label")?,
        query_path: take_field::<Option<_>>(&mut object, kind, "queryPath")?.unwrap_or_default(),
        subselection: take_field(&mut object, kind, "subselection")?,
        node: take_optional_node(&mut object, "node")?.map(Box::new),
    })
}

fn encode_deferred(deferred: &DeferredNode) -> Result<Value, serde_json::Error> {
    let mut object = Map::new();
    object.insert("depends".to_string(), serde_json::to_value(&deferred.depends)?);
    if let Some(label) = &deferred.label {
        object.insert("label".to_string(), Value::from(label.clone()));
    }
    object.insert(
        "queryPath".to_string(),
        serde_json::to_value(&deferred.query_path)?,
    );
    if let Some(subselection) = &deferred.subselection {
        object.insert("subselection".to_string(), Value::from(subselection.clone()));
    }
    insert_optional_node(&mut object, "node", deferred.node.as_deref())?;

    Ok(Value::Object(object))
}

impl PrettyDisplay for ConditionNode {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        let condition = &self.condition;
        match (&self.if_clause, &self.else_clause) {
            (Some(if_clause), Some(else_clause)) => {
                writeln!(f, "{indent}Condition(if: ${condition}) {{")?;
                writeln!(f, "{indent}  Then {{")?;
                if_clause.pretty_fmt(f, depth + 2)?;
                writeln!(f, "{indent}  }}")?;
                writeln!(f, "{indent}  Else {{")?;
                else_clause.pretty_fmt(f, depth + 2)?;
                writeln!(f, "{indent}  }}")?;
            }
            (Some(if_clause), None) => {
                writeln!(f, "{indent}Include(if: ${condition}) {{")?;
                if_clause.pretty_fmt(f, depth + 1)?;
            }
            (None, Some(else_clause)) => {
                writeln!(f, "{indent}Skip(if: ${condition}) {{")?;
                else_clause.pretty_fmt(f, depth + 1)?;
            }
            (None, None) => writeln!(f, "{indent}Condition(if: ${condition}) {{")?,
        }
        writeln!(f, "{indent}}},")
    }
}

impl PrettyDisplay for DeferNode {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        writeln!(f, "{indent}Defer {{")?;
        writeln!(f, "{indent}  Primary {{")?;
        if let Some(subselection) = &self.primary.subselection {
            write_indented_lines(f, subselection, depth + 2)?;
            writeln!(f, "{indent}    :")?;
        }
        if let Some(node) = &self.primary.node {
            node.pretty_fmt(f, depth + 2)?;
        }
        writeln!(f, "{indent}  }}, [")?;
        for deferred in &self.deferred {
            deferred.pretty_fmt(f, depth + 2)?;
        }
        writeln!(f, "{indent}  ]")?;
        writeln!(f, "{indent}}},")
    }
}

impl PrettyDisplay for DeferredNode {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        let depends = self
            .depends
            .iter()
            .map(|dependency| match &dependency.defer_label {
                Some(label) => format!("{}:{label}", dependency.id),
                None => dependency.id.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{indent}Deferred(depends: [{depends}], path: \"{}\"",
            self.query_path.join("/")
        )?;
        if let Some(label) = &self.label {
            write!(f, ", label: \"{label}\"")?;
        }
        writeln!(f, ") {{")?;
        if let Some(subselection) = &self.subselection {
            write_indented_lines(f, subselection, depth + 1)?;
            writeln!(f, "{indent}  :")?;
        }
        if let Some(node) = &self.node {
            node.pretty_fmt(f, depth + 1)?;
        }
        writeln!(f, "{indent}}},")
    }
}

impl PrettyDisplay for SubscriptionNode {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        writeln!(f, "{indent}Subscription {{")?;
        writeln!(f, "{indent}  Primary: {{")?;
        self.primary.pretty_fmt(f, depth + 2)?;
        writeln!(f, "{indent}  }},")?;
        if let Some(rest) = &self.rest {
            writeln!(f, "{indent}  Rest: {{")?;
            rest.pretty_fmt(f, depth + 2)?;
            writeln!(f, "{indent}  }},")?;
        }
        writeln!(f, "{indent}}},")
    }
}
