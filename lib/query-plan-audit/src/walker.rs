use crate::plan::{FetchNode, FlattenNode, PlanNode, PlanVocabulary, QueryPlan};

/// Per-kind callbacks for [`walk_query_plan`].
///
/// A `visit_*` callback sees a node before its children are walked and may
/// return a replacement for it. The walker then descends into the children of
/// whatever node is in place, so a replacement is walked too. `leave_parallel`
/// and `leave_sequence` run once the children have been rebuilt.
pub trait PlanVisitor<V: PlanVocabulary> {
    type Error;

    fn visit_fetch(&mut self, _node: &FetchNode) -> Result<Option<FetchNode>, Self::Error> {
        Ok(None)
    }

    fn visit_flatten(
        &mut self,
        _node: &FlattenNode<V>,
    ) -> Result<Option<FlattenNode<V>>, Self::Error> {
        Ok(None)
    }

    fn visit_parallel(
        &mut self,
        _nodes: &[PlanNode<V>],
    ) -> Result<Option<Vec<PlanNode<V>>>, Self::Error> {
        Ok(None)
    }

    fn visit_sequence(
        &mut self,
        _nodes: &[PlanNode<V>],
    ) -> Result<Option<Vec<PlanNode<V>>>, Self::Error> {
        Ok(None)
    }

    fn visit_extension(&mut self, _node: &V::Node) -> Result<Option<V::Node>, Self::Error> {
        Ok(None)
    }

    fn leave_parallel(&mut self, nodes: Vec<PlanNode<V>>) -> Result<Vec<PlanNode<V>>, Self::Error> {
        Ok(nodes)
    }

    fn leave_sequence(&mut self, nodes: Vec<PlanNode<V>>) -> Result<Vec<PlanNode<V>>, Self::Error> {
        Ok(nodes)
    }
}

/// Builds a new plan by walking `plan` with `visitor`. The input is left as is.
pub fn walk_query_plan<V, Vis>(
    plan: &QueryPlan<V>,
    visitor: &mut Vis,
) -> Result<QueryPlan<V>, Vis::Error>
where
    V: PlanVocabulary,
    Vis: PlanVisitor<V>,
{
    match &plan.node {
        None => Ok(plan.clone()),
        Some(node) => Ok(QueryPlan::new(walk_plan_node(node.clone(), visitor)?)),
    }
}

fn walk_plan_node<V, Vis>(node: PlanNode<V>, visitor: &mut Vis) -> Result<PlanNode<V>, Vis::Error>
where
    V: PlanVocabulary,
    Vis: PlanVisitor<V>,
{
    match node {
        PlanNode::Fetch(fetch) => Ok(PlanNode::Fetch(
            visitor.visit_fetch(&fetch)?.unwrap_or(fetch),
        )),
        PlanNode::Flatten(flatten) => {
            let flatten = visitor.visit_flatten(&flatten)?.unwrap_or(flatten);
            Ok(PlanNode::Flatten(FlattenNode {
                path: flatten.path,
                node: Box::new(walk_plan_node(*flatten.node, visitor)?),
            }))
        }
        PlanNode::Parallel(nodes) => {
            let nodes = visitor.visit_parallel(&nodes)?.unwrap_or(nodes);
            let nodes = walk_plan_nodes(nodes, visitor)?;
            Ok(PlanNode::Parallel(visitor.leave_parallel(nodes)?))
        }
        PlanNode::Sequence(nodes) => {
            let nodes = visitor.visit_sequence(&nodes)?.unwrap_or(nodes);
            let nodes = walk_plan_nodes(nodes, visitor)?;
            Ok(PlanNode::Sequence(visitor.leave_sequence(nodes)?))
        }
        PlanNode::Extension(extension) => {
            let extension = visitor.visit_extension(&extension)?.unwrap_or(extension);
            V::walk_children(extension, &mut |child| walk_plan_node(child, visitor))
                .map(PlanNode::Extension)
        }
    }
}

fn walk_plan_nodes<V, Vis>(
    nodes: Vec<PlanNode<V>>,
    visitor: &mut Vis,
) -> Result<Vec<PlanNode<V>>, Vis::Error>
where
    V: PlanVocabulary,
    Vis: PlanVisitor<V>,
{
    nodes
        .into_iter()
        .map(|node| walk_plan_node(node, visitor))
        .collect()
}
