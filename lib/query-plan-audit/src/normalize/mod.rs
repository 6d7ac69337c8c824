mod error;
mod literals;
mod operation;
mod requires;

pub use error::NormalizeError;
pub use operation::normalize_operation;
pub use requires::normalize_requires;

use crate::{
    plan::{FetchNode, PlanNode, PlanVocabulary, QueryPlan},
    walker::{walk_query_plan, PlanVisitor},
};
use tracing::instrument;

/// Brings a plan into the canonical form the differ compares.
///
/// Fetch operations and `requires` selections are sorted, Parallel children
/// are sorted by their rendered text. Sequence children keep their order, it
/// is the execution order.
#[instrument(level = "trace", skip_all)]
pub fn normalize_query_plan<V: PlanVocabulary>(
    plan: &QueryPlan<V>,
) -> Result<QueryPlan<V>, NormalizeError> {
    walk_query_plan(plan, &mut PlanNormalizer)
}

struct PlanNormalizer;

impl<V: PlanVocabulary> PlanVisitor<V> for PlanNormalizer {
    type Error = NormalizeError;

    fn visit_fetch(&mut self, node: &FetchNode) -> Result<Option<FetchNode>, Self::Error> {
        Ok(Some(FetchNode {
            operation: normalize_operation(&node.operation)?,
            requires: node.requires.as_deref().map(normalize_requires),
            ..node.clone()
        }))
    }

    fn leave_parallel(&mut self, mut nodes: Vec<PlanNode<V>>) -> Result<Vec<PlanNode<V>>, Self::Error> {
        nodes.sort_by_cached_key(|node| node.to_string());
        Ok(nodes)
    }
}
