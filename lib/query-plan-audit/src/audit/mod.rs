mod error;
mod operation;
mod result;

pub use error::{AuditError, OperationError};
pub use operation::{InvalidOperationRecord, Operation};
pub use result::{AuditFailure, AuditReport, AuditResult, AuditSuccess, AuditSummary};

use crate::{
    diff::{diff_query_plans, QueryPlanDiff},
    engine::{CompositionError, PlanningError, QueryPlanner, Supergraph},
    normalize::normalize_query_plan,
    plan::{decode_query_plan, Fed1, Fed2, PlanDecodeError, PlanVocabulary, QueryPlan},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditOptions {
    /// Also plan with the Federation v2 planner against the Federation v1
    /// supergraph and compare that plan with the Federation v2 one.
    pub hybrid_comparison: bool,
}

/// What an audit needs: each engine's planner and the outcome of composing
/// the subgraphs with that engine.
pub struct AuditSetup {
    pub fed1_planner: Arc<dyn QueryPlanner>,
    pub fed2_planner: Arc<dyn QueryPlanner>,
    pub fed1_supergraph: Result<Supergraph, CompositionError>,
    pub fed2_supergraph: Result<Supergraph, CompositionError>,
    pub options: AuditOptions,
}

pub struct QueryPlanAudit {
    fed1_planner: Arc<dyn QueryPlanner>,
    fed2_planner: Arc<dyn QueryPlanner>,
    fed1_supergraph: Supergraph,
    fed2_supergraph: Supergraph,
    options: AuditOptions,
}

impl QueryPlanAudit {
    /// Refuses to audit anything unless both compositions succeeded.
    pub fn new(setup: AuditSetup) -> Result<Self, AuditError> {
        let fed1_supergraph = setup.fed1_supergraph?;
        let fed2_supergraph = setup.fed2_supergraph?;

        Ok(QueryPlanAudit {
            fed1_planner: setup.fed1_planner,
            fed2_planner: setup.fed2_planner,
            fed1_supergraph,
            fed2_supergraph,
            options: setup.options,
        })
    }

    pub fn fed1_supergraph(&self) -> &Supergraph {
        &self.fed1_supergraph
    }

    pub fn fed2_supergraph(&self) -> &Supergraph {
        &self.fed2_supergraph
    }

    pub fn options(&self) -> AuditOptions {
        self.options
    }

    /// Audits `operations` one after the other, calling `progress` with the
    /// number of completed operations after each one.
    #[instrument(skip_all, fields(operations = operations.len()))]
    pub async fn run(
        &self,
        operations: &[Operation],
        mut progress: impl FnMut(usize),
    ) -> Result<AuditReport, AuditError> {
        let mut results = Vec::with_capacity(operations.len());
        for (index, operation) in operations.iter().enumerate() {
            results.push(self.audit_operation(operation).await?);
            progress(index + 1);
        }

        let summary = AuditSummary::from_results(&results);
        info!(
            total = summary.total,
            matched = summary.matched,
            mismatched = summary.mismatched(),
            "query plan audit finished"
        );

        Ok(AuditReport { results, summary })
    }

    /// Plans `operation` with every engine, then normalizes and compares the
    /// plans. Planner errors are captured in the result; only an unknown node
    /// kind is returned as an error.
    #[instrument(skip_all, fields(query_id = %operation.query_id, query_name = operation.display_name()))]
    pub async fn audit_operation(&self, operation: &Operation) -> Result<AuditResult, AuditError> {
        let document = operation.query_signature.as_str();
        let operation_name = operation.query_name.as_deref();

        let hybrid = async {
            match self.options.hybrid_comparison {
                true => Some(
                    self.fed2_planner
                        .plan(&self.fed1_supergraph, document, operation_name)
                        .await,
                ),
                false => None,
            }
        };

        let (fed1, fed2, fed2_from_fed1) = futures::join!(
            self.fed1_planner
                .plan(&self.fed1_supergraph, document, operation_name),
            self.fed2_planner
                .plan(&self.fed2_supergraph, document, operation_name),
            hybrid
        );

        let fed1 = decode_planned::<Fed1>(fed1)?;
        let fed2 = decode_planned::<Fed2>(fed2)?;
        let fed2_from_fed1 = fed2_from_fed1.map(decode_planned::<Fed2>).transpose()?;

        let result = match (fed1, fed2, fed2_from_fed1) {
            (Ok(fed1), Ok(fed2), None) => compare(operation, fed1, fed2, None),
            (Ok(fed1), Ok(fed2), Some(Ok(fed2_from_fed1))) => {
                compare(operation, fed1, fed2, Some(fed2_from_fed1))
            }
            (fed1, fed2, fed2_from_fed1) => AuditResult::Failure(AuditFailure::new(
                operation.clone(),
                fed1,
                fed2,
                fed2_from_fed1,
            )),
        };

        match &result {
            AuditResult::Success(success) => debug!(
                query_plans_match = success.query_plans_match,
                "operation audited"
            ),
            AuditResult::Failure(failure) => warn!(
                fed1_error = failure.fed1_error.as_ref().map(ToString::to_string),
                fed2_error = failure.fed2_error.as_ref().map(ToString::to_string),
                fed2_from_fed1_error = failure
                    .fed2_from_fed1_error
                    .as_ref()
                    .map(ToString::to_string),
                "operation could not be planned by every engine"
            ),
        }

        Ok(result)
    }
}

/// Decodes a planner response with the vocabulary of the engine that made it.
///
/// The outer error aborts the audit, the inner one only fails this operation.
fn decode_planned<V: PlanVocabulary>(
    planned: Result<Value, PlanningError>,
) -> Result<Result<QueryPlan<V>, OperationError>, AuditError> {
    let value = match planned {
        Ok(value) => value,
        Err(err) => return Ok(Err(err.into())),
    };

    match decode_query_plan::<V>(value) {
        Ok(plan) => Ok(Ok(plan)),
        Err(PlanDecodeError::UnknownNodeKind { kind, version }) => {
            Err(AuditError::UnknownNodeKind { kind, version })
        }
        Err(err) => Ok(Err(OperationError::InvalidPlan(err))),
    }
}

fn compare(
    operation: &Operation,
    fed1: QueryPlan<Fed1>,
    fed2: QueryPlan<Fed2>,
    fed2_from_fed1: Option<QueryPlan<Fed2>>,
) -> AuditResult {
    let normalized_fed1 = normalize_query_plan(&fed1);
    let normalized_fed2 = normalize_query_plan(&fed2);
    let hybrid = fed2_from_fed1.map(|plan| {
        let normalized = normalize_query_plan(&plan);
        (plan, normalized)
    });

    let (normalized_fed1, normalized_fed2, hybrid) = match (normalized_fed1, normalized_fed2, hybrid)
    {
        (Ok(normalized_fed1), Ok(normalized_fed2), None) => (normalized_fed1, normalized_fed2, None),
        (Ok(normalized_fed1), Ok(normalized_fed2), Some((plan, Ok(normalized)))) => {
            (normalized_fed1, normalized_fed2, Some((plan, normalized)))
        }
        (normalized_fed1, normalized_fed2, hybrid) => {
            // Every engine planned, so the raw plans are kept next to the errors.
            let (fed2_from_fed1, normalized_fed2_from_fed1) = hybrid.unzip();
            return AuditResult::Failure(AuditFailure {
                operation: operation.clone(),
                fed1: Some(fed1),
                fed2: Some(fed2),
                fed2_from_fed1,
                fed1_error: normalized_fed1.err().map(Into::into),
                fed2_error: normalized_fed2.err().map(Into::into),
                fed2_from_fed1_error: normalized_fed2_from_fed1.and_then(Result::err).map(Into::into),
            });
        }
    };
    let (fed2_from_fed1, normalized_fed2_from_fed1) = hybrid.unzip();

    let fed1_diff = diff_query_plans(&normalized_fed1, &normalized_fed2);
    let hybrid_diff = normalized_fed2_from_fed1
        .as_ref()
        .map(|normalized| diff_query_plans(normalized, &normalized_fed2));

    let fed1_matches_fed2 = fed1_diff.is_match();
    let fed2_matches_both_supergraphs = hybrid_diff.as_ref().map(QueryPlanDiff::is_match);

    AuditResult::Success(AuditSuccess {
        operation: operation.clone(),
        query_plans_match: fed1_matches_fed2 && fed2_matches_both_supergraphs.unwrap_or(true),
        fed1_matches_fed2,
        fed2_matches_both_supergraphs,
        fed1,
        fed2,
        fed2_from_fed1,
        normalized_fed1,
        normalized_fed2,
        normalized_fed2_from_fed1,
        fed1_diff,
        hybrid_diff,
    })
}
