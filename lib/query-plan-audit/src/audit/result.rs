use super::{error::OperationError, operation::Operation};
use crate::{
    diff::QueryPlanDiff,
    plan::{Fed1, Fed2, QueryPlan},
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditResult {
    Success(AuditSuccess),
    Failure(AuditFailure),
}

/// Every engine planned the operation and the plans were compared.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSuccess {
    #[serde(flatten)]
    pub operation: Operation,
    pub query_plans_match: bool,
    pub fed1_matches_fed2: bool,
    /// Set when the hybrid comparison ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fed2_matches_both_supergraphs: Option<bool>,
    pub fed1: QueryPlan<Fed1>,
    pub fed2: QueryPlan<Fed2>,
    /// Federation v2 planner run against the Federation v1 supergraph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fed2_from_fed1: Option<QueryPlan<Fed2>>,
    pub normalized_fed1: QueryPlan<Fed1>,
    pub normalized_fed2: QueryPlan<Fed2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_fed2_from_fed1: Option<QueryPlan<Fed2>>,
    pub fed1_diff: QueryPlanDiff,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hybrid_diff: Option<QueryPlanDiff>,
}

/// At least one engine could not produce a comparable plan.
///
/// Plans are kept for the engines that succeeded. Errors stay `None` for the
/// engines that succeeded and for stages that never ran.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFailure {
    #[serde(flatten)]
    pub operation: Operation,
    pub fed1: Option<QueryPlan<Fed1>>,
    pub fed2: Option<QueryPlan<Fed2>>,
    pub fed2_from_fed1: Option<QueryPlan<Fed2>>,
    pub fed1_error: Option<OperationError>,
    pub fed2_error: Option<OperationError>,
    pub fed2_from_fed1_error: Option<OperationError>,
}

impl AuditResult {
    pub fn operation(&self) -> &Operation {
        match self {
            AuditResult::Success(success) => &success.operation,
            AuditResult::Failure(failure) => &failure.operation,
        }
    }

    /// Planned by every engine with no difference after normalization.
    pub fn is_match(&self) -> bool {
        matches!(self, AuditResult::Success(success) if success.query_plans_match)
    }

    pub fn fed1_plan(&self) -> Option<&QueryPlan<Fed1>> {
        match self {
            AuditResult::Success(success) => Some(&success.fed1),
            AuditResult::Failure(failure) => failure.fed1.as_ref(),
        }
    }

    pub fn fed2_plan(&self) -> Option<&QueryPlan<Fed2>> {
        match self {
            AuditResult::Success(success) => Some(&success.fed2),
            AuditResult::Failure(failure) => failure.fed2.as_ref(),
        }
    }
}

impl AuditFailure {
    pub(super) fn new(
        operation: Operation,
        fed1: Result<QueryPlan<Fed1>, OperationError>,
        fed2: Result<QueryPlan<Fed2>, OperationError>,
        fed2_from_fed1: Option<Result<QueryPlan<Fed2>, OperationError>>,
    ) -> Self {
        let (fed1, fed1_error) = split(fed1);
        let (fed2, fed2_error) = split(fed2);
        let (fed2_from_fed1, fed2_from_fed1_error) =
            fed2_from_fed1.map(split).unwrap_or((None, None));

        AuditFailure {
            operation,
            fed1,
            fed2,
            fed2_from_fed1,
            fed1_error,
            fed2_error,
            fed2_from_fed1_error,
        }
    }
}

fn split<T, E>(result: Result<T, E>) -> (Option<T>, Option<E>) {
    match result {
        Ok(value) => (Some(value), None),
        Err(err) => (None, Some(err)),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub total: usize,
    pub matched: usize,
}

impl AuditSummary {
    pub fn from_results(results: &[AuditResult]) -> Self {
        AuditSummary {
            total: results.len(),
            matched: results.iter().filter(|result| result.is_match()).count(),
        }
    }

    pub fn mismatched(&self) -> usize {
        self.total - self.matched
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub results: Vec<AuditResult>,
    pub summary: AuditSummary,
}
