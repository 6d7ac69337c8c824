pub mod audit;
pub mod diff;
pub mod engine;
pub mod mermaid;
pub mod normalize;
pub mod plan;
pub mod utils;
pub mod walker;

#[cfg(test)]
mod tests;

pub use audit::{
    AuditError, AuditFailure, AuditOptions, AuditReport, AuditResult, AuditSetup, AuditSuccess,
    AuditSummary, Operation, QueryPlanAudit,
};
pub use diff::{diff_query_plans, QueryPlanDiff};
pub use engine::{
    Composer, CompositionError, FederationVersion, PlanningError, QueryPlanner,
    SubgraphDefinition, Supergraph,
};
pub use normalize::{normalize_query_plan, NormalizeError};
pub use plan::{decode_query_plan, Fed1, Fed2, PlanNode, PlanVocabulary, QueryPlan};
