use std::sync::Arc;

use serde_json::json;

use crate::{
    audit::{
        AuditError, AuditOptions, AuditResult, AuditSetup, Operation, OperationError,
        QueryPlanAudit,
    },
    engine::{CompositionError, FederationVersion, QueryPlanner},
    plan::Fed1,
    tests::testkit::{
        entity_fetch, fetch, flatten, init_logger, plan, query_plan, sequence, supergraph,
        TablePlanner,
    },
};

const MISSIONS: &str = "query Missions { missions { id name } }";
const ASTRONAUTS: &str = "query Astronauts { astronauts { id } }";
const CREW: &str = "query Crew { missions { crew { name } } }";

fn operation(id: &str, signature: &str) -> Operation {
    Operation::new(id, Some(id.to_string()), signature)
}

fn setup(fed1: Arc<TablePlanner>, fed2: Arc<TablePlanner>, options: AuditOptions) -> AuditSetup {
    AuditSetup {
        fed1_planner: fed1,
        fed2_planner: fed2,
        fed1_supergraph: Ok(supergraph(FederationVersion::One)),
        fed2_supergraph: Ok(supergraph(FederationVersion::Two)),
        options,
    }
}

fn audit(fed1: TablePlanner, fed2: TablePlanner) -> QueryPlanAudit {
    QueryPlanAudit::new(setup(fed1.into_arc(), fed2.into_arc(), AuditOptions::default()))
        .expect("compositions succeeded")
}

fn crew_plan(requires: serde_json::Value) -> serde_json::Value {
    query_plan(sequence(vec![
        fetch("missions", "{missions{__typename id}}"),
        flatten(
            json!(["missions", "@"]),
            entity_fetch(
                "astronauts",
                requires,
                "query($representations:[_Any!]!){_entities(representations:$representations){...on Mission{crew{name}}}}",
            ),
        ),
    ]))
}

#[tokio::test]
async fn swapped_fetch_fields_are_a_match() -> Result<(), AuditError> {
    init_logger();
    let audit = audit(
        TablePlanner::new().with_plan(MISSIONS, query_plan(fetch("missions", "{a{b c}}"))),
        TablePlanner::new().with_plan(MISSIONS, query_plan(fetch("missions", "{a{c b}}"))),
    );

    let result = audit.audit_operation(&operation("missions", MISSIONS)).await?;

    let AuditResult::Success(success) = &result else {
        panic!("expected success, got {result:?}");
    };
    assert!(success.query_plans_match);
    assert!(success.fed1_matches_fed2);
    assert_eq!(success.fed2_matches_both_supergraphs, None);
    assert_eq!(success.fed2_from_fed1, None);
    assert_ne!(success.fed1.to_string(), success.fed2.to_string());
    assert_eq!(success.normalized_fed1.to_string(), success.normalized_fed2.to_string());

    Ok(())
}

#[tokio::test]
async fn swapped_requires_are_a_match() -> Result<(), AuditError> {
    init_logger();
    let audit = audit(
        TablePlanner::new().with_plan(
            CREW,
            crew_plan(json!([
                { "kind": "Field", "name": "__typename" },
                { "kind": "Field", "name": "id" },
            ])),
        ),
        TablePlanner::new().with_plan(
            CREW,
            crew_plan(json!([
                { "kind": "Field", "name": "id" },
                { "kind": "Field", "name": "__typename" },
            ])),
        ),
    );

    let result = audit.audit_operation(&operation("crew", CREW)).await?;

    assert!(result.is_match(), "expected a match, got {result:?}");

    Ok(())
}

#[tokio::test]
async fn planning_error_is_captured_per_engine() -> Result<(), AuditError> {
    init_logger();
    let audit = audit(
        TablePlanner::new().with_error(MISSIONS, "Cannot query field \"name\" on type \"Mission\"."),
        TablePlanner::new().with_plan(MISSIONS, query_plan(fetch("missions", "{missions{id name}}"))),
    );

    let result = audit.audit_operation(&operation("missions", MISSIONS)).await?;

    let AuditResult::Failure(failure) = &result else {
        panic!("expected failure, got {result:?}");
    };
    assert_eq!(failure.fed1, None);
    assert!(failure.fed2.is_some());
    assert!(matches!(
        &failure.fed1_error,
        Some(OperationError::Planning(err)) if err.message.contains("Cannot query field")
    ));
    assert_eq!(failure.fed2_error, None);
    assert_eq!(failure.fed2_from_fed1, None);
    assert_eq!(failure.fed2_from_fed1_error, None);

    let serialized = serde_json::to_value(&result).expect("result should serialize");
    assert_eq!(serialized["type"], "FAILURE");
    assert_eq!(serialized["queryId"], "missions");
    assert_eq!(
        serialized["fed1Error"],
        "Cannot query field \"name\" on type \"Mission\"."
    );

    Ok(())
}

#[tokio::test]
async fn unparsable_fetch_operation_fails_the_operation() -> Result<(), AuditError> {
    init_logger();
    let audit = audit(
        TablePlanner::new().with_plan(MISSIONS, query_plan(fetch("missions", "{missions{"))),
        TablePlanner::new().with_plan(MISSIONS, query_plan(fetch("missions", "{missions{id}}"))),
    );

    let result = audit.audit_operation(&operation("missions", MISSIONS)).await?;

    let AuditResult::Failure(failure) = &result else {
        panic!("expected failure, got {result:?}");
    };
    assert!(matches!(
        failure.fed1_error,
        Some(OperationError::Normalization(_))
    ));
    assert_eq!(failure.fed2_error, None);
    assert!(failure.fed2.is_some());
    assert_eq!(
        failure.fed1.as_ref().map(ToString::to_string),
        Some(plan::<Fed1>(query_plan(fetch("missions", "{missions{"))).to_string())
    );

    Ok(())
}

#[tokio::test]
async fn hybrid_comparison_separates_planner_and_supergraph_differences() -> Result<(), AuditError>
{
    init_logger();
    let fed1 = TablePlanner::new()
        .with_plan(MISSIONS, query_plan(fetch("missions", "{missions{id name}}")))
        .into_arc();
    let fed2 = TablePlanner::new()
        .with_plan(MISSIONS, query_plan(fetch("missions", "{missions{name id}}")))
        .with_plan_for(
            FederationVersion::One,
            MISSIONS,
            query_plan(fetch("legacy-missions", "{missions{id name}}")),
        )
        .into_arc();
    let audit = QueryPlanAudit::new(setup(
        fed1,
        fed2.clone(),
        AuditOptions {
            hybrid_comparison: true,
        },
    ))?;

    let result = audit.audit_operation(&operation("missions", MISSIONS)).await?;

    let AuditResult::Success(success) = &result else {
        panic!("expected success, got {result:?}");
    };
    assert!(success.fed1_matches_fed2);
    assert_eq!(success.fed2_matches_both_supergraphs, Some(false));
    assert!(!success.query_plans_match);
    assert!(success.fed2_from_fed1.is_some());
    assert!(success
        .hybrid_diff
        .as_ref()
        .is_some_and(|diff| diff.differences == 2));

    let mut calls = fed2.calls();
    calls.sort_by_key(|(version, _)| *version == FederationVersion::Two);
    assert_eq!(
        calls,
        vec![
            (FederationVersion::One, MISSIONS.to_string()),
            (FederationVersion::Two, MISSIONS.to_string()),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn failed_composition_refuses_to_audit() {
    init_logger();
    let fed1 = TablePlanner::new().into_arc();
    let fed2 = TablePlanner::new().into_arc();
    let fed1_planner: Arc<dyn QueryPlanner> = fed1.clone();

    let result = QueryPlanAudit::new(AuditSetup {
        fed1_planner,
        fed2_planner: fed2.clone(),
        fed1_supergraph: Ok(supergraph(FederationVersion::One)),
        fed2_supergraph: Err(CompositionError::Failed {
            version: FederationVersion::Two,
            errors: vec!["[missions] Mission.id: conflicting types".to_string()],
        }),
        options: AuditOptions::default(),
    });

    assert!(matches!(
        result,
        Err(AuditError::Composition(CompositionError::Failed {
            version: FederationVersion::Two,
            ..
        }))
    ));
    assert!(fed1.calls().is_empty());
    assert!(fed2.calls().is_empty());
}

#[tokio::test]
async fn unknown_node_kind_aborts_the_run() {
    init_logger();
    let audit = audit(
        TablePlanner::new()
            .with_plan(MISSIONS, query_plan(fetch("missions", "{missions{id}}")))
            .with_plan(
                ASTRONAUTS,
                query_plan(json!({
                    "kind": "Condition",
                    "condition": "flag",
                    "ifClause": fetch("astronauts", "{astronauts{id}}"),
                })),
            ),
        TablePlanner::new()
            .with_plan(MISSIONS, query_plan(fetch("missions", "{missions{id}}")))
            .with_plan(ASTRONAUTS, query_plan(fetch("astronauts", "{astronauts{id}}"))),
    );

    let mut progress = vec![];
    let result = audit
        .run(
            &[
                operation("missions", MISSIONS),
                operation("astronauts", ASTRONAUTS),
            ],
            |done| progress.push(done),
        )
        .await;

    let err = match result {
        Ok(report) => panic!("expected the run to abort, got {report:?}"),
        Err(err) => err,
    };
    assert!(matches!(
        &err,
        AuditError::UnknownNodeKind { kind, version: FederationVersion::One } if kind == "Condition"
    ));
    assert_eq!(
        err.to_string(),
        "Invalid query plan node kind: Condition. This tool may need to update its Federation v1 support."
    );
    assert_eq!(progress, vec![1]);
}

#[tokio::test]
async fn run_counts_matches_and_reports_progress() -> Result<(), AuditError> {
    init_logger();
    let audit = audit(
        TablePlanner::new()
            .with_plan(MISSIONS, query_plan(fetch("missions", "{missions{id name}}")))
            .with_plan(ASTRONAUTS, query_plan(fetch("astronauts", "{astronauts{id}}")))
            .with_error(CREW, "unknown field crew"),
        TablePlanner::new()
            .with_plan(MISSIONS, query_plan(fetch("missions", "{missions{name id}}")))
            .with_plan(ASTRONAUTS, query_plan(fetch("people", "{astronauts{id}}")))
            .with_plan(CREW, query_plan(fetch("missions", "{missions{crew{name}}}"))),
    );

    let mut progress = vec![];
    let report = audit
        .run(
            &[
                operation("missions", MISSIONS),
                operation("astronauts", ASTRONAUTS),
                operation("crew", CREW),
            ],
            |done| progress.push(done),
        )
        .await?;

    assert_eq!(progress, vec![1, 2, 3]);
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.matched, 1);
    assert_eq!(report.summary.mismatched(), 2);
    assert_eq!(
        report
            .results
            .iter()
            .map(|result| (result.operation().query_id.as_str(), result.is_match()))
            .collect::<Vec<_>>(),
        vec![("missions", true), ("astronauts", false), ("crew", false)]
    );
    assert!(matches!(report.results[1], AuditResult::Success(_)));
    assert!(matches!(report.results[2], AuditResult::Failure(_)));

    Ok(())
}
