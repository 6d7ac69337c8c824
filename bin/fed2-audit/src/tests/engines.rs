#![cfg(unix)]

use audit_config::engines::EngineCommandConfig;
use query_plan_audit::{
    Composer, CompositionError, FederationVersion, QueryPlanner, SubgraphDefinition, Supergraph,
};
use serde_json::json;

use crate::engines::CommandEngine;

/// An engine whose `compose` and `plan` answers are fixed shell snippets.
fn shell_engine(compose: &str, plan: &str) -> CommandEngine {
    let script = format!(
        "cat > /dev/null; case \"$1\" in compose) {compose};; plan) {plan};; esac"
    );
    let config = EngineCommandConfig {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), script, "engine".to_string()],
    };

    CommandEngine::new(FederationVersion::Two, &config, std::env::temp_dir())
}

fn subgraphs() -> Vec<SubgraphDefinition> {
    vec![SubgraphDefinition {
        name: "missions".to_string(),
        url: Some("http://localhost:4001".to_string()),
        sdl: "type Query { missions: [String] }".to_string(),
    }]
}

#[tokio::test]
async fn composes_and_plans_through_the_program() {
    let engine = shell_engine(
        r#"printf '%s' '{"supergraphSdl":"type Query { missions: [String] }"}'"#,
        r#"printf '%s' '{"queryPlan":{"kind":"QueryPlan","node":null}}'"#,
    );

    let supergraph = engine
        .compose(&subgraphs())
        .await
        .expect("composition should succeed");
    assert_eq!(supergraph.version(), FederationVersion::Two);
    assert_eq!(supergraph.sdl(), "type Query { missions: [String] }");

    let plan = engine
        .plan(&supergraph, "{ missions }", None)
        .await
        .expect("planning should succeed");
    assert_eq!(plan, json!({ "kind": "QueryPlan", "node": null }));
}

#[tokio::test]
async fn composition_errors_are_reported() {
    let engine = shell_engine(
        r#"printf '%s' '{"errors":[{"message":"Field conflict"},{"message":"Missing key"}]}'"#,
        "true",
    );

    match engine.compose(&subgraphs()).await {
        Err(CompositionError::Failed { version, errors }) => {
            assert_eq!(version, FederationVersion::Two);
            assert_eq!(errors, vec!["Field conflict", "Missing key"]);
        }
        other => panic!("expected a failed composition, got {other:?}"),
    }
}

#[tokio::test]
async fn a_failing_program_carries_its_stderr() {
    let engine = shell_engine("echo 'engine crashed' >&2; exit 3", "true");

    match engine.compose(&subgraphs()).await {
        Err(CompositionError::Unavailable { reason, .. }) => {
            assert!(reason.contains("engine crashed"), "{reason}");
        }
        other => panic!("expected an unavailable engine, got {other:?}"),
    }
}

#[tokio::test]
async fn planning_errors_and_garbage_are_planning_errors() {
    let supergraph = Supergraph::new(FederationVersion::Two, "type Query { missions: [String] }")
        .expect("supergraph should parse");

    let engine = shell_engine("true", r#"printf '%s' '{"errors":[{"message":"Cannot query field"}]}'"#);
    let err = engine
        .plan(&supergraph, "{ astronauts }", None)
        .await
        .expect_err("planning should fail");
    assert_eq!(err.message, "Cannot query field");

    let engine = shell_engine("true", "echo 'not json'");
    let err = engine
        .plan(&supergraph, "{ missions }", None)
        .await
        .expect_err("planning should fail");
    assert!(err.message.contains("invalid response"), "{}", err.message);
}
