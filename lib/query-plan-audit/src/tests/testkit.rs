use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use lazy_static::lazy_static;
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    engine::{FederationVersion, PlanningError, QueryPlanner, Supergraph},
    plan::{decode_query_plan, PlanVocabulary, QueryPlan},
};

fn init_test_logger_internal() {
    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_bracketed_fields(true)
        .with_deferred_spans(false)
        .with_wraparound(25)
        .with_indent_lines(true)
        .with_timer(tracing_tree::time::Uptime::default())
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_targets(false);

    tracing_subscriber::registry()
        .with(tree_layer)
        .with(EnvFilter::from_default_env())
        .init();
}

lazy_static! {
    static ref TRACING_INIT: Once = Once::new();
}

pub fn init_logger() {
    TRACING_INIT.call_once(|| {
        init_test_logger_internal();
    });
}

pub const SUPERGRAPH_SDL: &str = r#"
type Query {
  missions: [Mission]
}

type Mission {
  id: ID!
  name: String
  crew: [Astronaut]
}

type Astronaut {
  id: ID!
  name: String
}
"#;

pub fn supergraph(version: FederationVersion) -> Supergraph {
    Supergraph::new(version, SUPERGRAPH_SDL).expect("test supergraph should parse")
}

pub fn plan<V: PlanVocabulary>(value: Value) -> QueryPlan<V> {
    decode_query_plan(value).expect("test plan should decode")
}

pub fn query_plan(node: Value) -> Value {
    json!({ "kind": "QueryPlan", "node": node })
}

pub fn fetch(service: &str, operation: &str) -> Value {
    json!({
        "kind": "Fetch",
        "serviceName": service,
        "variableUsages": [],
        "operation": operation,
        "operationKind": "query",
    })
}

pub fn entity_fetch(service: &str, requires: Value, operation: &str) -> Value {
    json!({
        "kind": "Fetch",
        "serviceName": service,
        "variableUsages": [],
        "requires": requires,
        "operation": operation,
        "operationKind": "query",
    })
}

pub fn flatten(path: Value, node: Value) -> Value {
    json!({ "kind": "Flatten", "path": path, "node": node })
}

pub fn sequence(nodes: Vec<Value>) -> Value {
    json!({ "kind": "Sequence", "nodes": nodes })
}

pub fn parallel(nodes: Vec<Value>) -> Value {
    json!({ "kind": "Parallel", "nodes": nodes })
}

/// Answers every operation from a table keyed by the operation document and,
/// optionally, the version of the supergraph planned against.
///
/// Documents missing from the table fail to plan. Calls are recorded with the
/// version of the supergraph they were made against.
#[derive(Default)]
pub struct TablePlanner {
    plans: HashMap<(Option<FederationVersion>, String), Result<Value, PlanningError>>,
    calls: Mutex<Vec<(FederationVersion, String)>>,
}

impl TablePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(mut self, document: &str, plan: Value) -> Self {
        self.plans.insert((None, document.to_string()), Ok(plan));
        self
    }

    /// A plan returned only when planning against a supergraph of `version`.
    pub fn with_plan_for(
        mut self,
        version: FederationVersion,
        document: &str,
        plan: Value,
    ) -> Self {
        self.plans
            .insert((Some(version), document.to_string()), Ok(plan));
        self
    }

    pub fn with_error(mut self, document: &str, message: &str) -> Self {
        self.plans.insert(
            (None, document.to_string()),
            Err(PlanningError::new(message)),
        );
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<(FederationVersion, String)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl QueryPlanner for TablePlanner {
    async fn plan(
        &self,
        supergraph: &Supergraph,
        document: &str,
        _operation_name: Option<&str>,
    ) -> Result<Value, PlanningError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((supergraph.version(), document.to_string()));

        self.plans
            .get(&(Some(supergraph.version()), document.to_string()))
            .or_else(|| self.plans.get(&(None, document.to_string())))
            .cloned()
            .unwrap_or_else(|| Err(PlanningError::new(format!("no plan for {document}"))))
    }
}
