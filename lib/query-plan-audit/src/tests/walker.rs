use std::convert::Infallible;

use serde_json::json;

use crate::{
    plan::{Fed1, Fed2, FetchNode, PlanNode, PlanVocabulary, QueryPlan},
    tests::testkit::{fetch, flatten, init_logger, parallel, plan, query_plan, sequence},
    walker::{walk_query_plan, PlanVisitor},
};

/// Renames every fetched service and records the order fetches were seen in.
#[derive(Default)]
struct RenameServices {
    seen: Vec<String>,
}

impl<V: PlanVocabulary> PlanVisitor<V> for RenameServices {
    type Error = Infallible;

    fn visit_fetch(&mut self, node: &FetchNode) -> Result<Option<FetchNode>, Self::Error> {
        self.seen.push(node.service_name.clone());
        Ok(Some(FetchNode {
            service_name: node.service_name.to_uppercase(),
            ..node.clone()
        }))
    }
}

fn service_names<V: PlanVocabulary>(node: &PlanNode<V>, names: &mut Vec<String>) {
    match node {
        PlanNode::Fetch(fetch) => names.push(fetch.service_name.clone()),
        PlanNode::Flatten(flatten) => service_names(&flatten.node, names),
        PlanNode::Parallel(nodes) | PlanNode::Sequence(nodes) => {
            for node in nodes {
                service_names(node, names);
            }
        }
        PlanNode::Extension(extension) => {
            for (_, child) in V::children(extension) {
                service_names(child, names);
            }
        }
    }
}

#[test]
fn visits_every_fetch_in_order_without_touching_input() {
    init_logger();
    let input: QueryPlan<Fed1> = plan(query_plan(sequence(vec![
        fetch("a", "{a}"),
        parallel(vec![
            flatten(json!(["a"]), fetch("b", "{b}")),
            flatten(json!(["a", "@"]), fetch("c", "{c}")),
        ]),
        fetch("d", "{d}"),
    ])));
    let snapshot = input.clone();

    let mut visitor = RenameServices::default();
    let output = walk_query_plan(&input, &mut visitor).expect("walk is infallible");

    assert_eq!(input, snapshot);
    assert_eq!(visitor.seen, vec!["a", "b", "c", "d"]);

    let mut names = vec![];
    service_names(output.node.as_ref().expect("walked plan has a node"), &mut names);
    assert_eq!(names, vec!["A", "B", "C", "D"]);

    let Some(PlanNode::Sequence(nodes)) = &output.node else {
        panic!("expected a sequence, got {:?}", output.node);
    };
    let PlanNode::Parallel(children) = &nodes[1] else {
        panic!("expected a parallel node, got {:?}", nodes[1]);
    };
    let PlanNode::Flatten(flatten) = &children[1] else {
        panic!("expected a flatten node, got {:?}", children[1]);
    };
    assert_eq!(flatten.path_string(), "a.@");
}

#[test]
fn empty_plan_is_returned_unchanged() {
    init_logger();
    let input: QueryPlan<Fed2> = QueryPlan::empty();
    let mut visitor = RenameServices::default();

    let output = walk_query_plan(&input, &mut visitor).expect("walk is infallible");

    assert_eq!(output, input);
    assert!(visitor.seen.is_empty());
}

#[test]
fn descends_into_fed2_extensions() {
    init_logger();
    let input: QueryPlan<Fed2> = plan(query_plan(json!({
        "kind": "Condition",
        "condition": "flag",
        "ifClause": fetch("yes", "{a}"),
        "elseClause": {
            "kind": "Defer",
            "primary": { "node": fetch("primary", "{b}") },
            "deferred": [
                { "depends": [], "queryPath": [], "node": fetch("deferred", "{c}") },
            ],
        },
    })));

    let mut visitor = RenameServices::default();
    let output = walk_query_plan(&input, &mut visitor).expect("walk is infallible");

    assert_eq!(visitor.seen, vec!["yes", "primary", "deferred"]);
    let mut names = vec![];
    service_names(output.node.as_ref().expect("walked plan has a node"), &mut names);
    assert_eq!(names, vec!["YES", "PRIMARY", "DEFERRED"]);
}

/// Reverses sequences once their children were walked.
struct ReverseSequences;

impl PlanVisitor<Fed1> for ReverseSequences {
    type Error = String;

    fn leave_sequence(
        &mut self,
        mut nodes: Vec<PlanNode<Fed1>>,
    ) -> Result<Vec<PlanNode<Fed1>>, Self::Error> {
        nodes.reverse();
        Ok(nodes)
    }

    fn visit_parallel(
        &mut self,
        nodes: &[PlanNode<Fed1>],
    ) -> Result<Option<Vec<PlanNode<Fed1>>>, Self::Error> {
        match nodes.is_empty() {
            true => Err("empty parallel".to_string()),
            false => Ok(None),
        }
    }
}

#[test]
fn leave_hooks_see_walked_children_and_errors_propagate() {
    init_logger();
    let input: QueryPlan<Fed1> = plan(query_plan(sequence(vec![
        fetch("a", "{a}"),
        sequence(vec![fetch("b", "{b}"), fetch("c", "{c}")]),
    ])));

    let output = walk_query_plan(&input, &mut ReverseSequences).expect("walk should succeed");
    let mut names = vec![];
    service_names(output.node.as_ref().expect("walked plan has a node"), &mut names);
    assert_eq!(names, vec!["c", "b", "a"]);

    let failing: QueryPlan<Fed1> = plan(query_plan(sequence(vec![parallel(vec![])])));
    assert_eq!(
        walk_query_plan(&failing, &mut ReverseSequences),
        Err("empty parallel".to_string())
    );
}
