use crate::plan::{FlattenPathSegment, PlanNode, PlanVocabulary, QueryPlan};

/// Renders `plan` as a mermaid flowchart, `None` when the plan has no node.
///
/// Sequence children are chained, Parallel children fan out of a `Parallel`
/// node, and Flatten nodes are linked after the node they wrap. Node ids are
/// assigned in visiting order (`n0`, `n1`, ...).
pub fn query_plan_to_mermaid<V: PlanVocabulary>(plan: &QueryPlan<V>) -> Option<String> {
    let node = plan.node.as_ref()?;
    let mut diagram = MermaidDiagram::default();
    diagram.process(node);

    let mut output = String::from("graph TD\n");
    for line in &diagram.lines {
        output.push_str("  ");
        output.push_str(line);
        output.push('\n');
    }

    Some(output)
}

#[derive(Default)]
struct MermaidDiagram {
    next_id: usize,
    lines: Vec<String>,
}

/// Where edges into and out of a processed subtree attach.
struct Endpoints {
    start: String,
    end: String,
}

impl MermaidDiagram {
    fn node(&mut self, label: &str) -> String {
        let id = format!("n{}", self.next_id);
        self.next_id += 1;
        self.lines.push(format!("{id}(\"{}\")", label.replace('"', "#quot;")));
        id
    }

    fn link(&mut self, from: &str, to: &str) {
        self.lines.push(format!("{from} --> {to}"));
    }

    fn process<V: PlanVocabulary>(&mut self, node: &PlanNode<V>) -> Endpoints {
        match node {
            PlanNode::Fetch(fetch) => {
                let id = self.node(&format!("Fetch ({})", fetch.service_name));
                Endpoints {
                    start: id.clone(),
                    end: id,
                }
            }
            PlanNode::Flatten(flatten) => {
                let id = self.node(&format!("Flatten ({})", flatten_path(&flatten.path)));
                let child = self.process(&flatten.node);
                self.link(&child.end, &id);
                Endpoints {
                    start: child.start,
                    end: id,
                }
            }
            PlanNode::Sequence(nodes) => {
                let mut endpoints: Option<Endpoints> = None;
                for child in nodes {
                    let child = self.process(child);
                    endpoints = Some(match endpoints {
                        None => child,
                        Some(previous) => {
                            self.link(&previous.end, &child.start);
                            Endpoints {
                                start: previous.start,
                                end: child.end,
                            }
                        }
                    });
                }
                endpoints.unwrap_or_else(|| {
                    let id = self.node("Sequence");
                    Endpoints {
                        start: id.clone(),
                        end: id,
                    }
                })
            }
            PlanNode::Parallel(nodes) => {
                let id = self.node("Parallel");
                for child in nodes {
                    let child = self.process(child);
                    self.link(&id, &child.start);
                }
                Endpoints {
                    start: id.clone(),
                    end: id,
                }
            }
            PlanNode::Extension(extension) => {
                let id = self.node(V::node_kind(extension));
                for (label, child) in V::children(extension) {
                    let child = self.process(child);
                    self.lines
                        .push(format!("{id} -->|{label}| {}", child.start));
                }
                Endpoints {
                    start: id.clone(),
                    end: id,
                }
            }
        }
    }
}

fn flatten_path(path: &[FlattenPathSegment]) -> String {
    path.iter()
        .map(|segment| match segment {
            FlattenPathSegment::List => "[]".to_string(),
            segment => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}
