use std::path::{Path, PathBuf};

use audit_config::audit::Fed2ReadinessConfig;
use query_plan_audit::{
    audit::OperationError, mermaid::query_plan_to_mermaid, AuditFailure, AuditReport,
    AuditResult, AuditSuccess, Operation, Supergraph,
};
use tracing::debug;

use crate::error::CliError;

const FED1_ON_FED1: &str = "Federation 1 supergraph with the Federation 1 planner";
const FED2_ON_FED1: &str = "Federation 1 supergraph with the Federation 2 planner";
const FED2_ON_FED2: &str = "Federation 2 supergraph with the Federation 2 planner";

/// Markdown report for an operation, `None` when its plans match.
pub fn render_report(result: &AuditResult, graph_ref: Option<&Fed2ReadinessConfig>) -> Option<String> {
    match result {
        AuditResult::Success(success) if success.query_plans_match => None,
        AuditResult::Success(success) => Some(render_success_report(success, graph_ref)),
        AuditResult::Failure(failure) => Some(render_failure_report(failure, graph_ref)),
    }
}

pub fn render_success_report(
    success: &AuditSuccess,
    graph_ref: Option<&Fed2ReadinessConfig>,
) -> String {
    let mut lines = header(&success.operation, graph_ref);

    lines.push(
        match success.query_plans_match {
            true => "🎉 No difference in query plans",
            false => "💣 Query plans differ",
        }
        .to_string(),
    );
    lines.push(String::new());

    if !success.fed1_matches_fed2 {
        section(&mut lines, "Before and After Migration Diff");
        lines.extend(
            [
                "This shows the difference between:",
                "",
                "* Using a **Federation 1** supergraph to generate query plans with the **Federation 1** planner",
                "* Using a **Federation 2** supergraph to generate query plans with the **Federation 2** planner",
                "",
                "This simulates the changes in query planning after completing the Federation 2 migration.",
                "",
                "The diff is calculated after query plan normalization (field sorting, etc.)",
                "",
            ]
            .map(String::from),
        );
        fenced(&mut lines, "diff", success.fed1_diff.render().trim_end());
        lines.push(String::new());
    }

    if let Some(hybrid_diff) = success.hybrid_diff.as_ref().filter(|diff| !diff.is_match()) {
        section(&mut lines, "In-progress Migration Diff");
        lines.extend(
            [
                "This shows the difference between:",
                "",
                "* Using a **Federation 1** supergraph to generate query plans with the Federation 2 planner",
                "* Using a **Federation 2** supergraph to generate query plans with the Federation 2 planner",
                "",
                "This simulates the changes in query planning after upgrading the planner but before",
                "changing the build configuration to use Federation 2 composition.",
                "",
                "The diff is calculated after query plan normalization (field sorting, etc.)",
                "",
            ]
            .map(String::from),
        );
        fenced(&mut lines, "diff", hybrid_diff.render().trim_end());
        lines.push(String::new());
    }

    section(&mut lines, "Operation");
    fenced(
        &mut lines,
        "graphql",
        &print_operation(&success.operation.query_signature),
    );
    lines.push(String::new());

    section(&mut lines, "Federation 1 Query Plan");
    fenced(&mut lines, "", &success.fed1.to_string());

    if let Some(fed2_from_fed1) = &success.fed2_from_fed1 {
        lines.push(String::new());
        section(&mut lines, "Federation 2 Query Plan with Federation 1 Supergraph");
        fenced(&mut lines, "", &fed2_from_fed1.to_string());
    }

    lines.push(String::new());
    section(&mut lines, "Federation 2 Query Plan with Federation 2 Supergraph");
    fenced(&mut lines, "", &success.fed2.to_string());

    lines.join("\n")
}

pub fn render_failure_report(
    failure: &AuditFailure,
    graph_ref: Option<&Fed2ReadinessConfig>,
) -> String {
    let mut lines = header(&failure.operation, graph_ref);

    let hybrid_ran = failure.fed2_from_fed1.is_some() || failure.fed2_from_fed1_error.is_some();
    let outcomes = [
        (FED1_ON_FED1, failure.fed1.is_some(), &failure.fed1_error, true),
        (
            FED2_ON_FED1,
            failure.fed2_from_fed1.is_some(),
            &failure.fed2_from_fed1_error,
            hybrid_ran,
        ),
        (FED2_ON_FED2, failure.fed2.is_some(), &failure.fed2_error, true),
    ];

    for (label, planned, error, ran) in &outcomes {
        if *ran {
            // A plan that failed to normalize is still a failure.
            let mark = match *planned && error.is_none() {
                true => "✅",
                false => "❌",
            };
            lines.push(format!("* {label}: {mark}"));
        }
    }
    lines.push(String::new());

    for (label, _, error, _) in &outcomes {
        if let Some(error) = error {
            push_error(&mut lines, label, error);
        }
    }

    section(&mut lines, "Operation");
    fenced(
        &mut lines,
        "graphql",
        &print_operation(&failure.operation.query_signature),
    );

    lines.join("\n")
}

/// `<name>-<id6>`, shared by the report and its diagrams.
pub fn report_file_stem(operation: &Operation) -> String {
    format!("{}-{}", operation.display_name(), operation.short_id())
}

/// Writes a report per mismatched or failed operation, the optional mermaid
/// diagrams, and both supergraphs. Returns the number of reports written.
pub fn write_reports(
    out: &Path,
    report: &AuditReport,
    supergraphs: (&Supergraph, &Supergraph),
    include_diagrams: bool,
    graph_ref: Option<&Fed2ReadinessConfig>,
) -> Result<usize, CliError> {
    std::fs::create_dir_all(out).map_err(|err| CliError::write(out, err))?;

    let mut written = 0;
    for result in &report.results {
        let stem = report_file_stem(result.operation());

        if include_diagrams {
            if let Some(diagram) = result.fed1_plan().and_then(query_plan_to_mermaid) {
                write_file(out.join(format!("{stem}-fed1.mmd")), &diagram)?;
            }
            if let Some(diagram) = result.fed2_plan().and_then(query_plan_to_mermaid) {
                write_file(out.join(format!("{stem}-fed2.mmd")), &diagram)?;
            }
        }

        if let Some(markdown) = render_report(result, graph_ref) {
            write_file(out.join(format!("{stem}.md")), &markdown)?;
            written += 1;
        }
    }

    let (fed1, fed2) = supergraphs;
    write_file(out.join(".supergraph.fed1.graphql"), fed1.sdl())?;
    write_file(out.join(".supergraph.fed2.graphql"), fed2.sdl())?;

    Ok(written)
}

fn write_file(path: PathBuf, contents: &str) -> Result<(), CliError> {
    debug!(path = %path.display(), "writing");
    std::fs::write(&path, contents).map_err(|err| CliError::write(path, err))
}

fn header(operation: &Operation, graph_ref: Option<&Fed2ReadinessConfig>) -> Vec<String> {
    let title = format!("{} {}", operation.display_name(), operation.short_id());
    let underline = "=".repeat(title.chars().count());
    let mut lines = vec![title, underline];

    if let Some(graph_ref) = graph_ref {
        let (graph, variant) = graph_ref.graph_and_variant();
        lines.push(format!(
            "https://studio.apollographql.com/graph/{graph}/operations?query={}&queryName={}&variant={variant}",
            urlencoding::encode(&operation.query_id),
            urlencoding::encode(operation.display_name()),
        ));
    }
    lines.push(String::new());

    lines
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(title.to_string());
    lines.push("-".repeat(title.chars().count()));
}

fn fenced(lines: &mut Vec<String>, language: &str, body: &str) {
    lines.push(format!("```{language}"));
    lines.push(body.to_string());
    lines.push("```".to_string());
}

fn push_error(lines: &mut Vec<String>, label: &str, error: &OperationError) {
    section(lines, &format!("Error: {label}"));
    lines.push(String::new());
    lines.push(error.to_string());
    lines.push(String::new());
}

/// Pretty-prints the operation, falling back to the raw text when it does not
/// parse.
fn print_operation(signature: &str) -> String {
    match graphql_parser::parse_query::<String>(signature) {
        Ok(document) => document.to_string().trim_end().to_string(),
        Err(_) => signature.to_string(),
    }
}
