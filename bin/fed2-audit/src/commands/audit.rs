use std::{path::PathBuf, process::ExitCode, sync::Arc};

use audit_config::AuditConfig;
use query_plan_audit::{
    AuditOptions, AuditSetup, Composer, CompositionError, FederationVersion, QueryPlanAudit,
    Supergraph,
};
use tracing::info;

use crate::{
    engines::CommandEngine, error::CliError, operations::load_operations, report::write_reports,
    subgraphs::load_subgraphs,
};

#[derive(Debug, clap::Args)]
pub struct AuditArgs {
    /// A JSON or YAML list of operations. Overrides `operations.file`.
    #[arg(long)]
    operations: Option<PathBuf>,

    /// Directory to write a report for each operation that differs.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also write a mermaid diagram of each query plan.
    #[arg(long)]
    include_diagrams: bool,

    /// Also plan with the Federation 2 planner against the Federation 1
    /// supergraph.
    #[arg(long)]
    hybrid: bool,
}

pub async fn run_audit(config: &AuditConfig, args: AuditArgs) -> Result<ExitCode, CliError> {
    let subgraphs = load_subgraphs(config)?;
    let fed1 = Arc::new(CommandEngine::new(
        FederationVersion::One,
        &config.engines.fed1,
        config.root_directory(),
    ));
    let fed2 = Arc::new(CommandEngine::new(
        FederationVersion::Two,
        &config.engines.fed2,
        config.root_directory(),
    ));

    info!(subgraphs = subgraphs.len(), "composing");
    let (fed1_supergraph, fed2_supergraph) =
        tokio::join!(fed1.compose(&subgraphs), fed2.compose(&subgraphs));

    // Federation v1 is reported first, and nothing else once a composition fails.
    for composed in [&fed1_supergraph, &fed2_supergraph] {
        if !report_composition(composed) {
            return Ok(ExitCode::FAILURE);
        }
    }

    let audit = QueryPlanAudit::new(AuditSetup {
        fed1_planner: fed1,
        fed2_planner: fed2,
        fed1_supergraph,
        fed2_supergraph,
        options: AuditOptions {
            hybrid_comparison: args.hybrid || config.audit.hybrid_comparison,
        },
    })?;

    let operations_path = args
        .operations
        .or_else(|| config.operations.file.as_ref().map(|file| file.absolute.clone()))
        .ok_or(CliError::MissingOperations)?;
    let operations = load_operations(&operations_path)?;
    let total = operations.len();

    println!("Generating query plans for {total} operations");

    let report = audit
        .run(&operations, |completed| {
            if completed == total || completed % 25 == 0 {
                info!(completed, total, "auditing operations");
            }
        })
        .await?;

    println!("-----------------------------------");
    println!("✅ Operations audited: {}", report.summary.total);
    println!("🏆 Operations that match: {}", report.summary.matched);
    if report.summary.mismatched() > 0 {
        println!("❌ Operations with differences: {}", report.summary.mismatched());
    }

    match args
        .out
        .or_else(|| config.audit.out.as_ref().map(|out| out.absolute.clone()))
    {
        Some(out) => {
            let written = write_reports(
                &out,
                &report,
                (audit.fed1_supergraph(), audit.fed2_supergraph()),
                args.include_diagrams || config.audit.include_diagrams,
                config.graph_ref(),
            )?;
            info!(reports = written, "reports written");
            println!("Results written to {}", out.display());
        }
        None => println!("\nAdd --out <directory> to print reports for each operation."),
    }

    Ok(ExitCode::SUCCESS)
}

/// Prints the outcome of a composition, `false` when it failed.
fn report_composition(composed: &Result<Supergraph, CompositionError>) -> bool {
    match composed {
        Ok(supergraph) => {
            println!("✅ Schema composes with {}", supergraph.version());
            true
        }
        Err(CompositionError::Failed { version, errors }) => {
            println!("💣 Schema did not compose with {version}");
            eprintln!("{}", errors.join("\n\n"));
            false
        }
        Err(err) => {
            println!("💣 Schema did not compose with {}", err.version());
            eprintln!("{err}");
            false
        }
    }
}
