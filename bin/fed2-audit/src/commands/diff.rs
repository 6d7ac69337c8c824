use std::{path::PathBuf, process::ExitCode};

use query_plan_audit::{
    decode_query_plan, diff_query_plans, normalize_query_plan, Fed1, Fed2, QueryPlanDiff,
};

use super::read_plan_json;
use crate::error::CliError;

#[derive(Debug, clap::Args)]
pub struct DiffArgs {
    /// Query plan JSON produced by the Federation 1 planner.
    fed1_plan: PathBuf,

    /// Query plan JSON produced by the Federation 2 planner.
    fed2_plan: PathBuf,

    /// Compare the plans as given, without normalizing them first.
    #[arg(long)]
    raw: bool,
}

/// Prints the diff of two plan files. Exits with a failure when they differ.
pub fn run_diff(args: DiffArgs) -> Result<ExitCode, CliError> {
    let diff = diff_plan_files(&args)?;

    print!("{}", diff.render());
    match diff.is_match() {
        true => {
            println!("🏆 Query plans match");
            Ok(ExitCode::SUCCESS)
        }
        false => {
            println!("❌ Query plans differ on {} lines", diff.differences);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn diff_plan_files(args: &DiffArgs) -> Result<QueryPlanDiff, CliError> {
    let fed1 = decode_query_plan::<Fed1>(read_plan_json(&args.fed1_plan)?)?;
    let fed2 = decode_query_plan::<Fed2>(read_plan_json(&args.fed2_plan)?)?;

    if args.raw {
        return Ok(diff_query_plans(&fed1, &fed2));
    }

    Ok(diff_query_plans(
        &normalize_query_plan(&fed1)?,
        &normalize_query_plan(&fed2)?,
    ))
}
