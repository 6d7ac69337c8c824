use std::path::PathBuf;

use clap::ValueEnum;
use query_plan_audit::{
    decode_query_plan, normalize_query_plan, Fed1, Fed2, PlanVocabulary,
};
use serde_json::Value;

use super::read_plan_json;
use crate::error::CliError;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Engine {
    Fed1,
    #[default]
    Fed2,
}

#[derive(Debug, clap::Args)]
pub struct NormalizeArgs {
    /// Query plan JSON to normalize.
    plan: PathBuf,

    /// The planner that produced the plan, which decides the node kinds it may
    /// contain.
    #[arg(long, value_enum, default_value_t)]
    engine: Engine,

    /// Print the normalized plan as JSON instead of its text form.
    #[arg(long)]
    json: bool,
}

pub fn run_normalize(args: NormalizeArgs) -> Result<(), CliError> {
    let value = read_plan_json(&args.plan)?;
    let output = match args.engine {
        Engine::Fed1 => normalize_value::<Fed1>(value, args.json)?,
        Engine::Fed2 => normalize_value::<Fed2>(value, args.json)?,
    };

    println!("{output}");
    Ok(())
}

fn normalize_value<V: PlanVocabulary>(value: Value, json: bool) -> Result<String, CliError> {
    let plan = decode_query_plan::<V>(value)?;
    let normalized = normalize_query_plan(&plan)?;

    match json {
        true => Ok(serde_json::to_string_pretty(&normalized)?),
        false => Ok(normalized.to_string()),
    }
}
