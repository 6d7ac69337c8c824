use crate::plan::{PlanVocabulary, QueryPlan};
use serde::Serialize;
use similar::{Algorithm, ChangeTag, TextDiff};
use std::fmt::{Display, Formatter as FmtFormatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffTag {
    Common,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub line: String,
}

/// Line diff between the rendered forms of two plans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlanDiff {
    /// Number of diff records considered.
    pub lines: usize,
    /// Records that are not common to both plans.
    pub differences: usize,
    pub diffs: Vec<DiffLine>,
}

impl QueryPlanDiff {
    pub fn is_match(&self) -> bool {
        self.differences == 0
    }

    /// `- `, `+ ` and `  ` prefixed listing of every record.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Display for QueryPlanDiff {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> FmtResult {
        for diff in &self.diffs {
            let prefix = match diff.tag {
                DiffTag::Common => "  ",
                DiffTag::Added => "+ ",
                DiffTag::Removed => "- ",
            };
            writeln!(f, "{prefix}{}", diff.line)?;
        }
        Ok(())
    }
}

/// Diffs `before` against `after` line by line.
///
/// Plans are compared by their rendered text, so both sides are expected to
/// be normalized already. Lines only in `before` are `Removed`, lines only in
/// `after` are `Added`.
pub fn diff_query_plans<A: PlanVocabulary, B: PlanVocabulary>(
    before: &QueryPlan<A>,
    after: &QueryPlan<B>,
) -> QueryPlanDiff {
    let before = before.to_string();
    let after = after.to_string();
    let before_lines = before.split('\n').collect::<Vec<&str>>();
    let after_lines = after.split('\n').collect::<Vec<&str>>();

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_slices(&before_lines, &after_lines);

    let diffs = diff
        .iter_all_changes()
        .map(|change| DiffLine {
            tag: match change.tag() {
                ChangeTag::Equal => DiffTag::Common,
                ChangeTag::Insert => DiffTag::Added,
                ChangeTag::Delete => DiffTag::Removed,
            },
            line: change.value().to_string(),
        })
        .collect::<Vec<_>>();

    QueryPlanDiff {
        lines: diffs.len(),
        differences: diffs
            .iter()
            .filter(|diff| diff.tag != DiffTag::Common)
            .count(),
        diffs,
    }
}
