use crate::plan::{RequiresField, RequiresInlineFragment, RequiresSelection};

/// Returns `selections` with every sibling list in canonical order.
///
/// Inline fragments come first, in the order they were given. Fields follow,
/// ordered by their response name. Nested lists are sorted before their
/// parent.
pub fn normalize_requires(selections: &[RequiresSelection]) -> Vec<RequiresSelection> {
    let mut normalized = selections
        .iter()
        .map(|selection| match selection {
            RequiresSelection::Field(field) => RequiresSelection::Field(RequiresField {
                name: field.name.clone(),
                alias: field.alias.clone(),
                selections: field.selections.as_deref().map(normalize_requires),
            }),
            RequiresSelection::InlineFragment(fragment) => {
                RequiresSelection::InlineFragment(RequiresInlineFragment {
                    type_condition: fragment.type_condition.clone(),
                    selections: normalize_requires(&fragment.selections),
                })
            }
        })
        .collect::<Vec<_>>();

    // Stable: inline fragments keep their relative order.
    normalized.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    normalized
}

fn sort_key(selection: &RequiresSelection) -> (u8, Option<&str>) {
    match selection {
        RequiresSelection::InlineFragment(_) => (0, None),
        RequiresSelection::Field(field) => (1, Some(field.response_name())),
    }
}
