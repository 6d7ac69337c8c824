use graphql_parser::query::{Definition, OperationDefinition, Selection, SelectionSet};

use super::{error::NormalizeError, literals::LiteralPrinter};

/// Prints `operation` back with the fields of every selection set sorted by
/// name.
///
/// Aliases are ignored. Fragment spreads and inline fragments stay in the
/// positions they had, only the slots taken by fields are reordered. String
/// and Float literals are printed so that normalizing twice gives the same
/// text.
pub fn normalize_operation(operation: &str) -> Result<String, NormalizeError> {
    let mut document = graphql_parser::parse_query::<String>(operation).map_err(|err| {
        NormalizeError::InvalidOperation {
            message: err.to_string(),
        }
    })?;

    let mut literals = LiteralPrinter::new(operation);

    for def in document.definitions.iter_mut() {
        match def {
            Definition::Operation(ref mut op) => match op {
                OperationDefinition::Query(ref mut q) => {
                    literals.stash_variables(&mut q.variable_definitions);
                    literals.stash_directives(&mut q.directives);
                    sort_selection_set(&mut q.selection_set, &mut literals)
                }
                OperationDefinition::Mutation(ref mut m) => {
                    literals.stash_variables(&mut m.variable_definitions);
                    literals.stash_directives(&mut m.directives);
                    sort_selection_set(&mut m.selection_set, &mut literals)
                }
                OperationDefinition::Subscription(ref mut s) => {
                    literals.stash_variables(&mut s.variable_definitions);
                    literals.stash_directives(&mut s.directives);
                    sort_selection_set(&mut s.selection_set, &mut literals)
                }
                OperationDefinition::SelectionSet(ref mut s) => {
                    sort_selection_set(s, &mut literals)
                }
            },
            Definition::Fragment(ref mut fr) => {
                literals.stash_directives(&mut fr.directives);
                sort_selection_set(&mut fr.selection_set, &mut literals)
            }
        }
    }

    Ok(literals.restore(&document.to_string()))
}

fn sort_selection_set<'b, 'a>(
    selection_set: &'b mut SelectionSet<'a, String>,
    literals: &mut LiteralPrinter,
) {
    for item in selection_set.items.iter_mut() {
        match item {
            Selection::Field(ref mut field) => {
                literals.stash_arguments(&mut field.arguments);
                literals.stash_directives(&mut field.directives);
                sort_selection_set(&mut field.selection_set, literals)
            }
            Selection::InlineFragment(ref mut fr) => {
                literals.stash_directives(&mut fr.directives);
                sort_selection_set(&mut fr.selection_set, literals)
            }
            Selection::FragmentSpread(ref mut spread) => {
                literals.stash_directives(&mut spread.directives)
            }
        }
    }

    let mut fields = Vec::new();
    let slots = std::mem::take(&mut selection_set.items)
        .into_iter()
        .map(|item| match item {
            Selection::Field(field) => {
                fields.push(field);
                None
            }
            other => Some(other),
        })
        .collect::<Vec<_>>();

    fields.sort_by(|a, b| a.name.cmp(&b.name));

    let mut fields = fields.into_iter();
    selection_set.items = slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| fields.next().map(Selection::Field)))
        .collect();
}
