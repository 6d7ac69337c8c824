use crate::utils::pretty_display::{get_indent, PrettyDisplay};
use serde::{Deserialize, Serialize};
use std::fmt::{Formatter as FmtFormatter, Result as FmtResult};

/// One selection of the entity representation a fetch needs from a previous fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RequiresSelection {
    Field(RequiresField),
    InlineFragment(RequiresInlineFragment),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiresField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selections: Option<Vec<RequiresSelection>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiresInlineFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_condition: Option<String>,
    #[serde(default)]
    pub selections: Vec<RequiresSelection>,
}

impl RequiresSelection {
    pub fn field(name: impl Into<String>) -> Self {
        RequiresSelection::Field(RequiresField {
            name: name.into(),
            alias: None,
            selections: None,
        })
    }

    pub fn inline_fragment(
        type_condition: impl Into<String>,
        selections: Vec<RequiresSelection>,
    ) -> Self {
        RequiresSelection::InlineFragment(RequiresInlineFragment {
            type_condition: Some(type_condition.into()),
            selections,
        })
    }
}

impl RequiresField {
    /// The key this field occupies in a response: its alias, or its name.
    pub fn response_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl PrettyDisplay for RequiresSelection {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult {
        let indent = get_indent(depth);
        match self {
            RequiresSelection::Field(field) => {
                let head = match &field.alias {
                    Some(alias) => format!("{alias}: {}", field.name),
                    None => field.name.clone(),
                };
                match field.selections.as_deref() {
                    Some(selections) if !selections.is_empty() => {
                        writeln!(f, "{indent}{head} {{")?;
                        for selection in selections {
                            selection.pretty_fmt(f, depth + 1)?;
                        }
                        writeln!(f, "{indent}}}")
                    }
                    _ => writeln!(f, "{indent}{head}"),
                }
            }
            RequiresSelection::InlineFragment(fragment) => {
                match &fragment.type_condition {
                    Some(type_condition) => writeln!(f, "{indent}... on {type_condition} {{")?,
                    None => writeln!(f, "{indent}... {{")?,
                }
                for selection in &fragment.selections {
                    selection.pretty_fmt(f, depth + 1)?;
                }
                writeln!(f, "{indent}}}")
            }
        }
    }
}
