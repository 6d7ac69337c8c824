use std::fmt::{Formatter as FmtFormatter, Result as FmtResult};

pub fn get_indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Multi-line rendering at a given nesting depth, two spaces per level.
pub trait PrettyDisplay {
    fn pretty_fmt(&self, f: &mut FmtFormatter<'_>, depth: usize) -> FmtResult;
}

/// Writes every line of `text` at `depth`, skipping empty lines.
pub fn write_indented_lines(f: &mut FmtFormatter<'_>, text: &str, depth: usize) -> FmtResult {
    let indent = get_indent(depth);
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        writeln!(f, "{indent}{line}")?;
    }
    Ok(())
}
