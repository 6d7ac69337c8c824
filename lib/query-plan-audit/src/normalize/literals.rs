use graphql_parser::query::{Directive, Value, VariableDefinition};

/// Keeps String and Float literals exactly as parsed through printing.
///
/// The document printer turns strings with a newline into block strings,
/// which drops a trailing newline, and prints `1.5e3` as the Int `1500`.
/// Each such literal is swapped for an enum placeholder before printing and
/// written back in a form that parses to the same value.
pub(super) struct LiteralPrinter {
    prefix: String,
    literals: Vec<String>,
}

impl LiteralPrinter {
    /// The placeholder prefix is picked so it cannot appear in `source`.
    pub(super) fn new(source: &str) -> Self {
        let mut prefix = String::from("__literal");
        while source.contains(prefix.as_str()) {
            prefix.push('_');
        }

        LiteralPrinter {
            prefix,
            literals: Vec::new(),
        }
    }

    pub(super) fn stash_value(&mut self, value: &mut Value<'_, String>) {
        let printed = match value {
            Value::String(string) => quote(string),
            Value::Float(float) => format!("{float:?}"),
            Value::List(items) => {
                items.iter_mut().for_each(|item| self.stash_value(item));
                return;
            }
            Value::Object(fields) => {
                fields.values_mut().for_each(|field| self.stash_value(field));
                return;
            }
            _ => return,
        };

        *value = Value::Enum(format!("{}{}", self.prefix, self.literals.len()));
        self.literals.push(printed);
    }

    pub(super) fn stash_arguments(&mut self, arguments: &mut [(String, Value<'_, String>)]) {
        for (_, value) in arguments.iter_mut() {
            self.stash_value(value);
        }
    }

    pub(super) fn stash_directives(&mut self, directives: &mut [Directive<'_, String>]) {
        for directive in directives.iter_mut() {
            self.stash_arguments(&mut directive.arguments);
        }
    }

    pub(super) fn stash_variables(&mut self, variables: &mut [VariableDefinition<'_, String>]) {
        for variable in variables.iter_mut() {
            if let Some(default_value) = variable.default_value.as_mut() {
                self.stash_value(default_value);
            }
        }
    }

    /// Writes the stashed literals back in place of their placeholders.
    pub(super) fn restore(&self, printed: &str) -> String {
        let mut restored = String::with_capacity(printed.len());
        let mut rest = printed;

        while let Some(start) = rest.find(self.prefix.as_str()) {
            restored.push_str(&rest[..start]);
            let tail = &rest[start + self.prefix.len()..];
            let digits = tail.chars().take_while(char::is_ascii_digit).count();

            match tail[..digits]
                .parse::<usize>()
                .ok()
                .and_then(|index| self.literals.get(index))
            {
                Some(literal) => {
                    restored.push_str(literal);
                    rest = &tail[digits..];
                }
                None => {
                    restored.push_str(&self.prefix);
                    rest = tail;
                }
            }
        }
        restored.push_str(rest);

        restored
    }
}

/// A single-line string literal that parses back to `value`.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04X}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
