//! OrientDB SQL statements and the transactional script they are wrapped in.

use crate::transform::records::Record;

pub const ROLLBACK: &str = "ROLLBACK;";

const STATEMENT_SEPARATOR: &str = ";\n";

/// `BEGIN`, the pushed statements, `COMMIT`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandScript {
    statements: Vec<String>,
}

impl CommandScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: String) {
        self.statements.push(statement);
    }

    /// Number of statements between `BEGIN` and `COMMIT`.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.statements.len() + 2);
        parts.push("BEGIN");
        parts.extend(self.statements.iter().map(String::as_str));
        parts.push("COMMIT");
        parts.join(STATEMENT_SEPARATOR)
    }
}

/// Wraps `value` in single quotes, escaping backslashes and quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

pub fn insert_statement(class: &str, record: &Record) -> Result<String, serde_json::Error> {
    Ok(format!(
        "INSERT INTO {class} CONTENT {}",
        serde_json::to_string(record)?
    ))
}

/// `CREATE EDGE`, with a `SET` clause only when there are attributes.
pub fn create_edge_statement(
    class: &str,
    from_rid: &str,
    to_rid: &str,
    attributes: &[(String, Option<String>)],
) -> String {
    let mut statement = format!("CREATE EDGE {class} FROM {from_rid} TO {to_rid}");
    if !attributes.is_empty() {
        let assignments: Vec<String> = attributes
            .iter()
            .map(|(name, value)| match value {
                Some(value) => format!("{name} = {}", quote_literal(value)),
                None => format!("{name} = null"),
            })
            .collect();
        statement.push_str(" SET ");
        statement.push_str(&assignments.join(", "));
    }
    statement
}

pub fn select_page(class: &str, key_field: &str, limit: usize, skip: usize) -> String {
    format!("SELECT {key_field}, @rid FROM {class} LIMIT {limit} SKIP {skip}")
}

pub fn select_keys(class: &str, key_field: &str, keys: &[String]) -> String {
    let literals: Vec<String> = keys.iter().map(|key| quote_literal(key)).collect();
    format!(
        "SELECT {key_field}, @rid FROM {class} WHERE {key_field} IN [{}]",
        literals.join(", ")
    )
}

pub fn truncate_class(class: &str) -> String {
    format!("TRUNCATE CLASS {class} UNSAFE")
}
