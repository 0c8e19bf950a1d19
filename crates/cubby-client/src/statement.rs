//! [`Statement`] — a parameterized statement under construction.
//!
//! Values never reach the SQL text; they travel as JSON parameters and bind
//! positionally on the server. Identifiers (table and column names) cannot
//! be parameters, so they are appended as raw fragments instead.

use serde_json::Value;

/// A SQL statement plus its positional parameters.
///
/// ```
/// use cubby_client::Statement;
///
/// let stmt = Statement::new("SELECT value FROM persistent_data WHERE key = ?1")
///   .bind("editor");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
  sql:    String,
  params: Vec<Value>,
}

impl Statement {
  pub fn new(sql: impl Into<String>) -> Self {
    Self { sql: sql.into(), params: Vec::new() }
  }

  /// Append a raw SQL fragment (for identifiers; never for values).
  pub fn raw(mut self, fragment: &str) -> Self {
    self.sql.push_str(fragment);
    self
  }

  /// Bind the next positional parameter (`?1`, `?2`, …).
  pub fn bind(mut self, value: impl Into<Value>) -> Self {
    self.params.push(value.into());
    self
  }

  /// Final SQL text and parameter list.
  pub fn compile(self) -> (String, Vec<Value>) {
    (self.sql, self.params)
  }
}
