//! DDL assembly from schema documents.
//!
//! Every statement is `IF NOT EXISTS`, and index names are derived
//! deterministically from the table name and column list, so re-applying a
//! schema against an initialized file is a no-op.

use cubby_core::{Table, UniqueIndex};

pub fn create_table_sql(table: &Table) -> String {
  let mut parts: Vec<String> = table
    .columns
    .iter()
    .map(|c| format!("{} {}", c.name, c.ty))
    .collect();

  parts.extend(table.foreign_keys.iter().map(|fk| {
    format!(
      "FOREIGN KEY ({}) REFERENCES {}({})",
      fk.column, fk.reference.table, fk.reference.column
    )
  }));

  format!("CREATE TABLE IF NOT EXISTS {} ({})", table.name, parts.join(", "))
}

pub fn create_unique_index_sql(table_name: &str, index: &UniqueIndex) -> String {
  format!(
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_{}_{} ON {} ({})",
    table_name,
    index.columns.join("_"),
    table_name,
    index.columns.join(", ")
  )
}
