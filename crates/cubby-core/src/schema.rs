//! Declarative schema documents and the builder that produces them.
//!
//! A [`Schema`] is a plain description of tables, columns, foreign keys and
//! unique indexes. It performs no execution itself; the storage engine turns
//! it into idempotent DDL. Column types are raw declaration strings
//! (e.g. `"INTEGER PRIMARY KEY AUTOINCREMENT"`) passed through verbatim.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Documents ───────────────────────────────────────────────────────────────

/// An immutable schema document, produced by [`SchemaBuilder::build`].
///
/// The `name` doubles as the backing file name (`<name>.db`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
  pub name:   String,
  pub tables: Vec<Table>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
  pub name:           String,
  pub columns:        Vec<Column>,
  #[serde(default)]
  pub foreign_keys:   Vec<ForeignKey>,
  #[serde(default)]
  pub unique_indexes: Vec<UniqueIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
  pub name: String,
  /// Raw column-type declaration, emitted into DDL unchanged.
  pub ty:   String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
  pub column:    String,
  pub reference: ColumnRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
  pub table:  String,
  pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueIndex {
  pub columns: Vec<String>,
}

impl Schema {
  /// Start building a schema named `name`.
  pub fn builder(name: impl Into<String>) -> SchemaBuilder {
    SchemaBuilder { name: name.into(), tables: Vec::new() }
  }

  /// Look up a table definition by name.
  pub fn table(&self, name: &str) -> Result<&Table> {
    self
      .tables
      .iter()
      .find(|t| t.name == name)
      .ok_or_else(|| Error::TableNotFound(name.to_string()))
  }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Owned builder for a [`Schema`].
///
/// Declaring two tables with the same name is accepted here; the duplicate
/// surfaces as a DDL failure when the schema is applied.
#[derive(Debug)]
pub struct SchemaBuilder {
  name:   String,
  tables: Vec<Table>,
}

impl SchemaBuilder {
  /// Open a table-scoped builder. Call [`TableBuilder::finish`] to return.
  pub fn table(self, name: impl Into<String>) -> TableBuilder {
    TableBuilder {
      schema: self,
      table:  Table {
        name:           name.into(),
        columns:        Vec::new(),
        foreign_keys:   Vec::new(),
        unique_indexes: Vec::new(),
      },
    }
  }

  /// Finalise into an immutable [`Schema`].
  pub fn build(self) -> Schema {
    Schema { name: self.name, tables: self.tables }
  }
}

/// Builder scoped to one table; every method returns `self` for chaining.
#[derive(Debug)]
pub struct TableBuilder {
  schema: SchemaBuilder,
  table:  Table,
}

impl TableBuilder {
  pub fn column(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
    self.table.columns.push(Column { name: name.into(), ty: ty.into() });
    self
  }

  pub fn foreign_key(
    mut self,
    column: impl Into<String>,
    ref_table: impl Into<String>,
    ref_column: impl Into<String>,
  ) -> Self {
    self.table.foreign_keys.push(ForeignKey {
      column:    column.into(),
      reference: ColumnRef { table: ref_table.into(), column: ref_column.into() },
    });
    self
  }

  pub fn unique_index<I, S>(mut self, columns: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.table.unique_indexes.push(UniqueIndex {
      columns: columns.into_iter().map(Into::into).collect(),
    });
    self
  }

  /// Close this table and return to the schema builder.
  pub fn finish(self) -> SchemaBuilder {
    let TableBuilder { mut schema, table } = self;
    schema.tables.push(table);
    schema
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
