//! Snapshot of a live database schema.
//!
//! Names are compared case-insensitively: unquoted identifiers come back
//! folded to lower case from PostgreSQL.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableMetadata {
    pub name: String,
    columns: BTreeSet<String>,
    foreign_keys: BTreeSet<String>,
}

impl TableMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_column(mut self, column: &str) -> Self {
        self.add_column(column);
        self
    }

    pub fn with_foreign_key(mut self, name: &str) -> Self {
        self.add_foreign_key(name);
        self
    }

    pub fn add_column(&mut self, column: &str) {
        self.columns.insert(column.to_lowercase());
    }

    pub fn add_foreign_key(&mut self, name: &str) {
        self.foreign_keys.insert(name.to_lowercase());
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column.to_lowercase())
    }

    pub fn has_foreign_key(&self, name: &str) -> bool {
        self.foreign_keys.contains(&name.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatabaseMetadata {
    tables: BTreeMap<String, TableMetadata>,
    sequences: BTreeSet<String>,
}

impl DatabaseMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.tables.insert(table.name.to_lowercase(), table);
        self
    }

    pub fn with_sequence(mut self, name: &str) -> Self {
        self.sequences.insert(name.to_lowercase());
        self
    }

    /// Table entry for `name`, created empty on first use
    pub fn table_mut(&mut self, name: &str) -> &mut TableMetadata {
        self.tables
            .entry(name.to_lowercase())
            .or_insert_with(|| TableMetadata::new(name))
    }

    pub fn add_sequence(&mut self, name: &str) {
        self.sequences.insert(name.to_lowercase());
    }

    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn has_sequence(&self, name: &str) -> bool {
        self.sequences.contains(&name.to_lowercase())
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}
