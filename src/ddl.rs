//! DDL statement generation.
//!
//! Statements are produced unformatted and without terminators; see
//! [`crate::format`] for the script layout.

use crate::dialect::Dialect;
use crate::metadata::DatabaseMetadata;
use crate::schema::{Column, Schema, Table};

pub struct DdlGenerator<'a> {
    dialect: &'a dyn Dialect,
}

impl<'a> DdlGenerator<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self { dialect }
    }

    /// Tables, then foreign keys, then sequences
    pub fn create_statements(&self, schema: &Schema) -> Vec<String> {
        let mut statements: Vec<String> = schema.tables.iter().map(|t| self.create_table(t)).collect();
        for table in &schema.tables {
            statements.extend(schema.foreign_keys_of(&table.name).map(|fk| self.dialect.add_foreign_key(fk)));
        }
        statements.extend(schema.sequences.iter().map(|s| self.dialect.create_sequence(s)));
        statements
    }

    /// Constraint drops (when the dialect needs them), tables in declaration order, sequences
    pub fn drop_statements(&self, schema: &Schema) -> Vec<String> {
        let mut statements = Vec::new();
        if self.dialect.drops_constraints() {
            for table in &schema.tables {
                statements.extend(schema.foreign_keys_of(&table.name).map(|fk| self.dialect.drop_foreign_key(fk)));
            }
        }
        statements.extend(schema.tables.iter().map(|t| self.dialect.drop_table(&t.name)));
        statements.extend(schema.sequences.iter().map(|s| self.dialect.drop_sequence(s)));
        statements
    }

    /// Statements bringing `live` up to `schema`; nothing is ever dropped
    pub fn update_statements(&self, schema: &Schema, live: &DatabaseMetadata) -> Vec<String> {
        let mut statements = Vec::new();

        for table in &schema.tables {
            match live.table(&table.name) {
                None => statements.push(self.create_table(table)),
                Some(existing) => {
                    for column in table.columns.iter().filter(|c| !existing.has_column(&c.name)) {
                        log::debug!("Column {}.{} is missing", table.name, column.name);
                        statements.push(self.add_column(table, column));
                    }
                }
            }
        }

        for table in &schema.tables {
            let existing = live.table(&table.name);
            for fk in schema.foreign_keys_of(&table.name) {
                if !existing.is_some_and(|t| t.has_foreign_key(&fk.name)) {
                    statements.push(self.dialect.add_foreign_key(fk));
                }
            }
        }

        for sequence in schema.sequences.iter().filter(|s| !live.has_sequence(s)) {
            statements.push(self.dialect.create_sequence(sequence));
        }
        statements
    }

    pub fn create_table(&self, table: &Table) -> String {
        let mut parts: Vec<String> = table.columns.iter().map(|c| self.column_definition(c)).collect();
        if !table.primary_key.is_empty() {
            parts.push(format!("primary key ({})", table.primary_key.join(", ")));
        }
        format!("create table {} ({})", table.name, parts.join(", "))
    }

    fn add_column(&self, table: &Table, column: &Column) -> String {
        format!("alter table {} add column {}", table.name, self.column_definition(column))
    }

    fn column_definition(&self, column: &Column) -> String {
        let type_name = self.dialect.type_name(&column.column_type);
        match self.dialect.identity_column_string() {
            Some(identity) if column.identity => format!("{} {} {}", column.name, type_name, identity),
            _ if !column.nullable => format!("{} {} not null", column.name, type_name),
            _ => format!("{} {}", column.name, type_name),
        }
    }
}
