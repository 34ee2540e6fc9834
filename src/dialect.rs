//! SQL dialects.
//!
//! A [`Dialect`] knows the type names and the drop/sequence syntax of one
//! database. Statements are rendered unformatted and without the trailing `;`.

use crate::schema::{ColumnType, ForeignKey};
use serde::Deserialize;

/// Sequence backing generated revision numbers on dialects without identity columns
pub const REVISION_SEQUENCE: &str = "hibernate_sequence";

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    H2,
    #[serde(alias = "postgres")]
    Postgresql,
}

impl DialectKind {
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            DialectKind::H2 => &H2Dialect,
            DialectKind::Postgresql => &PostgresDialect,
        }
    }

    /// Dialect of the database a JDBC URL points at, if it is one we know
    pub fn from_jdbc_url(url: &str) -> Option<Self> {
        if url.starts_with("jdbc:h2:") {
            Some(DialectKind::H2)
        } else if url.starts_with("jdbc:postgresql:") {
            Some(DialectKind::Postgresql)
        } else {
            None
        }
    }
}

pub trait Dialect {
    fn type_name(&self, column_type: &ColumnType) -> String;

    /// Column suffix for database generated keys, `None` when sequences are used instead
    fn identity_column_string(&self) -> Option<&'static str>;

    fn drop_table(&self, table: &str) -> String;

    /// Whether foreign keys are dropped explicitly before their tables
    fn drops_constraints(&self) -> bool {
        false
    }

    fn drop_foreign_key(&self, fk: &ForeignKey) -> String {
        format!("alter table {} drop constraint {}", fk.table, fk.name)
    }

    fn create_sequence(&self, name: &str) -> String {
        format!("create sequence {} start with 1 increment by 1", name)
    }

    fn drop_sequence(&self, name: &str) -> String {
        format!("drop sequence if exists {}", name)
    }

    fn add_foreign_key(&self, fk: &ForeignKey) -> String {
        format!(
            "alter table {} add constraint {} foreign key ({}) references {}",
            fk.table,
            fk.name,
            fk.columns.join(", "),
            fk.referenced_table
        )
    }
}

pub struct H2Dialect;

impl Dialect for H2Dialect {
    fn type_name(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Integer => "integer".to_string(),
            ColumnType::BigInt => "bigint".to_string(),
            ColumnType::SmallInt => "smallint".to_string(),
            ColumnType::TinyInt => "tinyint".to_string(),
            ColumnType::Boolean => "boolean".to_string(),
            ColumnType::Double => "double".to_string(),
            ColumnType::Varchar(length) => format!("varchar({})", length),
            ColumnType::Text => "clob".to_string(),
            ColumnType::Decimal { precision, scale } => format!("decimal({},{})", precision, scale),
            ColumnType::Date => "date".to_string(),
            ColumnType::Timestamp => "timestamp".to_string(),
        }
    }

    fn identity_column_string(&self) -> Option<&'static str> {
        Some("generated by default as identity")
    }

    fn drop_table(&self, table: &str) -> String {
        format!("drop table {} if exists", table)
    }
}

pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn type_name(&self, column_type: &ColumnType) -> String {
        match column_type {
            ColumnType::Integer => "int4".to_string(),
            ColumnType::BigInt => "int8".to_string(),
            ColumnType::SmallInt | ColumnType::TinyInt => "int2".to_string(),
            ColumnType::Boolean => "boolean".to_string(),
            ColumnType::Double => "float8".to_string(),
            ColumnType::Varchar(length) => format!("varchar({})", length),
            ColumnType::Text => "text".to_string(),
            ColumnType::Decimal { precision, scale } => format!("numeric({}, {})", precision, scale),
            ColumnType::Date => "date".to_string(),
            ColumnType::Timestamp => "timestamp".to_string(),
        }
    }

    fn identity_column_string(&self) -> Option<&'static str> {
        None
    }

    fn drop_table(&self, table: &str) -> String {
        format!("drop table if exists {} cascade", table)
    }

    fn drops_constraints(&self) -> bool {
        true
    }

    fn drop_foreign_key(&self, fk: &ForeignKey) -> String {
        format!("alter table if exists {} drop constraint {}", fk.table, fk.name)
    }

    fn create_sequence(&self, name: &str) -> String {
        format!("create sequence {} start 1 increment 1", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rev_fk() -> ForeignKey {
        ForeignKey {
            name: "FK_x".to_string(),
            table: "FooBar_AUD".to_string(),
            columns: vec!["REV".to_string()],
            referenced_table: "REVINFO".to_string(),
        }
    }

    #[test]
    fn test_h2_types() {
        let d = DialectKind::H2.dialect();
        assert_eq!(d.type_name(&ColumnType::Varchar(255)), "varchar(255)");
        assert_eq!(d.type_name(&ColumnType::TinyInt), "tinyint");
        assert_eq!(d.type_name(&ColumnType::Text), "clob");
        assert_eq!(d.identity_column_string(), Some("generated by default as identity"));
        assert_eq!(d.drop_table("FooBar"), "drop table FooBar if exists");
        assert!(!d.drops_constraints());
    }

    #[test]
    fn test_postgres_types() {
        let d = DialectKind::Postgresql.dialect();
        assert_eq!(d.type_name(&ColumnType::Integer), "int4");
        assert_eq!(d.type_name(&ColumnType::TinyInt), "int2");
        assert_eq!(
            d.type_name(&ColumnType::Decimal { precision: 19, scale: 2 }),
            "numeric(19, 2)"
        );
        assert_eq!(d.identity_column_string(), None);
        assert_eq!(d.drop_table("FooBar"), "drop table if exists FooBar cascade");
        assert_eq!(
            d.drop_foreign_key(&rev_fk()),
            "alter table if exists FooBar_AUD drop constraint FK_x"
        );
    }

    #[test]
    fn test_dialect_from_jdbc_url() {
        assert_eq!(DialectKind::from_jdbc_url("jdbc:h2:mem:test"), Some(DialectKind::H2));
        assert_eq!(
            DialectKind::from_jdbc_url("jdbc:postgresql://localhost:5432/app"),
            Some(DialectKind::Postgresql)
        );
        assert_eq!(DialectKind::from_jdbc_url("jdbc:mysql://localhost/app"), None);
    }

    #[test]
    fn test_add_foreign_key_references_primary_key() {
        assert_eq!(
            H2Dialect.add_foreign_key(&rev_fk()),
            "alter table FooBar_AUD add constraint FK_x foreign key (REV) references REVINFO"
        );
    }
}
