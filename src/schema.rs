//! Physical schema model produced by binding a persistence unit.

use crate::descriptor::PropertyType;

/// Column type with its size parameters resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInt,
    SmallInt,
    TinyInt,
    Boolean,
    Double,
    Varchar(u32),
    Text,
    Decimal { precision: u32, scale: u32 },
    Date,
    Timestamp,
}

impl ColumnType {
    pub const DEFAULT_LENGTH: u32 = 255;
    pub const DEFAULT_PRECISION: u32 = 19;
    pub const DEFAULT_SCALE: u32 = 2;

    pub fn from_property(
        kind: PropertyType,
        length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
    ) -> Self {
        match kind {
            PropertyType::Integer => ColumnType::Integer,
            PropertyType::Bigint => ColumnType::BigInt,
            PropertyType::Smallint => ColumnType::SmallInt,
            PropertyType::Tinyint => ColumnType::TinyInt,
            PropertyType::Boolean => ColumnType::Boolean,
            PropertyType::Double => ColumnType::Double,
            PropertyType::String => ColumnType::Varchar(length.unwrap_or(Self::DEFAULT_LENGTH)),
            PropertyType::Text => ColumnType::Text,
            PropertyType::Decimal => ColumnType::Decimal {
                precision: precision.unwrap_or(Self::DEFAULT_PRECISION),
                scale: scale.unwrap_or(Self::DEFAULT_SCALE),
            },
            PropertyType::Date => ColumnType::Date,
            PropertyType::Timestamp => ColumnType::Timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    /// Value generated by the database on insert
    pub identity: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            identity: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self.nullable = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Vec<String>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    /// Referenced through its primary key
    pub referenced_table: String,
}

/// Tables, foreign keys and sequences in creation order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    pub tables: Vec<Table>,
    pub foreign_keys: Vec<ForeignKey>,
    pub sequences: Vec<String>,
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn foreign_keys_of<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a ForeignKey> + 'a {
        self.foreign_keys.iter().filter(move |fk| fk.table == table)
    }
}
