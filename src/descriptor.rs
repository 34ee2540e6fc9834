//! Persistence descriptor.
//!
//! A descriptor is a TOML file listing persistence units. Each unit names its
//! dialect, optional audit settings and the entities it maps:
//!
//! ```toml
//! [[unit]]
//! name = "shop"
//! dialect = "h2"
//!
//! [[unit.entity]]
//! name = "Order"
//! audited = true
//!
//! [[unit.entity.property]]
//! name = "id"
//! type = "integer"
//! id = true
//!
//! [[unit.entity.property]]
//! name = "customer"
//! type = "string"
//! length = 80
//! ```

use crate::dialect::DialectKind;
use crate::error::ExportError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct PersistenceDescriptor {
    #[serde(default, rename = "unit")]
    pub units: Vec<PersistenceUnit>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PersistenceUnit {
    pub name: String,
    #[serde(default)]
    pub dialect: DialectKind,
    #[serde(default)]
    pub audit: AuditSettings,
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntityMapping>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EntityMapping {
    pub name: String,
    /// Table name, defaults to the entity name
    pub table: Option<String>,
    #[serde(default)]
    pub audited: bool,
    #[serde(default, rename = "property")]
    pub properties: Vec<PropertyMapping>,
}

impl EntityMapping {
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PropertyMapping {
    pub name: String,
    /// Column name, defaults to the property name
    pub column: Option<String>,
    /// Required unless the property references another entity
    #[serde(rename = "type")]
    pub kind: Option<PropertyType>,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub id: bool,
    /// `false` keeps the property out of the audit table
    #[serde(default = "default_true")]
    pub audited: bool,
    /// Name of the entity this many-to-one property joins to
    pub references: Option<String>,
}

impl PropertyMapping {
    pub fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

fn default_true() -> bool {
    true
}

/// Mapped property types
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Integer,
    Bigint,
    Smallint,
    Tinyint,
    Boolean,
    Double,
    String,
    Text,
    Decimal,
    Date,
    Timestamp,
}

/// Naming of the audit tables and revision columns
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AuditSettings {
    pub table_prefix: String,
    pub table_suffix: String,
    pub revision_field_name: String,
    pub revision_type_field_name: String,
    pub revision_info_table: String,
    pub revision_timestamp_field_name: String,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            table_prefix: String::new(),
            table_suffix: "_AUD".to_string(),
            revision_field_name: "REV".to_string(),
            revision_type_field_name: "REVTYPE".to_string(),
            revision_info_table: "REVINFO".to_string(),
            revision_timestamp_field_name: "REVTSTMP".to_string(),
        }
    }
}

impl PersistenceDescriptor {
    /// Parse a descriptor; `origin` names the source in error messages.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ExportError> {
        toml::from_str(content).map_err(|source| ExportError::Descriptor {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let content = fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let descriptor = Self::from_toml_str(&content, &path.display().to_string())?;
        log::debug!(
            "Loaded {} persistence unit(s) from {}",
            descriptor.units.len(),
            path.display()
        );
        Ok(descriptor)
    }

    pub fn unit(&self, name: &str) -> Result<&PersistenceUnit, ExportError> {
        self.units
            .iter()
            .find(|unit| unit.name == name)
            .ok_or_else(|| ExportError::UnitNotFound(name.to_string()))
    }
}
