//! # auditddl
//!
//! Schema export for persistence units with audited entities: `create`,
//! `create-drop` and `update` DDL scripts, including the audit shadow tables
//! and the revision-info table.
//!
//! Units are described in a TOML persistence descriptor (see [`descriptor`]).
//! `update` compares the mapped schema with a live PostgreSQL database.

pub mod audit;
pub mod binder;
pub mod config;
pub mod connection;
pub mod ddl;
pub mod descriptor;
pub mod dialect;
pub mod error;
pub mod exporter;
pub mod format;
pub mod inspector;
pub mod metadata;
pub mod naming;
pub mod schema;

pub use config::ExportConfig;
pub use connection::JdbcCredentials;
pub use descriptor::PersistenceDescriptor;
pub use error::ExportError;
pub use exporter::{AuditSchemaExporter, ExportAction, SchemaExporter};
pub use inspector::{MetadataReader, PostgresMetadataReader};
pub use metadata::{DatabaseMetadata, TableMetadata};
