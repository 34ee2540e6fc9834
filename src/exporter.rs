//! Schema export entry point.

use crate::binder::bind_unit;
use crate::config::ExportConfig;
use crate::connection::JdbcCredentials;
use crate::ddl::DdlGenerator;
use crate::descriptor::PersistenceDescriptor;
use crate::dialect::DialectKind;
use crate::error::ExportError;
use crate::format::format_script;
use crate::inspector::{MetadataReader, PostgresMetadataReader};

/// What kind of script to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportAction {
    /// Create tables, foreign keys and sequences
    Create,
    /// Drop everything first, then create
    CreateDrop,
    /// Only the changes the live database is missing
    Update(JdbcCredentials),
}

/// Generates the DDL script of a persistence unit
pub trait SchemaExporter {
    fn generate(&self, unit: &str, action: &ExportAction) -> Result<String, ExportError>;
}

impl<T: SchemaExporter + ?Sized> SchemaExporter for &T {
    fn generate(&self, unit: &str, action: &ExportAction) -> Result<String, ExportError> {
        (**self).generate(unit, action)
    }
}

/// Exporter for the units of one persistence descriptor, audit tables included
pub struct AuditSchemaExporter<R = PostgresMetadataReader> {
    descriptor: PersistenceDescriptor,
    reader: R,
}

impl AuditSchemaExporter {
    pub fn new(descriptor: PersistenceDescriptor) -> Self {
        Self::with_reader(descriptor, PostgresMetadataReader)
    }

    /// Load the descriptor named by `config`
    pub fn from_config(config: &ExportConfig) -> Result<Self, ExportError> {
        Ok(Self::new(PersistenceDescriptor::load(&config.persistence_file)?))
    }
}

impl<R: MetadataReader> AuditSchemaExporter<R> {
    pub fn with_reader(descriptor: PersistenceDescriptor, reader: R) -> Self {
        Self { descriptor, reader }
    }

    pub fn descriptor(&self) -> &PersistenceDescriptor {
        &self.descriptor
    }
}

impl<R: MetadataReader> SchemaExporter for AuditSchemaExporter<R> {
    fn generate(&self, unit: &str, action: &ExportAction) -> Result<String, ExportError> {
        let unit = self.descriptor.unit(unit)?;
        let schema = bind_unit(unit)?;
        let generator = DdlGenerator::new(unit.dialect.dialect());

        let statements = match action {
            ExportAction::Create => generator.create_statements(&schema),
            ExportAction::CreateDrop => {
                let mut statements = generator.drop_statements(&schema);
                statements.extend(generator.create_statements(&schema));
                statements
            }
            ExportAction::Update(credentials) => {
                if let Some(driver) = dialect_mismatch(unit.dialect, &credentials.url) {
                    log::warn!(
                        "Unit '{}' renders {:?} DDL but {} is a {:?} database; missing tables may not apply",
                        unit.name,
                        unit.dialect,
                        credentials.url,
                        driver
                    );
                }
                let live = self.reader.read(credentials)?;
                generator.update_statements(&schema, &live)
            }
        };

        log::info!("Generated {} statement(s) for unit '{}'", statements.len(), unit.name);
        Ok(format_script(statements))
    }
}

/// The URL's dialect when it differs from the one the unit renders
fn dialect_mismatch(rendered: DialectKind, url: &str) -> Option<DialectKind> {
    DialectKind::from_jdbc_url(url).filter(|driver| *driver != rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{DatabaseMetadata, TableMetadata};
    use std::cell::RefCell;

    const UNIT: &str = r#"
[[unit]]
name = "application-data-unit-export-test"

[[unit.entity]]
name = "FooBar"
audited = true

[[unit.entity.property]]
name = "id"
type = "integer"
id = true

[[unit.entity.property]]
name = "foo"
type = "string"

[[unit.entity.property]]
name = "bar"
type = "integer"
nullable = false
"#;

    struct FixedReader {
        metadata: DatabaseMetadata,
        seen: RefCell<Vec<JdbcCredentials>>,
    }

    impl MetadataReader for FixedReader {
        fn read(&self, credentials: &JdbcCredentials) -> Result<DatabaseMetadata, ExportError> {
            self.seen.borrow_mut().push(credentials.clone());
            Ok(self.metadata.clone())
        }
    }

    fn exporter(metadata: DatabaseMetadata) -> AuditSchemaExporter<FixedReader> {
        AuditSchemaExporter::with_reader(
            PersistenceDescriptor::from_toml_str(UNIT, "test").unwrap(),
            FixedReader {
                metadata,
                seen: RefCell::new(Vec::new()),
            },
        )
    }

    #[test]
    fn test_create_script() {
        let script = exporter(DatabaseMetadata::new())
            .generate("application-data-unit-export-test", &ExportAction::Create)
            .unwrap();
        assert!(script.starts_with("\n    create table FooBar (\n        id integer not null,\n"));
        assert!(script.ends_with("        references REVINFO;\n"));
    }

    #[test]
    fn test_create_drop_starts_with_drops() {
        let script = exporter(DatabaseMetadata::new())
            .generate("application-data-unit-export-test", &ExportAction::CreateDrop)
            .unwrap();
        assert!(script.starts_with(
            "\n    drop table FooBar if exists;\n\n    drop table FooBar_AUD if exists;\n\n    drop table REVINFO if exists;\n\n    create table FooBar ("
        ));
    }

    #[test]
    fn test_update_passes_credentials_to_reader() {
        let live = DatabaseMetadata::new()
            .with_table(TableMetadata::new("FooBar").with_column("id").with_column("foo").with_column("bar"))
            .with_table(
                TableMetadata::new("FooBar_AUD")
                    .with_column("id")
                    .with_column("REV")
                    .with_column("REVTYPE")
                    .with_column("foo")
                    .with_column("bar")
                    .with_foreign_key("FK_hq6lvb9twe0idlwiwq4locy79"),
            )
            .with_table(TableMetadata::new("REVINFO").with_column("REV").with_column("REVTSTMP"));
        let exporter = exporter(live);
        let credentials = JdbcCredentials::new("jdbc:postgresql:app", "foo", "bar");

        let script = exporter
            .generate("application-data-unit-export-test", &ExportAction::Update(credentials.clone()))
            .unwrap();
        assert_eq!(script, "");
        assert_eq!(exporter.reader.seen.borrow().as_slice(), &[credentials]);
    }

    #[test]
    fn test_dialect_mismatch() {
        assert_eq!(
            dialect_mismatch(DialectKind::H2, "jdbc:postgresql:app"),
            Some(DialectKind::Postgresql)
        );
        assert_eq!(dialect_mismatch(DialectKind::Postgresql, "jdbc:postgresql:app"), None);
        assert_eq!(dialect_mismatch(DialectKind::H2, "jdbc:oracle:thin:@db"), None);
    }

    #[test]
    fn test_update_with_other_driver_still_generates() {
        let exporter = exporter(DatabaseMetadata::new());
        let credentials = JdbcCredentials::new("jdbc:postgresql:app", "foo", "bar");
        let script = exporter
            .generate("application-data-unit-export-test", &ExportAction::Update(credentials))
            .unwrap();
        assert!(script.contains("create table FooBar_AUD"));
    }

    #[test]
    fn test_unknown_unit() {
        let err = exporter(DatabaseMetadata::new())
            .generate("other-unit", &ExportAction::Create)
            .unwrap_err();
        assert!(matches!(err, ExportError::UnitNotFound(name) if name == "other-unit"));
    }
}
