//! Audit table derivation.
//!
//! Every audited entity gets a shadow table keyed by its id plus the revision
//! number, holding a nullable copy of each audited property and the revision
//! type. All shadow tables reference one revision-info table.

use crate::binder::BoundEntity;
use crate::descriptor::{AuditSettings, PersistenceUnit};
use crate::dialect::REVISION_SEQUENCE;
use crate::error::ExportError;
use crate::naming::foreign_key_name;
use crate::schema::{Column, ColumnType, ForeignKey, Schema, Table};

pub fn audit_table_name(settings: &AuditSettings, table: &str) -> String {
    format!("{}{}{}", settings.table_prefix, table, settings.table_suffix)
}

/// Append the audit tables, their foreign keys and the revision-info table to `schema`
pub fn derive_audit_tables(
    unit: &PersistenceUnit,
    entities: &[BoundEntity],
    schema: &mut Schema,
) -> Result<(), ExportError> {
    let settings = &unit.audit;
    let audited: Vec<&BoundEntity> = entities.iter().filter(|e| e.audited).collect();
    if audited.is_empty() {
        return Ok(());
    }

    for entity in &audited {
        let table = audit_table(unit, entity)?;
        let columns = vec![settings.revision_field_name.clone()];
        schema.foreign_keys.push(ForeignKey {
            name: foreign_key_name(&table.name, &columns),
            table: table.name.clone(),
            columns,
            referenced_table: settings.revision_info_table.clone(),
        });
        schema.tables.push(table);
    }

    let dialect = unit.dialect.dialect();
    let revision = if dialect.identity_column_string().is_some() {
        Column::new(&settings.revision_field_name, ColumnType::Integer).identity()
    } else {
        schema.sequences.push(REVISION_SEQUENCE.to_string());
        Column::new(&settings.revision_field_name, ColumnType::Integer).not_null()
    };
    schema.tables.push(Table {
        name: settings.revision_info_table.clone(),
        columns: vec![
            revision,
            Column::new(&settings.revision_timestamp_field_name, ColumnType::BigInt),
        ],
        primary_key: vec![settings.revision_field_name.clone()],
    });

    log::debug!("Derived {} audit table(s) for unit '{}'", audited.len(), unit.name);
    Ok(())
}

fn audit_table(unit: &PersistenceUnit, entity: &BoundEntity) -> Result<Table, ExportError> {
    let settings = &unit.audit;
    let mut table = Table::new(audit_table_name(settings, &entity.table.name));

    for id in &entity.id_columns {
        table.columns.push(Column::new(&id.name, id.column_type).not_null());
        table.primary_key.push(id.name.clone());
    }
    table
        .columns
        .push(Column::new(&settings.revision_field_name, ColumnType::Integer).not_null());
    table.primary_key.push(settings.revision_field_name.clone());
    table
        .columns
        .push(Column::new(&settings.revision_type_field_name, ColumnType::TinyInt));

    for column in &entity.audited_columns {
        let clashes = column.name.eq_ignore_ascii_case(&settings.revision_field_name)
            || column.name.eq_ignore_ascii_case(&settings.revision_type_field_name);
        if clashes {
            return Err(ExportError::invalid_mapping(
                &unit.name,
                format!(
                    "column '{}' of audited entity '{}' clashes with a revision column",
                    column.name, entity.entity
                ),
            ));
        }
        table.columns.push(Column::new(&column.name, column.column_type));
    }
    Ok(table)
}
