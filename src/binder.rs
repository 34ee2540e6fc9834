//! Binds a persistence unit's entity mappings to tables.
//!
//! Column order within a table is fixed: id columns first, then the remaining
//! properties, each group sorted by property name. Declaration order in the
//! descriptor therefore never changes the generated DDL.

use crate::audit;
use crate::descriptor::{EntityMapping, PersistenceUnit, PropertyMapping};
use crate::error::ExportError;
use crate::naming::foreign_key_name;
use crate::schema::{Column, ColumnType, ForeignKey, Schema, Table};
use std::collections::HashSet;

/// An entity after binding, with the column groups audit derivation needs
#[derive(Debug, Clone)]
pub struct BoundEntity {
    pub entity: String,
    pub audited: bool,
    pub table: Table,
    pub id_columns: Vec<Column>,
    /// Non-id columns of audited properties, in table order
    pub audited_columns: Vec<Column>,
    pub foreign_keys: Vec<ForeignKey>,
}

/// Bind every entity of `unit` and derive its audit tables
pub fn bind_unit(unit: &PersistenceUnit) -> Result<Schema, ExportError> {
    let entities = bind_entities(unit)?;

    let mut schema = Schema::default();
    for bound in &entities {
        schema.tables.push(bound.table.clone());
        schema.foreign_keys.extend(bound.foreign_keys.iter().cloned());
    }
    audit::derive_audit_tables(unit, &entities, &mut schema)?;

    let mut seen = HashSet::new();
    for table in &schema.tables {
        if !seen.insert(table.name.to_lowercase()) {
            return Err(ExportError::invalid_mapping(
                &unit.name,
                format!("table '{}' is mapped more than once", table.name),
            ));
        }
    }

    log::debug!(
        "Bound unit '{}': {} table(s), {} foreign key(s)",
        unit.name,
        schema.tables.len(),
        schema.foreign_keys.len()
    );
    Ok(schema)
}

pub fn bind_entities(unit: &PersistenceUnit) -> Result<Vec<BoundEntity>, ExportError> {
    unit.entities
        .iter()
        .map(|entity| bind_entity(unit, entity))
        .collect()
}

fn bind_entity(unit: &PersistenceUnit, entity: &EntityMapping) -> Result<BoundEntity, ExportError> {
    let table_name = entity.table_name();

    let mut ids: Vec<&PropertyMapping> = entity.properties.iter().filter(|p| p.id).collect();
    let mut others: Vec<&PropertyMapping> = entity.properties.iter().filter(|p| !p.id).collect();
    if ids.is_empty() {
        return Err(ExportError::invalid_mapping(
            &unit.name,
            format!("entity '{}' has no id property", entity.name),
        ));
    }
    ids.sort_by(|a, b| a.name.cmp(&b.name));
    others.sort_by(|a, b| a.name.cmp(&b.name));

    let mut table = Table::new(table_name);
    let mut id_columns = Vec::new();
    let mut audited_columns = Vec::new();
    let mut foreign_keys = Vec::new();
    let mut names = HashSet::new();

    for property in ids.iter().chain(others.iter()) {
        let column_type = resolve_type(unit, entity, property)?;
        let mut column = Column::new(property.column_name(), column_type);
        if property.id || !property.nullable {
            column = column.not_null();
        }
        if !names.insert(column.name.to_lowercase()) {
            return Err(ExportError::invalid_mapping(
                &unit.name,
                format!("column '{}' is mapped twice in '{}'", column.name, table_name),
            ));
        }

        if let Some(target) = &property.references {
            let referenced = find_entity(unit, entity, target)?;
            let columns = vec![column.name.clone()];
            foreign_keys.push(ForeignKey {
                name: foreign_key_name(table_name, &columns),
                table: table_name.to_string(),
                columns,
                referenced_table: referenced.table_name().to_string(),
            });
        }

        if property.id {
            id_columns.push(column.clone());
            table.primary_key.push(column.name.clone());
        } else if property.audited {
            audited_columns.push(column.clone());
        }
        table.columns.push(column);
    }

    Ok(BoundEntity {
        entity: entity.name.clone(),
        audited: entity.audited,
        table,
        id_columns,
        audited_columns,
        foreign_keys,
    })
}

fn resolve_type(
    unit: &PersistenceUnit,
    entity: &EntityMapping,
    property: &PropertyMapping,
) -> Result<ColumnType, ExportError> {
    if let Some(target) = &property.references {
        // a join column takes the type of the referenced primary key
        let referenced = find_entity(unit, entity, target)?;
        let mut target_ids = referenced.properties.iter().filter(|p| p.id);
        return match (target_ids.next(), target_ids.next()) {
            (Some(id), None) if id.references.is_none() => resolve_type(unit, referenced, id),
            _ => Err(ExportError::invalid_mapping(
                &unit.name,
                format!(
                    "'{}.{}' must reference an entity with a single basic id",
                    entity.name, property.name
                ),
            )),
        };
    }

    property
        .kind
        .map(|kind| ColumnType::from_property(kind, property.length, property.precision, property.scale))
        .ok_or_else(|| {
            ExportError::invalid_mapping(
                &unit.name,
                format!("property '{}.{}' has no type", entity.name, property.name),
            )
        })
}

fn find_entity<'a>(
    unit: &'a PersistenceUnit,
    from: &EntityMapping,
    name: &str,
) -> Result<&'a EntityMapping, ExportError> {
    unit.entities.iter().find(|e| e.name == name).ok_or_else(|| {
        ExportError::invalid_mapping(
            &unit.name,
            format!("entity '{}' references unknown entity '{}'", from.name, name),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PersistenceDescriptor;

    fn unit(content: &str) -> PersistenceUnit {
        PersistenceDescriptor::from_toml_str(content, "test")
            .unwrap()
            .units
            .remove(0)
    }

    const SHOP: &str = r#"
[[unit]]
name = "shop"

[[unit.entity]]
name = "Customer"

[[unit.entity.property]]
name = "name"
type = "string"
nullable = false

[[unit.entity.property]]
name = "id"
type = "bigint"
id = true

[[unit.entity.property]]
name = "email"
type = "string"
length = 120

[[unit.entity]]
name = "Order"
table = "orders"

[[unit.entity.property]]
name = "id"
type = "integer"
id = true

[[unit.entity.property]]
name = "customer"
column = "customer_id"
references = "Customer"
"#;

    #[test]
    fn test_columns_are_ordered_ids_first_then_by_name() {
        let schema = bind_unit(&unit(SHOP)).unwrap();
        let customer = schema.table("Customer").unwrap();
        let names: Vec<&str> = customer.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "name"]);
        assert_eq!(customer.primary_key, vec!["id"]);
        assert!(!customer.column("id").unwrap().nullable);
        assert!(customer.column("email").unwrap().nullable);
        assert!(!customer.column("name").unwrap().nullable);
        assert_eq!(customer.column("email").unwrap().column_type, ColumnType::Varchar(120));
    }

    #[test]
    fn test_reference_takes_target_id_type_and_adds_foreign_key() {
        let schema = bind_unit(&unit(SHOP)).unwrap();
        let orders = schema.table("orders").unwrap();
        assert_eq!(orders.column("customer_id").unwrap().column_type, ColumnType::BigInt);

        assert_eq!(schema.foreign_keys.len(), 1);
        let fk = &schema.foreign_keys[0];
        assert_eq!(fk.table, "orders");
        assert_eq!(fk.columns, vec!["customer_id"]);
        assert_eq!(fk.referenced_table, "Customer");
        assert_eq!(fk.name, foreign_key_name("orders", &["customer_id".to_string()]));
    }

    #[test]
    fn test_unaudited_unit_has_no_revision_table() {
        let schema = bind_unit(&unit(SHOP)).unwrap();
        assert_eq!(schema.tables.len(), 2);
        assert!(schema.sequences.is_empty());
    }

    #[test]
    fn test_entity_without_id_is_rejected() {
        let content = r#"
[[unit]]
name = "bad"

[[unit.entity]]
name = "Thing"

[[unit.entity.property]]
name = "label"
type = "string"
"#;
        let err = bind_unit(&unit(content)).unwrap_err();
        assert!(err.to_string().contains("has no id property"));
    }

    #[test]
    fn test_unknown_reference_is_rejected() {
        let content = r#"
[[unit]]
name = "bad"

[[unit.entity]]
name = "Thing"

[[unit.entity.property]]
name = "id"
type = "integer"
id = true

[[unit.entity.property]]
name = "owner"
references = "Person"
"#;
        let err = bind_unit(&unit(content)).unwrap_err();
        assert!(err.to_string().contains("unknown entity 'Person'"));
    }

    #[test]
    fn test_missing_type_is_rejected() {
        let content = r#"
[[unit]]
name = "bad"

[[unit.entity]]
name = "Thing"

[[unit.entity.property]]
name = "id"
id = true
"#;
        let err = bind_unit(&unit(content)).unwrap_err();
        assert!(err.to_string().contains("has no type"));
    }
}
