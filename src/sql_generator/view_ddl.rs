//! Federation view generation.
//!
//! For federated execution every touched object and link type gets one view
//! in the shared virtual namespace, named after the *logical* type and
//! selecting only mapped columns with `physical_column AS logical_property`
//! aliasing. This is the single place physical-to-logical name translation
//! happens on the federated path.

use crate::ontology_catalog::{LinkType, ObjectType};

use super::dialect::Dialect;
use super::errors::SqlGeneratorError;

/// View over an object type's physical table, exposing `id` plus the
/// declared properties under their logical names.
pub fn object_view_sql(
    object: &ObjectType,
    mount_alias: &str,
    dialect: Dialect,
) -> Result<String, SqlGeneratorError> {
    let mapping = object
        .datasource
        .as_ref()
        .ok_or_else(|| SqlGeneratorError::MappingNotConfigured {
            type_name: object.name.clone(),
        })?;

    let mut columns = vec![format!(
        "{} AS id",
        dialect.identifier(&mapping.id_column)
    )];
    for property in &object.properties {
        columns.push(format!(
            "{} AS {}",
            dialect.identifier(mapping.column_for(&property.name)),
            dialect.identifier(&property.name)
        ));
    }

    Ok(format!(
        "CREATE VIEW {} AS SELECT {} FROM {}.{}",
        dialect.identifier(&object.name),
        columns.join(", "),
        mount_alias,
        dialect.identifier(&mapping.table_name)
    ))
}

/// View over a link type's intermediate table, exposing `source_id`,
/// `target_id`, and any link-table attributes under their logical names.
pub fn link_view_sql(
    link: &LinkType,
    mount_alias: &str,
    dialect: Dialect,
) -> Result<String, SqlGeneratorError> {
    let mapping = link
        .datasource
        .as_ref()
        .ok_or_else(|| SqlGeneratorError::MappingNotConfigured {
            type_name: link.name.clone(),
        })?;

    let mut columns = vec![
        format!(
            "{} AS source_id",
            dialect.identifier(&mapping.from_column)
        ),
        format!("{} AS target_id", dialect.identifier(&mapping.to_column)),
    ];
    for property in &link.properties {
        columns.push(format!(
            "{} AS {}",
            dialect.identifier(mapping.column_for(&property.name)),
            dialect.identifier(&property.name)
        ));
    }

    Ok(format!(
        "CREATE VIEW {} AS SELECT {} FROM {}.{}",
        dialect.identifier(&link.name),
        columns.join(", "),
        mount_alias,
        dialect.identifier(&mapping.table_name)
    ))
}
