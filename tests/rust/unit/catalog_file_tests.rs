//! Catalog loading from files.

use std::io::Write;

use ontoql::ontology_catalog::{CatalogError, OntologyCatalog};

const CATALOG_YAML: &str = r#"
objects:
  Vehicle:
    properties: [plate, owner]
    datasource:
      database: db_a
      table: vehicles
      id_column: vehicle_id
      columns:
        plate: plate_no
  Media:
    properties: [code]
    datasource:
      database: db_b
      table: media
      id_column: media_id
links:
  hasMedia:
    from: Vehicle
    to: Media
    cardinality: one_to_many
    datasource:
      database: db_a
      table: vehicle_media
      from_column: vehicle_id
      to_column: media_id
"#;

#[test]
fn catalog_loads_from_a_yaml_file() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(CATALOG_YAML.as_bytes())?;

    let catalog = OntologyCatalog::from_yaml_file(file.path())?;
    assert!(catalog.object_type("Vehicle").is_some());
    assert!(catalog.object_type("Media").is_some());
    assert!(catalog.link_type("hasMedia").is_some());

    let mapping = catalog
        .object_type("Vehicle")
        .unwrap()
        .datasource
        .as_ref()
        .unwrap();
    assert_eq!(mapping.database, "db_a");
    assert_eq!(mapping.column_for("plate"), "plate_no");
    Ok(())
}

#[test]
fn missing_file_reports_a_read_error() {
    let result = OntologyCatalog::from_yaml_file("/no/such/catalog.yaml");
    assert!(matches!(result, Err(CatalogError::ConfigReadError { .. })));
}

#[test]
fn malformed_yaml_reports_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"objects: [not, a, map]").unwrap();
    let result = OntologyCatalog::from_yaml_file(file.path());
    assert!(matches!(result, Err(CatalogError::ConfigParseError { .. })));
}
