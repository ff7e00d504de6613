//! Ontology catalog configuration management.
//!
//! Handles loading and validation of catalog definitions from YAML or JSON
//! files. The catalog is defined with the following structure:
//!
//! ```yaml
//! objects:
//!   Vehicle:
//!     properties: [plate, owner, {name: weight, type: float}]
//!     datasource:
//!       database: db_a
//!       table: vehicles
//!       id_column: vehicle_id
//!       columns:
//!         plate: plate_no
//!         owner: owner_name
//! links:
//!   hasMedia:
//!     from: Vehicle
//!     to: Media
//!     direction: directed          # or undirected
//!     cardinality: one_to_many
//!     properties: [linkedAt]
//!     datasource:
//!       database: db_a
//!       table: vehicle_media
//!       from_column: vehicle_id
//!       to_column: media_id
//! ```
//!
//! Property-to-column maps may only name declared properties; a datasource
//! block missing its table or id columns is rejected at load time rather
//! than left to fail during query compilation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::errors::CatalogError;
use super::schema::{
    Cardinality, DataSourceMapping, LinkDataSourceMapping, LinkDirection, LinkType, ObjectType,
    Property, PropertyType,
};
use super::OntologyCatalog;

/// Property declaration: either a bare name or a `{name, type}` pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyConfig {
    Name(String),
    Typed {
        name: String,
        #[serde(rename = "type")]
        data_type: PropertyType,
    },
}

impl PropertyConfig {
    fn into_property(self) -> Property {
        match self {
            PropertyConfig::Name(name) => Property::new(name, PropertyType::String),
            PropertyConfig::Typed { name, data_type } => Property::new(name, data_type),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDataSourceConfig {
    pub database: String,
    pub table: String,
    pub id_column: String,
    #[serde(default)]
    pub columns: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDataSourceConfig {
    pub database: String,
    pub table: String,
    pub from_column: String,
    pub to_column: String,
    #[serde(default)]
    pub columns: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectConfig {
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
    pub datasource: Option<ObjectDataSourceConfig>,
}

fn default_direction() -> LinkDirection {
    LinkDirection::Directed
}

fn default_cardinality() -> Cardinality {
    Cardinality::ManyToMany
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub from: String,
    pub to: String,
    #[serde(default = "default_direction")]
    pub direction: LinkDirection,
    #[serde(default = "default_cardinality")]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
    pub datasource: Option<LinkDataSourceConfig>,
}

/// Root of a catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub objects: HashMap<String, ObjectConfig>,
    #[serde(default)]
    pub links: HashMap<String, LinkConfig>,
}

impl CatalogConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|e| CatalogError::ConfigReadError {
            error: e.to_string(),
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(json).map_err(|e| CatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Build the validated in-memory catalog
    pub fn into_catalog(self) -> Result<OntologyCatalog, CatalogError> {
        let mut objects = HashMap::new();
        for (name, config) in self.objects {
            let object = build_object_type(&name, config)?;
            objects.insert(name, object);
        }

        let mut links = HashMap::new();
        for (name, config) in self.links {
            let link = build_link_type(&name, config)?;
            links.insert(name, link);
        }

        let catalog = OntologyCatalog::new(objects, links);
        catalog.validate()?;
        Ok(catalog)
    }
}

fn build_properties(type_name: &str, configs: Vec<PropertyConfig>) -> Result<Vec<Property>, CatalogError> {
    let mut properties: Vec<Property> = Vec::with_capacity(configs.len());
    for config in configs {
        let property = config.into_property();
        if properties.iter().any(|p| p.name == property.name) {
            return Err(CatalogError::DuplicateProperty {
                type_name: type_name.to_string(),
                property: property.name,
            });
        }
        properties.push(property);
    }
    Ok(properties)
}

fn build_object_type(name: &str, config: ObjectConfig) -> Result<ObjectType, CatalogError> {
    let properties = build_properties(name, config.properties)?;

    let datasource = match config.datasource {
        Some(ds) => {
            if ds.table.trim().is_empty() || ds.id_column.trim().is_empty() {
                return Err(CatalogError::PartialMapping {
                    type_name: name.to_string(),
                    detail: "table and id_column must both be set".to_string(),
                });
            }
            check_mapped_properties(name, &properties, &ds.columns)?;
            Some(DataSourceMapping {
                database: ds.database,
                table_name: ds.table,
                id_column: ds.id_column,
                columns: ds.columns,
            })
        }
        None => None,
    };

    Ok(ObjectType {
        name: name.to_string(),
        properties,
        datasource,
    })
}

fn build_link_type(name: &str, config: LinkConfig) -> Result<LinkType, CatalogError> {
    let properties = build_properties(name, config.properties)?;

    let datasource = match config.datasource {
        Some(ds) => {
            if ds.table.trim().is_empty()
                || ds.from_column.trim().is_empty()
                || ds.to_column.trim().is_empty()
            {
                return Err(CatalogError::PartialMapping {
                    type_name: name.to_string(),
                    detail: "table, from_column and to_column must all be set".to_string(),
                });
            }
            check_mapped_properties(name, &properties, &ds.columns)?;
            Some(LinkDataSourceMapping {
                database: ds.database,
                table_name: ds.table,
                from_column: ds.from_column,
                to_column: ds.to_column,
                columns: ds.columns,
            })
        }
        None => None,
    };

    Ok(LinkType {
        name: name.to_string(),
        from_object: config.from,
        to_object: config.to,
        direction: config.direction,
        cardinality: config.cardinality,
        properties,
        datasource,
    })
}

fn check_mapped_properties(
    type_name: &str,
    properties: &[Property],
    columns: &HashMap<String, String>,
) -> Result<(), CatalogError> {
    for mapped in columns.keys() {
        if !properties.iter().any(|p| &p.name == mapped) {
            return Err(CatalogError::UnmappedProperty {
                type_name: type_name.to_string(),
                property: mapped.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_CATALOG: &str = r#"
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
    fn basic_catalog_loads() {
        let catalog = CatalogConfig::from_yaml_str(BASIC_CATALOG)
            .unwrap()
            .into_catalog()
            .unwrap();
        let vehicle = catalog.object_type("Vehicle").unwrap();
        assert_eq!(vehicle.properties.len(), 2);
        let mapping = vehicle.datasource.as_ref().unwrap();
        assert_eq!(mapping.column_for("plate"), "plate_no");
        assert_eq!(mapping.column_for("owner"), "owner");
        assert_eq!(mapping.logical_for("plate_no"), Some("plate"));

        let link = catalog.link_type("hasMedia").unwrap();
        assert_eq!(link.from_object, "Vehicle");
        assert!(link.is_directed());
    }

    #[test]
    fn partial_mapping_is_rejected() {
        let yaml = r#"
objects:
  Vehicle:
    properties: [plate]
    datasource:
      database: db_a
      table: ""
      id_column: vehicle_id
"#;
        let result = CatalogConfig::from_yaml_str(yaml).unwrap().into_catalog();
        assert!(matches!(result, Err(CatalogError::PartialMapping { .. })));
    }

    #[test]
    fn column_map_must_name_declared_properties() {
        let yaml = r#"
objects:
  Vehicle:
    properties: [plate]
    datasource:
      database: db_a
      table: vehicles
      id_column: vehicle_id
      columns:
        color: color_code
"#;
        let result = CatalogConfig::from_yaml_str(yaml).unwrap().into_catalog();
        assert!(matches!(
            result,
            Err(CatalogError::UnmappedProperty { .. })
        ));
    }

    #[test]
    fn link_endpoints_must_exist() {
        let yaml = r#"
objects:
  Vehicle:
    properties: [plate]
links:
  hasMedia:
    from: Vehicle
    to: Missing
"#;
        let result = CatalogConfig::from_yaml_str(yaml).unwrap().into_catalog();
        assert!(matches!(
            result,
            Err(CatalogError::InvalidLinkEndpoint { .. })
        ));
    }

    #[test]
    fn typed_properties_parse() {
        let yaml = r#"
objects:
  TollRecord:
    properties:
      - station
      - name: amount
        type: float
"#;
        let catalog = CatalogConfig::from_yaml_str(yaml)
            .unwrap()
            .into_catalog()
            .unwrap();
        let record = catalog.object_type("TollRecord").unwrap();
        assert_eq!(record.property("amount").unwrap().data_type, PropertyType::Float);
        assert_eq!(
            record.property("station").unwrap().data_type,
            PropertyType::String
        );
    }
}
