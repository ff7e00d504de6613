//! Ontology catalog: logical object types, link types, and their physical
//! datasource mappings.
//!
//! The catalog is the schema-metadata surface consumed by the rest of the
//! pipeline (`object_type` / `link_type` lookups). It is loaded once from a
//! YAML or JSON definition and validated before any query touches it.

use std::collections::HashMap;

pub mod catalog_config;
pub mod errors;
pub mod field_path;
pub mod schema;

pub use catalog_config::CatalogConfig;
pub use errors::{CatalogError, FieldPathError};
pub use field_path::FieldPath;
pub use schema::{
    Cardinality, DataSourceMapping, LinkDataSourceMapping, LinkDirection, LinkType, ObjectType,
    Property, PropertyType,
};

/// In-memory schema metadata: all known object types and link types.
#[derive(Debug, Clone, Default)]
pub struct OntologyCatalog {
    objects: HashMap<String, ObjectType>,
    links: HashMap<String, LinkType>,
}

impl OntologyCatalog {
    pub fn new(objects: HashMap<String, ObjectType>, links: HashMap<String, LinkType>) -> Self {
        OntologyCatalog { objects, links }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        CatalogConfig::from_yaml_str(yaml)?.into_catalog()
    }

    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, CatalogError> {
        CatalogConfig::from_yaml_file(path)?.into_catalog()
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        self.objects.get(name)
    }

    pub fn link_type(&self, name: &str) -> Option<&LinkType> {
        self.links.get(name)
    }

    pub fn object_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Structural validation: every link endpoint must name a known object.
    ///
    /// Mapping-level checks (partial datasources, undeclared mapped
    /// properties) already ran while the config was converted.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for link in self.links.values() {
            for endpoint in [&link.from_object, &link.to_object] {
                if !self.objects.contains_key(endpoint) {
                    return Err(CatalogError::InvalidLinkEndpoint {
                        link: link.name.clone(),
                        object: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
