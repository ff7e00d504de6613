use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared value type of a property. Used to type plan row shapes; the
/// physical column type is owned by the underlying database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    /// Internal default for columns with no declared type (id columns);
    /// never written in catalog files
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub data_type: PropertyType,
}

impl Property {
    pub fn new(name: impl Into<String>, data_type: PropertyType) -> Self {
        Property {
            name: name.into(),
            data_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    Directed,
    Undirected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// Physical binding of an object type: which database/table it lives in,
/// its id column, and the property-to-column map.
///
/// A mapping is either fully configured (table + id column present) or
/// absent on the owning type; the catalog loader rejects partial mappings
/// so the planner never scans wrong columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceMapping {
    pub database: String,
    pub table_name: String,
    pub id_column: String,
    /// Logical property name -> physical column name.
    /// Properties absent from the map use their own name as the column.
    pub columns: HashMap<String, String>,
}

impl DataSourceMapping {
    /// Physical column backing a logical property
    pub fn column_for<'a>(&'a self, property: &'a str) -> &'a str {
        self.columns
            .get(property)
            .map(String::as_str)
            .unwrap_or(property)
    }

    /// Reverse lookup: logical property name for a physical column, if mapped
    pub fn logical_for(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, physical)| physical.as_str() == column)
            .map(|(logical, _)| logical.as_str())
    }
}

/// Physical binding of a link type's intermediate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDataSourceMapping {
    pub database: String,
    pub table_name: String,
    /// Column holding the source object's id
    pub from_column: String,
    /// Column holding the target object's id
    pub to_column: String,
    pub columns: HashMap<String, String>,
}

impl LinkDataSourceMapping {
    pub fn column_for<'a>(&'a self, property: &'a str) -> &'a str {
        self.columns
            .get(property)
            .map(String::as_str)
            .unwrap_or(property)
    }
}

/// A logical table-like concept with named, typed properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    /// Declared order is significant: it fixes the row shape layout
    /// (id first, then properties in this order).
    pub properties: Vec<Property>,
    pub datasource: Option<DataSourceMapping>,
}

impl ObjectType {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }
}

/// A typed, optionally directed association between two object types,
/// possibly carrying its own properties via an intermediate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkType {
    pub name: String,
    pub from_object: String,
    pub to_object: String,
    pub direction: LinkDirection,
    pub cardinality: Cardinality,
    /// Attributes stored on the link table itself, not on either endpoint
    pub properties: Vec<Property>,
    pub datasource: Option<LinkDataSourceMapping>,
}

impl LinkType {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_directed(&self) -> bool {
        self.direction == LinkDirection::Directed
    }
}
