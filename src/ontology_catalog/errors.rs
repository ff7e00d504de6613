//! Error types for ontology catalog loading, validation, and field path
//! resolution.
//!
//! Catalog errors surface configuration problems at load time; field path
//! errors carry the resolution taxonomy used to reject queries before plan
//! construction.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("No object type found for `{name}`")]
    UnknownObject { name: String },
    #[error("No link type found for `{name}`")]
    UnknownLink { name: String },
    #[error("Link `{link}` references unknown object type `{object}`")]
    InvalidLinkEndpoint { link: String, object: String },
    #[error("Column mapping on `{type_name}` names undeclared property `{property}`")]
    UnmappedProperty { type_name: String, property: String },
    #[error("Datasource mapping on `{type_name}` is partially configured: {detail}")]
    PartialMapping { type_name: String, detail: String },
    #[error("Duplicate property `{property}` declared on `{type_name}`")]
    DuplicateProperty { type_name: String, property: String },
    #[error("Failed to read catalog file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse catalog: {error}")]
    ConfigParseError { error: String },
}

/// Field path resolution failures, one variant per rejection reason.
///
/// Every variant names the offending path segment so callers can report
/// which part of the query failed without re-deriving context.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FieldPathError {
    #[error("Object type `{object}` has no property `{property}`")]
    UnknownField { object: String, property: String },
    #[error("`{segment}` does not name a declared link traversal")]
    UnknownTraversal { segment: String },
    #[error("Traversal `{link}` does not name a known link type")]
    UnknownLink { link: String },
    #[error("Directed link `{link}` cannot be traversed from `{object}` (not its source side)")]
    DirectionViolation { link: String, object: String },
    #[error("Link `{link}` connects neither side to object type `{object}`")]
    DisconnectedLink { link: String, object: String },
}
