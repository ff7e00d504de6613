use thiserror::Error;

use crate::ontology_catalog::FieldPathError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryModelError {
    #[error("Failed to parse query: {message}")]
    Parse { message: String },
    #[error("No object type found for `{name}`")]
    UnknownObject { name: String },
    #[error("Unsupported filter operator `{operator}`")]
    InvalidOperator { operator: String },
    #[error("Unsupported aggregate function `{function}`")]
    InvalidAggregate { function: String },
    #[error("Unsupported sort direction `{direction}` (expected ASC or DESC)")]
    InvalidDirection { direction: String },
    #[error("Malformed filter condition: {detail}")]
    FilterArity { detail: String },
    #[error("Malformed metric: {detail}")]
    MetricArity { detail: String },
    #[error("{field} must be non-negative, got {value}")]
    NegativePaging { field: String, value: i64 },
    #[error("Traversal `{link}` declares target `{declared}` but resolves to `{resolved}`")]
    TraversalTargetMismatch {
        link: String,
        declared: String,
        resolved: String,
    },
    #[error("Query exceeds the maximum link traversal depth of {max}")]
    TraversalDepthExceeded { max: u32 },
    #[error(transparent)]
    FieldPath(#[from] FieldPathError),
}
