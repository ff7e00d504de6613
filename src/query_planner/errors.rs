use thiserror::Error;

use crate::ontology_catalog::FieldPathError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanBuilderError {
    #[error("No object type found for `{name}`")]
    UnknownObject { name: String },
    #[error("No link type found for `{link}`")]
    UnknownLink { link: String },
    #[error("`{type_name}` has no configured datasource mapping; refusing to build a plan for it")]
    MappingNotConfigured { type_name: String },
    #[error("Filter field `{field}` does not resolve against the row shape")]
    UnresolvedFilterField { field: String },
    #[error("Group-by field `{field}` does not resolve against the row shape")]
    UnresolvedGroupByField { field: String },
    #[error("Aggregate field `{field}` does not resolve against the row shape")]
    UnresolvedMetricField { field: String },
    #[error("Order-by field `{field}` does not resolve against the projected row shape")]
    UnresolvedSortField { field: String },
    #[error(transparent)]
    FieldPath(#[from] FieldPathError),
}
