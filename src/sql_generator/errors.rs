use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SqlGeneratorError {
    #[error("Plan shape not supported by the SQL generator: {detail}")]
    UnsupportedPlanShape { detail: String },
    #[error("Cannot encode string literal for the target dialect: {detail}")]
    UnencodableLiteral { detail: String },
    #[error("Value cannot be rendered as a SQL literal: {detail}")]
    InvalidLiteral { detail: String },
    #[error("`{type_name}` has no configured datasource mapping; cannot generate a view for it")]
    MappingNotConfigured { type_name: String },
}
