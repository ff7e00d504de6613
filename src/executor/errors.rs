use thiserror::Error;

use crate::query_model::QueryModelError;
use crate::query_planner::PlanBuilderError;
use crate::sql_generator::SqlGeneratorError;

/// Errors surfaced by physical database drivers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DriverError {
    #[error("Failed to connect to database `{database}`: {message}")]
    Connect { database: String, message: String },
    #[error("Statement failed: {message}")]
    Statement { message: String },
}

/// Errors from the execution layer. Driver failures carry the emitted SQL
/// for diagnosis; compilation-time failures pass through unchanged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExecuteError {
    #[error(transparent)]
    Validation(#[from] QueryModelError),
    #[error(transparent)]
    Plan(#[from] PlanBuilderError),
    #[error(transparent)]
    Sql(#[from] SqlGeneratorError),
    #[error("Root object `{object}` has no datasource database configured")]
    NoDatabase { object: String },
    #[error("Query touches multiple databases but federation is disabled by configuration")]
    FederationDisabled,
    #[error("{source}\n  While executing: {sql}")]
    Driver { source: DriverError, sql: String },
}

impl ExecuteError {
    pub fn driver(source: DriverError, sql: impl Into<String>) -> Self {
        ExecuteError::Driver {
            source,
            sql: sql.into(),
        }
    }
}
