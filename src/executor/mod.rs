//! Query execution: routing, the driver abstraction, and the single-source
//! and federated runners behind `QueryEngine::execute_query`.

use serde_json::Value;

pub mod driver;
pub mod engine;
pub mod errors;
pub mod federated;
pub mod router;
pub mod single;
mod touched;

pub use driver::{Connection, Driver, ResultSet};
pub use engine::QueryEngine;
pub use errors::{DriverError, ExecuteError};
pub use router::{route, Route};

/// The result surfaced to consumers: rows keyed by logical column name (in
/// projection order), the ordered column list, and the emitted SQL text.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub rows: Vec<serde_json::Map<String, Value>>,
    pub columns: Vec<String>,
    pub sql: String,
}

/// Pair row values with column names, preserving column order.
pub(crate) fn rows_to_maps(
    columns: &[String],
    rows: Vec<Vec<Value>>,
) -> Vec<serde_json::Map<String, Value>> {
    rows.into_iter()
        .map(|row| {
            columns
                .iter()
                .cloned()
                .zip(row.into_iter())
                .collect::<serde_json::Map<String, Value>>()
        })
        .collect()
}
