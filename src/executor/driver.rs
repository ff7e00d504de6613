//! Physical database driver abstraction.
//!
//! Drivers are external collaborators: the engine only needs to open a
//! connection by database identifier, run statements, and (for federation)
//! obtain a virtual connection that can mount several physical databases
//! under aliases (`ATTACH DATABASE … AS alias`) and resolve views across
//! them. Connections are opened per request and closed before the request
//! returns; the engine does no pooling of its own.

use async_trait::async_trait;
use serde_json::Value;

use crate::sql_generator::Dialect;

use super::errors::DriverError;

/// Rows returned by one statement, column-major metadata plus row-major
/// values in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        ResultSet { columns, rows }
    }
}

/// A live handle to one physical database, or to the shared virtual
/// namespace spanning mounted databases.
#[async_trait]
pub trait Connection: Send {
    /// Run a statement returning rows
    async fn query(&mut self, sql: &str) -> Result<ResultSet, DriverError>;

    /// Run a utility statement (ATTACH/DETACH, CREATE/DROP VIEW)
    async fn execute(&mut self, sql: &str) -> Result<(), DriverError>;

    /// Release the underlying handle
    async fn close(&mut self) -> Result<(), DriverError>;
}

#[async_trait]
pub trait Driver: Send + Sync {
    /// Open a connection to one physical database by identifier
    async fn connect(&self, database: &str) -> Result<Box<dyn Connection>, DriverError>;

    /// Open a connection to the virtual namespace used for federated
    /// execution
    async fn connect_virtual(&self) -> Result<Box<dyn Connection>, DriverError>;

    /// Dialect of one physical database, when the driver knows it; the
    /// engine falls back to its configured default otherwise
    fn dialect(&self, database: &str) -> Option<Dialect>;

    /// Dialect of the virtual federation surface
    fn virtual_dialect(&self) -> Option<Dialect> {
        None
    }
}
