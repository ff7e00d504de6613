//! A scripted driver standing in for physical databases.
//!
//! Tests register `(substring, response)` pairs; any executed query whose
//! SQL contains the substring gets the canned result set. Every statement
//! is recorded so tests can assert the exact mount/view/teardown traffic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ontoql::executor::{Connection, Driver, DriverError, ResultSet};
use ontoql::sql_generator::Dialect;
use serde_json::Value;

#[derive(Default)]
struct Inner {
    responses: Vec<(String, Result<ResultSet, String>)>,
    dialects: HashMap<String, Dialect>,
    virtual_dialect: Option<Dialect>,
    statements: Vec<String>,
    queries: Vec<String>,
    connected: Vec<String>,
    virtual_connections: usize,
    closed: usize,
}

#[derive(Default, Clone)]
pub struct ScriptedDriver {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to any query whose SQL contains `needle`
    pub fn respond(&self, needle: &str, columns: &[&str], rows: Vec<Vec<Value>>) {
        let result = ResultSet::new(columns.iter().map(|c| c.to_string()).collect(), rows);
        self.inner
            .lock()
            .unwrap()
            .responses
            .push((needle.to_string(), Ok(result)));
    }

    /// Fail any query whose SQL contains `needle`
    pub fn fail(&self, needle: &str, message: &str) {
        self.inner
            .lock()
            .unwrap()
            .responses
            .push((needle.to_string(), Err(message.to_string())));
    }

    pub fn set_dialect(&self, database: &str, dialect: Dialect) {
        self.inner
            .lock()
            .unwrap()
            .dialects
            .insert(database.to_string(), dialect);
    }

    pub fn set_virtual_dialect(&self, dialect: Dialect) {
        self.inner.lock().unwrap().virtual_dialect = Some(dialect);
    }

    pub fn statements(&self) -> Vec<String> {
        self.inner.lock().unwrap().statements.clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.inner.lock().unwrap().queries.clone()
    }

    pub fn connected(&self) -> Vec<String> {
        self.inner.lock().unwrap().connected.clone()
    }

    pub fn virtual_connections(&self) -> usize {
        self.inner.lock().unwrap().virtual_connections
    }

    pub fn closed(&self) -> usize {
        self.inner.lock().unwrap().closed
    }
}

#[async_trait]
impl Driver for ScriptedDriver {
    async fn connect(&self, database: &str) -> Result<Box<dyn Connection>, DriverError> {
        let mut inner = self.inner.lock().unwrap();
        inner.connected.push(database.to_string());
        Ok(Box::new(ScriptedConnection {
            inner: self.inner.clone(),
        }))
    }

    async fn connect_virtual(&self) -> Result<Box<dyn Connection>, DriverError> {
        let mut inner = self.inner.lock().unwrap();
        inner.virtual_connections += 1;
        Ok(Box::new(ScriptedConnection {
            inner: self.inner.clone(),
        }))
    }

    fn dialect(&self, database: &str) -> Option<Dialect> {
        self.inner.lock().unwrap().dialects.get(database).copied()
    }

    fn virtual_dialect(&self) -> Option<Dialect> {
        self.inner.lock().unwrap().virtual_dialect
    }
}

struct ScriptedConnection {
    inner: Arc<Mutex<Inner>>,
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn query(&mut self, sql: &str) -> Result<ResultSet, DriverError> {
        let mut inner = self.inner.lock().unwrap();
        inner.queries.push(sql.to_string());
        for (needle, response) in &inner.responses {
            if sql.contains(needle.as_str()) {
                return match response {
                    Ok(result) => Ok(result.clone()),
                    Err(message) => Err(DriverError::Statement {
                        message: message.clone(),
                    }),
                };
            }
        }
        Ok(ResultSet::default())
    }

    async fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        self.inner.lock().unwrap().statements.push(sql.to_string());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.inner.lock().unwrap().closed += 1;
        Ok(())
    }
}
