//! The public query entry point.
//!
//! `QueryEngine` owns the catalog and a driver, validates incoming query
//! models, routes them, and dispatches to single-source or federated
//! execution. Every outcome carries the emitted SQL for observability.

use serde_json::Value;

use crate::config::{ConfigError, EngineConfig};
use crate::ontology_catalog::OntologyCatalog;
use crate::query_model::{validate, QueryModel};
use crate::sql_generator::Dialect;

use super::driver::Driver;
use super::errors::ExecuteError;
use super::federated::execute_federated;
use super::router::{route, Route};
use super::single::execute_single;
use super::QueryOutcome;

pub struct QueryEngine<D: Driver> {
    catalog: OntologyCatalog,
    driver: D,
    config: EngineConfig,
    fallback_dialect: Dialect,
}

impl<D: Driver> QueryEngine<D> {
    pub fn new(catalog: OntologyCatalog, driver: D) -> Self {
        Self::with_config(catalog, driver, EngineConfig::default())
            .expect("default configuration is valid")
    }

    pub fn with_config(
        catalog: OntologyCatalog,
        driver: D,
        config: EngineConfig,
    ) -> Result<Self, ConfigError> {
        let fallback_dialect = Dialect::from_name(&config.default_dialect)
            .ok_or_else(|| ConfigError::UnknownDialect(config.default_dialect.clone()))?;
        Ok(QueryEngine {
            catalog,
            driver,
            config,
            fallback_dialect,
        })
    }

    pub fn catalog(&self) -> &OntologyCatalog {
        &self.catalog
    }

    /// Execute one validated query model end to end.
    pub async fn execute_query(&self, query: &QueryModel) -> Result<QueryOutcome, ExecuteError> {
        validate(query, &self.catalog, self.config.max_traversal_depth)?;

        if query.use_cache {
            // Advisory hint from consumers; caching lives outside this core
            log::debug!("use_cache hint received; not enforced by the query engine");
        }

        match route(query, &self.catalog) {
            Route::SingleSource => {
                execute_single(query, &self.catalog, &self.driver, self.fallback_dialect).await
            }
            Route::Federated => {
                if !self.config.federation_enabled {
                    return Err(ExecuteError::FederationDisabled);
                }
                execute_federated(query, &self.catalog, &self.driver, self.fallback_dialect).await
            }
        }
    }

    /// Parse the JSON wire format and execute.
    pub async fn execute_json(&self, value: Value) -> Result<QueryOutcome, ExecuteError> {
        let query = QueryModel::from_json_value(value)?;
        self.execute_query(&query).await
    }
}
