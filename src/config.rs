use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unknown SQL dialect: {0}")]
    UnknownDialect(String),
}

/// Engine configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Dialect name assumed for databases the driver does not report one for
    #[validate(length(min = 1, message = "Default dialect cannot be empty"))]
    pub default_dialect: String,

    /// Maximum depth of nested link traversals accepted per query (1-16)
    #[validate(range(
        min = 1,
        max = 16,
        message = "Max traversal depth must be between 1 and 16"
    ))]
    pub max_traversal_depth: u32,

    /// Whether to validate the ontology catalog against mapped tables on load
    pub validate_catalog: bool,

    /// Whether federated execution is permitted at all
    pub federation_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_dialect: "mysql".to_string(),
            max_traversal_depth: 4,
            validate_catalog: true,
            federation_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables with validation
    ///
    /// Reads a `.env` file first if one is present, matching how the engine
    /// is deployed alongside its catalog files.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            default_dialect: env::var("ONTOQL_DEFAULT_DIALECT")
                .unwrap_or_else(|_| "mysql".to_string()),
            max_traversal_depth: parse_env_var("ONTOQL_MAX_TRAVERSAL_DEPTH", "4")?,
            validate_catalog: parse_env_var("ONTOQL_VALIDATE_CATALOG", "true")?,
            federation_enabled: parse_env_var("ONTOQL_FEDERATION_ENABLED", "true")?,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
