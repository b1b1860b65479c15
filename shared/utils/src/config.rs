use config::{Config, ConfigError, Environment, File};
use partcode_models::SkuLayout;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout_seconds: u64,
    pub busy_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Layout used for newly generated SKUs. Both layouts always decode.
    pub layout: SkuLayout,
    /// Number of alphabet characters in the sequence segment.
    pub sequence_width: usize,
    /// JSON file replacing the built-in classification tables.
    pub tables_path: Option<String>,
    pub partial_search_limit: u32,
    pub similar_limit: u32,
    pub recent_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Start with default values
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with PARTCODE prefix
            .add_source(Environment::with_prefix("PARTCODE").separator("__"));

        config.build()?.try_deserialize()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://partcode.db".to_string(),
            max_connections: 5,
            connection_timeout_seconds: 30,
            busy_timeout_seconds: 10,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a database file at `path`, used by tools and tests.
    pub fn for_path(path: &std::path::Path) -> Self {
        Self {
            url: format!("sqlite://{}", path.display()),
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: SkuLayout::Simplified,
            sequence_width: 4,
            tables_path: None,
            partial_search_limit: 15,
            similar_limit: 20,
            recent_limit: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "plain".to_string(),
            file_path: None,
        }
    }
}
