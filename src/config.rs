/// Configuration management using figment
///
/// Loads configuration with this precedence (highest wins):
/// 1. Defaults (hardcoded)
/// 2. TOML file: greensearch.toml (in working directory)
/// 3. Environment variables: prefixed GREENSEARCH_ (e.g., GREENSEARCH_LOG_LEVEL=debug,
///    nested sections via double underscore: GREENSEARCH_NLP__BASE_URL=...)

use figment::{
    Figment,
    providers::{Env, Format, Toml, Serialized},
};
use serde::{Deserialize, Serialize};
use crate::errors::SearchError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional file path for log output (in addition to stderr)
    #[serde(default)]
    pub log_file: Option<String>,

    /// Address the HTTP server binds to
    #[serde(default = "default_http_bind")]
    pub http_bind: String,

    /// PostgreSQL connection string for the product catalog
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// External NLP collaborator settings
    #[serde(default)]
    pub nlp: NlpConfig,

    /// Cascade policy knobs (limits, score constants, per-stage timeouts)
    #[serde(default)]
    pub search: CascadeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpConfig {
    /// Whether the semantic stage is attempted at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the NLP microservice
    #[serde(default = "default_nlp_base_url")]
    pub base_url: String,

    /// Timeout for /ai-search calls, in milliseconds
    #[serde(default = "default_nlp_search_timeout_ms")]
    pub search_timeout_ms: u64,

    /// Timeout for /health probes, in milliseconds
    #[serde(default = "default_nlp_health_timeout_ms")]
    pub health_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Maximum results returned by the full-text and substring stages
    #[serde(default = "default_search_limit")]
    pub limit: i64,

    /// Relevance score stamped on substring-stage hits (they have no native rank)
    #[serde(default = "default_fallback_score")]
    pub fallback_score: f64,

    /// Timeout applied to each store query, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_database_url() -> String {
    "postgres://localhost/greensearch".to_string()
}

fn default_true() -> bool {
    true
}

fn default_nlp_base_url() -> String {
    "http://127.0.0.1:5001".to_string()
}

fn default_nlp_search_timeout_ms() -> u64 {
    4000
}

fn default_nlp_health_timeout_ms() -> u64 {
    1500
}

fn default_search_limit() -> i64 {
    24
}

fn default_fallback_score() -> f64 {
    0.1
}

fn default_store_timeout_ms() -> u64 {
    3000
}

impl Default for NlpConfig {
    fn default() -> Self {
        NlpConfig {
            enabled: true,
            base_url: default_nlp_base_url(),
            search_timeout_ms: default_nlp_search_timeout_ms(),
            health_timeout_ms: default_nlp_health_timeout_ms(),
        }
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        CascadeConfig {
            limit: default_search_limit(),
            fallback_score: default_fallback_score(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            log_file: None,
            http_bind: default_http_bind(),
            database_url: default_database_url(),
            nlp: NlpConfig::default(),
            search: CascadeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, TOML file, and environment variables
    ///
    /// Environment variables override TOML file values.
    /// Example: GREENSEARCH_SEARCH__LIMIT=12 overrides search.limit in greensearch.toml
    pub fn load() -> Result<Config, SearchError> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("greensearch.toml"))
            .merge(Env::prefixed("GREENSEARCH_").split("__"))
            .extract()
            .map_err(|e| SearchError::Config(format!("Failed to load config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.http_bind, "127.0.0.1:5000");
        assert!(config.nlp.enabled);
        assert_eq!(config.nlp.base_url, "http://127.0.0.1:5001");
        assert_eq!(config.nlp.search_timeout_ms, 4000);
        assert_eq!(config.search.limit, 24);
        assert_eq!(config.search.fallback_score, 0.1);
    }
}
