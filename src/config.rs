//! Configuration management for the `TripPlanner` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripPlannerError;
use crate::clustering::{DayOrdering, GroupingOptions};
use crate::models::TripStyle;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TripPlanner` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripPlannerConfig {
    /// Itinerary generation (chat-completion API)
    pub llm: LlmConfig,
    /// Geocoding service
    pub geocoding: GeocodingConfig,
    /// Geocoding cache
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Day clustering
    pub clustering: ClusteringConfig,
    /// Default trip parameters
    pub defaults: DefaultsConfig,
}

/// Chat-completion API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key; takes precedence over `api_key_env`
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Retries for transient failures (0 disables retrying)
    pub max_retries: u32,
}

/// Which public geocoder to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeocodingProvider {
    #[default]
    Nominatim,
    OpenMeteo,
}

/// Geocoding service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub provider: GeocodingProvider,
    /// Base URL; empty selects the provider's public endpoint
    pub base_url: String,
    /// User agent sent with every request (required by Nominatim)
    pub user_agent: String,
    /// Minimum spacing between outbound requests in milliseconds
    pub request_interval_ms: u64,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Retries for transient failures
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache geocoding results between runs
    pub enabled: bool,
    /// Cache TTL in hours
    pub ttl_hours: u32,
    /// Cache directory location
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Day clustering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    /// Scale factor applied to the first and last point before clustering
    pub endpoint_weight: Option<f64>,
    pub ordering: DayOrdering,
}

/// Default trip parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub days: u32,
    pub travelers: u32,
    pub style: TripStyle,
}

// Default value functions
fn default_llm_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_llm_timeout() -> u32 {
    60
}

fn default_geocoding_user_agent() -> String {
    format!("tripplanner/{}", crate::VERSION)
}

fn default_geocoding_interval() -> u64 {
    1000
}

fn default_geocoding_timeout() -> u32 {
    10
}

fn default_geocoding_max_retries() -> u32 {
    2
}

fn default_cache_ttl() -> u32 {
    168
}

fn default_cache_location() -> String {
    "~/.cache/tripplanner".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_llm_api_key_env(),
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_seconds: default_llm_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            provider: GeocodingProvider::default(),
            base_url: String::new(),
            user_agent: default_geocoding_user_agent(),
            request_interval_ms: default_geocoding_interval(),
            timeout_seconds: default_geocoding_timeout(),
            max_retries: default_geocoding_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_hours: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        let grouping = GroupingOptions::default();
        Self {
            seed: grouping.seed,
            n_init: grouping.n_init,
            max_iter: grouping.max_iter,
            endpoint_weight: grouping.endpoint_weight,
            ordering: grouping.ordering,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            days: 4,
            travelers: 2,
            style: TripStyle::default(),
        }
    }
}

impl LlmConfig {
    /// API key from the config file, or from the configured environment variable
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl GeocodingConfig {
    /// Base URL with the provider's public endpoint as fallback
    #[must_use]
    pub fn endpoint(&self) -> &str {
        if !self.base_url.is_empty() {
            return &self.base_url;
        }
        match self.provider {
            GeocodingProvider::Nominatim => "https://nominatim.openstreetmap.org",
            GeocodingProvider::OpenMeteo => "https://geocoding-api.open-meteo.com/v1",
        }
    }
}

impl CacheConfig {
    /// Cache directory with a leading `~` expanded
    #[must_use]
    pub fn resolved_location(&self) -> PathBuf {
        match self.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.location)),
            None => PathBuf::from(&self.location),
        }
    }
}

impl ClusteringConfig {
    #[must_use]
    pub fn grouping_options(&self) -> GroupingOptions {
        GroupingOptions {
            seed: self.seed,
            n_init: self.n_init,
            max_iter: self.max_iter,
            endpoint_weight: self.endpoint_weight,
            ordering: self.ordering,
        }
    }
}

impl TripPlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TRIPPLANNER_LLM__MODEL
        builder = builder.add_source(
            Environment::with_prefix("TRIPPLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripPlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripplanner").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.llm.api_key_env.is_empty() {
            self.llm.api_key_env = default_llm_api_key_env();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.geocoding.user_agent.is_empty() {
            self.geocoding.user_agent = default_geocoding_user_agent();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.clustering.n_init == 0 {
            self.clustering.n_init = GroupingOptions::default().n_init;
        }
        if self.clustering.max_iter == 0 {
            self.clustering.max_iter = GroupingOptions::default().max_iter;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.llm.timeout_seconds > 600 {
            return Err(TripPlannerError::config("LLM timeout cannot exceed 600 seconds").into());
        }

        if self.llm.max_retries > 10 || self.geocoding.max_retries > 10 {
            return Err(TripPlannerError::config("Max retries cannot exceed 10").into());
        }

        if self.geocoding.timeout_seconds > 300 {
            return Err(
                TripPlannerError::config("Geocoding timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.geocoding.request_interval_ms > 60_000 {
            return Err(TripPlannerError::config(
                "Geocoding request interval cannot exceed 60000 ms",
            )
            .into());
        }

        if self.cache.ttl_hours > 24 * 365 {
            return Err(TripPlannerError::config("Cache TTL cannot exceed one year").into());
        }

        if self.clustering.n_init > 100 || self.clustering.max_iter > 10_000 {
            return Err(TripPlannerError::config(
                "Clustering n_init cannot exceed 100 and max_iter cannot exceed 10000",
            )
            .into());
        }

        if let Some(weight) = self.clustering.endpoint_weight {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(TripPlannerError::config(
                    "Clustering endpoint weight must be a positive number",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("LLM", self.llm.base_url.as_str()),
            ("Geocoding", self.geocoding.endpoint()),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripPlannerError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TripPlannerConfig::default();
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.geocoding.request_interval_ms, 1000);
        assert_eq!(config.geocoding.endpoint(), "https://nominatim.openstreetmap.org");
        assert_eq!(config.clustering.seed, 42);
        assert_eq!(config.logging.level, "info");
        assert!(config.llm.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_open_meteo_endpoint() {
        let mut config = TripPlannerConfig::default();
        config.geocoding.provider = GeocodingProvider::OpenMeteo;
        assert_eq!(
            config.geocoding.endpoint(),
            "https://geocoding-api.open-meteo.com/v1"
        );
    }

    #[test]
    fn test_config_api_key_takes_precedence() {
        let mut llm = LlmConfig::default();
        llm.api_key = Some("gsk_from_config".to_string());
        llm.api_key_env = "TRIPPLANNER_TEST_UNSET_KEY".to_string();
        assert_eq!(llm.resolve_api_key(), Some("gsk_from_config".to_string()));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let mut llm = LlmConfig::default();
        llm.api_key = Some("   ".to_string());
        llm.api_key_env = "TRIPPLANNER_TEST_DEFINITELY_UNSET".to_string();
        assert_eq!(llm.resolve_api_key(), None);
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TripPlannerConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TripPlannerConfig::default();
        config.geocoding.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_endpoint_weight() {
        let mut config = TripPlannerConfig::default();
        config.clustering.endpoint_weight = Some(0.0);
        assert!(config.validate().is_err());
        config.clustering.endpoint_weight = Some(1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = TripPlannerConfig::default();
        config.llm.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("LLM base URL"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[llm]\nmodel = \"llama-3.1-8b-instant\"\n\n[clustering]\nordering = \"visit\"\nseed = 7\n",
        )
        .unwrap();

        let config = TripPlannerConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.clustering.ordering, DayOrdering::Visit);
        assert_eq!(config.clustering.seed, 7);
        // untouched sections keep their defaults
        assert_eq!(config.geocoding.request_interval_ms, 1000);
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = TripPlannerConfig::default();
        config.llm.model = String::new();
        config.logging.format = String::new();
        config.clustering.n_init = 0;
        config.apply_defaults();
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.clustering.n_init, 1);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = TripPlannerConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("tripplanner"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }

    #[test]
    fn test_cache_location_expands_home() {
        let cache = CacheConfig {
            location: "/tmp/tripplanner-cache".to_string(),
            ..CacheConfig::default()
        };
        assert_eq!(cache.resolved_location(), PathBuf::from("/tmp/tripplanner-cache"));
    }
}
