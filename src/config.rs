use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_SHEET_NAME: &str = "Form Response";
pub const DEFAULT_CONFIG_FILE: &str = "feedback.toml";
const ENV_PREFIX: &str = "FEEDBACK";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Endpoint is not configured (set FEEDBACK_ENDPOINT or `endpoint` in feedback.toml)")]
    MissingEndpoint,
    #[error("Invalid endpoint URL {0}: {1}")]
    InvalidEndpoint(String, String),
    #[error("Sheet name must not be empty")]
    EmptySheetName,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FeedbackConfig {
    #[serde(default)]
    pub endpoint: String,
    pub sheet_name: String,
    /// Off by default: a hung request keeps the form in the submitting state.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    pub brand_name: String,
    pub brand_tagline: String,
}

impl FeedbackConfig {
    /// Defaults layered under every other source.
    pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let mut builder = Config::builder()
            .set_default("sheet_name", option_env!("FEEDBACK_SHEET_NAME").unwrap_or(DEFAULT_SHEET_NAME))?
            .set_default("brand_name", "A.T. Plus Jewellers")?
            .set_default("brand_tagline", "Symbol of Trust Since 1957")?;

        if let Some(endpoint) = option_env!("FEEDBACK_ENDPOINT") {
            builder = builder.set_default("endpoint", endpoint)?;
        }

        Ok(builder)
    }

    /// Loads `.env`, then the config file (if present), then `FEEDBACK_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = Self::builder_with_defaults()?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let loaded: FeedbackConfig = config.try_deserialize()?;
        loaded.validate()?;

        info!("Configuration loaded for sheet '{}'", loaded.sheet_name);
        debug!("Endpoint: {}", loaded.endpoint);
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }

        let url = Url::parse(&self.endpoint)
            .map_err(|e| ConfigError::InvalidEndpoint(self.endpoint.clone(), e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidEndpoint(
                self.endpoint.clone(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.sheet_name.trim().is_empty() {
            return Err(ConfigError::EmptySheetName);
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
