#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::repository::DEFAULT_TABLE;
use crate::core::ConfigProvider;
use crate::utils::error::{RateError, Result};
use crate::utils::validation::{self, Validate};
use std::env;
use toml_config::{unresolved, TomlConfig};

pub const ENV_URL: &str = "FREIGHT_RATES_URL";
pub const ENV_API_KEY: &str = "FREIGHT_RATES_API_KEY";
pub const ENV_ACCESS_TOKEN: &str = "FREIGHT_RATES_ACCESS_TOKEN";
pub const ENV_TABLE: &str = "FREIGHT_RATES_TABLE";

pub(crate) fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validation::validate_url("backend.url", config.backend_url())?;
    validation::validate_non_empty_string("backend.api_key", config.api_key())?;
    if unresolved(config.api_key()) {
        return Err(RateError::MissingConfigError {
            field: "backend.api_key".to_string(),
        });
    }
    validation::validate_table_name("backend.table", config.table())?;
    if let Some(timeout) = config.timeout_seconds() {
        validation::validate_positive_number("backend.timeout_seconds", timeout, 1)?;
    }
    Ok(())
}

/// Backend connection settings after merging file, environment and flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendSettings {
    pub url: String,
    pub api_key: String,
    pub access_token: Option<String>,
    pub table: String,
    pub timeout_seconds: Option<u64>,
}

impl BackendSettings {
    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            url: config.backend_url().to_string(),
            api_key: config.api_key().to_string(),
            access_token: config.access_token().map(str::to_string),
            // an absent key stays empty so the environment can fill it
            table: config.backend.table.clone().unwrap_or_default(),
            timeout_seconds: config.timeout_seconds(),
        }
    }

    pub fn from_env() -> Self {
        let var = |key: &str| {
            env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            url: var(ENV_URL).unwrap_or_default(),
            api_key: var(ENV_API_KEY).unwrap_or_default(),
            access_token: var(ENV_ACCESS_TOKEN),
            table: var(ENV_TABLE).unwrap_or_else(|| {
                tracing::debug!("{} not set, using default: {}", ENV_TABLE, DEFAULT_TABLE);
                DEFAULT_TABLE.to_string()
            }),
            timeout_seconds: None,
        }
    }

    /// Fills anything this side left empty from `fallback`.
    pub fn or(self, fallback: BackendSettings) -> Self {
        let pick = |value: String, fallback: String| {
            if value.is_empty() {
                fallback
            } else {
                value
            }
        };
        Self {
            url: pick(self.url, fallback.url),
            api_key: pick(self.api_key, fallback.api_key),
            access_token: self.access_token.or(fallback.access_token),
            table: pick(self.table, fallback.table),
            timeout_seconds: self.timeout_seconds.or(fallback.timeout_seconds),
        }
    }
}

impl ConfigProvider for BackendSettings {
    fn backend_url(&self) -> &str {
        &self.url
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    fn table(&self) -> &str {
        if self.table.is_empty() {
            DEFAULT_TABLE
        } else {
            &self.table
        }
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }
}

impl Validate for BackendSettings {
    fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(RateError::MissingConfigError {
                field: format!("backend.url (or {})", ENV_URL),
            });
        }
        if self.api_key.is_empty() {
            return Err(RateError::MissingConfigError {
                field: format!("backend.api_key (or {})", ENV_API_KEY),
            });
        }
        validate_provider(self)
    }
}
