use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateError {
    #[error("Not signed in: no authenticated user")]
    AuthError,

    #[error("Backend operation failed: {message}")]
    StoreError { message: String },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    Store,
    Validation,
    Config,
    Io,
}

impl RateError {
    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreError {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthError => ErrorCategory::Auth,
            Self::StoreError { .. } | Self::HttpError(_) | Self::SerializationError(_) => {
                ErrorCategory::Store
            }
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Config,
            Self::CsvError(_) | Self::IoError(_) => ErrorCategory::Io,
        }
    }

    /// Text shown to the user in a notification.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::AuthError => "Please sign in to manage your rates.".to_string(),
            Self::StoreError { message } => format!("Could not reach your rates: {}", message),
            Self::ValidationError { message, .. } => message.clone(),
            Self::HttpError(e) => format!("Could not reach the rates service: {}", e),
            Self::SerializationError(_) => {
                "The rates service returned data that could not be read.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RateError>;
