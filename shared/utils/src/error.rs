use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartcodeError {
    #[error("Invalid component: {field} - {message}")]
    InvalidComponent {
        field: String,
        rule: String,
        message: String,
    },

    #[error("Store write conflict: {message}")]
    StoreWriteConflict { message: String },

    #[error("Sequence space exhausted for bucket {bucket} (capacity {capacity})")]
    SequenceExhausted { bucket: String, capacity: u64 },

    #[error("Invalid SKU format: '{sku}' has {parts} part(s), expected 3 or 5")]
    InvalidSkuFormat { sku: String, parts: usize },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PartcodeError {
    pub fn invalid_component(
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidComponent {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn store_write_conflict(message: impl Into<String>) -> Self {
        Self::StoreWriteConflict {
            message: message.into(),
        }
    }

    pub fn sequence_exhausted(bucket: impl Into<String>, capacity: u64) -> Self {
        Self::SequenceExhausted {
            bucket: bucket.into(),
            capacity,
        }
    }

    pub fn invalid_sku_format(sku: impl Into<String>, parts: usize) -> Self {
        Self::InvalidSkuFormat {
            sku: sku.into(),
            parts,
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidComponent { .. } => "INVALID_COMPONENT",
            Self::StoreWriteConflict { .. } => "STORE_WRITE_CONFLICT",
            Self::SequenceExhausted { .. } => "SEQUENCE_EXHAUSTED",
            Self::InvalidSkuFormat { .. } => "INVALID_SKU_FORMAT",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Rejections are the caller's input problem; a batch skips them and moves on.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidComponent { .. })
    }
}

pub type PartcodeResult<T> = Result<T, PartcodeError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<PartcodeError> for ErrorResponse {
    fn from(error: PartcodeError) -> Self {
        let details = match &error {
            PartcodeError::InvalidComponent { field, rule, .. } => {
                Some(serde_json::json!({ "field": field, "rule": rule }))
            }
            PartcodeError::SequenceExhausted { bucket, capacity } => {
                Some(serde_json::json!({ "bucket": bucket, "capacity": capacity }))
            }
            _ => None,
        };

        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            details,
        }
    }
}

// Conversion from common error types
impl From<sqlx::Error> for PartcodeError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                Self::store_write_conflict(db_error.message().to_string())
            }
            _ => Self::database(error.to_string()),
        }
    }
}

impl From<config::ConfigError> for PartcodeError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

impl From<serde_json::Error> for PartcodeError {
    fn from(error: serde_json::Error) -> Self {
        Self::configuration(error.to_string())
    }
}

impl From<std::io::Error> for PartcodeError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(error.to_string())
    }
}
