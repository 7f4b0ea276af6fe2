//! # Entity Link Error Types
//!
//! Structured error handling for the entity link subsystem using thiserror
//! instead of `Box<dyn Error>` patterns.
//!
//! The taxonomy is deliberately small: callers distinguish records that were
//! rejected before touching storage ([`EntityLinkError::Validation`]) from
//! failures raised by the storage engine itself.

use thiserror::Error;

/// Errors raised by entity link services and storage engines
#[derive(Error, Debug)]
pub enum EntityLinkError {
    #[error("Validation error: required field {field} is not set")]
    Validation { field: String },

    #[error("Storage error: {operation}: {message}")]
    Storage { operation: String, message: String },

    #[error("Database connection error: {message}")]
    Connection { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl EntityLinkError {
    /// Create a validation error for a missing required field
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }

    /// Create a storage error scoped to a named operation
    pub fn storage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a database connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Check if this error was raised before the record reached storage
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error originated in the storage engine
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Connection { .. })
    }
}

/// Conversion from sqlx::Error to EntityLinkError
impl From<sqlx::Error> for EntityLinkError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => EntityLinkError::storage("query", "No rows found"),
            sqlx::Error::Database(db_err) => {
                EntityLinkError::storage("database", db_err.to_string())
            }
            sqlx::Error::PoolTimedOut => {
                EntityLinkError::connection("Database pool timed out waiting for a connection")
            }
            sqlx::Error::PoolClosed => EntityLinkError::connection("Database pool is closed"),
            sqlx::Error::Configuration(config_err) => {
                EntityLinkError::configuration(config_err.to_string())
            }
            _ => EntityLinkError::connection(err.to_string()),
        }
    }
}

/// Conversion from config::ConfigError to EntityLinkError
impl From<config::ConfigError> for EntityLinkError {
    fn from(err: config::ConfigError) -> Self {
        EntityLinkError::configuration(err.to_string())
    }
}

/// Conversion from serde_json::Error to EntityLinkError
impl From<serde_json::Error> for EntityLinkError {
    fn from(err: serde_json::Error) -> Self {
        EntityLinkError::serialization(err.to_string())
    }
}

/// Result type alias for entity link operations
pub type Result<T> = std::result::Result<T, EntityLinkError>;
