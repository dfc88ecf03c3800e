use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        /// For capacity/time-overlap rejections: earliest point at which a
        /// retry of the same window can succeed.
        earliest_available: Option<DateTime<Utc>>,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unprocessable amount: {detail} (limit {limit})")]
    UnprocessableAmount { detail: String, limit: Decimal },

    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            earliest_available: None,
        }
    }
}
