// src/error.rs
use thiserror::Error;

/// Errors produced by the valuation library.
///
/// Country data is mandatory, so `ExternalData` is fatal to a valuation.
/// `StockUnavailable` is recoverable: the comparable-multiples method
/// degrades to a zero contribution and the remaining methods carry on.
#[derive(Debug, Error)]
pub enum ValuatorError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("unknown country code '{0}'")]
    UnknownCountry(String),

    #[error("external data source failed: {0}")]
    ExternalData(String),

    #[error("comparable stock data unavailable: {0}")]
    StockUnavailable(String),

    #[error("cache store error: {0}")]
    Cache(#[from] std::io::Error),

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ValuatorError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValuatorError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValuatorError>;
