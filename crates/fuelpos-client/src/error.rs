//! Client error types.

use fuelpos_core::FuelId;
use rust_decimal::Decimal;

/// Errors that can occur when using the fuelpos client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response this client has no variant for.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request was malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Fuel type not found.
    #[error("fuel not found: {fuel_id}")]
    FuelNotFound {
        /// The fuel id.
        fuel_id: FuelId,
    },

    /// Not enough stock for the sale.
    #[error("insufficient stock for fuel {fuel_id}: requested={requested}, available={available}")]
    InsufficientStock {
        /// Fuel the sale was for.
        fuel_id: FuelId,
        /// Quantity asked for.
        requested: Decimal,
        /// Stock at the time of the check.
        available: Decimal,
    },

    /// The service could not persist the request; nothing was applied.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether repeating the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
