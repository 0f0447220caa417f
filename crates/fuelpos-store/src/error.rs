//! Error types for storage.

use fuelpos_core::{FuelId, PosError};
use rust_decimal::Decimal;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Lock wait timed out or the transaction was busy.
    #[error("storage contention: {0}")]
    Contention(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Input rejected before any write.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Fuel record not found.
    #[error("fuel not found: {fuel_id}")]
    FuelNotFound {
        /// The fuel id that was looked up.
        fuel_id: FuelId,
    },

    /// Not enough stock for the decrement.
    #[error("insufficient stock: available={available}, requested={requested}")]
    InsufficientStock {
        /// The fuel being sold.
        fuel_id: FuelId,
        /// Quantity asked for.
        requested: Decimal,
        /// Stock on hand.
        available: Decimal,
    },
}

impl From<PosError> for StoreError {
    fn from(err: PosError) -> Self {
        match err {
            PosError::Validation(msg) => Self::Invalid(msg),
            PosError::NotFound { fuel_id } => Self::FuelNotFound { fuel_id },
            PosError::InsufficientStock {
                fuel_id,
                requested,
                available,
            } => Self::InsufficientStock {
                fuel_id,
                requested,
                available,
            },
            PosError::Persistence(msg) => Self::Database(msg),
        }
    }
}

impl From<StoreError> for PosError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Invalid(msg) => Self::Validation(msg),
            StoreError::FuelNotFound { fuel_id } => Self::NotFound { fuel_id },
            StoreError::InsufficientStock {
                fuel_id,
                requested,
                available,
            } => Self::InsufficientStock {
                fuel_id,
                requested,
                available,
            },
            StoreError::Database(_) | StoreError::Contention(_) | StoreError::Serialization(_) => {
                Self::Persistence(err.to_string())
            }
        }
    }
}
