//! Error types for sale recording and inventory administration.

use rust_decimal::Decimal;

use crate::ids::{FuelId, IdError};

/// Result type for point-of-sale operations.
pub type Result<T> = std::result::Result<T, PosError>;

/// Every way a sale (or an inventory edit) can fail.
///
/// Only [`PosError::Persistence`] is worth retrying; the other variants
/// describe the request or the stock level and will fail the same way again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PosError {
    /// Malformed input. Rejected before storage is touched.
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced fuel type does not exist.
    #[error("fuel not found: {fuel_id}")]
    NotFound {
        /// The fuel id that was looked up.
        fuel_id: FuelId,
    },

    /// Not enough stock at the moment the decrement was attempted.
    #[error("insufficient stock for fuel {fuel_id}: requested={requested}, available={available}")]
    InsufficientStock {
        /// The fuel being sold.
        fuel_id: FuelId,
        /// Quantity asked for.
        requested: Decimal,
        /// Stock on hand when the guarded check ran.
        available: Decimal,
    },

    /// Storage failed during the atomic unit. Any partial effect has been
    /// rolled back by the time this is returned.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl PosError {
    /// Whether the caller may retry the same logical request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

impl From<IdError> for PosError {
    fn from(err: IdError) -> Self {
        match err {
            IdError::SequenceExhausted => Self::Persistence(err.to_string()),
            _ => Self::Validation(format!("invalid fuel id: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn only_persistence_is_retryable() {
        let fuel_id = FuelId::new(1).unwrap();
        assert!(PosError::Persistence("disk full".into()).is_retryable());
        assert!(!PosError::Validation("bad".into()).is_retryable());
        assert!(!PosError::NotFound { fuel_id }.is_retryable());
        assert!(!PosError::InsufficientStock {
            fuel_id,
            requested: dec!(150),
            available: dec!(100),
        }
        .is_retryable());
    }

    #[test]
    fn insufficient_stock_message_carries_quantities() {
        let err = PosError::InsufficientStock {
            fuel_id: FuelId::new(4).unwrap(),
            requested: dec!(150.00),
            available: dec!(100.00),
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for fuel 4: requested=150.00, available=100.00"
        );
    }
}
