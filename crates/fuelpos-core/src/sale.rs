//! Sale ledger types.
//!
//! A [`SaleRecord`] is written exactly once, by the sale coordinator, and
//! never changes afterwards. It carries its own price snapshot so later price
//! edits on the fuel do not rewrite history.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::PosError;
use crate::fuel::StockReservation;
use crate::ids::{FuelId, SaleId};

/// Decimal places kept on money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Price times quantity, rounded half away from zero to exactly [`MONEY_SCALE`] places.
///
/// Returns `None` if the product does not fit in a `Decimal`.
#[must_use]
pub fn line_total(price_per_unit: Decimal, quantity: Decimal) -> Option<Decimal> {
    let mut total = price_per_unit
        .checked_mul(quantity)?
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    total.rescale(MONEY_SCALE);
    Some(total)
}

/// A sale request as it arrives from a caller.
///
/// Fields are optional so that a missing value is reported as a validation
/// failure instead of a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleRequest {
    /// Raw fuel id.
    #[serde(default)]
    pub fuel_id: Option<u64>,
    /// Litres to sell.
    #[serde(default)]
    pub quantity: Option<Decimal>,
    /// Free-text customer name.
    #[serde(default)]
    pub customer_name: Option<String>,
}

impl SaleRequest {
    /// Convenience constructor.
    #[must_use]
    pub fn new(fuel_id: FuelId, quantity: Decimal, customer_name: Option<String>) -> Self {
        Self {
            fuel_id: Some(fuel_id.get()),
            quantity: Some(quantity),
            customer_name,
        }
    }

    /// Check the request shape without touching storage.
    ///
    /// # Errors
    ///
    /// Returns `PosError::Validation` if the fuel id is missing or not
    /// positive, or the quantity is missing or not greater than zero.
    pub fn validate(&self) -> Result<ValidatedSale, PosError> {
        let raw_id = self
            .fuel_id
            .ok_or_else(|| PosError::Validation("fuel_id is required".into()))?;
        let fuel_id = FuelId::try_from(raw_id)?;

        let quantity = self
            .quantity
            .ok_or_else(|| PosError::Validation("quantity is required".into()))?;
        if quantity <= Decimal::ZERO {
            return Err(PosError::Validation("quantity must be greater than zero".into()));
        }

        let customer_name = self
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Ok(ValidatedSale {
            fuel_id,
            quantity,
            customer_name,
        })
    }
}

/// A request that passed shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSale {
    /// Fuel to sell.
    pub fuel_id: FuelId,
    /// Litres, strictly positive.
    pub quantity: Decimal,
    /// Trimmed customer name, `None` when blank.
    pub customer_name: Option<String>,
}

/// An immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Sale id (ULID, time-ordered).
    pub id: SaleId,
    /// Fuel sold. A reporting reference only.
    pub fuel_id: FuelId,
    /// Litres sold.
    pub quantity: Decimal,
    /// Price per litre captured when the stock was reserved.
    pub price_per_unit: Decimal,
    /// `round(quantity * price_per_unit, 2)`.
    pub total_amount: Decimal,
    /// Optional customer name.
    pub customer_name: Option<String>,
    /// When the sale was recorded.
    pub created_at: DateTime<Utc>,
}

impl SaleRecord {
    /// Build the ledger entry for a reservation, billing at the reserved price.
    ///
    /// # Errors
    ///
    /// Returns `PosError::Validation` if the total overflows.
    pub fn from_reservation(
        id: SaleId,
        sale: &ValidatedSale,
        reservation: &StockReservation,
    ) -> Result<Self, PosError> {
        let total_amount = line_total(reservation.price_at_time, reservation.quantity)
            .ok_or_else(|| PosError::Validation("sale total is out of range".into()))?;

        Ok(Self {
            id,
            fuel_id: reservation.fuel_id,
            quantity: reservation.quantity,
            price_per_unit: reservation.price_at_time,
            total_amount,
            customer_name: sale.customer_name.clone(),
            created_at: Utc::now(),
        })
    }

    /// The receipt handed back to the caller.
    #[must_use]
    pub fn receipt(&self) -> SaleReceipt {
        SaleReceipt {
            sale_id: self.id,
            total_amount: self.total_amount,
            price_per_unit: self.price_per_unit,
        }
    }
}

/// Result of a recorded sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    /// The new ledger entry.
    pub sale_id: SaleId,
    /// Amount charged, two decimal places.
    pub total_amount: Decimal,
    /// Price per litre the sale was billed at.
    pub price_per_unit: Decimal,
}

/// A ledger entry joined with the fuel's current label, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleView {
    /// The ledger entry.
    #[serde(flatten)]
    pub sale: SaleRecord,
    /// Current label of the fuel, `None` if the fuel has since been deleted.
    pub fuel_type: Option<String>,
}

/// Lifecycle of a single sale request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleState {
    /// Input shape checked.
    Validated,
    /// Stock decremented inside an open unit, not yet visible.
    StockReserved,
    /// Decrement and ledger entry committed together.
    Recorded,
    /// Refused without side effects.
    Rejected,
    /// Reserved stock was given back after a failure.
    RolledBack,
}

impl fmt::Display for SaleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validated => "validated",
            Self::StockReserved => "stock_reserved",
            Self::Recorded => "recorded",
            Self::Rejected => "rejected",
            Self::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}
