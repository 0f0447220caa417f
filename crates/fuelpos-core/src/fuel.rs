//! Fuel inventory types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PosError;
use crate::ids::FuelId;

/// A fuel type on sale at the station, with its current price and stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelRecord {
    /// Fuel identifier.
    pub id: FuelId,

    /// Display label ("Petrol", "Diesel", ...).
    #[serde(rename = "type")]
    pub fuel_type: String,

    /// Current price per litre.
    pub price_per_unit: Decimal,

    /// Litres in the tank.
    pub stock_quantity: Decimal,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When price or stock last changed.
    pub updated_at: DateTime<Utc>,
}

impl FuelRecord {
    /// Build a record for a freshly allocated id.
    #[must_use]
    pub fn new(id: FuelId, fuel: &NewFuel) -> Self {
        let now = Utc::now();
        Self {
            id,
            fuel_type: fuel.fuel_type.trim().to_string(),
            price_per_unit: fuel.price_per_unit,
            stock_quantity: fuel.stock_quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the tank holds at least `quantity` litres.
    #[must_use]
    pub fn has_sufficient_stock(&self, quantity: Decimal) -> bool {
        self.stock_quantity >= quantity
    }

    /// Take `quantity` out of stock and report the reservation.
    ///
    /// The caller must hold the row lock for this record.
    ///
    /// # Errors
    ///
    /// Returns `PosError::InsufficientStock` if `quantity` exceeds the stock;
    /// the record is left untouched in that case.
    pub fn reserve(&mut self, quantity: Decimal) -> Result<StockReservation, PosError> {
        if !self.has_sufficient_stock(quantity) {
            return Err(PosError::InsufficientStock {
                fuel_id: self.id,
                requested: quantity,
                available: self.stock_quantity,
            });
        }

        self.stock_quantity -= quantity;
        self.updated_at = Utc::now();

        Ok(StockReservation {
            fuel_id: self.id,
            quantity,
            price_at_time: self.price_per_unit,
            new_stock: self.stock_quantity,
        })
    }

    /// Apply an admin edit.
    pub fn apply(&mut self, update: &FuelUpdate) {
        if let Some(price) = update.price_per_unit {
            self.price_per_unit = price;
        }
        if let Some(stock) = update.stock_quantity {
            self.stock_quantity = stock;
        }
        self.updated_at = Utc::now();
    }
}

/// Input for creating a fuel type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFuel {
    /// Display label.
    #[serde(rename = "type")]
    pub fuel_type: String,
    /// Price per litre.
    pub price_per_unit: Decimal,
    /// Initial stock in litres.
    pub stock_quantity: Decimal,
}

impl NewFuel {
    /// Check the label is present and the numbers are non-negative.
    ///
    /// # Errors
    ///
    /// Returns `PosError::Validation` describing the first bad field.
    pub fn validate(&self) -> Result<(), PosError> {
        if self.fuel_type.trim().is_empty() {
            return Err(PosError::Validation("fuel type is required".into()));
        }
        check_non_negative("price_per_unit", self.price_per_unit)?;
        check_non_negative("stock_quantity", self.stock_quantity)
    }
}

/// A partial admin edit of price and/or stock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FuelUpdate {
    /// New price per litre.
    #[serde(default)]
    pub price_per_unit: Option<Decimal>,
    /// New stock level (an absolute overwrite, not a delta).
    #[serde(default)]
    pub stock_quantity: Option<Decimal>,
}

impl FuelUpdate {
    /// Reject empty edits and negative values.
    ///
    /// # Errors
    ///
    /// Returns `PosError::Validation` if nothing is set or a value is negative.
    pub fn validate(&self) -> Result<(), PosError> {
        if self.price_per_unit.is_none() && self.stock_quantity.is_none() {
            return Err(PosError::Validation("nothing to update".into()));
        }
        if let Some(price) = self.price_per_unit {
            check_non_negative("price_per_unit", price)?;
        }
        if let Some(stock) = self.stock_quantity {
            check_non_negative("stock_quantity", stock)?;
        }
        Ok(())
    }
}

/// Outcome of a successful guarded decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockReservation {
    /// Fuel the stock was taken from.
    pub fuel_id: FuelId,
    /// Litres taken.
    pub quantity: Decimal,
    /// Price in effect while the row was locked; the sale is billed at this price.
    pub price_at_time: Decimal,
    /// Stock left after the decrement.
    pub new_stock: Decimal,
}

fn check_non_negative(field: &str, value: Decimal) -> Result<(), PosError> {
    if value < Decimal::ZERO {
        return Err(PosError::Validation(format!("{field} must not be negative")));
    }
    Ok(())
}
