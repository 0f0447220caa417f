//! `RocksDB` storage layer and sale coordinator.
//!
//! This crate holds the authoritative fuel inventory and the append-only sale
//! ledger, and the [`SaleCoordinator`] that ties them together.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `fuels`: Fuel records, keyed by big-endian `fuel_id`
//! - `sales`: Sale records, keyed by `sale_id` (ULID)
//! - `sales_by_fuel`: Index for listing sales of one fuel
//! - `meta`: Counters (the fuel id sequence)
//!
//! A sale is written through a [`SaleUnit`]: one database transaction that
//! locks the fuel row, decrements its stock and appends the ledger entry.
//! Nothing is visible until [`SaleUnit::commit`]; dropping the unit rolls it back.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fuelpos_core::{NewFuel, Principal, SaleRequest};
//! use fuelpos_store::{RocksStore, SaleCoordinator, Store};
//! use rust_decimal::Decimal;
//!
//! let store = Arc::new(RocksStore::open("/tmp/fuelpos-db").unwrap());
//! let petrol = store
//!     .create_fuel(&NewFuel {
//!         fuel_type: "Petrol".into(),
//!         price_per_unit: Decimal::new(10_000, 2),
//!         stock_quantity: Decimal::new(10_000, 2),
//!     })
//!     .unwrap();
//!
//! let sales = SaleCoordinator::new(Arc::clone(&store));
//! let receipt = sales
//!     .record_sale(
//!         &Principal::new("admin"),
//!         &SaleRequest::new(petrol.id, Decimal::new(3_000, 2), None),
//!     )
//!     .unwrap();
//! assert_eq!(receipt.total_amount, Decimal::new(300_000, 2));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod coordinator;
pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use coordinator::{SaleCoordinator, DEFAULT_RECENT_SALES, MAX_RECENT_SALES};
pub use error::{Result, StoreError};
pub use rocks::{RocksStore, RocksUnit, StoreOptions};

use fuelpos_core::{
    FuelId, FuelRecord, FuelUpdate, NewFuel, SaleId, SaleRecord, StockReservation,
};
use rust_decimal::Decimal;

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer so the coordinator can be driven
/// against any backend that offers a transactional [`SaleUnit`].
pub trait Store: Send + Sync {
    /// The atomic unit of work handed out by [`Store::begin`].
    type Unit<'a>: SaleUnit
    where
        Self: 'a;

    // =========================================================================
    // Inventory Operations
    // =========================================================================

    /// Get a fuel record by ID. Reads committed data only and never blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_fuel(&self, fuel_id: FuelId) -> Result<Option<FuelRecord>>;

    /// List all fuel records ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_fuels(&self) -> Result<Vec<FuelRecord>>;

    /// Create a fuel record with the next free ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Invalid` if the input fails validation.
    fn create_fuel(&self, fuel: &NewFuel) -> Result<FuelRecord>;

    /// Apply an admin edit to price and/or stock.
    ///
    /// Runs under the same row lock as the guarded decrement.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::FuelNotFound` if the fuel doesn't exist.
    fn update_fuel(&self, fuel_id: FuelId, update: &FuelUpdate) -> Result<FuelRecord>;

    /// Delete a fuel record. Sales that reference it are kept.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::FuelNotFound` if the fuel doesn't exist.
    fn delete_fuel(&self, fuel_id: FuelId) -> Result<()>;

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Get a sale by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_sale(&self, sale_id: &SaleId) -> Result<Option<SaleRecord>>;

    /// List sales, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_sales(&self, limit: usize, offset: usize) -> Result<Vec<SaleRecord>>;

    /// List sales of one fuel, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_sales_by_fuel(
        &self,
        fuel_id: FuelId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SaleRecord>>;

    /// Issue the id for the next sale.
    ///
    /// Each id sorts after every id issued or stored before it, so the
    /// ledger's key order is the order sales were recorded in.
    ///
    /// # Errors
    ///
    /// Returns an error if no further id can be issued.
    fn next_sale_id(&self) -> Result<SaleId>;

    // =========================================================================
    // Atomic Unit
    // =========================================================================

    /// Open a unit of work for one sale.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    fn begin(&self) -> Result<Self::Unit<'_>>;
}

/// One sale's worth of writes, applied together or not at all.
///
/// Dropping a unit without calling [`SaleUnit::commit`] discards every write
/// made through it and releases its locks.
pub trait SaleUnit {
    /// Lock the fuel row, check the stock and decrement it.
    ///
    /// Serialized against every other unit touching the same fuel; the check
    /// sees the stock as left by all previously committed decrements.
    ///
    /// # Errors
    ///
    /// - `StoreError::FuelNotFound` if the fuel doesn't exist.
    /// - `StoreError::InsufficientStock` if `quantity` exceeds the stock.
    /// - `StoreError::Contention` if the row lock could not be taken in time.
    fn decrement_if_sufficient(
        &mut self,
        fuel_id: FuelId,
        quantity: Decimal,
    ) -> Result<StockReservation>;

    /// Append a sale and its index entry.
    ///
    /// # Errors
    ///
    /// Returns an error only if the write itself fails.
    fn append_sale(&mut self, sale: &SaleRecord) -> Result<()>;

    /// Make every write of this unit visible at once.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; nothing is applied in that case.
    fn commit(self) -> Result<()>
    where
        Self: Sized;

    /// Discard every write of this unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend reports a failure while discarding.
    fn rollback(self) -> Result<()>
    where
        Self: Sized;
}
