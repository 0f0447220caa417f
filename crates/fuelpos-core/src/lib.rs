//! Core types for the fuel station point-of-sale service.
//!
//! This crate provides the domain types shared by the store, the HTTP service
//! and the client SDK:
//!
//! - **Identifiers**: `FuelId`, `SaleId`
//! - **Inventory**: `FuelRecord`, `NewFuel`, `FuelUpdate`, `StockReservation`
//! - **Ledger**: `SaleRecord`, `SaleRequest`, `ValidatedSale`, `SaleReceipt`, `SaleView`
//! - **Errors**: `PosError`, the taxonomy every sale outcome is reported in
//!
//! # Units
//!
//! Stock and sale quantities are in litres, prices per litre. All of them are
//! `rust_decimal::Decimal`; money is rounded to two decimal places only when a
//! sale total is computed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod fuel;
pub mod ids;
pub mod principal;
pub mod sale;

pub use error::{PosError, Result};
pub use fuel::{FuelRecord, FuelUpdate, NewFuel, StockReservation};
pub use ids::{FuelId, IdError, SaleId, SaleIdSequence};
pub use principal::Principal;
pub use sale::{
    line_total, SaleReceipt, SaleRecord, SaleRequest, SaleState, SaleView, ValidatedSale,
    MONEY_SCALE,
};
