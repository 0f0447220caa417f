//! Fuel POS Client SDK.
//!
//! This crate provides a client library for tills and back-office tools to
//! talk to the fuelpos API.
//!
//! # Example
//!
//! ```no_run
//! use fuelpos_client::FuelPosClient;
//! use fuelpos_core::{FuelId, SaleRequest};
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> Result<(), fuelpos_client::ClientError> {
//! let client = FuelPosClient::new("http://fuelpos:8080", "your-admin-key")?;
//!
//! let petrol = FuelId::new(1).expect("positive id");
//! let receipt = client
//!     .record_sale(&SaleRequest::new(petrol, Decimal::new(3_000, 2), None))
//!     .await?;
//!
//! println!("Charged {}", receipt.total_amount);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, FuelPosClient};
pub use error::ClientError;
