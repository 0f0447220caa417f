//! Fuel POS HTTP API Service.
//!
//! This crate provides the HTTP API for the fuel station point of sale:
//!
//! - Fuel inventory administration (types, prices, stock)
//! - Sale recording with guarded stock decrement
//! - Recent sales listing
//!
//! # Authentication
//!
//! Every `/v1` route needs an admin principal, given either as:
//!
//! 1. **Admin API key** - `X-Admin-Key` header, with `X-Admin-Id` naming the caller
//! 2. **Session JWT** - `Authorization: Bearer` HS256 token with `role = "admin"`

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServiceConfig};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
