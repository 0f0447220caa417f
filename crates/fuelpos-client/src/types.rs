//! Wire types that only the client needs.

use fuelpos_core::FuelId;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Error envelope returned by the service.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// `details` of a `not_found` error for a fuel.
#[derive(Debug, Deserialize)]
pub(crate) struct FuelNotFoundDetails {
    pub fuel_id: FuelId,
}

/// `details` of an `insufficient_stock` error.
#[derive(Debug, Deserialize)]
pub(crate) struct InsufficientStockDetails {
    pub fuel_id: FuelId,
    pub requested: Decimal,
    pub available: Decimal,
}
