//! Fuel inventory handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use fuelpos_core::{FuelId, FuelRecord, FuelUpdate, NewFuel, PosError};
use fuelpos_store::Store;

use super::blocking;
use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Parse a fuel id from a path segment.
pub(crate) fn parse_fuel_id(raw: &str) -> Result<FuelId, ApiError> {
    raw.parse::<FuelId>()
        .map_err(|e| ApiError::from(PosError::from(e)))
}

/// List all fuel types.
pub async fn list_fuels(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
) -> Result<Json<Vec<FuelRecord>>, ApiError> {
    let fuels = blocking(move || Ok(state.store.list_fuels()?)).await?;
    Ok(Json(fuels))
}

/// Get one fuel type.
pub async fn get_fuel(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<FuelRecord>, ApiError> {
    let fuel_id = parse_fuel_id(&id)?;

    let fuel = blocking(move || {
        state
            .store
            .get_fuel(fuel_id)?
            .ok_or(ApiError::FuelNotFound { fuel_id })
    })
    .await?;

    Ok(Json(fuel))
}

/// Add a fuel type.
pub async fn create_fuel(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    body: Result<Json<NewFuel>, JsonRejection>,
) -> Result<(StatusCode, Json<FuelRecord>), ApiError> {
    let Json(body) = body?;

    let fuel = blocking(move || Ok(state.store.create_fuel(&body)?)).await?;

    tracing::info!(
        admin = %auth.principal.subject,
        fuel_id = %fuel.id,
        fuel_type = %fuel.fuel_type,
        "Fuel created"
    );

    Ok((StatusCode::CREATED, Json(fuel)))
}

/// Change the price and/or stock of a fuel type.
pub async fn update_fuel(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Path(id): Path<String>,
    body: Result<Json<FuelUpdate>, JsonRejection>,
) -> Result<Json<FuelRecord>, ApiError> {
    let fuel_id = parse_fuel_id(&id)?;
    let Json(update) = body?;

    let fuel = blocking(move || Ok(state.store.update_fuel(fuel_id, &update)?)).await?;

    tracing::info!(
        admin = %auth.principal.subject,
        fuel_id = %fuel.id,
        price_per_unit = %fuel.price_per_unit,
        stock_quantity = %fuel.stock_quantity,
        "Fuel updated"
    );

    Ok(Json(fuel))
}

/// Remove a fuel type. Its past sales stay in the ledger.
pub async fn delete_fuel(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let fuel_id = parse_fuel_id(&id)?;

    blocking(move || Ok(state.store.delete_fuel(fuel_id)?)).await?;

    tracing::info!(admin = %auth.principal.subject, fuel_id = %fuel_id, "Fuel deleted");

    Ok(StatusCode::NO_CONTENT)
}
