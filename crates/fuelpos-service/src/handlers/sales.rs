//! Sale handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use fuelpos_core::{SaleId, SaleReceipt, SaleRecord, SaleRequest, SaleView};
use fuelpos_store::{Store, DEFAULT_RECENT_SALES};

use super::blocking;
use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Record a sale.
///
/// Not idempotent: each successful call sells once more.
pub async fn record_sale(
    State(state): State<Arc<AppState>>,
    auth: AdminAuth,
    body: Result<Json<SaleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SaleReceipt>), ApiError> {
    let Json(request) = body?;

    let receipt =
        blocking(move || Ok(state.sales.record_sale(&auth.principal, &request)?)).await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Recent sales query parameters.
#[derive(Debug, Deserialize)]
pub struct RecentSalesQuery {
    /// Maximum number of sales to return (default: 100, capped at 200).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_RECENT_SALES
}

/// List the most recent sales, newest first.
pub async fn list_recent_sales(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    query: Result<Query<RecentSalesQuery>, QueryRejection>,
) -> Result<Json<Vec<SaleView>>, ApiError> {
    let Query(query) = query?;

    let sales = blocking(move || Ok(state.sales.list_recent_sales(query.limit)?)).await?;

    Ok(Json(sales))
}

/// Get one sale.
pub async fn get_sale(
    State(state): State<Arc<AppState>>,
    _auth: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<SaleRecord>, ApiError> {
    let sale_id: SaleId = id
        .parse()
        .map_err(|_| ApiError::Validation(format!("invalid sale id: {id}")))?;

    let sale = blocking(move || {
        state
            .store
            .get_sale(&sale_id)?
            .ok_or_else(|| ApiError::NotFound(format!("sale not found: {sale_id}")))
    })
    .await?;

    Ok(Json(sale))
}
