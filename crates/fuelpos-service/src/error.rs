//! API error types and responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fuelpos_core::{FuelId, PosError};
use rust_decimal::Decimal;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Malformed input.
    #[error("{0}")]
    Validation(String),

    /// Fuel type not found.
    #[error("fuel not found: {fuel_id}")]
    FuelNotFound {
        /// The fuel id that was looked up.
        fuel_id: FuelId,
    },

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Stock can't cover the requested quantity.
    #[error("insufficient stock for fuel {fuel_id}: requested={requested}, available={available}")]
    InsufficientStock {
        /// Fuel the sale was for.
        fuel_id: FuelId,
        /// Quantity asked for.
        requested: Decimal,
        /// Stock at the time of the check.
        available: Decimal,
    },

    /// Storage failed; nothing was applied and the request may be retried.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
                None,
            ),
            Self::FuelNotFound { fuel_id } => (
                StatusCode::NOT_FOUND,
                "not_found",
                self.to_string(),
                Some(serde_json::json!({ "fuel_id": fuel_id })),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::InsufficientStock {
                fuel_id,
                requested,
                available,
            } => (
                StatusCode::CONFLICT,
                "insufficient_stock",
                self.to_string(),
                Some(serde_json::json!({
                    "fuel_id": fuel_id,
                    "requested": requested,
                    "available": available
                })),
            ),
            Self::Persistence(msg) => {
                tracing::error!(error = %msg, "Persistence error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "persistence_error",
                    "Storage is temporarily unavailable, retry the request".to_string(),
                    None,
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<PosError> for ApiError {
    fn from(err: PosError) -> Self {
        match err {
            PosError::Validation(msg) => Self::Validation(msg),
            PosError::NotFound { fuel_id } => Self::FuelNotFound { fuel_id },
            PosError::InsufficientStock {
                fuel_id,
                requested,
                available,
            } => Self::InsufficientStock {
                fuel_id,
                requested,
                available,
            },
            PosError::Persistence(msg) => Self::Persistence(msg),
        }
    }
}

impl From<fuelpos_store::StoreError> for ApiError {
    fn from(err: fuelpos_store::StoreError) -> Self {
        PosError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn insufficient_stock_carries_details() {
        let fuel_id = FuelId::new(1).unwrap();
        let err = ApiError::from(PosError::InsufficientStock {
            fuel_id,
            requested: Decimal::new(15_000, 2),
            available: Decimal::new(10_000, 2),
        });

        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "insufficient_stock");
        assert_eq!(body["error"]["details"]["fuel_id"], 1);
        assert_eq!(body["error"]["details"]["requested"], "150.00");
        assert_eq!(body["error"]["details"]["available"], "100.00");
    }

    #[tokio::test]
    async fn persistence_hides_the_cause() {
        let (status, body) = render(ApiError::Persistence("lock timed out".into())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "persistence_error");
        assert!(!body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("lock timed out"));
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn not_found_names_the_fuel() {
        let err = ApiError::from(PosError::NotFound {
            fuel_id: FuelId::new(7).unwrap(),
        });

        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
        assert!(body["error"]["message"].as_str().unwrap().contains('7'));
        assert_eq!(body["error"]["details"]["fuel_id"], 7);
    }
}
