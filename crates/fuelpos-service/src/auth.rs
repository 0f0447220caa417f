//! Authentication extractors.
//!
//! Session login happens outside this service. A request reaches the sale and
//! inventory handlers only if it carries admin credentials, which become the
//! [`Principal`] the core logs against.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fuelpos_core::Principal;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Role claim that grants access to the API.
pub const ADMIN_ROLE: &str = "admin";

/// An authenticated admin.
///
/// Accepts either:
/// - `X-Admin-Key` matching the configured admin key (`X-Admin-Id` names the caller)
/// - `Authorization: Bearer <jwt>` signed with the configured HS256 secret and
///   carrying `role = "admin"`
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// The authenticated caller.
    pub principal: Principal,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(admin_key) = header(parts, "x-admin-key") {
            let expected_key = state
                .config
                .admin_api_key
                .as_ref()
                .ok_or(ApiError::Unauthorized)?;

            if admin_key != expected_key {
                tracing::debug!("Admin key rejected");
                return Err(ApiError::Unauthorized);
            }

            let admin_id = header(parts, "x-admin-id").unwrap_or("admin");

            tracing::debug!(admin_id = %admin_id, "Admin authenticated by key");

            return Ok(AdminAuth {
                principal: Principal::new(admin_id),
            });
        }

        let token = header(parts, "authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let secret = state
            .config
            .jwt_secret
            .as_ref()
            .ok_or(ApiError::Unauthorized)?;

        let claims = validate_jwt(token, secret)?;

        if claims.role != ADMIN_ROLE {
            tracing::debug!(sub = %claims.sub, role = %claims.role, "Token lacks admin role");
            return Err(ApiError::Unauthorized);
        }

        tracing::debug!(sub = %claims.sub, "Admin authenticated by token");

        Ok(AdminAuth {
            principal: Principal::new(claims.sub),
        })
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (the signed-in user).
    pub sub: String,
    /// Role granted by the login service.
    pub role: String,
    /// Expiration time.
    pub exp: i64,
}

/// Validate an HS256 session token.
fn validate_jwt(token: &str, secret: &str) -> Result<SessionClaims, ApiError> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        ApiError::Unauthorized
    })?;

    Ok(token_data.claims)
}
