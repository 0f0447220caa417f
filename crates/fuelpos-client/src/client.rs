//! Fuel POS HTTP client implementation.

use reqwest::{Client, RequestBuilder};
use std::time::Duration;

use fuelpos_core::{FuelId, FuelRecord, SaleId, SaleReceipt, SaleRecord, SaleRequest, SaleView};

use crate::error::ClientError;
use crate::types::{ApiErrorResponse, FuelNotFoundDetails, InsufficientStockDetails};

/// Fuel POS API client.
///
/// Authenticates every request with the admin API key.
#[derive(Debug, Clone)]
pub struct FuelPosClient {
    client: Client,
    base_url: String,
    admin_key: String,
    admin_id: String,
}

impl FuelPosClient {
    /// Create a new fuelpos client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the fuelpos service (e.g., `"http://fuelpos:8080"`)
    /// * `admin_key` - Admin API key for authentication
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        admin_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::with_options(base_url, admin_key, ClientOptions::default())
    }

    /// Create a new fuelpos client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        admin_key: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            admin_key: admin_key.into(),
            admin_id: options.admin_id,
        })
    }

    /// Record a sale.
    ///
    /// Not idempotent: retrying after a response was lost may sell twice.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InsufficientStock`, `ClientError::FuelNotFound` or
    /// `ClientError::Validation` when the sale is refused, and
    /// `ClientError::Persistence` when it may be retried.
    pub async fn record_sale(&self, request: &SaleRequest) -> Result<SaleReceipt, ClientError> {
        let url = format!("{}/v1/sales", self.base_url);

        tracing::debug!(url = %url, fuel_id = ?request.fuel_id, "Recording sale");

        let response = self.authorized(self.client.post(&url)).json(request).send().await?;

        self.handle_response(response).await
    }

    /// List the most recent sales, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_recent_sales(&self, limit: usize) -> Result<Vec<SaleView>, ClientError> {
        let url = format!("{}/v1/sales", self.base_url);

        let response = self
            .authorized(self.client.get(&url))
            .query(&[("limit", limit)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get one sale.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn get_sale(&self, sale_id: &SaleId) -> Result<SaleRecord, ClientError> {
        let url = format!("{}/v1/sales/{sale_id}", self.base_url);

        let response = self.authorized(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    /// List all fuel types.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn list_fuels(&self) -> Result<Vec<FuelRecord>, ClientError> {
        let url = format!("{}/v1/fuel", self.base_url);

        let response = self.authorized(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    /// Get one fuel type.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::FuelNotFound` if it doesn't exist.
    pub async fn get_fuel(&self, fuel_id: FuelId) -> Result<FuelRecord, ClientError> {
        let url = format!("{}/v1/fuel/{fuel_id}", self.base_url);

        let response = self.authorized(self.client.get(&url)).send().await?;

        self.handle_response(response).await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("x-admin-key", &self.admin_key)
            .header("x-admin-id", &self.admin_id)
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        let Ok(api_error) = error_body else {
            return Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            });
        };

        let body = api_error.error;
        tracing::debug!(status = %status, code = %body.code, "API error response");

        // Map specific error codes to typed errors
        let typed = match body.code.as_str() {
            "validation_error" => Some(ClientError::Validation(body.message.clone())),
            "persistence_error" => Some(ClientError::Persistence(body.message.clone())),
            "not_found" => body
                .details
                .clone()
                .and_then(|d| serde_json::from_value::<FuelNotFoundDetails>(d).ok())
                .map(|d| ClientError::FuelNotFound { fuel_id: d.fuel_id }),
            "insufficient_stock" => body
                .details
                .clone()
                .and_then(|d| serde_json::from_value::<InsufficientStockDetails>(d).ok())
                .map(|d| ClientError::InsufficientStock {
                    fuel_id: d.fuel_id,
                    requested: d.requested,
                    available: d.available,
                }),
            _ => None,
        };

        Err(typed.unwrap_or(ClientError::Api {
            code: body.code,
            message: body.message,
            status: status.as_u16(),
        }))
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// Name the service logs this caller under.
    pub admin_id: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            admin_id: "admin".to_string(),
        }
    }
}

impl ClientOptions {
    /// Create options with a caller name.
    #[must_use]
    pub fn with_admin_id(name: impl Into<String>) -> Self {
        Self {
            admin_id: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = FuelPosClient::new("http://localhost:8080", "test-admin-key").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.admin_id, "admin");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = FuelPosClient::new("http://localhost:8080/", "test-admin-key").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn client_options() {
        let options = ClientOptions::with_admin_id("till-3");
        let client = FuelPosClient::with_options("http://localhost:8080", "key", options).unwrap();
        assert_eq!(client.admin_id, "till-3");
    }
}
