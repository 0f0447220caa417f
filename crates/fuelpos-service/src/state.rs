//! Application state.

use std::sync::Arc;

use fuelpos_store::{RocksStore, SaleCoordinator};

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend, for inventory administration and reads.
    pub store: Arc<RocksStore>,

    /// The only path through which sales are written.
    pub sales: SaleCoordinator<RocksStore>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<RocksStore>, config: ServiceConfig) -> Self {
        if config.admin_api_key.is_none() && config.jwt_secret.is_none() {
            tracing::warn!("Neither ADMIN_API_KEY nor JWT_SECRET set - all /v1 requests will be rejected");
        }

        let sales = SaleCoordinator::new(Arc::clone(&store));

        Self {
            store,
            sales,
            config,
        }
    }
}
