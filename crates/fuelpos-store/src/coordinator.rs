//! The sale transaction coordinator.
//!
//! The only writer of sale records and the only caller of the guarded
//! decrement. Each call walks one request through
//! `Validated -> StockReserved -> Recorded`, or stops in `Rejected` (nothing
//! written) or `RolledBack` (reservation undone after a storage failure).

use std::collections::HashMap;
use std::sync::Arc;

use fuelpos_core::{
    FuelId, PosError, Principal, SaleReceipt, SaleRecord, SaleRequest, SaleState, SaleView,
};

use crate::{SaleUnit, Store};

/// Default page size for [`SaleCoordinator::list_recent_sales`].
pub const DEFAULT_RECENT_SALES: usize = 100;

/// Largest page [`SaleCoordinator::list_recent_sales`] will return.
pub const MAX_RECENT_SALES: usize = 200;

/// Records sales against a [`Store`].
pub struct SaleCoordinator<S> {
    store: Arc<S>,
}

impl<S> Clone for SaleCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> SaleCoordinator<S> {
    /// Create a coordinator over a shared store handle.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store, for read-only projections.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a sale: reserve stock at the current price and append the
    /// ledger entry, as one atomic unit.
    ///
    /// Not idempotent: calling it twice with the same request sells twice.
    ///
    /// # Errors
    ///
    /// - `PosError::Validation` for a malformed request (storage untouched).
    ///   A total too large to represent is only known once the price is read;
    ///   that reservation is discarded and the request logged as rejected.
    /// - `PosError::NotFound` if the fuel doesn't exist.
    /// - `PosError::InsufficientStock` if the stock can't cover the quantity.
    /// - `PosError::Persistence` if storage failed; the reservation has been
    ///   rolled back and the request may be retried.
    pub fn record_sale(
        &self,
        principal: &Principal,
        request: &SaleRequest,
    ) -> Result<SaleReceipt, PosError> {
        let sale = request.validate().map_err(|err| {
            tracing::debug!(
                principal = %principal.subject,
                state = %SaleState::Rejected,
                error = %err,
                "Sale rejected"
            );
            err
        })?;

        tracing::debug!(
            principal = %principal.subject,
            fuel_id = %sale.fuel_id,
            quantity = %sale.quantity,
            state = %SaleState::Validated,
            "Recording sale"
        );

        let mut unit = self.store.begin()?;

        let reservation = match unit.decrement_if_sufficient(sale.fuel_id, sale.quantity) {
            Ok(reservation) => reservation,
            Err(err) => {
                // Nothing was written; dropping the unit releases the row lock.
                drop(unit);
                let err = PosError::from(err);
                tracing::info!(
                    principal = %principal.subject,
                    fuel_id = %sale.fuel_id,
                    quantity = %sale.quantity,
                    state = %SaleState::Rejected,
                    error = %err,
                    "Sale rejected"
                );
                return Err(err);
            }
        };

        tracing::debug!(
            fuel_id = %sale.fuel_id,
            price_per_unit = %reservation.price_at_time,
            new_stock = %reservation.new_stock,
            state = %SaleState::StockReserved,
            "Stock reserved"
        );

        // Issued under the row lock, so sales of one fuel get ids in commit order.
        let sale_id = match self.store.next_sale_id() {
            Ok(sale_id) => sale_id,
            Err(err) => return Err(Self::roll_back(unit, principal, &sale.fuel_id, err.into())),
        };

        let record = match SaleRecord::from_reservation(sale_id, &sale, &reservation) {
            Ok(record) => record,
            Err(err) => {
                // Only the decrement is pending; dropping the unit discards it.
                drop(unit);
                tracing::info!(
                    principal = %principal.subject,
                    fuel_id = %sale.fuel_id,
                    quantity = %sale.quantity,
                    price_per_unit = %reservation.price_at_time,
                    state = %SaleState::Rejected,
                    error = %err,
                    "Sale rejected"
                );
                return Err(err);
            }
        };

        if let Err(err) = unit.append_sale(&record) {
            return Err(Self::roll_back(unit, principal, &sale.fuel_id, err.into()));
        }

        if let Err(err) = unit.commit() {
            // A failed commit applies nothing.
            let err = PosError::from(err);
            tracing::error!(
                principal = %principal.subject,
                fuel_id = %sale.fuel_id,
                sale_id = %record.id,
                state = %SaleState::RolledBack,
                error = %err,
                "Sale commit failed"
            );
            return Err(err);
        }

        tracing::info!(
            principal = %principal.subject,
            fuel_id = %record.fuel_id,
            sale_id = %record.id,
            quantity = %record.quantity,
            price_per_unit = %record.price_per_unit,
            total_amount = %record.total_amount,
            new_stock = %reservation.new_stock,
            state = %SaleState::Recorded,
            "Sale recorded"
        );

        Ok(record.receipt())
    }

    /// The most recent sales, newest first, each with the fuel's current label.
    ///
    /// `limit` is clamped to [`MAX_RECENT_SALES`]. A sale whose fuel has been
    /// deleted is still listed, with no label. Never mutates anything.
    ///
    /// # Errors
    ///
    /// Returns `PosError::Persistence` if the ledger can't be read.
    pub fn list_recent_sales(&self, limit: usize) -> Result<Vec<SaleView>, PosError> {
        let sales = self.store.list_sales(limit.min(MAX_RECENT_SALES), 0)?;

        let mut labels: HashMap<FuelId, Option<String>> = HashMap::new();
        let mut views = Vec::with_capacity(sales.len());
        for sale in sales {
            let fuel_type = match labels.get(&sale.fuel_id) {
                Some(label) => label.clone(),
                None => {
                    let label = self.store.get_fuel(sale.fuel_id)?.map(|f| f.fuel_type);
                    labels.insert(sale.fuel_id, label.clone());
                    label
                }
            };
            views.push(SaleView { sale, fuel_type });
        }

        Ok(views)
    }

    /// Undo a reservation and report why.
    fn roll_back(
        unit: S::Unit<'_>,
        principal: &Principal,
        fuel_id: &FuelId,
        cause: PosError,
    ) -> PosError {
        if let Err(err) = unit.rollback() {
            // The transaction is discarded when dropped, so the stock is
            // restored even if the explicit rollback reports a failure.
            tracing::warn!(error = %err, "Explicit rollback failed");
        }

        tracing::error!(
            principal = %principal.subject,
            fuel_id = %fuel_id,
            state = %SaleState::RolledBack,
            error = %cause,
            "Sale rolled back"
        );

        cause
    }
}
