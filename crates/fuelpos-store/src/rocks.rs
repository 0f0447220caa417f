//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait,
//! backed by a pessimistic `TransactionDB`. Writes that read-modify-write a
//! fuel row take an exclusive lock on that row only, so sales of different
//! fuels never wait on each other.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, Direction, ErrorKind, IteratorMode, MultiThreaded,
    Options, Transaction, TransactionDB, TransactionDBOptions, TransactionOptions, WriteOptions,
};
use rust_decimal::Decimal;

use fuelpos_core::{
    FuelId, FuelRecord, FuelUpdate, NewFuel, SaleId, SaleIdSequence, SaleRecord, StockReservation,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{SaleUnit, Store};

/// Default time a unit waits for a row lock before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(2000);

type Db = TransactionDB<MultiThreaded>;

/// Tuning knobs for [`RocksStore`].
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// How long a transaction waits for a row lock.
    pub lock_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

impl StoreOptions {
    fn lock_timeout_ms(&self) -> i64 {
        i64::try_from(self.lock_timeout.as_millis()).unwrap_or(i64::MAX)
    }
}

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Db,
    options: StoreOptions,
    sale_ids: SaleIdSequence,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open or create a database with explicit options.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open_with<P: AsRef<Path>>(path: P, options: StoreOptions) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let mut txn_db_opts = TransactionDBOptions::default();
        txn_db_opts.set_txn_lock_timeout(options.lock_timeout_ms());
        txn_db_opts.set_default_lock_timeout(options.lock_timeout_ms());

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = Db::open_cf_descriptors(&opts, &txn_db_opts, path, cf_descriptors)
            .map_err(db_error)?;

        let mut store = Self {
            db,
            options,
            sale_ids: SaleIdSequence::default(),
        };
        let latest = store.latest_sale_id()?;
        store.sale_ids = SaleIdSequence::starting_after(latest);

        tracing::debug!(
            lock_timeout_ms = options.lock_timeout_ms(),
            latest_sale_id = ?latest,
            "Opened fuel store"
        );

        Ok(store)
    }

    /// The id of the newest stored sale, if any.
    fn latest_sale_id(&self) -> Result<Option<SaleId>> {
        let cf = self.cf(cf::SALES)?;
        let Some(item) = self.db.iterator_cf(&cf, IteratorMode::End).next() else {
            return Ok(None);
        };

        let (key, _) = item.map_err(db_error)?;
        keys::decode_sale_key(&key)
            .map(Some)
            .ok_or_else(|| StoreError::Serialization("malformed sale key".into()))
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Start a pessimistic transaction with the configured lock timeout.
    fn transaction(&self) -> Transaction<'_, Db> {
        let mut txn_opts = TransactionOptions::default();
        txn_opts.set_lock_timeout(self.options.lock_timeout_ms());
        txn_opts.set_deadlock_detect(true);
        self.db.transaction_opt(&WriteOptions::default(), &txn_opts)
    }

    /// Read a fuel row and lock it until `txn` ends.
    fn lock_fuel(&self, txn: &Transaction<'_, Db>, fuel_id: FuelId) -> Result<FuelRecord> {
        let cf = self.cf(cf::FUELS)?;
        let data = txn
            .get_for_update_cf(&cf, keys::fuel_key(fuel_id), true)
            .map_err(db_error)?
            .ok_or(StoreError::FuelNotFound { fuel_id })?;
        deserialize(&data)
    }

    /// Write a fuel row inside `txn`.
    fn write_fuel(&self, txn: &Transaction<'_, Db>, fuel: &FuelRecord) -> Result<()> {
        let cf = self.cf(cf::FUELS)?;
        txn.put_cf(&cf, keys::fuel_key(fuel.id), serialize(fuel)?).map_err(db_error)
    }

    /// Allocate the next fuel id inside `txn`.
    fn next_fuel_id(&self, txn: &Transaction<'_, Db>) -> Result<FuelId> {
        let cf = self.cf(cf::META)?;
        let current = txn
            .get_for_update_cf(&cf, keys::FUEL_SEQUENCE_KEY, true)
            .map_err(db_error)?
            .map(|data| {
                <[u8; 8]>::try_from(data.as_slice())
                    .map(u64::from_be_bytes)
                    .map_err(|_| StoreError::Serialization("corrupt fuel sequence".into()))
            })
            .transpose()?
            .unwrap_or(0);

        let next = current
            .checked_add(1)
            .ok_or_else(|| StoreError::Database("fuel id sequence exhausted".into()))?;
        txn.put_cf(&cf, keys::FUEL_SEQUENCE_KEY, next.to_be_bytes()).map_err(db_error)?;

        FuelId::new(next).map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl Store for RocksStore {
    type Unit<'a> = RocksUnit<'a>;

    // =========================================================================
    // Inventory Operations
    // =========================================================================

    fn get_fuel(&self, fuel_id: FuelId) -> Result<Option<FuelRecord>> {
        let cf = self.cf(cf::FUELS)?;

        self.db
            .get_cf(&cf, keys::fuel_key(fuel_id))
            .map_err(db_error)?
            .map(|data| deserialize(&data))
            .transpose()
    }

    fn list_fuels(&self) -> Result<Vec<FuelRecord>> {
        let cf = self.cf(cf::FUELS)?;

        self.db
            .iterator_cf(&cf, IteratorMode::Start)
            .map(|item| {
                let (_, value) = item.map_err(db_error)?;
                deserialize(&value)
            })
            .collect()
    }

    fn create_fuel(&self, fuel: &NewFuel) -> Result<FuelRecord> {
        fuel.validate()?;

        let txn = self.transaction();
        let fuel_id = self.next_fuel_id(&txn)?;
        let record = FuelRecord::new(fuel_id, fuel);
        self.write_fuel(&txn, &record)?;
        txn.commit().map_err(db_error)?;

        tracing::info!(
            fuel_id = %record.id,
            fuel_type = %record.fuel_type,
            price_per_unit = %record.price_per_unit,
            stock_quantity = %record.stock_quantity,
            "Fuel created"
        );

        Ok(record)
    }

    fn update_fuel(&self, fuel_id: FuelId, update: &FuelUpdate) -> Result<FuelRecord> {
        update.validate()?;

        let txn = self.transaction();
        let mut fuel = self.lock_fuel(&txn, fuel_id)?;
        fuel.apply(update);
        self.write_fuel(&txn, &fuel)?;
        txn.commit().map_err(db_error)?;

        tracing::info!(
            fuel_id = %fuel_id,
            price_per_unit = %fuel.price_per_unit,
            stock_quantity = %fuel.stock_quantity,
            "Fuel updated"
        );

        Ok(fuel)
    }

    fn delete_fuel(&self, fuel_id: FuelId) -> Result<()> {
        let cf = self.cf(cf::FUELS)?;

        let txn = self.transaction();
        self.lock_fuel(&txn, fuel_id)?;
        txn.delete_cf(&cf, keys::fuel_key(fuel_id)).map_err(db_error)?;
        txn.commit().map_err(db_error)?;

        tracing::info!(fuel_id = %fuel_id, "Fuel deleted");

        Ok(())
    }

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    fn get_sale(&self, sale_id: &SaleId) -> Result<Option<SaleRecord>> {
        let cf = self.cf(cf::SALES)?;

        self.db
            .get_cf(&cf, keys::sale_key(sale_id))
            .map_err(db_error)?
            .map(|data| deserialize(&data))
            .transpose()
    }

    fn list_sales(&self, limit: usize, offset: usize) -> Result<Vec<SaleRecord>> {
        let cf = self.cf(cf::SALES)?;

        // Sale ids strictly increase, so iterating from the end walks newest first.
        self.db
            .iterator_cf(&cf, IteratorMode::End)
            .skip(offset)
            .take(limit)
            .map(|item| {
                let (_, value) = item.map_err(db_error)?;
                deserialize(&value)
            })
            .collect()
    }

    fn list_sales_by_fuel(
        &self,
        fuel_id: FuelId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SaleRecord>> {
        let cf_by_fuel = self.cf(cf::SALES_BY_FUEL)?;
        let prefix = keys::fuel_sales_prefix(fuel_id);
        let upper = keys::fuel_sales_upper_bound(fuel_id);

        let iter = self.db.iterator_cf(&cf_by_fuel, IteratorMode::From(&upper, Direction::Reverse));

        let wanted = offset.saturating_add(limit);
        let mut sale_ids = Vec::new();
        for item in iter {
            if sale_ids.len() >= wanted {
                break;
            }
            let (key, _) = item.map_err(db_error)?;

            if !key.starts_with(&prefix) {
                break;
            }

            let sale_id = keys::extract_sale_id_from_fuel_key(&key)
                .ok_or_else(|| StoreError::Serialization("malformed sales index key".into()))?;
            sale_ids.push(sale_id);
        }

        let mut sales = Vec::with_capacity(sale_ids.len().saturating_sub(offset));
        for sale_id in sale_ids.into_iter().skip(offset) {
            if let Some(sale) = self.get_sale(&sale_id)? {
                sales.push(sale);
            }
        }

        Ok(sales)
    }

    fn next_sale_id(&self) -> Result<SaleId> {
        self.sale_ids.next_id().map_err(|e| StoreError::Database(e.to_string()))
    }

    // =========================================================================
    // Atomic Unit
    // =========================================================================

    fn begin(&self) -> Result<RocksUnit<'_>> {
        Ok(RocksUnit {
            store: self,
            txn: self.transaction(),
        })
    }
}

/// A sale unit backed by one `RocksDB` transaction.
///
/// Row locks taken by the unit are held until it commits, rolls back or is
/// dropped. Dropping without a commit discards all of its writes.
pub struct RocksUnit<'a> {
    store: &'a RocksStore,
    txn: Transaction<'a, Db>,
}

impl SaleUnit for RocksUnit<'_> {
    fn decrement_if_sufficient(
        &mut self,
        fuel_id: FuelId,
        quantity: Decimal,
    ) -> Result<StockReservation> {
        let mut fuel = self.store.lock_fuel(&self.txn, fuel_id)?;
        let reservation = fuel.reserve(quantity)?;
        self.store.write_fuel(&self.txn, &fuel)?;
        Ok(reservation)
    }

    fn append_sale(&mut self, sale: &SaleRecord) -> Result<()> {
        let cf_sales = self.store.cf(cf::SALES)?;
        let cf_by_fuel = self.store.cf(cf::SALES_BY_FUEL)?;
        let sale_key = keys::sale_key(&sale.id);

        // Entries are never overwritten.
        if self
            .txn
            .get_for_update_cf(&cf_sales, sale_key, true)
            .map_err(db_error)?
            .is_some()
        {
            return Err(StoreError::Database(format!("sale {} already recorded", sale.id)));
        }

        self.txn
            .put_cf(&cf_sales, sale_key, serialize(sale)?)
            .map_err(db_error)?;
        self.txn
            .put_cf(&cf_by_fuel, keys::fuel_sale_key(sale.fuel_id, &sale.id), [])
            .map_err(db_error)?;

        Ok(())
    }

    fn commit(self) -> Result<()> {
        self.txn.commit().map_err(db_error)
    }

    fn rollback(self) -> Result<()> {
        self.txn.rollback().map_err(db_error)
    }
}

/// Map a `RocksDB` error, separating lock contention from hard failures.
fn db_error(err: rocksdb::Error) -> StoreError {
    match err.kind() {
        ErrorKind::TimedOut | ErrorKind::Busy | ErrorKind::TryAgain | ErrorKind::Expired => {
            StoreError::Contention(err.to_string())
        }
        _ => StoreError::Database(err.to_string()),
    }
}

/// Serialize a value using CBOR.
fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

/// Deserialize a value from CBOR.
fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
    ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
}
