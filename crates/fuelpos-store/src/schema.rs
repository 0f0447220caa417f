//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Fuel records, keyed by big-endian `fuel_id`.
    pub const FUELS: &str = "fuels";

    /// Sale records, keyed by `sale_id` (ULID).
    pub const SALES: &str = "sales";

    /// Index: sales by fuel, keyed by `fuel_id || sale_id`.
    /// Value is empty (index only).
    pub const SALES_BY_FUEL: &str = "sales_by_fuel";

    /// Counters and other bookkeeping.
    pub const META: &str = "meta";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::FUELS, cf::SALES, cf::SALES_BY_FUEL, cf::META]
}
