//! Key encoding utilities for `RocksDB`.
//!
//! Fuel ids are stored big-endian so that byte order is numeric order; sale
//! ids are ULIDs so that byte order is time order.

use fuelpos_core::{FuelId, SaleId};

/// Key of the fuel id sequence in the `meta` column family.
pub const FUEL_SEQUENCE_KEY: &[u8] = b"fuel_seq";

/// Create a fuel key from a fuel ID.
#[must_use]
pub fn fuel_key(fuel_id: FuelId) -> [u8; 8] {
    fuel_id.to_be_bytes()
}

/// Create a sale key from a sale ID.
#[must_use]
pub fn sale_key(sale_id: &SaleId) -> [u8; 16] {
    sale_id.to_bytes()
}

/// Decode a sale key.
///
/// Returns `None` if the key is not 16 bytes long.
#[must_use]
pub fn decode_sale_key(key: &[u8]) -> Option<SaleId> {
    let bytes: [u8; 16] = key.try_into().ok()?;
    Some(SaleId::from_bytes(bytes))
}

/// Create a fuel-sale index key.
///
/// Format: `fuel_id (8 bytes, big-endian) || sale_id (16 bytes)`
#[must_use]
pub fn fuel_sale_key(fuel_id: FuelId, sale_id: &SaleId) -> Vec<u8> {
    let mut key = Vec::with_capacity(24);
    key.extend_from_slice(&fuel_key(fuel_id));
    key.extend_from_slice(&sale_key(sale_id));
    key
}

/// The prefix shared by every index key of one fuel.
#[must_use]
pub fn fuel_sales_prefix(fuel_id: FuelId) -> [u8; 8] {
    fuel_key(fuel_id)
}

/// The largest possible index key of one fuel, used to seek backwards.
#[must_use]
pub fn fuel_sales_upper_bound(fuel_id: FuelId) -> Vec<u8> {
    let mut key = Vec::with_capacity(24);
    key.extend_from_slice(&fuel_key(fuel_id));
    key.extend_from_slice(&[0xff; 16]);
    key
}

/// Extract the sale ID from a fuel-sale index key.
///
/// Returns `None` if the key is not 24 bytes long.
#[must_use]
pub fn extract_sale_id_from_fuel_key(key: &[u8]) -> Option<SaleId> {
    let bytes: [u8; 16] = key.get(8..24)?.try_into().ok()?;
    Some(SaleId::from_bytes(bytes))
}
