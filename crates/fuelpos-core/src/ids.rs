//! Identifier types.
//!
//! Fuel types keep the integer keys they have always had; sales use ULIDs so
//! that ledger keys sort chronologically.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use ulid::{Generator, Ulid};

/// A fuel type identifier.
///
/// Always strictly positive. Raw ids coming from requests are checked with
/// [`FuelId::new`] or the `TryFrom` impls before they reach storage.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct FuelId(u64);

impl FuelId {
    /// Create a fuel id, rejecting zero.
    ///
    /// # Errors
    ///
    /// Returns `IdError::NotPositive` for `0`.
    pub const fn new(raw: u64) -> Result<Self, IdError> {
        if raw == 0 {
            return Err(IdError::NotPositive);
        }
        Ok(Self(raw))
    }

    /// Return the raw integer value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Big-endian bytes, so that byte order matches numeric order.
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Decode from big-endian bytes.
    ///
    /// # Errors
    ///
    /// Returns `IdError::NotPositive` if the bytes encode `0`.
    pub const fn from_be_bytes(bytes: [u8; 8]) -> Result<Self, IdError> {
        Self::new(u64::from_be_bytes(bytes))
    }
}

impl TryFrom<u64> for FuelId {
    type Error = IdError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for FuelId {
    type Error = IdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map_err(|_| IdError::NotPositive)
            .and_then(Self::new)
    }
}

impl From<FuelId> for u64 {
    fn from(id: FuelId) -> Self {
        id.0
    }
}

impl FromStr for FuelId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s.trim().parse().map_err(|_| IdError::InvalidNumber)?;
        Self::try_from(raw)
    }
}

impl fmt::Debug for FuelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FuelId({})", self.0)
    }
}

impl fmt::Display for FuelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A sale identifier using ULID for time-ordering.
///
/// Ledger entries are keyed by this id. Ids handed out by one
/// [`SaleIdSequence`] strictly increase, so iterating the ledger in key order
/// walks it in the order sales were recorded.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SaleId(Ulid);

impl SaleId {
    /// Return the bytes of the ULID (16 bytes).
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }

    /// Create a `SaleId` from bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Ulid::from_bytes(bytes))
    }
}

impl FromStr for SaleId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid = Ulid::from_string(s).map_err(|_| IdError::InvalidUlid)?;
        Ok(Self(ulid))
    }
}

impl fmt::Debug for SaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SaleId({})", self.0)
    }
}

impl fmt::Display for SaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SaleId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SaleId> for String {
    fn from(id: SaleId) -> Self {
        id.0.to_string()
    }
}

/// Issues strictly increasing [`SaleId`]s.
///
/// Ids minted in the same millisecond, or after the clock steps back, are the
/// previous id plus one, so they still sort after everything issued before.
#[derive(Default)]
pub struct SaleIdSequence {
    state: Mutex<SequenceState>,
}

#[derive(Default)]
struct SequenceState {
    generator: Generator,
    last: Option<Ulid>,
}

impl SaleIdSequence {
    /// A sequence whose first id sorts after `last`.
    #[must_use]
    pub fn starting_after(last: Option<SaleId>) -> Self {
        Self {
            state: Mutex::new(SequenceState {
                generator: Generator::new(),
                last: last.map(|id| id.0),
            }),
        }
    }

    /// The next id.
    ///
    /// # Errors
    ///
    /// Returns `IdError::SequenceExhausted` if a millisecond runs out of ids.
    pub fn next_id(&self) -> Result<SaleId, IdError> {
        // The state is a pair of ulids; a panic elsewhere can't leave it torn.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = state
            .generator
            .generate()
            .map_err(|_| IdError::SequenceExhausted)?;
        if let Some(last) = state.last {
            if next <= last {
                next = last.increment().ok_or(IdError::SequenceExhausted)?;
            }
        }

        state.last = Some(next);
        Ok(SaleId(next))
    }
}

impl fmt::Debug for SaleIdSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaleIdSequence").finish_non_exhaustive()
    }
}

/// Errors from parsing or issuing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The identifier is zero or negative.
    #[error("identifier must be a positive integer")]
    NotPositive,

    /// The input is not an integer.
    #[error("identifier is not a number")]
    InvalidNumber,

    /// The input is not a valid ULID.
    #[error("invalid ULID format")]
    InvalidUlid,

    /// No more sale ids can be issued this millisecond.
    #[error("sale id sequence exhausted")]
    SequenceExhausted,
}
