//! Authenticated principal context.

use serde::{Deserialize, Serialize};

/// The already-authorized caller of an operation.
///
/// Opaque to the sale path: it is carried along for logging only, the
/// decision to let the caller in has been made before it gets here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Who the caller is (admin id, JWT subject).
    pub subject: String,
}

impl Principal {
    /// Create a principal for the given subject.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}
