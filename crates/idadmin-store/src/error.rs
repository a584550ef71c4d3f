//! Store-side constraint violations.

use thiserror::Error;

/// Why the store refused a staged change.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The key is already taken.
    #[error("{table} already contains {key}")]
    Duplicate {
        /// Table name.
        table: &'static str,
        /// Offending key.
        key: String,
    },

    /// The row does not exist.
    #[error("{table} has no row {key}")]
    Missing {
        /// Table name.
        table: &'static str,
        /// Missing key.
        key: String,
    },
}
