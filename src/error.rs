//! Error type shared by every table variant.

use thiserror::Error;

/// Failures reported by construction, cursors and ordered accessors.
///
/// Absence of a key is never an error; lookups report it as `None`.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// Requested capacity, or entry count for a reservation, exceeds what
    /// the largest power-of-two table can hold.
    #[error("requested capacity is too large: {requested} (max {max})")]
    InvalidCapacity {
        /// Capacity the caller asked for
        requested: usize,
        /// Largest supported table capacity
        max: usize,
    },

    /// Load factor outside the open interval (0, 1).
    #[error("load factor must be > 0 and < 1: {load_factor}")]
    InvalidLoadFactor {
        /// Rejected load factor
        load_factor: f32,
    },

    /// `Cursor::remove` without a preceding `next`, or twice for one entry.
    #[error("next must be called before remove")]
    NoCurrentEntry,

    /// Positional access past the end of an ordered table.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Requested position
        index: usize,
        /// Number of ordered entries
        len: usize,
    },
}

impl Error {
    pub fn invalid_capacity(requested: usize) -> Self {
        Self::InvalidCapacity {
            requested,
            max: crate::config::MAX_CAPACITY,
        }
    }

    pub fn invalid_load_factor(load_factor: f32) -> Self {
        Self::InvalidLoadFactor { load_factor }
    }

    pub fn out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
