use std::collections::TryReserveError;

use thiserror::Error;

use crate::MAX_BIT_DEPTH;

/// Errors that can occur when creating or mutating an occupancy trie.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller asked for a bit depth outside the supported range.
    ///
    /// A depth of zero would describe an empty id space, and anything above
    /// [`MAX_BIT_DEPTH`] would overflow the `u64` id arithmetic.
    #[error("bit depth must be in 1..={MAX_BIT_DEPTH}, got {bit_depth}")]
    InvalidBitDepth {
        /// The rejected bit depth.
        bit_depth: u32,
    },

    /// A reserve targeted an id inside a region that is already fully
    /// occupied.
    #[error("id {id} lies in a region that is already occupied")]
    RegionOccupied {
        /// The targeted id, after masking to the trie's bit depth.
        id: u64,
    },

    /// A release targeted an id inside a region that is already fully
    /// vacant.
    #[error("id {id} lies in a region that is already vacant")]
    RegionVacant {
        /// The targeted id, after masking to the trie's bit depth.
        id: u64,
    },

    /// Node storage could not be grown mid-descent.
    ///
    /// Status bits already updated along the visited part of the path are
    /// not rolled back.
    #[error("failed to grow trie node storage")]
    AllocationFailed(#[from] TryReserveError),
}

/// A specialized `Result` type for occupancy trie operations, returning the
/// crate's [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
