//! Errors reported for invalid positions.
//!
//! Lookups and insertions never fail: a missing value is reported as the end
//! position or `None`, a duplicate insertion as `false`. Only erasure needs a
//! position that names a live element, and the `try_*` variants report the
//! violation with this error instead of panicking.

use thiserror::Error;

/// Errors that can occur when erasing by position or by range.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The end position does not refer to a value.
    #[error("the end position does not refer to a value")]
    EndPosition,

    /// The value the position referred to has been erased.
    ///
    /// Positions stay valid across unrelated insertions and erasures, but not
    /// across erasure of the tree node they refer to or across `clear`.
    /// A position taken from a different set is stale as well.
    #[error("the position refers to an erased value")]
    StalePosition,

    /// The last position of a range lies before its first position.
    #[error("the range ends before it starts")]
    ReversedRange,
}

/// A Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;
