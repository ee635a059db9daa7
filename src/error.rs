//! Error types for fallible vector operations.
//!
//! Hand-rolled, not built on `thiserror`/`anyhow`, matching how the teacher
//! crate's own dependency-free data structures surface errors (see
//! `pile.rs`'s `LoadError`/`InsertError`).

use std::fmt;

/// Returned by any operation given an index outside `0..len` (or, for
/// `slice`, a range outside `0..=len`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds {
    pub index: usize,
    pub len: usize,
}

impl fmt::Display for OutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index {} out of bounds for vector of length {}",
            self.index, self.len
        )
    }
}

impl std::error::Error for OutOfBounds {}
