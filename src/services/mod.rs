//! Request-level operations shared by the HTTP handlers.
//!
//! Handlers stay thin: they extract input, call into here, and shape the
//! response. Everything here is async and pushes redb work onto the blocking
//! pool through [`crate::db::with_db`].

pub mod collections;
pub mod mantras;
pub mod messages;
pub mod users;

use crate::error::{AppError, Result};

/// Outcome of an idempotent "add" on a unique relation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The row was written by this call
    Inserted,
    /// The row was already present (seen by the pre-check or by the store)
    AlreadyPresent,
}

impl Insertion {
    pub fn already_exists(self) -> bool {
        self == Insertion::AlreadyPresent
    }
}

/// Interpret the result of a store insert that followed a negative pre-check
///
/// A uniqueness violation here means a concurrent request inserted the same
/// row between the check and the insert; the state the caller asked for
/// holds, so it is reported as `AlreadyPresent` rather than as an error.
pub(crate) fn resolve_insert(result: Result<()>) -> Result<Insertion> {
    match result {
        Ok(()) => Ok(Insertion::Inserted),
        Err(AppError::UniqueViolation(table)) => {
            tracing::info!("Concurrent insert won the race on {}", table);
            Ok(Insertion::AlreadyPresent)
        }
        Err(e) => Err(e),
    }
}
