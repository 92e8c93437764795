//! Domain error taxonomy for ending allocation.

use crate::error::AppError;

/// Failures of the allocation and manual reservation paths.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    /// The same manual ending appears more than once in one request.
    #[error("Link ending {ending} appears more than once in the request")]
    DuplicateInRequest { ending: String },

    /// A requested manual ending is already taken by a stored link.
    #[error("Link ending {ending} already exists")]
    EndingAlreadyExists { ending: String },

    /// Generation could not produce enough unique endings within its budget.
    #[error("Could not allocate {requested} link endings (allocated {allocated})")]
    Exhausted { requested: usize, allocated: usize },

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] AppError),
}
