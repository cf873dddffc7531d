//! Error taxonomy shared by the store and the booking workflow.

use thiserror::Error;

use crate::models::TicketId;

/// Rejected user input. Never fatal: the caller re-prompts or drops the
/// single operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Passenger name was blank.
    #[error("passenger name cannot be empty")]
    EmptyName,
    /// Age outside `1..=120`.
    #[error("invalid age {0}: age must be between 1 and 120")]
    InvalidAge(u32),
    /// Train number was blank.
    #[error("train number cannot be empty")]
    EmptyTrainNumber,
    /// Base fare was zero, negative or not a finite number.
    #[error("fare must be greater than 0 (got {0})")]
    InvalidFare(f64),
    /// Ticket type selection was neither Sleeper nor AC.
    #[error("invalid ticket type '{0}': select 1 (Sleeper) or 2 (AC)")]
    InvalidTicketClass(String),
    /// Ticket id prompt was blank.
    #[error("ticket id cannot be empty")]
    EmptyTicketId,
    /// Raw text that does not parse as the expected primitive.
    #[error("'{input}' is not a valid {field}")]
    Malformed {
        /// Name of the field being parsed.
        field: &'static str,
        /// The offending raw input.
        input: String,
    },
}

/// Failures reported by [`TicketStore`](crate::store::TicketStore).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A ticket with this id is already held.
    #[error("ticket {0} is already in the store")]
    DuplicateId(TicketId),
    /// No ticket matches the requested id.
    #[error("ticket {0} not found")]
    NotFound(String),
    /// The ticket id sequence has no successor left.
    #[error("ticket id sequence exhausted")]
    IdsExhausted,
}

/// Errors surfaced by [`BookingDesk`](crate::booking::BookingDesk) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookingError {
    /// The request was rejected before any state changed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Lookup or cancellation of an unknown id.
    #[error("ticket not found with id {id}")]
    NotFound {
        /// The id as supplied by the caller.
        id: String,
    },
    /// Internal bookkeeping broke an invariant: a duplicate id or an
    /// exhausted id sequence.
    #[error("invariant violated: {0}")]
    InvariantViolation(StoreError),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => BookingError::NotFound { id },
            broken @ (StoreError::DuplicateId(_) | StoreError::IdsExhausted) => {
                BookingError::InvariantViolation(broken)
            }
        }
    }
}
