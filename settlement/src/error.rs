//! Error types for the settlement engine

use crate::types::ParticipantId;
use thiserror::Error;

/// Result type for settlement operations
pub type Result<T> = std::result::Result<T, Error>;

/// Settlement errors
#[derive(Error, Debug)]
pub enum Error {
    /// Net balances do not sum to zero, so no full settlement exists
    #[error("Unbalanced input: net balances sum to {total}, expected 0")]
    UnbalancedInput {
        /// Signed sum of all net balances
        total: i64,
    },

    /// Exactly one participant has a nonzero balance and cannot be paired
    #[error("Single leftover balance: participant {id} has net {net} with no counterparty")]
    SingleLeftover {
        /// Participant left over
        id: ParticipantId,
        /// Its net balance
        net: i64,
    },

    /// Well-formed input but the search found no all-zero state
    #[error("Unsolvable: search exhausted without settling all balances")]
    Unsolvable,

    /// Search exceeded its node budget
    #[error("Search budget exceeded after exploring {explored} states")]
    SearchBudgetExceeded {
        /// States visited before giving up
        explored: u64,
    },

    /// Too many nonzero balances for exhaustive search
    #[error("Too many participants: {count} nonzero balances (max {max})")]
    TooManyParticipants {
        /// Nonzero balances in the request
        count: usize,
        /// Configured ceiling
        max: usize,
    },

    /// Same participant listed twice
    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(ParticipantId),

    /// Arithmetic overflow while summing or scaling amounts
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    /// Amount cannot be expressed in whole settlement units
    #[error("Non-integral amount: {0}")]
    NonIntegralAmount(String),

    /// Malformed caller input (negative expense, zero buy-in size, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Leftover pool error
    #[error("Leftover error: {0}")]
    Leftover(String),

    /// Produced plan does not settle the input (internal bug)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error stems from caller data rather than an internal fault
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::UnbalancedInput { .. }
                | Error::SingleLeftover { .. }
                | Error::DuplicateParticipant(_)
                | Error::NonIntegralAmount(_)
                | Error::InvalidInput(_)
                | Error::TooManyParticipants { .. }
        )
    }
}
