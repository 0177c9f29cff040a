//! Error types for the ledger

use crate::types::{AccountId, Amount};
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Debit exceeds the source account's balance
    #[error("Insufficient balance on {account}: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Account being debited
        account: AccountId,
        /// Balance at the time of the call
        available: Amount,
        /// Requested amount
        requested: Amount,
    },

    /// Delegated transfer exceeds the remaining allowance
    #[error(
        "Insufficient allowance from {owner} to {spender}: available {available}, requested {requested}"
    )]
    InsufficientAllowance {
        /// Owner of the funds
        owner: AccountId,
        /// Spender acting on the owner's behalf
        spender: AccountId,
        /// Remaining allowance at the time of the call
        available: Amount,
        /// Requested amount
        requested: Amount,
    },

    /// Addition would exceed `Amount::MAX`
    #[error("Arithmetic overflow")]
    Overflow,

    /// Caller is not permitted to mint
    #[error("Unauthorized: {0} may not mint")]
    Unauthorized(AccountId),

    /// Invariant violation (conservation, etc.)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Whether this is a logical rejection of an operation (as opposed to an
    /// infrastructure fault). Rejections never mutate state.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::InsufficientBalance { .. }
                | Error::InsufficientAllowance { .. }
                | Error::Overflow
                | Error::Unauthorized(_)
        )
    }

    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Error::InsufficientBalance { .. } => "insufficient_balance",
            Error::InsufficientAllowance { .. } => "insufficient_allowance",
            Error::Overflow => "overflow",
            Error::Unauthorized(_) => "unauthorized",
            Error::InvariantViolation(_) => "invariant_violation",
            Error::Concurrency(_) => "concurrency",
            Error::Config(_) => "config",
            Error::Serialization(_) => "serialization",
            Error::Io(_) => "io",
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
