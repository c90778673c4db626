//! Error taxonomy for the POS core.
//!
//! Three families, kept distinct so callers can react differently:
//! local validation failures (never reach the remote store), remote
//! failures (transport or `success: false`), and stale-state failures
//! (a status transition whose remote precondition no longer holds, the
//! caller must reload and retry).

use thiserror::Error;

use crate::models::TransactionStatus;

#[derive(Debug, Error)]
pub enum PosError {
    /// Checkout requested on an empty cart.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// A transaction may be created in LUNAS or PENDING, never DIBATALKAN.
    #[error("a transaction cannot be created in status {0}")]
    InvalidInitialStatus(TransactionStatus),

    /// Requested status change is not a legal lifecycle transition.
    #[error("invalid status transition {from} -> {to}")]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },

    /// No transaction with this id in the local list; reload before retrying.
    #[error("unknown transaction: {0}")]
    UnknownTransaction(String),

    /// The wildcard category is built in: not deletable, not assignable.
    #[error("category \"{0}\" is reserved")]
    ReservedCategory(String),

    /// A product referenced a category that is not in the category set.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Transport failure or a `success: false` reply from the spreadsheet.
    /// Local state is left unchanged; reconciliation requires a fresh read.
    #[error("remote store error: {0}")]
    Remote(String),

    /// The remote copy of a transaction no longer matches the expected
    /// precondition (changed by another client). Reload, then retry.
    #[error("transaction {id} changed remotely: {message}")]
    StaleState { id: String, message: String },
}

impl PosError {
    /// Whether the error was detected locally, before any remote call.
    pub fn is_validation(&self) -> bool {
        !matches!(self, PosError::Remote(_) | PosError::StaleState { .. })
    }
}

pub type Result<T> = std::result::Result<T, PosError>;
