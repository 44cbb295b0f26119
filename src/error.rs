use alloy::primitives::TxHash;
use thiserror::Error;

use crate::constants::OUT_OF_BOUNDS_REASON;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Read started past the last quest of the requested listing.
    #[error("Start index out of bounds")]
    OutOfBounds,
    #[error("ledger read failed: {0}")]
    Read(String),
    #[error("transaction could not be sent: {0}")]
    Send(String),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("transaction {tx_hash} was not confirmed: {reason}")]
    Unconfirmed { tx_hash: TxHash, reason: String },
}

impl LedgerError {
    /// Maps a raw read failure, recognising the ledger's out-of-bounds revert.
    pub fn from_read_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(OUT_OF_BOUNDS_REASON) {
            LedgerError::OutOfBounds
        } else {
            LedgerError::Read(message)
        }
    }

    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, LedgerError::OutOfBounds)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid reward amount `{0}`")]
    InvalidAmount(String),
    #[error("invalid reward token address `{0}`")]
    InvalidToken(String),
}
