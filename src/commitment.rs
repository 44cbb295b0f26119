//! Answer commitments.
//!
//! The ledger never sees a plaintext answer, only `keccak256(salt ++ lowercase(secret))`.
//! Quest creation and claim attempts must go through the same [`CommitmentHasher`]
//! or the two sides will never agree.

use alloy::primitives::{B256, keccak256};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitmentHasher {
    salt: Option<String>,
}

impl CommitmentHasher {
    pub fn new(salt: Option<String>) -> Self {
        Self {
            salt: salt.filter(|salt| !salt.is_empty()),
        }
    }

    pub fn unsalted() -> Self {
        Self { salt: None }
    }

    pub fn normalize(secret: &str) -> String {
        secret.to_lowercase()
    }

    pub fn commit(&self, secret: &str) -> B256 {
        let normalized = Self::normalize(secret);
        match &self.salt {
            Some(salt) => keccak256(format!("{salt}{normalized}").as_bytes()),
            None => keccak256(normalized.as_bytes()),
        }
    }

    pub fn matches(&self, secret: &str, stored: B256) -> bool {
        self.commit(secret) == stored
    }
}
