//! Maps write failures onto the fixed set of user-facing error categories.
//!
//! Rules are evaluated top to bottom against the lower-cased failure message and
//! the first match wins; anything unmatched is [`ErrorCategory::Unknown`]. The
//! keyword lists are part of the product's behaviour and are pinned by the tests.

use std::fmt;

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCategory {
    ValidationError,
    WalletNotConnected,
    WrongAnswer,
    InsufficientFunds,
    UserRejected,
    AssetNotAllowed,
    Reverted,
    Unknown,
}

impl ErrorCategory {
    /// The only text a user ever sees for a failure.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorCategory::ValidationError => "Please fill all the fields",
            ErrorCategory::WalletNotConnected => "Please connect your wallet",
            ErrorCategory::WrongAnswer => "Wrong Answer, You got this",
            ErrorCategory::InsufficientFunds => "Insufficient funds",
            ErrorCategory::UserRejected => "Transaction rejected",
            ErrorCategory::AssetNotAllowed => "This token is not allowed as a reward",
            ErrorCategory::Reverted => "Transaction reverted",
            ErrorCategory::Unknown => "Transaction failed",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}

pub const INSUFFICIENT_FUNDS_KEYWORDS: &[&str] = &[
    "insufficient funds",
    "insufficient balance",
    "exceeds balance",
];
pub const USER_REJECTED_KEYWORDS: &[&str] = &[
    "user denied transaction",
    "user denied",
    "user rejected",
    "rejected the request",
];
pub const ASSET_NOT_ALLOWED_KEYWORDS: &[&str] = &[
    "not whitelisted",
    "whitelist",
    "not allowlisted",
    "allowlist",
    "allow-list",
    "token not allowed",
];
pub const REVERTED_KEYWORDS: &[&str] = &["reverted", "revert"];

/// Ordered classification rules; earlier rules take priority.
pub const RULES: &[(&[&str], ErrorCategory)] = &[
    (INSUFFICIENT_FUNDS_KEYWORDS, ErrorCategory::InsufficientFunds),
    (USER_REJECTED_KEYWORDS, ErrorCategory::UserRejected),
    (ASSET_NOT_ALLOWED_KEYWORDS, ErrorCategory::AssetNotAllowed),
    (REVERTED_KEYWORDS, ErrorCategory::Reverted),
];

pub fn classify_message(message: &str) -> ErrorCategory {
    let message = message.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| message.contains(keyword)))
        .map(|(_, category)| *category)
        .unwrap_or(ErrorCategory::Unknown)
}

/// Classifies any error by its rendered chain of causes.
pub fn classify_error(error: &anyhow::Error) -> ErrorCategory {
    let category = classify_message(&format!("{error:#}"));
    warn!(?category, "write failed: {error:#}");
    category
}
