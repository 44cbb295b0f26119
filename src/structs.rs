use std::fmt;

use alloy::primitives::{Address, B256, U256};
use serde::Serialize;

use crate::classify::ErrorCategory;
use crate::sol_types::QuestHunt;

/// A quest exactly as the ledger returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestRecord {
    pub id: U256,
    pub creator: Address,
    pub question: String,
    /// Content identifier of the hint in the content store.
    pub hint: String,
    pub answer: B256,
    /// Smallest-unit amount of `reward_asset`.
    pub reward_amount: U256,
    pub reward_asset: Address,
    pub active: bool,
    pub claimant: Address,
}

impl QuestRecord {
    /// A quest is open exactly while nobody has claimed it.
    pub fn is_consistent(&self) -> bool {
        self.active == self.claimant.is_zero()
    }
}

impl From<QuestHunt::Quest> for QuestRecord {
    fn from(quest: QuestHunt::Quest) -> Self {
        QuestRecord {
            id: quest.questId,
            creator: quest.creator,
            question: quest.question,
            hint: quest.hint,
            answer: quest.answer,
            reward_amount: quest.rewardAmount,
            reward_asset: quest.rewardToken,
            active: quest.isActive,
            claimant: quest.claimedBy,
        }
    }
}

/// Which ledger listing a pager reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestFeed {
    All,
    Open,
    Ended,
    /// There is no dedicated ledger entrypoint, so this reads the full listing.
    Recent,
}

impl fmt::Display for QuestFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuestFeed::All => "all",
            QuestFeed::Open => "open",
            QuestFeed::Ended => "ended",
            QuestFeed::Recent => "recent",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for QuestFeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(QuestFeed::All),
            "open" => Ok(QuestFeed::Open),
            "ended" => Ok(QuestFeed::Ended),
            "recent" => Ok(QuestFeed::Recent),
            other => Err(format!("unknown quest feed: {other}")),
        }
    }
}

/// USD equivalent of a reward, or the marker that no quote was available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsdValue {
    Known(String),
    Unavailable,
}

impl fmt::Display for UsdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsdValue::Known(value) => write!(f, "${value}"),
            UsdValue::Unavailable => f.write_str("n/a"),
        }
    }
}

impl Serialize for UsdValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UsdValue::Known(value) => serializer.serialize_some(value),
            UsdValue::Unavailable => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedReward {
    pub amount: String,
    pub usd_value: UsdValue,
}

/// Display-ready quest, rebuilt on every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayQuest {
    pub id: U256,
    pub title: String,
    pub amount: String,
    pub usd_value: UsdValue,
    pub hint: String,
    pub reward_asset: Address,
    pub active: bool,
    pub claimant: Address,
    pub creator: Address,
    /// Stored commitment; claim attempts are checked against it locally.
    pub answer: B256,
}

/// Result of one write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    Success,
    Failure(ErrorCategory, String),
}

impl TxOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TxOutcome::Success)
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            TxOutcome::Success => None,
            TxOutcome::Failure(category, _) => Some(*category),
        }
    }
}
