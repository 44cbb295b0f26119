//! Turns raw ledger records into [`DisplayQuest`]s.
//!
//! Batches are enriched one record at a time, never concurrently, which keeps the
//! request rate against the quote and gateway services bounded by a single
//! in-flight call. A record that fails to enrich is logged and left out; the rest
//! of the batch is still returned in ledger order.

use std::sync::Arc;

use alloy::primitives::U256;
use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::content::ContentStore;
use crate::ledger::QuestReader;
use crate::normalizer::RewardNormalizer;
use crate::structs::{DisplayQuest, QuestRecord};

pub struct QuestEnricher {
    normalizer: RewardNormalizer,
    content: Arc<dyn ContentStore>,
}

impl QuestEnricher {
    pub fn new(normalizer: RewardNormalizer, content: Arc<dyn ContentStore>) -> Self {
        Self {
            normalizer,
            content,
        }
    }

    async fn try_enrich(&self, raw: QuestRecord) -> Result<DisplayQuest> {
        if !raw.is_consistent() {
            warn!(
                quest_id = %raw.id,
                active = raw.active,
                claimant = %raw.claimant,
                "quest activity does not match its claimant"
            );
        }
        let hint = self
            .content
            .fetch(&raw.hint)
            .await
            .with_context(|| format!("failed to resolve hint {}", raw.hint))?;
        let reward = self
            .normalizer
            .normalize(raw.reward_amount, raw.reward_asset)
            .await?;
        Ok(DisplayQuest {
            id: raw.id,
            title: raw.question,
            amount: reward.amount,
            usd_value: reward.usd_value,
            hint,
            reward_asset: raw.reward_asset,
            active: raw.active,
            claimant: raw.claimant,
            creator: raw.creator,
            answer: raw.answer,
        })
    }

    pub async fn enrich_one(&self, raw: QuestRecord) -> Option<DisplayQuest> {
        let quest_id = raw.id;
        match self.try_enrich(raw).await {
            Ok(quest) => Some(quest),
            Err(e) => {
                warn!(%quest_id, "dropping quest: {e:#}");
                None
            }
        }
    }

    pub async fn enrich_batch(&self, raws: Vec<QuestRecord>) -> Vec<DisplayQuest> {
        let requested = raws.len();
        let mut quests = Vec::with_capacity(requested);
        for raw in raws {
            if let Some(quest) = self.enrich_one(raw).await {
                quests.push(quest);
            }
        }
        debug!(requested, enriched = quests.len(), "enriched batch");
        quests
    }

    /// Detail view load. `None` means the id is unknown or unusable and the
    /// caller should navigate away.
    pub async fn load_quest(&self, reader: &dyn QuestReader, id: U256) -> Option<DisplayQuest> {
        match reader.quest(id).await {
            Ok(raw) => self.enrich_one(raw).await,
            Err(e) => {
                warn!(quest_id = %id, "failed to read quest: {e}");
                None
            }
        }
    }
}
