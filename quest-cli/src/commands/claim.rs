use std::sync::Arc;

use alloy::primitives::U256;
use anyhow::{Result, anyhow};
use quest_hunt_rs::config::Config;
use tracing::info;

use super::{finish, session};

pub async fn run(config: &Config, id: U256, key: &str, private_key: &str) -> Result<()> {
    let session = session(config, private_key)?;
    let ledger = Arc::new(quest_hunt_rs::read_ledger(config));
    let enricher = quest_hunt_rs::enricher(config, ledger.clone())?;
    let quest = enricher
        .load_quest(ledger.as_ref(), id)
        .await
        .ok_or_else(|| anyhow!("quest {id} not found"))?;
    if !quest.active {
        return Err(anyhow!("quest {id} was already claimed by {}", quest.claimant));
    }

    let orchestrator = quest_hunt_rs::orchestrator(config, ledger)?;
    let outcome = orchestrator.claim(&session, &quest, key).await;
    if let Some(notification) = orchestrator.notifications().current() {
        info!("{}", notification.message);
    }
    finish(outcome)
}
