use std::sync::Arc;

use alloy::primitives::U256;
use anyhow::{Result, anyhow};
use quest_hunt_rs::config::Config;

pub async fn run(config: &Config, id: U256) -> Result<()> {
    let ledger = Arc::new(quest_hunt_rs::read_ledger(config));
    let enricher = quest_hunt_rs::enricher(config, ledger.clone())?;
    let quest = enricher
        .load_quest(ledger.as_ref(), id)
        .await
        .ok_or_else(|| anyhow!("quest {id} not found"))?;
    println!("{}", serde_json::to_string_pretty(&quest)?);
    Ok(())
}
