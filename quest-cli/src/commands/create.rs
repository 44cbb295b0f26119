use std::sync::Arc;

use anyhow::Result;
use quest_hunt_rs::{config::Config, orchestrator::CreateQuestForm};
use tracing::info;

use super::{finish, session};

pub fn form(
    name: String,
    key: String,
    hint: String,
    token: String,
    amount: String,
) -> CreateQuestForm {
    CreateQuestForm {
        name,
        key,
        hint,
        reward_token: token,
        amount,
    }
}

pub async fn run(config: &Config, mut form: CreateQuestForm, private_key: &str) -> Result<()> {
    let session = session(config, private_key)?;
    let metadata = Arc::new(quest_hunt_rs::read_ledger(config));
    let orchestrator = quest_hunt_rs::orchestrator(config, metadata)?;

    let outcome = orchestrator.create_quest(&session, &mut form).await;
    if let Some(notification) = orchestrator.notifications().current() {
        info!("{}", notification.message);
    }
    finish(outcome)
}
