pub mod claim;
pub mod create;
pub mod list;
pub mod show;

use std::sync::Arc;

use alloy::{providers::ProviderBuilder, signers::local::PrivateKeySigner};
use anyhow::{Context, Result};
use quest_hunt_rs::{
    config::Config,
    ledger::{AlloyLedger, QuestWriter},
    orchestrator::Session,
    structs::TxOutcome,
};
use tracing::info;

/// Signing session for `private_key` against the configured ledger.
pub fn session(config: &Config, private_key: &str) -> Result<Session> {
    let signer: PrivateKeySigner = private_key
        .trim()
        .parse()
        .context("PRIVATE_KEY must be a hex-encoded secp256k1 key")?;
    let account = signer.address();
    info!(%account, "using wallet");
    let provider = ProviderBuilder::new()
        .wallet(signer)
        .connect_http(config.rpc_url.clone());
    let writer: Arc<dyn QuestWriter> =
        Arc::new(AlloyLedger::new(provider, config.contract_address));
    Ok(Session::connected(account, writer))
}

/// Prints the outcome and turns a failure into a non-zero exit.
pub fn finish(outcome: TxOutcome) -> Result<()> {
    match outcome {
        TxOutcome::Success => Ok(()),
        TxOutcome::Failure(category, _) => anyhow::bail!("{}", category.user_message()),
    }
}
