pub mod classify;
pub mod commitment;
pub mod config;
pub mod constants;
pub mod content;
pub mod enrichment;
pub mod error;
pub mod ledger;
pub mod normalizer;
pub mod notification;
pub mod orchestrator;
pub mod pager;
pub mod price;
pub mod sol_types;
pub mod structs;

use std::sync::Arc;

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::Result;

use commitment::CommitmentHasher;
use config::Config;
use content::PinataStore;
use enrichment::QuestEnricher;
use ledger::{AlloyLedger, TokenMetadata};
use normalizer::RewardNormalizer;
use notification::NotificationSlot;
use orchestrator::TransactionOrchestrator;
use price::HttpPriceOracle;

/// Read-only ledger over plain HTTP; enough for browsing and detail views.
pub fn read_ledger(config: &Config) -> AlloyLedger<impl Provider + Clone + 'static> {
    let provider = ProviderBuilder::new().connect_http(config.rpc_url.clone());
    AlloyLedger::new(provider, config.contract_address)
}

pub fn content_store(config: &Config) -> Result<PinataStore> {
    PinataStore::new(
        config.ipfs_gateway_url.clone(),
        config.pinata_upload_url.clone(),
        config.pinata_jwt.clone(),
    )
}

pub fn hasher(config: &Config) -> CommitmentHasher {
    CommitmentHasher::new(config.project_salt.clone())
}

/// Wires the HTTP quote source, IPFS gateway and `metadata` into an enricher.
pub fn enricher(config: &Config, metadata: Arc<dyn TokenMetadata>) -> Result<QuestEnricher> {
    let oracle = HttpPriceOracle::new(
        config.native_price_url.clone(),
        config.token_price_url.clone(),
    )?;
    let normalizer = RewardNormalizer::new(Arc::new(oracle), metadata);
    Ok(QuestEnricher::new(normalizer, Arc::new(content_store(config)?)))
}

pub fn orchestrator(
    config: &Config,
    metadata: Arc<dyn TokenMetadata>,
) -> Result<TransactionOrchestrator> {
    Ok(TransactionOrchestrator::new(
        Arc::new(content_store(config)?),
        metadata,
        hasher(config),
        NotificationSlot::default(),
    ))
}
