//! Access to the quest ledger contract and to reward-token metadata.
//!
//! Reads and writes are split into separate traits so the pager only ever sees
//! [`QuestReader`], while the orchestrator needs a [`QuestWriter`] backed by a
//! signing provider.

use alloy::{
    contract::Error as ContractError,
    network::{Ethereum, ReceiptResponse},
    primitives::{Address, B256, TxHash, U256},
    providers::{PendingTransactionBuilder, Provider},
    sol_types::decode_revert_reason,
};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::LedgerError;
use crate::sol_types::{IERC20, QuestHunt};
use crate::structs::{QuestFeed, QuestRecord};

#[async_trait]
pub trait QuestReader: Send + Sync {
    /// Quests of `feed` in `[start, end)`; past-the-end starts fail with
    /// [`LedgerError::OutOfBounds`].
    async fn quests(
        &self,
        feed: QuestFeed,
        start: u64,
        end: u64,
    ) -> Result<Vec<QuestRecord>, LedgerError>;

    async fn quest(&self, id: U256) -> Result<QuestRecord, LedgerError>;
}

#[async_trait]
pub trait TokenMetadata: Send + Sync {
    async fn decimals(&self, asset: Address) -> Result<u8, LedgerError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateQuestCall {
    pub question: String,
    pub hint_cid: String,
    pub answer: B256,
    /// Zero for native rewards, which travel in `value` instead.
    pub reward_amount: U256,
    pub reward_asset: Address,
    /// Protocol fee, plus the reward itself when it is paid in the native coin.
    pub value: U256,
}

/// Write entrypoints. Every method returns only once the transaction is confirmed.
#[async_trait]
pub trait QuestWriter: Send + Sync {
    async fn revenue_fees(&self) -> Result<U256, LedgerError>;
    /// Lets the ledger contract pull `amount` of `asset` from the signer.
    async fn approve(&self, asset: Address, amount: U256) -> Result<TxHash, LedgerError>;
    async fn create_quest(&self, call: CreateQuestCall) -> Result<TxHash, LedgerError>;
    async fn submit_answer(&self, id: U256, answer: B256) -> Result<TxHash, LedgerError>;
}

/// alloy-backed ledger. Writes need `P` to carry a wallet filler.
#[derive(Debug, Clone)]
pub struct AlloyLedger<P> {
    provider: P,
    address: Address,
}

impl<P: Provider> AlloyLedger<P> {
    pub fn new(provider: P, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

/// Prefers the decoded revert reason over the transport's rendering of the error.
fn contract_error_message(error: &ContractError) -> String {
    error
        .as_revert_data()
        .and_then(|data| decode_revert_reason(&data))
        .map(|reason| format!("execution reverted: {reason}"))
        .unwrap_or_else(|| error.to_string())
}

fn read_error(error: ContractError) -> LedgerError {
    LedgerError::from_read_message(contract_error_message(&error))
}

fn send_error(error: ContractError) -> LedgerError {
    LedgerError::Send(contract_error_message(&error))
}

async fn confirm(pending: PendingTransactionBuilder<Ethereum>) -> Result<TxHash, LedgerError> {
    let tx_hash = *pending.tx_hash();
    debug!(%tx_hash, "waiting for receipt");
    let receipt = pending
        .get_receipt()
        .await
        .map_err(|e| LedgerError::Unconfirmed {
            tx_hash,
            reason: e.to_string(),
        })?;
    if !receipt.status() {
        return Err(LedgerError::Reverted(tx_hash));
    }
    Ok(tx_hash)
}

#[async_trait]
impl<P: Provider> QuestReader for AlloyLedger<P> {
    async fn quests(
        &self,
        feed: QuestFeed,
        start: u64,
        end: u64,
    ) -> Result<Vec<QuestRecord>, LedgerError> {
        let contract = QuestHunt::new(self.address, &self.provider);
        let (start, end) = (U256::from(start), U256::from(end));
        let quests = match feed {
            QuestFeed::All | QuestFeed::Recent => contract.getQuests(start, end).call().await,
            QuestFeed::Open => contract.getOpenQuests(start, end).call().await,
            QuestFeed::Ended => contract.getEndedQuests(start, end).call().await,
        }
        .map_err(read_error)?;
        Ok(quests.into_iter().map(QuestRecord::from).collect())
    }

    async fn quest(&self, id: U256) -> Result<QuestRecord, LedgerError> {
        let contract = QuestHunt::new(self.address, &self.provider);
        let quest = contract.getQuest(id).call().await.map_err(read_error)?;
        Ok(quest.into())
    }
}

#[async_trait]
impl<P: Provider> TokenMetadata for AlloyLedger<P> {
    async fn decimals(&self, asset: Address) -> Result<u8, LedgerError> {
        IERC20::new(asset, &self.provider)
            .decimals()
            .call()
            .await
            .map_err(read_error)
    }
}

#[async_trait]
impl<P: Provider> QuestWriter for AlloyLedger<P> {
    async fn revenue_fees(&self) -> Result<U256, LedgerError> {
        QuestHunt::new(self.address, &self.provider)
            .revenueFees()
            .call()
            .await
            .map_err(read_error)
    }

    async fn approve(&self, asset: Address, amount: U256) -> Result<TxHash, LedgerError> {
        info!(%asset, %amount, spender = %self.address, "sending approval");
        let pending = IERC20::new(asset, &self.provider)
            .approve(self.address, amount)
            .send()
            .await
            .map_err(send_error)?;
        confirm(pending).await
    }

    async fn create_quest(&self, call: CreateQuestCall) -> Result<TxHash, LedgerError> {
        info!(
            reward_asset = %call.reward_asset,
            reward_amount = %call.reward_amount,
            value = %call.value,
            "sending createQuest"
        );
        let pending = QuestHunt::new(self.address, &self.provider)
            .createQuest(
                call.question,
                call.hint_cid,
                call.answer,
                call.reward_amount,
                call.reward_asset,
            )
            .value(call.value)
            .send()
            .await
            .map_err(send_error)?;
        confirm(pending).await
    }

    async fn submit_answer(&self, id: U256, answer: B256) -> Result<TxHash, LedgerError> {
        info!(quest_id = %id, "sending submitAnswer");
        let pending = QuestHunt::new(self.address, &self.provider)
            .submitAnswer(id, answer)
            .send()
            .await
            .map_err(send_error)?;
        confirm(pending).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_QUEST_CONTRACT_ADDRESS;
    use alloy::providers::ProviderBuilder;

    #[test]
    fn test_ledger_creation() {
        let provider =
            ProviderBuilder::new().connect_http("http://127.0.0.1:8545".parse().unwrap());
        let ledger = AlloyLedger::new(provider, DEFAULT_QUEST_CONTRACT_ADDRESS);
        assert_eq!(ledger.address(), DEFAULT_QUEST_CONTRACT_ADDRESS);
    }

    #[tokio::test]
    #[ignore = "requires RPC_URL pointing at a chain with the quest ledger deployed"]
    async fn test_reads_first_page() -> anyhow::Result<()> {
        dotenv::dotenv().ok();
        let rpc_url = std::env::var("RPC_URL")?.parse()?;
        let address = std::env::var("QUEST_CONTRACT_ADDRESS")
            .ok()
            .and_then(|a| a.parse().ok())
            .unwrap_or(DEFAULT_QUEST_CONTRACT_ADDRESS);
        let ledger = AlloyLedger::new(ProviderBuilder::new().connect_http(rpc_url), address);
        match ledger.quests(QuestFeed::All, 0, 10).await {
            Ok(quests) => assert!(quests.len() <= 10),
            Err(e) => assert!(e.is_out_of_bounds(), "unexpected error: {e}"),
        }
        Ok(())
    }
}
