//! Write flows: quest creation and answer submission.
//!
//! Each submission walks `Idle -> Validating -> (Rejected | Submitting) ->
//! (Confirmed | Failed)` and ends in exactly one [`TxOutcome`] plus one
//! user-visible notification. Raw provider errors are logged, never shown.

use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use alloy::primitives::{Address, TxHash, U256, utils::parse_units};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::classify::{ErrorCategory, classify_error};
use crate::commitment::CommitmentHasher;
use crate::constants::{NATIVE_ASSET, NATIVE_DECIMALS};
use crate::content::ContentStore;
use crate::error::ValidationError;
use crate::ledger::{CreateQuestCall, QuestWriter, TokenMetadata};
use crate::notification::{Notification, NotificationSlot};
use crate::structs::{DisplayQuest, TxOutcome};

/// A connected wallet: the account and a writer that signs for it.
#[derive(Clone)]
pub struct Signer {
    pub account: Address,
    pub writer: Arc<dyn QuestWriter>,
}

/// Connection context handed to every write; `signer` is `None` until a wallet connects.
#[derive(Clone, Default)]
pub struct Session {
    pub signer: Option<Signer>,
}

impl Session {
    pub fn connected(account: Address, writer: Arc<dyn QuestWriter>) -> Self {
        Self {
            signer: Some(Signer { account, writer }),
        }
    }

    pub fn disconnected() -> Self {
        Self { signer: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Rejected,
    Submitting,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateQuestForm {
    pub name: String,
    /// The secret answer, hashed before it leaves the process.
    pub key: String,
    pub hint: String,
    /// Token contract address; blank means the reward is paid in the native coin.
    pub reward_token: String,
    /// Reward in human units of the chosen asset.
    pub amount: String,
}

impl CreateQuestForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn validate(&self) -> Result<ValidatedForm, ValidationError> {
        for (field, value) in [
            ("name", &self.name),
            ("key", &self.key),
            ("hint", &self.hint),
            ("amount", &self.amount),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }
        let amount = self.amount.trim();
        match Decimal::from_str(amount) {
            Ok(value) if value > Decimal::ZERO => {}
            _ => return Err(ValidationError::InvalidAmount(amount.to_string())),
        }
        let reward_token = self.reward_token.trim();
        let reward = if reward_token.is_empty() {
            RewardInput::Native(to_base_units(amount, NATIVE_DECIMALS)?)
        } else {
            let asset = Address::from_str(reward_token)
                .map_err(|_| ValidationError::InvalidToken(reward_token.to_string()))?;
            RewardInput::Token {
                asset,
                amount: amount.to_string(),
            }
        };
        Ok(ValidatedForm {
            question: self.name.clone(),
            secret: self.key.clone(),
            hint: self.hint.clone(),
            reward,
        })
    }
}

/// Converts a human amount into base units, refusing zero and any digits the
/// asset cannot represent.
fn to_base_units(amount: &str, decimals: u8) -> Result<U256, ValidationError> {
    let invalid = || ValidationError::InvalidAmount(amount.to_string());
    let value = Decimal::from_str(amount).map_err(|_| invalid())?;
    if value <= Decimal::ZERO || value.normalize().scale() > u32::from(decimals) {
        return Err(invalid());
    }
    parse_units(amount, decimals)
        .map(|units| units.get_absolute())
        .map_err(|_| invalid())
}

enum RewardInput {
    Native(U256),
    /// Token amounts stay textual until the token's decimals are known.
    Token { asset: Address, amount: String },
}

struct ValidatedForm {
    question: String,
    secret: String,
    hint: String,
    reward: RewardInput,
}

enum RewardError {
    Invalid(ValidationError),
    Unreadable(anyhow::Error),
}

pub struct TransactionOrchestrator {
    content: Arc<dyn ContentStore>,
    metadata: Arc<dyn TokenMetadata>,
    hasher: CommitmentHasher,
    notifications: NotificationSlot,
    state: Mutex<SubmissionState>,
}

impl TransactionOrchestrator {
    pub fn new(
        content: Arc<dyn ContentStore>,
        metadata: Arc<dyn TokenMetadata>,
        hasher: CommitmentHasher,
        notifications: NotificationSlot,
    ) -> Self {
        Self {
            content,
            metadata,
            hasher,
            notifications,
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    pub fn state(&self) -> SubmissionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn notifications(&self) -> &NotificationSlot {
        &self.notifications
    }

    fn set_state(&self, state: SubmissionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn reject(&self, category: ErrorCategory, raw: String) -> TxOutcome {
        info!(?category, "submission rejected: {raw}");
        self.set_state(SubmissionState::Rejected);
        self.notifications.show(Notification::error(category.user_message()));
        TxOutcome::Failure(category, raw)
    }

    fn fail(&self, error: anyhow::Error) -> TxOutcome {
        let category = classify_error(&error);
        self.set_state(SubmissionState::Failed);
        self.notifications.show(Notification::error(category.user_message()));
        TxOutcome::Failure(category, format!("{error:#}"))
    }

    pub async fn create_quest(&self, session: &Session, form: &mut CreateQuestForm) -> TxOutcome {
        self.set_state(SubmissionState::Validating);
        let Some(signer) = &session.signer else {
            return self.reject(
                ErrorCategory::WalletNotConnected,
                "no wallet connected".to_string(),
            );
        };
        let validated = match form.validate() {
            Ok(validated) => validated,
            Err(e) => return self.reject(ErrorCategory::ValidationError, e.to_string()),
        };
        let (reward_asset, reward_amount) = match self.reward_units(&validated.reward).await {
            Ok(reward) => reward,
            Err(RewardError::Invalid(e)) => {
                return self.reject(ErrorCategory::ValidationError, e.to_string());
            }
            Err(RewardError::Unreadable(e)) => {
                return self.reject(classify_error(&e), format!("{e:#}"));
            }
        };

        self.set_state(SubmissionState::Submitting);
        match self
            .submit_create(signer, validated, reward_asset, reward_amount)
            .await
        {
            Ok(tx_hash) => {
                info!(%tx_hash, account = %signer.account, "quest created");
                self.set_state(SubmissionState::Confirmed);
                form.reset();
                self.notifications.show(Notification::success(
                    "Your hunt has been created successfully",
                ));
                TxOutcome::Success
            }
            Err(e) => self.fail(e),
        }
    }

    /// Resolves the reward into base units before anything is uploaded or sent.
    async fn reward_units(&self, reward: &RewardInput) -> Result<(Address, U256), RewardError> {
        match reward {
            RewardInput::Native(amount) => Ok((NATIVE_ASSET, *amount)),
            RewardInput::Token { asset, amount } => {
                let decimals = self
                    .metadata
                    .decimals(*asset)
                    .await
                    .with_context(|| format!("failed to read decimals of {asset}"))
                    .map_err(RewardError::Unreadable)?;
                let amount = to_base_units(amount, decimals).map_err(RewardError::Invalid)?;
                Ok((*asset, amount))
            }
        }
    }

    async fn submit_create(
        &self,
        signer: &Signer,
        form: ValidatedForm,
        reward_asset: Address,
        reward_amount: U256,
    ) -> Result<TxHash> {
        let name = format!("{}-{}", form.question, unix_millis());
        let hint_cid = self
            .content
            .upload(&form.hint, &name)
            .await
            .context("failed to upload hint")?;
        let answer = self.hasher.commit(&form.secret);
        let fee = signer
            .writer
            .revenue_fees()
            .await
            .context("failed to read protocol fee")?;

        let call = if reward_asset == NATIVE_ASSET {
            CreateQuestCall {
                question: form.question,
                hint_cid,
                answer,
                reward_amount: U256::ZERO,
                reward_asset: NATIVE_ASSET,
                value: reward_amount.saturating_add(fee),
            }
        } else {
            signer
                .writer
                .approve(reward_asset, reward_amount)
                .await
                .context("reward token approval failed")?;
            CreateQuestCall {
                question: form.question,
                hint_cid,
                answer,
                reward_amount,
                reward_asset,
                value: fee,
            }
        };

        let tx_hash = signer
            .writer
            .create_quest(call)
            .await
            .context("createQuest failed")?;
        Ok(tx_hash)
    }

    /// Checks `secret` against the quest's stored commitment locally and only
    /// talks to the ledger when it matches.
    pub async fn claim(&self, session: &Session, quest: &DisplayQuest, secret: &str) -> TxOutcome {
        self.set_state(SubmissionState::Validating);
        let Some(signer) = &session.signer else {
            return self.reject(
                ErrorCategory::WalletNotConnected,
                "no wallet connected".to_string(),
            );
        };
        if secret.trim().is_empty() {
            return self.reject(
                ErrorCategory::ValidationError,
                ValidationError::MissingField("key").to_string(),
            );
        }
        if !self.hasher.matches(secret, quest.answer) {
            return self.reject(
                ErrorCategory::WrongAnswer,
                format!("commitment mismatch for quest {}", quest.id),
            );
        }

        self.set_state(SubmissionState::Submitting);
        match signer.writer.submit_answer(quest.id, quest.answer).await {
            Ok(tx_hash) => {
                info!(
                    %tx_hash,
                    quest_id = %quest.id,
                    account = %signer.account,
                    "reward claimed"
                );
                self.set_state(SubmissionState::Confirmed);
                self.notifications.show(Notification::congratulations(format!(
                    "Congratulations! You just won {} ({})",
                    quest.amount, quest.usd_value
                )));
                TxOutcome::Success
            }
            Err(e) => {
                warn!(quest_id = %quest.id, "claim failed");
                self.fail(anyhow::Error::new(e).context("submitAnswer failed"))
            }
        }
    }
}

fn unix_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}
