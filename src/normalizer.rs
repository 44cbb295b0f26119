//! Converts raw on-chain reward amounts into human units and USD.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, U256, utils::format_units};
use anyhow::{Context, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use crate::constants::{NATIVE_ASSET, NATIVE_DECIMALS, USD_PRECISION};
use crate::ledger::TokenMetadata;
use crate::price::PriceOracle;
use crate::structs::{NormalizedReward, UsdValue};

/// Rounds toward positive infinity at `dp` places, so a displayed value never understates.
pub fn round_up_to_precision(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToPositiveInfinity)
}

/// `raw / 10^decimals` as an exact decimal string, without trailing zeros
/// beyond the first fractional digit ("0.05", "1.0").
pub fn format_amount(raw: U256, decimals: u8) -> Result<String> {
    let formatted = format_units(raw, decimals).context("amount does not fit the asset decimals")?;
    let Some((int_part, frac_part)) = formatted.split_once('.') else {
        return Ok(format!("{formatted}.0"));
    };
    let frac_part = frac_part.trim_end_matches('0');
    let frac_part = if frac_part.is_empty() { "0" } else { frac_part };
    Ok(format!("{int_part}.{frac_part}"))
}

/// Prices `amount` at `rate`, or flags the value unavailable.
pub fn usd_value(amount: &str, rate: Option<Decimal>) -> UsdValue {
    let Some(rate) = rate else {
        return UsdValue::Unavailable;
    };
    let amount = match Decimal::from_str(amount) {
        Ok(amount) => amount,
        Err(e) => {
            warn!(amount, "amount cannot be priced: {e}");
            return UsdValue::Unavailable;
        }
    };
    match rate.checked_mul(amount) {
        Some(value) => UsdValue::Known(format!(
            "{:.prec$}",
            round_up_to_precision(value, USD_PRECISION),
            prec = USD_PRECISION as usize
        )),
        None => {
            warn!(%rate, %amount, "usd value overflows");
            UsdValue::Unavailable
        }
    }
}

pub struct RewardNormalizer {
    oracle: Arc<dyn PriceOracle>,
    metadata: Arc<dyn TokenMetadata>,
}

impl RewardNormalizer {
    pub fn new(oracle: Arc<dyn PriceOracle>, metadata: Arc<dyn TokenMetadata>) -> Self {
        Self { oracle, metadata }
    }

    /// Decimals of the reward asset; the native coin needs no lookup.
    pub async fn decimals(&self, asset: Address) -> Result<u8> {
        if asset == NATIVE_ASSET {
            return Ok(NATIVE_DECIMALS);
        }
        self.metadata
            .decimals(asset)
            .await
            .with_context(|| format!("failed to read decimals of {asset}"))
    }

    pub async fn normalize(&self, raw_amount: U256, asset: Address) -> Result<NormalizedReward> {
        let decimals = self.decimals(asset).await?;
        let amount = format_amount(raw_amount, decimals)?;
        let rate = if asset == NATIVE_ASSET {
            self.oracle.native_usd_rate().await
        } else {
            self.oracle.token_usd_rate(asset).await
        };
        let usd_value = usd_value(&amount, rate);
        Ok(NormalizedReward { amount, usd_value })
    }
}
