//! USD spot quotes for reward assets.
//!
//! Quotes are never cached: every enrichment asks again. Any failure, including
//! an unparsable body or a non-positive rate, is logged and reported as `None`.

use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn native_usd_rate(&self) -> Option<Decimal>;
    async fn token_usd_rate(&self, asset: Address) -> Option<Decimal>;
}

#[derive(Debug, Deserialize)]
struct NativeQuote {
    #[serde(rename = "USD", with = "rust_decimal::serde::float")]
    usd: Decimal,
}

#[derive(Debug, Deserialize)]
struct PairSearch {
    #[serde(default)]
    pairs: Option<Vec<Pair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pair {
    price_usd: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpPriceOracle {
    http_client: Client,
    native_price_url: Url,
    token_price_url: String,
}

impl HttpPriceOracle {
    pub fn new(native_price_url: Url, token_price_url: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("quest-hunt-rs/0.1")
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http_client,
            native_price_url,
            token_price_url: token_price_url.into(),
        })
    }

    async fn fetch_native(&self) -> Result<Decimal> {
        let quote: NativeQuote = self
            .http_client
            .get(self.native_price_url.clone())
            .send()
            .await
            .context("Failed to request native quote")?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse native quote")?;
        Ok(quote.usd)
    }

    async fn fetch_token(&self, asset: Address) -> Result<Option<Decimal>> {
        let url = format!("{}{}", self.token_price_url, asset);
        let search: PairSearch = self
            .http_client
            .get(&url)
            .send()
            .await
            .context("Failed to request token quote")?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse pair search")?;
        first_pair_price(search)
    }
}

fn first_pair_price(search: PairSearch) -> Result<Option<Decimal>> {
    let Some(price) = search
        .pairs
        .and_then(|pairs| pairs.into_iter().next())
        .and_then(|pair| pair.price_usd)
    else {
        return Ok(None);
    };
    Ok(Some(
        Decimal::from_str(&price).with_context(|| format!("invalid priceUsd `{price}`"))?,
    ))
}

fn positive(rate: Decimal) -> Option<Decimal> {
    (rate > Decimal::ZERO).then_some(rate)
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
    async fn native_usd_rate(&self) -> Option<Decimal> {
        match self.fetch_native().await {
            Ok(rate) => {
                debug!(%rate, "native usd rate");
                positive(rate)
            }
            Err(e) => {
                warn!("native usd quote unavailable: {e:#}");
                None
            }
        }
    }

    async fn token_usd_rate(&self, asset: Address) -> Option<Decimal> {
        match self.fetch_token(asset).await {
            Ok(Some(rate)) => {
                debug!(%asset, %rate, "token usd rate");
                positive(rate)
            }
            Ok(None) => {
                warn!(%asset, "no liquidity pair found for token");
                None
            }
            Err(e) => {
                warn!(%asset, "token usd quote unavailable: {e:#}");
                None
            }
        }
    }
}
