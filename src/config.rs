use std::env;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use url::Url;

use crate::constants::{
    DEFAULT_IPFS_GATEWAY_URL, DEFAULT_NATIVE_PRICE_URL, DEFAULT_PAGE_SIZE,
    DEFAULT_PINATA_UPLOAD_URL, DEFAULT_QUEST_CONTRACT_ADDRESS, DEFAULT_TOKEN_PRICE_URL,
};

/// Process-wide settings, read once at start-up and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: Url,
    pub contract_address: Address,
    /// Bearer token for hint uploads; reads work without it.
    pub pinata_jwt: Option<String>,
    pub project_salt: Option<String>,
    pub ipfs_gateway_url: Url,
    pub pinata_upload_url: Url,
    pub native_price_url: Url,
    /// Pair-search endpoint; the token address is appended verbatim.
    pub token_price_url: String,
    pub page_size: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests do not touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let rpc_url = get("RPC_URL").context("RPC_URL must be set")?;
        let rpc_url = Url::parse(&rpc_url).context("RPC_URL must be a valid URL")?;

        let contract_address = match get("QUEST_CONTRACT_ADDRESS") {
            Some(address) => address
                .parse()
                .context("QUEST_CONTRACT_ADDRESS must be a valid address")?,
            None => DEFAULT_QUEST_CONTRACT_ADDRESS,
        };

        let url_or_default = |key: &str, default: &str| -> Result<Url> {
            let raw = get(key).unwrap_or_else(|| default.to_string());
            Url::parse(&raw).with_context(|| format!("{key} must be a valid URL"))
        };

        let page_size = match get("PAGE_SIZE") {
            Some(size) => size
                .parse::<u64>()
                .ok()
                .filter(|size| *size > 0)
                .context("PAGE_SIZE must be a positive integer")?,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            rpc_url,
            contract_address,
            pinata_jwt: get("PINATA_JWT"),
            project_salt: get("PROJECT_SALT"),
            ipfs_gateway_url: url_or_default("IPFS_GATEWAY_URL", DEFAULT_IPFS_GATEWAY_URL)?,
            pinata_upload_url: url_or_default("PINATA_UPLOAD_URL", DEFAULT_PINATA_UPLOAD_URL)?,
            native_price_url: url_or_default("NATIVE_PRICE_URL", DEFAULT_NATIVE_PRICE_URL)?,
            token_price_url: get("TOKEN_PRICE_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_PRICE_URL.to_string()),
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup(&[("RPC_URL", "https://rpc.example.org")])).unwrap();
        assert_eq!(config.contract_address, DEFAULT_QUEST_CONTRACT_ADDRESS);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.pinata_jwt.is_none());
        assert!(config.project_salt.is_none());
        assert_eq!(config.token_price_url, DEFAULT_TOKEN_PRICE_URL);
    }

    #[test]
    fn test_missing_rpc_url() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("RPC_URL"));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = Config::from_lookup(lookup(&[
            ("RPC_URL", "https://rpc.example.org"),
            ("PROJECT_SALT", "  "),
        ]))
        .unwrap();
        assert!(config.project_salt.is_none());
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let result = Config::from_lookup(lookup(&[
            ("RPC_URL", "https://rpc.example.org"),
            ("PAGE_SIZE", "0"),
        ]));
        assert!(result.is_err());
    }
}
