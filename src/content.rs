//! Hint storage on a content-addressed gateway.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::debug;
use url::Url;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Stores `text` under a display `name`, returning its content identifier.
    async fn upload(&self, text: &str, name: &str) -> Result<String>;
    /// Retrieves the plaintext addressed by `cid`.
    async fn fetch(&self, cid: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    cid: String,
}

#[derive(Debug, Clone)]
pub struct PinataStore {
    http_client: Client,
    gateway_url: Url,
    upload_url: Url,
    jwt: Option<String>,
}

impl PinataStore {
    pub fn new(gateway_url: Url, upload_url: Url, jwt: Option<String>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent("quest-hunt-rs/0.1")
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http_client,
            gateway_url: with_trailing_slash(gateway_url),
            upload_url,
            jwt,
        })
    }

    /// `{gateway}/{cid}`. The cid comes from the ledger, so anything that could
    /// steer the request off the gateway is refused.
    fn hint_url(&self, cid: &str) -> Result<Url> {
        let valid = !cid.is_empty()
            && cid
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            bail!("invalid content identifier `{cid}`");
        }
        let mut url = self.gateway_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("gateway url `{}` cannot take a path", self.gateway_url))?
            .pop_if_empty()
            .push(cid);
        Ok(url)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[async_trait]
impl ContentStore for PinataStore {
    async fn upload(&self, text: &str, name: &str) -> Result<String> {
        let jwt = self
            .jwt
            .as_deref()
            .ok_or_else(|| anyhow!("PINATA_JWT must be set to upload hints"))?;
        let file = Part::text(text.to_string())
            .file_name(name.to_string())
            .mime_str("text/plain")?;
        let form = Form::new().part("file", file).text("network", "public");

        let response: UploadResponse = self
            .http_client
            .post(self.upload_url.clone())
            .bearer_auth(jwt)
            .multipart(form)
            .send()
            .await
            .context("Failed to upload hint")?
            .error_for_status()?
            .json()
            .await
            .context("Failed to parse upload response")?;
        debug!(cid = %response.data.cid, "hint uploaded");
        Ok(response.data.cid)
    }

    async fn fetch(&self, cid: &str) -> Result<String> {
        let url = self.hint_url(cid)?;
        let hint = self
            .http_client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch hint {cid}"))?
            .error_for_status()?
            .text()
            .await?;
        Ok(hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(gateway: &str, jwt: Option<&str>) -> PinataStore {
        PinataStore::new(
            Url::parse(gateway).unwrap(),
            Url::parse("http://127.0.0.1:9/v3/files").unwrap(),
            jwt.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn test_hint_url_joins_gateway() {
        let with_slash = store("https://gw.example.org/ipfs/", None);
        let without_slash = store("https://gw.example.org/ipfs", None);
        let cid = "bafkreigh2akiscaildc";
        assert_eq!(
            with_slash.hint_url(cid).unwrap().as_str(),
            "https://gw.example.org/ipfs/bafkreigh2akiscaildc"
        );
        assert_eq!(with_slash.hint_url(cid).unwrap(), without_slash.hint_url(cid).unwrap());
    }

    #[test]
    fn test_hint_url_stays_on_gateway() {
        let store = store("https://gw.example.org/ipfs/", None);
        for cid in [
            "https://evil.example/x",
            "//evil.example/x",
            "../../admin",
            "bafy?x=1",
            "bafy#frag",
            "",
        ] {
            assert!(store.hint_url(cid).is_err(), "{cid}");
        }
        let url = store.hint_url("bafkreigh2akiscaildc").unwrap();
        assert_eq!(url.host_str(), Some("gw.example.org"));
        assert!(url.path().starts_with("/ipfs/"));
    }

    #[test]
    fn test_parses_upload_response() {
        let response: UploadResponse =
            serde_json::from_str(r#"{"data": {"id": "x", "cid": "bafy123", "size": 12}}"#).unwrap();
        assert_eq!(response.data.cid, "bafy123");
    }

    #[tokio::test]
    async fn test_upload_requires_token() {
        let err = store("https://gw.example.org/ipfs/", None)
            .upload("hint", "name")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("PINATA_JWT"));
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let result = store("http://127.0.0.1:9/ipfs/", None).fetch("bafy123").await;
        assert!(result.is_err());
    }
}
