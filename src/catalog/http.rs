use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::errors::VigiloError;

use super::{stix, AttackPattern, CatalogClient};

const STIX_URL: &str =
    "https://raw.githubusercontent.com/mitre-attack/attack-stix-data/master/enterprise-attack/enterprise-attack.json";

/// Production `CatalogClient`: fetches the pinned STIX bundle and parses
/// it (spec §6, 60s timeout).
pub struct HttpCatalogClient {
    client: Client,
    url: String,
}

impl HttpCatalogClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client builds with default TLS backend");
        Self {
            client,
            url: STIX_URL.to_string(),
        }
    }
}

impl Default for HttpCatalogClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_attack_patterns(&self) -> Result<Vec<AttackPattern>, VigiloError> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(VigiloError::TransientTransport(format!(
                "STIX bundle fetch returned {}",
                resp.status()
            )));
        }
        let bundle: Value = resp.json().await?;
        Ok(stix::parse_bundle(&bundle))
    }
}
