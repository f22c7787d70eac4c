use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::VigiloError;

use super::{FeedClient, FetchStatus};

const BASE: &str = "https://www.virustotal.com/api/v3";

/// Production `FeedClient`, grounded in `gti_collector.py`'s endpoint set
/// and pagination-by-`links.next` contract (spec §6).
pub struct HttpFeedClient {
    client: Client,
    api_key: String,
}

impl HttpFeedClient {
    pub fn new(api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client builds with default TLS backend");
        Self {
            client,
            api_key: api_key.to_string(),
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("x-apikey", &self.api_key)
            .header("accept", "application/json")
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn resolve_collection(
        &self,
        actor_name: &str,
        external_id: Option<&str>,
    ) -> Result<Option<String>, VigiloError> {
        if let Some(id) = external_id {
            return Ok(Some(id.to_string()));
        }

        let query = format!(r#"entity:threat_actor "{actor_name}""#);
        let resp = self
            .get(&format!("{BASE}/intelligence/search"))
            .query(&[("query", query.as_str()), ("limit", "1")])
            .send()
            .await?;

        if !resp.status().is_success() {
            warn!(status = %resp.status(), actor = actor_name, "intelligence search failed");
            return Err(VigiloError::TransientTransport(format!(
                "intelligence search returned {}",
                resp.status()
            )));
        }

        let body: Value = resp.json().await?;
        let id = body["data"]
            .as_array()
            .and_then(|items| items.first())
            .and_then(|item| item["id"].as_str())
            .map(str::to_string);
        Ok(id)
    }

    async fn fetch_techniques(&self, collection_id: &str) -> Result<(Vec<String>, FetchStatus), VigiloError> {
        let mut url = format!("{BASE}/collections/{collection_id}/relationships/attack_techniques?limit=40");
        let mut seen: HashSet<String> = HashSet::new();

        loop {
            let resp = self.get(&url).send().await?;
            if !resp.status().is_success() {
                warn!(status = %resp.status(), collection_id, "attack_techniques fetch failed");
                return Ok((Vec::new(), FetchStatus::Transient));
            }
            let body: Value = resp.json().await?;
            if let Some(items) = body["data"].as_array() {
                for item in items {
                    if let Some(id) = item["id"].as_str() {
                        seen.insert(id.to_string());
                    }
                }
            }
            match body["links"]["next"].as_str() {
                Some(next) => url = next.to_string(),
                None => break,
            }
        }

        debug!(collection_id, count = seen.len(), "fetched technique relationships");
        Ok((seen.into_iter().collect(), FetchStatus::Ok))
    }

    async fn fetch_file_hashes(
        &self,
        collection_id: &str,
        limit: u32,
    ) -> Result<(Vec<String>, FetchStatus), VigiloError> {
        let page_limit = limit.min(40);
        let mut url = format!(
            "{BASE}/collections/{collection_id}/relationships/files?limit={page_limit}"
        );
        let mut hashes = Vec::new();

        while (hashes.len() as u32) < limit {
            let resp = self.get(&url).send().await?;
            if !resp.status().is_success() {
                warn!(status = %resp.status(), collection_id, "files relationships fetch failed");
                return Ok((Vec::new(), FetchStatus::Transient));
            }
            let body: Value = resp.json().await?;
            if let Some(items) = body["data"].as_array() {
                for item in items {
                    if let Some(id) = item["id"].as_str() {
                        hashes.push(id.to_string());
                    }
                }
            }
            match body["links"]["next"].as_str() {
                Some(next) => url = next.to_string(),
                None => break,
            }
        }

        hashes.truncate(limit as usize);
        Ok((hashes, FetchStatus::Ok))
    }

    async fn fetch_file_mitre_tree(&self, hash: &str) -> HashSet<String> {
        let mut techniques = HashSet::new();
        let resp = match self.get(&format!("{BASE}/files/{hash}/behaviour_mitre_trees")).send().await {
            Ok(r) => r,
            Err(_) => return techniques,
        };
        if !resp.status().is_success() {
            return techniques;
        }
        let body: Value = match resp.json().await {
            Ok(b) => b,
            Err(_) => return techniques,
        };
        if let Some(sandboxes) = body["data"].as_object() {
            for sandbox in sandboxes.values() {
                if let Some(tactics) = sandbox["tactics"].as_array() {
                    for tactic in tactics {
                        if let Some(techs) = tactic["techniques"].as_array() {
                            for tech in techs {
                                if let Some(id) = tech["id"].as_str() {
                                    techniques.insert(id.to_string());
                                }
                            }
                        }
                    }
                }
            }
        }
        techniques
    }
}
