use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::VigiloError;

use super::{FeedClient, FetchStatus};

/// Scripted `FeedClient` test double standing in for the feed the engine
/// does not own (spec §1 Non-goals). Each actor's collection id and its
/// responses are configured up front.
#[derive(Default)]
pub struct MockFeedClient {
    collections: HashMap<String, String>,
    techniques: Mutex<HashMap<String, (Vec<String>, FetchStatus)>>,
    file_hashes: HashMap<String, Vec<String>>,
    file_trees: HashMap<String, HashSet<String>>,
}

impl MockFeedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, actor_name: &str, collection_id: &str) -> Self {
        self.collections.insert(actor_name.to_string(), collection_id.to_string());
        self
    }

    pub fn with_techniques(self, collection_id: &str, codes: &[&str]) -> Self {
        self.techniques.lock().unwrap().insert(
            collection_id.to_string(),
            (codes.iter().map(|s| s.to_string()).collect(), FetchStatus::Ok),
        );
        self
    }

    pub fn with_transient_error(self, collection_id: &str) -> Self {
        self.techniques
            .lock()
            .unwrap()
            .insert(collection_id.to_string(), (Vec::new(), FetchStatus::Transient));
        self
    }

    pub fn with_file_hashes(mut self, collection_id: &str, hashes: &[&str]) -> Self {
        self.file_hashes
            .insert(collection_id.to_string(), hashes.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_file_tree(mut self, hash: &str, codes: &[&str]) -> Self {
        self.file_trees
            .insert(hash.to_string(), codes.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Replace a collection's scripted technique response after
    /// construction, simulating a second reconciliation pass.
    pub fn set_techniques(&self, collection_id: &str, codes: &[&str]) {
        self.techniques.lock().unwrap().insert(
            collection_id.to_string(),
            (codes.iter().map(|s| s.to_string()).collect(), FetchStatus::Ok),
        );
    }
}

#[async_trait]
impl FeedClient for MockFeedClient {
    async fn resolve_collection(
        &self,
        actor_name: &str,
        external_id: Option<&str>,
    ) -> Result<Option<String>, VigiloError> {
        if let Some(id) = external_id {
            return Ok(Some(id.to_string()));
        }
        Ok(self.collections.get(actor_name).cloned())
    }

    async fn fetch_techniques(&self, collection_id: &str) -> Result<(Vec<String>, FetchStatus), VigiloError> {
        Ok(self
            .techniques
            .lock()
            .unwrap()
            .get(collection_id)
            .cloned()
            .unwrap_or((Vec::new(), FetchStatus::Ok)))
    }

    async fn fetch_file_hashes(
        &self,
        collection_id: &str,
        limit: u32,
    ) -> Result<(Vec<String>, FetchStatus), VigiloError> {
        let mut hashes = self.file_hashes.get(collection_id).cloned().unwrap_or_default();
        hashes.truncate(limit as usize);
        Ok((hashes, FetchStatus::Ok))
    }

    async fn fetch_file_mitre_tree(&self, hash: &str) -> HashSet<String> {
        self.file_trees.get(hash).cloned().unwrap_or_default()
    }
}
