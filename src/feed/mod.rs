pub mod http;
pub mod mock;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::errors::VigiloError;

pub use http::HttpFeedClient;

/// Outcome of a paginated fetch: distinguishes a definitive (possibly
/// empty) result from a transient transport failure, per spec §4.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Ok,
    Transient,
}

/// The external threat-intel feed the engine does not own (spec §1/§4.2).
/// `HttpFeedClient` is the production implementation; tests use
/// `mock::MockFeedClient`.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn resolve_collection(
        &self,
        actor_name: &str,
        external_id: Option<&str>,
    ) -> Result<Option<String>, VigiloError>;

    async fn fetch_techniques(&self, collection_id: &str) -> Result<(Vec<String>, FetchStatus), VigiloError>;

    async fn fetch_file_hashes(
        &self,
        collection_id: &str,
        limit: u32,
    ) -> Result<(Vec<String>, FetchStatus), VigiloError>;

    /// Individual file failures are silently treated as empty (spec §4.2).
    async fn fetch_file_mitre_tree(&self, hash: &str) -> HashSet<String>;
}
