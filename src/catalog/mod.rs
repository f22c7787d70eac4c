pub mod http;
pub mod mock;
pub mod stix;
pub mod sync;

use async_trait::async_trait;

use crate::errors::VigiloError;

pub use http::HttpCatalogClient;
pub use stix::AttackPattern;
pub use sync::{legacy_load, sync_catalog, LegacyLoadSummary, SyncSummary};

/// The MITRE ATT&CK reference bundle the engine does not own (spec
/// §1/§4.1). `HttpCatalogClient` fetches and parses the STIX bundle;
/// tests use `mock::MockCatalogClient`.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_attack_patterns(&self) -> Result<Vec<AttackPattern>, VigiloError>;
}
