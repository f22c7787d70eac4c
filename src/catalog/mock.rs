use async_trait::async_trait;

use crate::errors::VigiloError;

use super::{AttackPattern, CatalogClient};

pub struct MockCatalogClient {
    patterns: Vec<AttackPattern>,
}

impl MockCatalogClient {
    pub fn new(patterns: Vec<AttackPattern>) -> Self {
        Self { patterns }
    }
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    async fn fetch_attack_patterns(&self) -> Result<Vec<AttackPattern>, VigiloError> {
        Ok(self.patterns.clone())
    }
}
