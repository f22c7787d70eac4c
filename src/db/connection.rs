use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::errors::VigiloError;

/// Thin wrapper around a connection pool. Cloning is cheap — `PgPool`
/// is itself an `Arc`-backed handle.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, VigiloError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Wraps an already-established pool, e.g. the one `#[sqlx::test]`
    /// provisions for integration tests.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), VigiloError> {
        crate::MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| VigiloError::Internal(format!("migration failed: {e}")))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
