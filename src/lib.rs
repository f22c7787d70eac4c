pub mod alerts;
pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod feed;
pub mod ledger;
pub mod models;
pub mod reconciliation;
pub mod risk;
pub mod runner;
pub mod scheduler;

/// Embedded migration set, run by [`db::Database::migrate`] and by
/// `#[sqlx::test(migrator = "vigilo::MIGRATOR")]` in integration tests.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
