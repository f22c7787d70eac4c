pub mod errors;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::CatalogClient;
use crate::config::AppConfig;
use crate::db::Database;
use crate::feed::FeedClient;

/// Shared state for every handler: the store plus the two out-of-scope
/// collaborators (spec §1) the engine talks to through a trait object so
/// tests can substitute mocks.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub feed: Arc<dyn FeedClient>,
    pub catalog: Arc<dyn CatalogClient>,
    pub config: Arc<AppConfig>,
}

/// The minimal read/trigger surface: health, manual job triggers,
/// job/alert/risk reads. Full CRUD over actors/techniques is explicitly
/// out of scope.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", axum::routing::get(routes::health::health_check))
        .route("/collection/run", axum::routing::post(routes::collection::trigger_collection))
        .route("/mitre/sync", axum::routing::post(routes::mitre::trigger_mitre_sync))
        .route("/jobs", axum::routing::get(routes::jobs::list_jobs))
        .route("/jobs/{id}", axum::routing::get(routes::jobs::get_job))
        .route("/alerts", axum::routing::get(routes::alerts::list_alerts))
        .route("/risk/{country}", axum::routing::get(routes::risk::latest_risk))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
