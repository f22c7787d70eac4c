use std::sync::Arc;

use tracing::info;

use vigilo::api::{self, AppState};
use vigilo::catalog::HttpCatalogClient;
use vigilo::config::AppConfig;
use vigilo::db::Database;
use vigilo::errors::VigiloError;
use vigilo::feed::HttpFeedClient;
use vigilo::scheduler;

use crate::cli::commands::ServeArgs;

pub async fn handle_serve(config: AppConfig, args: ServeArgs) -> Result<(), VigiloError> {
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let feed: Arc<dyn vigilo::feed::FeedClient> = Arc::new(HttpFeedClient::new(&config.vt_api_key));
    let catalog: Arc<dyn vigilo::catalog::CatalogClient> = Arc::new(HttpCatalogClient::new());
    let config = Arc::new(config);

    let state = AppState {
        db: db.clone(),
        feed: feed.clone(),
        catalog: catalog.clone(),
        config: config.clone(),
    };

    tokio::spawn(scheduler::run_collection_scheduler(db.clone(), feed, config.clone()));
    tokio::spawn(scheduler::run_mitre_scheduler(db, catalog));

    let app = api::build_router(state);
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| VigiloError::Internal(format!("bind failed: {e}")))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| VigiloError::Internal(format!("server error: {e}")))?;

    Ok(())
}
