use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use affinity_api::config::Config;
use affinity_api::routes::{create_router, AppState};
use affinity_api::similarity::BatchRunner;
use affinity_api::store::{create_pool, PostgresCatalog, PostgresRelatednessStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("affinity_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let catalog = Arc::new(PostgresCatalog::new(pool.clone()));
    let store = Arc::new(PostgresRelatednessStore::new(pool));
    store.ensure_schema().await?;

    let runner = Arc::new(BatchRunner::new(
        catalog,
        store.clone(),
        config.top_n,
        config.scoring_workers,
    ));
    let state = Arc::new(AppState {
        runner,
        store,
        top_n: config.top_n,
    });
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
