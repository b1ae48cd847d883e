use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tourops_api::notify::notifier_from_config;
use tourops_api::{router, AppState};
use tourops_common::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tourops=info".parse()?))
        .init();

    let config = Config::from_env()?;
    let notifier = notifier_from_config(&config);
    if config.resend_api_key.is_none() {
        info!("RESEND_API_KEY not set, change notifications go to the log");
    }

    let state = match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await?;
            info!("Connected to database");

            sqlx::migrate!("../../migrations").run(&pool).await?;
            info!("Migrations complete");

            AppState::postgres(pool, notifier)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory storage with a demo tour");
            AppState::in_memory(notifier)
        }
    };

    let app = router(Arc::new(state), &config.allowed_origins);

    let addr = config.bind_addr();
    info!("Tour operations API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
