use anyhow::Result;
use jobscout::{
    config::{Config, init_tracing},
    drafting::DraftingClient,
    fetcher::Fetcher,
    notifications::Notifier,
    pipeline::Pipeline,
    repositories::{PgPostingStore, PgSourceRegistry},
};
use std::sync::Arc;
use tracing::info;

/// One discovery run. Exits non-zero only when configuration, the database
/// or the source registry is unavailable.
#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;
    init_tracing(config.log_format());

    // Create database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections((config.discovery().concurrency as u32).saturating_add(2))
        .connect(config.database_url())
        .await?;

    let fetcher = Fetcher::new(config.discovery().fetch_timeout)?;
    let extractor = DraftingClient::new(config.gemini(), config.discovery().max_text_chars)?;
    let notifier = Notifier::from_settings(config.notifications())?;
    if !notifier.is_enabled() {
        info!("no notification sinks configured");
    }

    let pipeline = Arc::new(Pipeline::new(
        fetcher,
        Arc::new(PgSourceRegistry::new(pool.clone())),
        Arc::new(PgPostingStore::new(pool.clone())),
        Arc::new(extractor),
        notifier,
        config.discovery().clone(),
    ));
    pipeline.spawn_shutdown_listener();

    pipeline.run_once().await?;
    pool.close().await;

    Ok(())
}
