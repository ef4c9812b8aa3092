use anyhow::Result;
use jobscout::{
    app_state::AppState,
    config::{Config, init_tracing},
    drafting::DraftingClient,
    fetcher::Fetcher,
    middleware::RateLimit,
    router::build_router,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;

const RATE_LIMIT_REQUESTS: u32 = 30;
const RATE_LIMIT_WINDOW_SECS: i64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format());

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(config.database_url())
        .await?;

    let fetcher = Fetcher::new(config.discovery().fetch_timeout)?;
    let extractor = DraftingClient::new(config.gemini(), config.discovery().max_text_chars)?;
    let state = AppState::new(
        pool,
        fetcher,
        Arc::new(extractor),
        config.discovery().max_text_chars,
    );

    let app = build_router(
        state,
        RateLimit::new(RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW_SECS),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("admin API listening on {}", listener.local_addr()?);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    Ok(())
}
