use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use incubator_api::{
    config::Config,
    create_app, database,
    jobs::StartupSync,
    upstream::{JebClient, UpstreamApi},
    AppState,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    let db = database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    let upstream: Arc<dyn UpstreamApi> = Arc::new(JebClient::new(
        &config.jeb_api_url,
        &config.jeb_group_token,
        config.jeb_timeout,
    )?);

    let status = StartupSync::new(&db, upstream.as_ref(), config.sync_page_limit)
        .test_connection()
        .await;
    if status.success {
        info!("{}", status.message);
    } else {
        warn!("{}; POST /startups/sync will fail until it is reachable", status.message);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = create_app(AppState::new(config, db, upstream));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);
    info!("Swagger UI available at http://{}/docs", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server");
}
