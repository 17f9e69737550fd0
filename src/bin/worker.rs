use std::{env, sync::Arc};

use anyhow::{bail, Context};
use incubator_api::{
    config::Config,
    database,
    jobs::StartupSync,
    models::UserRole,
    repositories::UserRepository,
    upstream::{JebClient, UpstreamApi},
};
use tokio::time::interval;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    // Command-line flags
    let args: Vec<String> = env::args().collect();
    let sync_once = args.iter().any(|a| a == "--sync-startups");
    let grant_admin = args
        .iter()
        .position(|a| a == "--grant-admin")
        .map(|i| args.get(i + 1).cloned());

    let db = database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    if let Some(email) = grant_admin {
        let Some(email) = email else {
            bail!("--grant-admin needs an email address");
        };
        let repo = UserRepository::new(&db);
        let user = repo
            .find_by_email(&email)
            .await?
            .with_context(|| format!("no account registered with {}", email))?;
        repo.set_role(&user.id, UserRole::Admin).await?;
        info!("Granted admin role to {}", email);
        return Ok(());
    }

    let upstream: Arc<dyn UpstreamApi> = Arc::new(JebClient::new(
        &config.jeb_api_url,
        &config.jeb_group_token,
        config.jeb_timeout,
    )?);
    let sync = StartupSync::new(&db, upstream.as_ref(), config.sync_page_limit);

    if sync_once {
        let summary = sync.synchronize().await?;
        info!("{}", summary.message());
        return Ok(());
    }

    info!(
        "Worker starting; syncing startups every {} minutes",
        config.sync_interval.as_secs() / 60
    );

    let mut ticker = interval(config.sync_interval);
    loop {
        ticker.tick().await;
        info!("Running scheduled startup sync...");

        match sync.synchronize().await {
            Ok(summary) => info!("{}", summary.message()),
            Err(e) => error!(?e, "startup-sync job failed"),
        }
    }
}
