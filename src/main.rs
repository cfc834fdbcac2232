use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use proxy_seeder::config::{ConfigManager, FileConfigManager, DEFAULT_CONFIG_PATH};
use proxy_seeder::{ChromeBrowser, JobFactory, Reporter, Scheduler, SchedulerSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // diagnostics on stderr, stdout is reserved for the report stream
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("proxy_seeder=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config_manager = FileConfigManager::new(config_path);
    let config = config_manager
        .load_config()
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("could not load configuration")?;

    tracing::info!("Starting proxy seeder for sites {:?}", config.sites);

    let factory = JobFactory::new().context("could not build site extractors")?;
    let queue = factory.build(&config);

    let browser = Arc::new(
        ChromeBrowser::launch(&config.browser)
            .await
            .map_err(|e| anyhow::anyhow!(e))
            .context("could not start the browser")?,
    );

    let reporter = Reporter::stdout(config.output.format);
    let scheduler = Scheduler::new(queue, browser.clone(), reporter, SchedulerSettings::from(&config));
    let summary = scheduler
        .run()
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("report stream failed")?;

    if let Err(e) = browser.shutdown().await {
        tracing::warn!("Browser shutdown failed: {}", e);
    }

    tracing::info!(
        "Run finished in {}s: {} jobs, {} records, {} failed navigations",
        (summary.finished_at - summary.started_at).num_seconds(),
        summary.jobs_run,
        summary.records_emitted,
        summary.navigation_failures
    );
    Ok(())
}
