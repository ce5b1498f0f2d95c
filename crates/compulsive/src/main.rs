use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use compulsive_core::Config;
use compulsive_monitor::{ChangeMonitor, HttpFetcher, MonitorEngine, SmtpNotifier};
use tokio::sync::watch;
use tracing::{error, info};

mod cli;
mod logging;
mod signals;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    // keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = logging::init(args.log_dir.as_deref())?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting compulsive");

    let config = Config::load(&args.configuration).inspect_err(|e| {
        error!(path = %args.configuration.display(), error = %e, "couldn't load config file");
    })?;
    info!(
        url = %config.url,
        frequency_secs = config.poll_interval().as_secs(),
        recipients = config.email.to.len(),
        "configuration loaded"
    );

    let fetcher = Arc::new(HttpFetcher::new().context("building HTTP client")?);
    let notifier =
        Arc::new(SmtpNotifier::new(&config.email.server).context("building SMTP transport")?);

    // handlers go in before the seed fetch, which has no timeout
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let _signals = signals::forward_shutdown(shutdown_tx).context("installing signal handlers")?;

    // no polling without a baseline: a failed seed fetch ends the process
    let seed = ChangeMonitor::seed(config.url.clone(), config.email.clone(), fetcher, notifier);
    let Some(seeded) = signals::unless_shutdown(seed, &mut shutdown_rx).await else {
        info!("stopped before the initial snapshot was taken");
        return Ok(());
    };
    let monitor = seeded.inspect_err(|e| error!(error = %e, "failed to fetch initial snapshot"))?;

    MonitorEngine::new(monitor, config.poll_interval())
        .run(shutdown_rx)
        .await;

    info!("compulsive stopped");
    Ok(())
}
