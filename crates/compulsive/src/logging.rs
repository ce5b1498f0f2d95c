use std::path::Path;

use anyhow::Context;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

const DEFAULT_FILTER: &str = "compulsive=info,compulsive_monitor=info,compulsive_core=info";
const LOG_FILE_PREFIX: &str = "compulsive";
const LOG_FILE_SUFFIX: &str = "log";

/// Install the global subscriber: human-readable stdout, plus a daily-rotated
/// JSON file in `log_dir` when one is given.
///
/// The returned guard must outlive the program's logging.
pub fn init(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let (layer, guard) = json_file_layer(dir)?;
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(env_filter)
        .with(stdout_layer)
        .init();

    Ok(guard)
}

/// JSON lines into `<dir>/compulsive.<date>.log`, rotated daily, written off-thread.
fn json_file_layer(dir: &Path) -> anyhow::Result<(impl Layer<Registry>, WorkerGuard)> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer = fmt::layer().with_writer(writer).with_ansi(false).json();
    Ok((layer, guard))
}
