//! Logging initialization from the resolved configuration.

use anyhow::Context;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;
use trendlens_config::LoggingConfig;

/// Initialize the global tracing subscriber.
///
/// The level comes from the resolved `logging.level`; an unparseable level
/// falls back to `info` rather than failing the run. Console and file
/// writers follow `logging.console` / `logging.file` and can be combined.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match (&config.file, config.console) {
        (Some(path), console) => {
            let path = Path::new(path);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating log directory {}", parent.display()))?;
                }
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let file = Arc::new(file);

            if console {
                builder.with_writer(io::stdout.and(file)).init();
            } else {
                builder.with_writer(file).init();
            }
        }
        (None, true) => builder.init(),
        (None, false) => builder.with_writer(io::sink).init(),
    }

    Ok(())
}
