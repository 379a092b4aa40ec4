//! File-backed tracing setup. The terminal belongs to the UI, so log output
//! goes to a file in the state directory.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Env var holding the log filter directive (e.g. `monkeysee=debug`)
pub const LOG_ENV: &str = "MONKEYSEE_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber writing to `path`. Keep the returned guard
/// alive until exit so buffered lines get flushed.
pub fn init(path: &Path) -> std::io::Result<Option<WorkerGuard>> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "monkeysee.log".to_string());

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        // a subscriber is already installed; drop the guard so the writer shuts down
        Err(_) => Ok(None),
    }
}
