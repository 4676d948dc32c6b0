//! Session logger — `tracing` output mirrored to a single file in the OS data
//! directory and to stderr.
//!
//! The file is **truncated (overwritten) at each launch**, so it only ever
//! contains output from the most-recent session.
//!
//! Log location:
//!   Windows:  `%APPDATA%\SnapEdit\snapedit.log`
//!   Linux:    `~/.local/share/SnapEdit/snapedit.log`
//!   macOS:    `~/Library/Application Support/SnapEdit/snapedit.log`
//!
//! The file receives `info` and above (`debug` when verbose). Stderr only
//! shows warnings and errors unless verbose. With verbose logging on,
//! `RUST_LOG` overrides the filter.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Returns the path to the current session log file.
pub fn log_path() -> Option<&'static PathBuf> {
    LOG_PATH.get()
}

/// Initialise logging. Must be called once before any logging.
///
/// * Creates (or truncates) the session log file. If it cannot be opened,
///   logging continues on stderr only.
/// * Installs a panic hook that records the panic before the default handler
///   runs.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes the file writer.
pub fn init(verbose: bool) -> Option<WorkerGuard> {
    let level = if verbose { "debug" } else { "info" };
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };
    let path = log_file_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path);

    let guard = match file {
        Ok(f) => {
            let (writer, guard) = tracing_appender::non_blocking(f);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .with(stderr_layer(verbose))
                .try_init();
            let _ = LOG_PATH.set(path.clone());
            Some(guard)
        }
        Err(e) => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer(verbose))
                .try_init();
            tracing::warn!("failed to open log file {}: {}", path.display(), e);
            None
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %path.display(),
        "SnapEdit session started"
    );

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("PANIC: {}", info);
        prev(info);
    }));

    guard
}

fn stderr_layer<S>(verbose: bool) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(level)
}

fn log_file_path() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("SnapEdit")
        .join("snapedit.log")
}
