//! Tracing setup: console layer (pretty or JSON) plus an optional rolling file.

use std::path::Path;

use eyre::WrapErr;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::FILE_GUARD;

/// Console logs go to stderr so stdout stays machine-readable.
/// `RUST_LOG` overrides `console_level` when set.
pub fn init(json: bool, console_level: &str, cfg: &ranger_config::Logging) -> eyre::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(console_level))
        .wrap_err_with(|| format!("invalid --log-level '{console_level}'"))?;

    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    };

    let file = match cfg.file.as_deref() {
        Some(path) => {
            let level = cfg.level.as_deref().unwrap_or("info");
            let filter = EnvFilter::try_new(level)
                .wrap_err_with(|| format!("invalid logging.level '{level}'"))?;
            let appender = rolling_appender(Path::new(path), cfg.rotation.as_deref())?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .wrap_err("installing tracing subscriber")
}

fn rolling_appender(
    path: &Path,
    rotation: Option<&str>,
) -> eyre::Result<tracing_appender::rolling::RollingFileAppender> {
    use tracing_appender::rolling;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| eyre::eyre!("logging.file '{}' has no file name", path.display()))?;
    std::fs::create_dir_all(dir)
        .wrap_err_with(|| format!("creating log directory {}", dir.display()))?;

    Ok(match rotation.unwrap_or("never") {
        "daily" => rolling::daily(dir, name),
        "hourly" => rolling::hourly(dir, name),
        _ => rolling::never(dir, name),
    })
}
