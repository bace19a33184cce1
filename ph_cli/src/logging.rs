//! Tracing setup: console on stderr, optional JSON file via tracing-appender.

use std::path::Path;

use eyre::WrapErr;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::FILE_GUARD;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const DEFAULT_LEVEL: &str = "info";

/// `--log-level`, then `[logging] level`, then info.
pub fn effective_level<'a>(flag: Option<&'a str>, logging: &'a ph_config::Logging) -> &'a str {
    flag.or(logging.level.as_deref()).unwrap_or(DEFAULT_LEVEL)
}

/// `RUST_LOG` wins over both the flag and the config.
pub fn init(flag: Option<&str>, json: bool, logging: &ph_config::Logging) -> eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(effective_level(flag, logging)))
        .wrap_err("invalid log level")?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(fmt::layer().with_writer(std::io::stderr).boxed());
    }

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
        let appender = match logging.rotation.as_deref().unwrap_or("never") {
            "daily" => tracing_appender::rolling::daily(dir, name),
            "hourly" => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .wrap_err("install tracing subscriber")
}
