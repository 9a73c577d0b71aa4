//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;

/// Install a global fmt subscriber writing to stderr.
///
/// The filter comes from `RUST_LOG` and falls back to `info`.
pub fn init(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
