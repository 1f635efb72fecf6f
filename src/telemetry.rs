//! Logging initialization

use anyhow::Result;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `default_level`.
pub fn init(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    let subscriber = Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false));

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
