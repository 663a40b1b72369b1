//! Tracing subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a console subscriber.
///
/// `RUST_LOG` wins when set; otherwise logs at `info`, or `debug` when
/// `verbose`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fallback = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()?;

    Ok(())
}
