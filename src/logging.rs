//! Logging initialisation via tracing-subscriber.

use tracing_subscriber::EnvFilter;

use crate::error::BridgeError;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is used. Output goes to
/// stderr so streamed replies on stdout stay clean.
pub fn init(level: &str) -> Result<(), BridgeError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| BridgeError::Configuration(format!("invalid log level '{level}': {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| BridgeError::Configuration(format!("failed to set subscriber: {e}")))
}
