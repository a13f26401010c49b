//! Tracing setup for binaries.
//!
//! Logs go to stderr so that stdout stays reserved for the RPC protocol.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "video_pocket=info,videopocket_rpc=info";

/// Installs the global fmt subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`].
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
