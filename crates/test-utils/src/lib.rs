//! Shared setup for errtag's integration tests: tracing bootstrap and a fixed set of fixture
//! variants.

use errtag::{Kind, Registry, Tagged, define_error};
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a console subscriber for tests. `RUST_LOG` wins over `level` when set.
///
/// Safe to call from every test: only the first call installs anything.
#[cfg(feature = "test_setup")]
pub fn init_test_tracing(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let console = fmt::layer()
        .with_target(true)
        .with_level(true)
        .without_time()
        .with_line_number(true)
        .with_test_writer();

    // try_init: a global subscriber may already be set by another test in this binary
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .try_init();
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkData {
    pub status: u16,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutData {
    pub after_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseData {
    pub line: u32,
    pub column: u32,
}

define_error! {
    /// An upstream HTTP call failed.
    pub NetworkError(NetworkData);
    pub Timeout(TimeoutData) = "timeout";
    pub ParseFailure(ParseData);
    pub Unauthorized;
}

/// The canonical `NetworkError` used across tests: message "Request failed".
pub fn network(status: u16, url: &str) -> Tagged<NetworkError> {
    NetworkError::new(
        "Request failed",
        NetworkData {
            status,
            url: url.to_string(),
        },
    )
}

/// Registry knowing every fixture variant.
pub fn fixture_registry() -> Registry {
    Registry::new()
        .register(NetworkError)
        .register(Timeout)
        .register(ParseFailure)
        .register(Unauthorized)
}
