//! # Logging
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins when set;
//! otherwise the filter comes from the configured log level.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::OperatorConfig;

fn default_directive(log_level: &str) -> String {
    format!("onepassword_operator={}", log_level.to_lowercase())
}

/// Initialize the global tracing subscriber from operator configuration
///
/// Safe to call more than once; later calls return an error that callers
/// may ignore.
pub fn init_logging(config: &OperatorConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.log_format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_lowercases_level() {
        assert_eq!(default_directive("INFO"), "onepassword_operator=info");
        assert_eq!(default_directive("Debug"), "onepassword_operator=debug");
    }
}
