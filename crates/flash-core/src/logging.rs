//! Tracing initialisation for binaries
//!
//! Library code only emits events; whoever owns `main` calls
//! [`init_tracing`] once.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single line
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Default filter when `RUST_LOG` is unset
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "flash_core=debug,flash_gemini=debug,flash_store=debug,flash_extract=debug,info"
    } else {
        "warn,flash_core=info"
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` overrides the default filter.
///
/// # Errors
/// Fails if a global subscriber is already installed
pub fn init_tracing(
    format: LogFormat,
    verbose: bool,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(verbose)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
}
