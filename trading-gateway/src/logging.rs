//! Subscriber setup for gateway diagnostics.
//!
//! Adapters only emit `tracing` events. An application embedding the gateway
//! can install a subscriber with [`init_logging`], which scopes the filter to
//! gateway targets: venue calls at one level, the HTTP stack underneath at
//! another, and optionally every signed or public request line from
//! `trading_gateway::http`.

use std::env;
use std::io::IsTerminal;

use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Target of the gateway's own events.
const GATEWAY_TARGET: &str = "trading_gateway";

/// Target of the per-request lines emitted by the HTTP client.
const REQUEST_TARGET: &str = "trading_gateway::http";

/// Crates of the HTTP stack below the gateway.
const TRANSPORT_TARGETS: [&str; 2] = ["reqwest", "hyper"];

/// Line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

/// Timestamps on each line. Venue timestamps are UTC, so log lines are too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampFormat {
    #[default]
    Utc,
    None,
}

/// How gateway diagnostics are filtered and printed.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub timestamps: TimestampFormat,
    /// Level of adapter events (orders placed, batches, leverage changes)
    pub venue_level: String,
    /// Level of reqwest/hyper internals
    pub transport_level: String,
    /// Log every outbound REST call at debug, whatever `venue_level` is
    pub trace_requests: bool,
    /// Append file:line to each event
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            timestamps: TimestampFormat::Utc,
            venue_level: "info".to_string(),
            transport_level: "warn".to_string(),
            trace_requests: false,
            include_location: false,
        }
    }
}

fn flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl LogConfig {
    /// Read `GATEWAY_LOG_FORMAT` (pretty|compact), `GATEWAY_LOG_TIMESTAMPS`
    /// (utc|none), `GATEWAY_LOG_LEVEL`, `GATEWAY_LOG_TRANSPORT_LEVEL` and
    /// `GATEWAY_LOG_REQUESTS`. Unset or unknown values keep the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(format) = env::var("GATEWAY_LOG_FORMAT") {
            if format.eq_ignore_ascii_case("compact") {
                config.format = LogFormat::Compact;
            }
        }
        if let Ok(timestamps) = env::var("GATEWAY_LOG_TIMESTAMPS") {
            if matches!(timestamps.to_ascii_lowercase().as_str(), "none" | "off") {
                config.timestamps = TimestampFormat::None;
            }
        }
        if let Ok(level) = env::var("GATEWAY_LOG_LEVEL") {
            config.venue_level = level;
        }
        if let Ok(level) = env::var("GATEWAY_LOG_TRANSPORT_LEVEL") {
            config.transport_level = level;
        }
        if let Ok(requests) = env::var("GATEWAY_LOG_REQUESTS") {
            config.trace_requests = flag(&requests);
        }
        config
    }

    pub fn with_venue_level(mut self, level: impl Into<String>) -> Self {
        self.venue_level = level.into();
        self
    }

    pub fn with_request_tracing(mut self, enabled: bool) -> Self {
        self.trace_requests = enabled;
        self
    }

    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub fn filter_directives(&self) -> String {
        let mut directives = vec![
            "warn".to_string(),
            format!("{}={}", GATEWAY_TARGET, self.venue_level),
        ];
        directives.extend(
            TRANSPORT_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, self.transport_level)),
        );
        if self.trace_requests {
            directives.push(format!("{}=debug", REQUEST_TARGET));
        }
        directives.join(",")
    }
}

/// Install a global subscriber. `RUST_LOG` overrides the configured filter.
///
/// # Errors
///
/// Fails when a global subscriber is already installed or the directives do
/// not parse.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.filter_directives())?,
    };
    let ansi = std::io::stderr().is_terminal();
    let registry = tracing_subscriber::registry().with(filter);

    macro_rules! install {
        ($layer:expr) => {{
            let layer = $layer
                .with_writer(std::io::stderr)
                .with_ansi(ansi)
                .with_file(config.include_location)
                .with_line_number(config.include_location);
            match config.timestamps {
                TimestampFormat::Utc => registry
                    .with(layer.with_timer(ChronoUtc::new("%Y-%m-%dT%H:%M:%S%.3fZ".to_string())))
                    .try_init(),
                TimestampFormat::None => registry.with(layer.without_time()).try_init(),
            }
        }};
    }

    match config.format {
        LogFormat::Pretty => install!(fmt::layer())?,
        LogFormat::Compact => install!(fmt::layer().compact())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_scope_gateway_and_transport() {
        assert_eq!(
            LogConfig::default().filter_directives(),
            "warn,trading_gateway=info,reqwest=warn,hyper=warn"
        );
    }

    #[test]
    fn test_request_tracing_adds_http_directive() {
        let directives = LogConfig::default()
            .with_venue_level("warn")
            .with_request_tracing(true)
            .filter_directives();
        assert!(directives.contains("trading_gateway=warn"));
        assert!(directives.ends_with("trading_gateway::http=debug"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }

    #[test]
    fn test_flag_values() {
        assert!(flag("TRUE"));
        assert!(flag("1"));
        assert!(!flag("0"));
        assert!(!flag("maybe"));
    }

    #[test]
    fn test_second_init_fails_instead_of_panicking() {
        let config = LogConfig {
            timestamps: TimestampFormat::None,
            format: LogFormat::Compact,
            ..LogConfig::default()
        };
        let _ = init_logging(config.clone());
        assert!(init_logging(config).is_err());
    }
}
