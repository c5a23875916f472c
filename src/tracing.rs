//! Tracing initialization.
//!
//! Logs always go to stderr (or the test writer): stdout carries the MCP
//! protocol. `RUST_LOG` refines the filter; `DOCNAV_LOG_FORMAT=json` switches
//! to one JSON object per line.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log line format.
pub const LOG_FORMAT_ENV_VAR: &str = "DOCNAV_LOG_FORMAT";

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Compact,
        }
    }
}

fn running_under_test_harness() -> bool {
    std::env::var_os("NEXTEST").is_some() || std::env::var_os("CARGO_TARGET_TMPDIR").is_some()
}

/// Initialize tracing. Safe to call multiple times.
pub fn init() {
    INIT.call_once(|| {
        let is_test = running_under_test_harness();
        let level = if is_test { Level::DEBUG } else { Level::INFO };
        let filter = EnvFilter::from_default_env().add_directive(level.into());
        let format = LogFormat::parse(std::env::var(LOG_FORMAT_ENV_VAR).ok().as_deref());

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true);

        // A test harness may already own the global subscriber.
        let result = match (format, is_test) {
            (LogFormat::Json, true) => builder.json().with_test_writer().try_init(),
            (LogFormat::Json, false) => builder.json().with_writer(std::io::stderr).try_init(),
            (LogFormat::Compact, true) => builder.compact().with_test_writer().try_init(),
            (LogFormat::Compact, false) => {
                builder.compact().with_writer(std::io::stderr).try_init()
            }
        };
        if let Err(e) = result
            && !is_test
        {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });
}
