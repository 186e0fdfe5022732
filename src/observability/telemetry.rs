//! Telemetry
//!
//! Structured logging for pipeline tasks, the dev server and the terminal
//! session. Levels are controlled via RUST_LOG; without it the CLI stays
//! quiet unless `--verbose` is passed.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Crate filter used by `--verbose` when RUST_LOG is unset.
const VERBOSE_FILTER: &str = "nodem_site=debug,tower_http=info";

/// Install the stderr subscriber. RUST_LOG wins over `verbose`; with
/// neither, no subscriber is installed and only `output` lines appear.
pub fn init_tracing(verbose: bool) {
    if let Ok(filter) = std::env::var("RUST_LOG") {
        init_tracing_with_filter(&filter);
    } else if verbose {
        init_tracing_with_filter(VERBOSE_FILTER);
    }
}

/// Install the subscriber with `filter`. An unparsable filter falls back to
/// `warn`. Only the first call has any effect.
pub fn init_tracing_with_filter(filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .try_init();
    });
}

/// Escape control characters in text that came from outside (remote payloads,
/// file names) before it reaches a log line.
pub fn sanitize_for_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x1b' => out.push_str("\\e"),
            '\x00' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}
