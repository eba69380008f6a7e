use crate::error::SourceError;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `TMON_LOG=trace`.
pub const ENV: &str = "TMON_LOG";

/// Installs the global subscriber.
///
/// The dashboard owns the terminal, so logs go to `$TMPDIR/tmon.log` when
/// `enabled` or `TMON_LOG` is set, and are discarded otherwise. Returns the
/// log path when file logging is active.
pub fn init(enabled: bool) -> Option<PathBuf> {
    let from_env = std::env::var_os(ENV).is_some();
    let filter = EnvFilter::try_from_env(ENV)
        .unwrap_or_else(|_| EnvFilter::new(if enabled { "debug" } else { "warn" }));

    if enabled || from_env {
        let path = std::env::temp_dir().join("tmon.log");
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_thread_names(true)
                .with_writer(Mutex::new(file))
                .try_init();
            return Some(path);
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::sink)
        .try_init();
    None
}

/// Times an expression and records the elapsed milliseconds at trace level.
macro_rules! profile {
    ($label:expr, $expr:expr) => {{
        let start = std::time::Instant::now();
        let result = $expr;
        tracing::trace!(
            phase = $label,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "timing"
        );
        result
    }};
}

pub(crate) use profile;

/// Logs a source's failures when it starts failing and when it recovers,
/// rather than on every read.
#[derive(Debug, Default)]
pub struct FailureLatch {
    failing: bool,
}

impl FailureLatch {
    pub fn observe<T>(&mut self, what: &str, result: Result<T, SourceError>) -> Option<T> {
        match result {
            Ok(value) => {
                if self.failing {
                    debug!(source = what, "reading recovered");
                    self.failing = false;
                }
                Some(value)
            }
            Err(e) => {
                if !self.failing {
                    warn!(source = what, error = %e, "reading failed");
                    self.failing = true;
                }
                None
            }
        }
    }
}
