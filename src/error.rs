use std::{io, path::PathBuf, time::Duration};
use thiserror::Error;

/// Failures while acquiring a raw reading from the host.
///
/// These never reach the render loop: formatters and the cpu sampler log
/// them and fall back to zero or empty values.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to run `{program}`: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("`{program}` exited with {status}")]
    Status { program: String, status: String },
    #[error("`{program}` did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("unexpected {what} format: {detail}")]
    Parse { what: &'static str, detail: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("$HOME not found, cannot locate the config file")]
    NoHome,
    #[error("failed to read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write config file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config value `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Fatal errors. Any of these ends the process with a non-zero status
/// before (or instead of) running the dashboard.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("stdout is not a terminal")]
    NotATerminal,
    #[error("could not initialise the terminal: {0}")]
    Terminal(#[source] io::Error),
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("could not start the cpu sampler: {0}")]
    Sampler(#[source] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
