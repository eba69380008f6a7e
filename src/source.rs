use crate::error::SourceError;
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

/// A provider of raw, unparsed metric text.
///
/// Structured pseudo-files are preferred; running an external tool is the
/// fallback for data the kernel does not expose as a file.
pub trait MetricSource: Send {
    fn read(&self) -> Result<String, SourceError>;

    /// Startup probe: whether a read currently succeeds.
    fn is_available(&self) -> bool {
        self.read().is_ok()
    }
}

impl<T: MetricSource + ?Sized> MetricSource for Box<T> {
    fn read(&self) -> Result<String, SourceError> {
        (**self).read()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// Reads a whole file, typically under `/proc` or `/sys`.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl MetricSource for FileSource {
    fn read(&self) -> Result<String, SourceError> {
        fs::read_to_string(&self.path).map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// Runs an external program and captures its stdout.
///
/// Each run is bounded by `timeout`; a program that overruns it is killed
/// and the read fails, so a hung tool costs at most one timeout per frame.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSource {
    const POLL: Duration = Duration::from_millis(5);

    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        CommandSource {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn spawn_error(&self, source: io::Error) -> SourceError {
        SourceError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

/// Kills and reaps a child that is no longer wanted.
fn abandon(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl MetricSource for CommandSource {
    fn read(&self) -> Result<String, SourceError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // drain stdout concurrently so a chatty tool cannot block on a full pipe
        let reader = child.stdout.take().map(|mut stdout| {
            thread::spawn(move || {
                let mut out = String::new();
                stdout.read_to_string(&mut out).map(|_| out)
            })
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    abandon(&mut child);
                    return Err(SourceError::Timeout {
                        program: self.program.clone(),
                        timeout: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(Self::POLL),
                Err(e) => {
                    abandon(&mut child);
                    return Err(self.spawn_error(e));
                }
            }
        };

        let output = match reader {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Ok(String::new()))
                .map_err(|e| self.spawn_error(e))?,
            None => String::new(),
        };

        if !status.success() {
            return Err(SourceError::Status {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }

        Ok(output)
    }
}

#[cfg(test)]
pub use mock::MockSource;
