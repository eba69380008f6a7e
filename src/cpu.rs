use crate::bar::{self, DisplayMode};
use crate::error::SourceError;
use crate::logging::FailureLatch;
use crate::source::{FileSource, MetricSource};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use sysinfo::System;
use tracing::debug;

const STAT: &str = "/proc/stat";
const LOADAVG: &str = "/proc/loadavg";

const ICON: &str = "🖥  ";
const LABEL_WIDTH: usize = 9;
const BAR_CELLS: usize = 7;

/// Cumulative time counters for all cpus, in clock ticks since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuCounters {
    pub total: u64,
    pub idle: u64,
}

impl CpuCounters {
    /// Parses the aggregate `cpu` line of `/proc/stat`.
    ///
    /// Every listed state counts towards `total`; only the idle task counts
    /// as idle.
    pub fn parse(stat: &str) -> Result<Self, SourceError> {
        let line = stat
            .lines()
            .find(|line| line.split_whitespace().next() == Some("cpu"))
            .ok_or_else(|| SourceError::Parse {
                what: "/proc/stat",
                detail: "no aggregate cpu line".to_string(),
            })?;

        let times = line
            .split_whitespace()
            .skip(1)
            .map(str::parse::<u64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SourceError::Parse {
                what: "/proc/stat",
                detail: e.to_string(),
            })?;

        // user nice system idle are present on every kernel
        if times.len() < 4 {
            return Err(SourceError::Parse {
                what: "/proc/stat",
                detail: format!("expected at least 4 cpu times, found {}", times.len()),
            });
        }

        Ok(CpuCounters {
            total: times.iter().sum(),
            idle: times[3],
        })
    }

    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.idle)
    }

    /// Fraction of the elapsed time between `prev` and `self` that was spent
    /// busy. A counter that went backwards reads as zero.
    pub fn usage_since(&self, prev: &CpuCounters) -> f32 {
        if self.total < prev.total || self.used() < prev.used() {
            return 0.0;
        }
        let total = self.total - prev.total;
        if total == 0 {
            return 0.0;
        }
        let used = self.used() - prev.used();
        (used as f64 / total as f64).clamp(0.0, 1.0) as f32
    }
}

/// The latest cpu utilisation in `[0, 1]`, shared between the sampler
/// thread (the only writer) and the render loop.
#[derive(Debug, Clone, Default)]
pub struct CpuUsage(Arc<AtomicU32>);

impl CpuUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    fn store(&self, usage: f32) {
        self.0.store(usage.to_bits(), Ordering::Release);
    }
}

/// Commands sent from the main thread to the sampler.
pub enum SamplerCommand {
    Stop,
}

/// Computes delta-based cpu utilisation from cumulative counters.
pub struct CpuSampler<S> {
    source: S,
    prev: CpuCounters,
    usage: CpuUsage,
    latch: FailureLatch,
}

impl CpuSampler<FileSource> {
    pub fn proc_stat(usage: CpuUsage) -> Self {
        Self::new(FileSource::new(STAT), usage)
    }
}

impl<S: MetricSource> CpuSampler<S> {
    pub fn new(source: S, usage: CpuUsage) -> Self {
        CpuSampler {
            source,
            prev: CpuCounters::default(),
            usage,
            latch: FailureLatch::default(),
        }
    }

    /// Takes one sample and publishes it. The first sample is measured
    /// against zeroed counters, i.e. it is the average since boot.
    pub fn sample(&mut self) -> f32 {
        let counters = self
            .source
            .read()
            .and_then(|stat| CpuCounters::parse(&stat));

        let usage = match self.latch.observe("cpu counters", counters) {
            Some(curr) => {
                let usage = curr.usage_since(&self.prev);
                self.prev = curr;
                usage
            }
            None => 0.0,
        };

        self.usage.store(usage);
        usage
    }
}

impl<S: MetricSource + 'static> CpuSampler<S> {
    /// Runs the sampler on its own thread, sampling immediately and then
    /// once per `interval` until told to stop.
    pub fn spawn(mut self, interval: Duration) -> io::Result<SamplerHandle> {
        let (command_tx, command_rx) = mpsc::channel::<SamplerCommand>();

        let handle = thread::Builder::new()
            .name("cpu-sampler".to_string())
            .spawn(move || {
                loop {
                    let usage = self.sample();
                    tracing::trace!(usage, "cpu sample");

                    match command_rx.recv_timeout(interval) {
                        Ok(SamplerCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                }
                debug!("cpu sampler stopped");
            })?;

        Ok(SamplerHandle { command_tx, handle })
    }
}

/// Owner's side of a running sampler.
pub struct SamplerHandle {
    command_tx: Sender<SamplerCommand>,
    handle: JoinHandle<()>,
}

impl SamplerHandle {
    /// Signals the sampler and waits for its thread to exit.
    pub fn shutdown(self) {
        let _ = self.command_tx.send(SamplerCommand::Stop);
        if self.handle.join().is_err() {
            tracing::error!("cpu sampler panicked");
        }
    }
}

/// Load averages via sysinfo, for systems without `/proc/loadavg`.
#[derive(Debug, Default)]
pub struct SysinfoLoadAvg;

impl MetricSource for SysinfoLoadAvg {
    fn read(&self) -> Result<String, SourceError> {
        let load = System::load_average();
        Ok(format!("{:.2} {:.2} {:.2}", load.one, load.five, load.fifteen))
    }
}

/// The load-average source: `/proc/loadavg` when readable, sysinfo
/// otherwise.
pub fn load_source() -> Box<dyn MetricSource> {
    let file = FileSource::new(LOADAVG);
    if file.is_available() {
        Box::new(file)
    } else {
        debug!("{LOADAVG} unreadable, using sysinfo load averages");
        Box::new(SysinfoLoadAvg)
    }
}

/// First token of a load-average reading: the one-minute average.
pub fn one_minute_load(loadavg: &str) -> &str {
    loadavg.split_whitespace().next().unwrap_or("")
}

/// Formats the load/cpu panel.
pub fn format_line(mode: DisplayMode, load: &str, usage: f32) -> String {
    let icon = if mode.is_unicode() { ICON } else { "" };
    format!(
        "{icon}{load:<LABEL_WIDTH$}[{}]",
        bar::render(usage, BAR_CELLS, mode)
    )
}
