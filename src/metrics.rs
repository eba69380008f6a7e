use crate::bar::DisplayMode;
use crate::battery::{self, Battery};
use crate::clock;
use crate::config::{BatteryIcons, Config};
use crate::cpu::{self, CpuUsage};
use crate::layout::Panel;
use crate::logging::FailureLatch;
use crate::memory::{self, MemInfo};
use crate::source::MetricSource;
use crate::temperature;
use std::path::Path;
use tracing::debug;

/// Which optional subsystems were found at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    pub battery: bool,
    pub temperature: bool,
}

/// The metric sources behind each panel, and the formatting settings.
///
/// Every `line` call is total: read failures are logged once and drawn as
/// zero or empty values.
pub struct Metrics {
    battery: Option<Battery>,
    load: Box<dyn MetricSource>,
    usage: CpuUsage,
    memory: Box<dyn MetricSource>,
    temperature: Option<Box<dyn MetricSource>>,
    temp_min: f32,
    temp_max: f32,
    icons: BatteryIcons,
    load_latch: FailureLatch,
    memory_latch: FailureLatch,
    temperature_latch: FailureLatch,
}

impl Metrics {
    /// Probes the host once for the optional battery and temperature
    /// subsystems.
    pub fn probe(config: &Config, usage: CpuUsage) -> Self {
        let battery = battery::find(Path::new(battery::POWER_SUPPLY)).map(Battery::new);
        let temperature = temperature::probe(&config.temp_sensor, config.command_timeout());
        debug!(
            battery = battery.is_some(),
            temperature = temperature.is_some(),
            "probed optional panels"
        );

        Metrics {
            battery,
            load: cpu::load_source(),
            usage,
            memory: Box::new(memory::source()),
            temperature,
            temp_min: config.temp_min,
            temp_max: config.temp_max,
            icons: config.battery.clone(),
            load_latch: FailureLatch::default(),
            memory_latch: FailureLatch::default(),
            temperature_latch: FailureLatch::default(),
        }
    }

    pub fn availability(&self) -> Availability {
        Availability {
            battery: self.battery.is_some(),
            temperature: self.temperature.is_some(),
        }
    }

    /// Formats one panel's row.
    pub fn line(&mut self, panel: Panel, mode: DisplayMode) -> String {
        match panel {
            Panel::Clock => clock::format_line(mode, &clock::now()),
            Panel::Battery => match &self.battery {
                Some(battery) => battery::format_line(mode, &battery.read(), &self.icons),
                None => String::new(),
            },
            Panel::Cpu => {
                let loadavg = self
                    .load_latch
                    .observe("load average", self.load.read())
                    .unwrap_or_default();
                cpu::format_line(mode, cpu::one_minute_load(&loadavg), self.usage.load())
            }
            Panel::Memory => {
                let info = self
                    .memory_latch
                    .observe("meminfo", self.memory.read())
                    .map(|text| MemInfo::parse(&text))
                    .unwrap_or_default();
                memory::format_line(mode, &info)
            }
            Panel::Temperature => {
                let Some(source) = &self.temperature else {
                    return String::new();
                };
                let reading = self
                    .temperature_latch
                    .observe("temperature", source.read())
                    .unwrap_or_default();
                temperature::format_line(mode, &reading, self.temp_min, self.temp_max)
            }
        }
    }
}

#[cfg(test)]
impl Metrics {
    /// Metrics backed by canned sources instead of the host.
    pub fn with_sources(
        load: Box<dyn MetricSource>,
        memory: Box<dyn MetricSource>,
        temperature: Option<Box<dyn MetricSource>>,
        usage: CpuUsage,
    ) -> Self {
        let config = Config::default();
        Metrics {
            battery: None,
            load,
            usage,
            memory,
            temperature,
            temp_min: config.temp_min,
            temp_max: config.temp_max,
            icons: config.battery,
            load_latch: FailureLatch::default(),
            memory_latch: FailureLatch::default(),
            temperature_latch: FailureLatch::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockSource;

    const MEMINFO: &str = "MemTotal: 16000000 kB\nMemFree: 8000000 kB\nBuffers: 500000 kB\nCached: 1500000 kB\n";

    #[test]
    fn test_lines_from_sources() {
        let mut metrics = Metrics::with_sources(
            Box::new(MockSource::ok(["0.52 0.58 0.59 2/1024 31337\n"])),
            Box::new(MockSource::ok([MEMINFO])),
            Some(Box::new(MockSource::ok(["50.0°C"]))),
            CpuUsage::new(),
        );

        assert_eq!(metrics.line(Panel::Cpu, DisplayMode::Plain), "0.52     [       ]");
        assert_eq!(metrics.line(Panel::Memory, DisplayMode::Plain), "5.7GB   [###    ]");
        assert_eq!(
            metrics.line(Panel::Temperature, DisplayMode::Plain),
            "50.0°C  [####   ]"
        );
        assert_eq!(metrics.line(Panel::Battery, DisplayMode::Plain), "");
    }

    #[test]
    fn test_failed_reads_still_draw() {
        let mut metrics = Metrics::with_sources(
            Box::new(MockSource::ok(Vec::<String>::new())),
            Box::new(MockSource::ok(Vec::<String>::new())),
            Some(Box::new(MockSource::ok(Vec::<String>::new()))),
            CpuUsage::new(),
        );

        assert_eq!(metrics.line(Panel::Cpu, DisplayMode::Plain), "         [       ]");
        assert_eq!(metrics.line(Panel::Memory, DisplayMode::Plain), "0.0GB   [       ]");
        assert_eq!(
            metrics.line(Panel::Temperature, DisplayMode::Plain),
            "        [       ]"
        );
    }

    #[test]
    fn test_availability() {
        let metrics = Metrics::with_sources(
            Box::new(MockSource::default()),
            Box::new(MockSource::default()),
            None,
            CpuUsage::new(),
        );
        assert_eq!(
            metrics.availability(),
            Availability {
                battery: false,
                temperature: false,
            }
        );
    }
}
