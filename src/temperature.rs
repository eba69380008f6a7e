use crate::bar::{self, DisplayMode};
use crate::error::SourceError;
use crate::source::{CommandSource, MetricSource};
use std::time::Duration;
use sysinfo::Components;
use tracing::debug;

const ICON: &str = "🌡️  ";
const LABEL_WIDTH: usize = 8;
const BAR_CELLS: usize = 7;
const UNIT: &str = "°C";

/// Reads a hardware monitor sensor through sysinfo (hwmon under the hood).
#[derive(Debug, Clone)]
pub struct ComponentSensor {
    label: String,
}

impl ComponentSensor {
    pub fn new(label: impl Into<String>) -> Self {
        ComponentSensor {
            label: label.into(),
        }
    }
}

impl MetricSource for ComponentSensor {
    fn read(&self) -> Result<String, SourceError> {
        let components = Components::new_with_refreshed_list();
        components
            .list()
            .iter()
            .find(|component| label_matches(component.label(), &self.label))
            .map(|component| component.temperature())
            .filter(|celsius| celsius.is_finite())
            .map(|celsius| format!("{celsius:.1}{UNIT}"))
            .ok_or_else(|| SourceError::Parse {
                what: "hwmon",
                detail: format!("no sensor labelled {:?}", self.label),
            })
    }
}

/// Whether a sysinfo component label names the configured sensor.
///
/// On Linux sysinfo prefixes the hwmon label with the chip name, so
/// `coretemp Core 0` matches `Core 0`.
pub fn label_matches(component: &str, wanted: &str) -> bool {
    let component = component.trim();
    component == wanted
        || component
            .strip_suffix(wanted)
            .is_some_and(|chip| chip.ends_with(' '))
}

/// Reads a sensor by running lm-sensors' `sensors` tool.
#[derive(Debug, Clone)]
pub struct SensorsCommand {
    command: CommandSource,
    label: String,
}

impl SensorsCommand {
    pub fn new(label: impl Into<String>, timeout: Duration) -> Self {
        Self::with_command(CommandSource::new("sensors", timeout).arg("-A"), label)
    }

    pub fn with_command(command: CommandSource, label: impl Into<String>) -> Self {
        SensorsCommand {
            command,
            label: label.into(),
        }
    }
}

impl MetricSource for SensorsCommand {
    fn read(&self) -> Result<String, SourceError> {
        let output = self.command.read()?;
        extract_reading(&output, &self.label).ok_or_else(|| SourceError::Parse {
            what: "sensors output",
            detail: format!("no reading for {:?}", self.label),
        })
    }
}

/// Probes for a temperature source for `label`, preferring hwmon via
/// sysinfo over running `sensors`.
///
/// `sensors` only counts when its output has a reading for `label`.
pub fn probe(label: &str, timeout: Duration) -> Option<Box<dyn MetricSource>> {
    let chosen = select(
        ComponentSensor::new(label),
        SensorsCommand::new(label, timeout),
    );
    debug!(label, found = chosen.is_some(), "probed temperature");
    chosen
}

/// The first of two sources that currently produces a reading.
fn select<P, F>(preferred: P, fallback: F) -> Option<Box<dyn MetricSource>>
where
    P: MetricSource + 'static,
    F: MetricSource + 'static,
{
    if preferred.is_available() {
        debug!("temperature from structured source");
        return Some(Box::new(preferred));
    }

    match fallback.read() {
        Ok(_) => {
            debug!("temperature from external tool");
            Some(Box::new(fallback))
        }
        Err(e) => {
            debug!(error = %e, "no temperature source");
            None
        }
    }
}

/// Finds the first `N.N°C` token on the line for `label` in `sensors`
/// output.
pub fn extract_reading(output: &str, label: &str) -> Option<String> {
    output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter(|(name, _)| name.trim() == label)
        .find_map(|(_, rest)| {
            let end = rest.find(UNIT)?;
            let start = rest[..end]
                .rfind(|c: char| !(c.is_ascii_digit() || c == '.'))
                .map_or(0, |i| i + 1);
            (start < end).then(|| format!("{}{UNIT}", &rest[start..end]))
        })
}

/// The leading number of a reading such as `45.0°C`; zero when there is
/// none.
pub fn parse_celsius(reading: &str) -> f32 {
    let reading = reading.trim();
    let end = reading
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && matches!(c, '+' | '-'))))
        .map_or(reading.len(), |(i, _)| i);
    reading[..end].parse().unwrap_or(0.0)
}

/// Position of `celsius` between the configured thresholds.
pub fn fraction(celsius: f32, min: f32, max: f32) -> f32 {
    if max > min {
        (celsius - min) / (max - min)
    } else {
        0.0
    }
}

/// Formats the temperature panel: the raw reading and a bar scaled
/// between `min` and `max`.
pub fn format_line(mode: DisplayMode, reading: &str, min: f32, max: f32) -> String {
    let icon = if mode.is_unicode() { ICON } else { "" };
    let level = fraction(parse_celsius(reading), min, max);
    format!(
        "{icon}{reading:<LABEL_WIDTH$}[{}]",
        bar::render(level, BAR_CELLS, mode)
    )
}
