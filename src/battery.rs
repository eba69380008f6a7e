use crate::bar::{self, DisplayMode};
use crate::config::BatteryIcons;
use crate::source::{FileSource, MetricSource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

pub const POWER_SUPPLY: &str = "/sys/class/power_supply";

const LABEL_WIDTH: usize = 4;
const BAR_CELLS: usize = 4;

/// Finds the first power supply under `root` whose `type` is `Battery`.
pub fn find(root: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(root = %root.display(), error = %e, "no power supply class");
            return None;
        }
    };

    let mut dirs = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect::<Vec<_>>();
    // read_dir order is unspecified; BAT0 should win over BAT1
    dirs.sort();

    dirs.into_iter().find(|dir| {
        FileSource::new(dir.join("type"))
            .read()
            .is_ok_and(|kind| kind.trim() == "Battery")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeState {
    Charging,
    Discharging,
    /// Full, not charging, unknown, or anything else the kernel reports.
    Idle,
}

impl ChargeState {
    fn parse(status: &str) -> Self {
        match status.trim() {
            "Charging" => ChargeState::Charging,
            "Discharging" => ChargeState::Discharging,
            _ => ChargeState::Idle,
        }
    }
}

/// One tick's worth of battery attributes.
///
/// Charge and rate are in whatever unit the driver exposes (µAh/µA or
/// µWh/µW); only their ratios are used.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryReading {
    pub state: ChargeState,
    pub capacity: f32,
    pub full: f64,
    pub now: f64,
    pub rate: f64,
}

impl BatteryReading {
    /// Estimated seconds until full (charging) or empty (discharging).
    pub fn remaining_secs(&self) -> Option<u64> {
        let hours = match self.state {
            ChargeState::Charging => (self.full - self.now) / self.rate,
            ChargeState::Discharging => self.now / self.rate,
            ChargeState::Idle => return None,
        };
        let secs = hours * 3600.0;
        (secs.is_finite() && secs >= 1.0).then(|| secs as u64)
    }
}

/// A battery exposed through sysfs.
#[derive(Debug, Clone)]
pub struct Battery {
    dir: PathBuf,
}

impl Battery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Battery { dir: dir.into() }
    }

    /// Reads all attributes. Attributes that cannot be read or parsed come
    /// back as zero, so this always produces something to draw.
    pub fn read(&self) -> BatteryReading {
        BatteryReading {
            state: ChargeState::parse(&self.attr(&["status"]).unwrap_or_default()),
            capacity: self.number(&["capacity"]) as f32,
            full: self.number(&["charge_full", "energy_full"]),
            now: self.number(&["charge_now", "energy_now"]),
            rate: self.number(&["current_now", "power_now"]),
        }
    }

    /// The first of `names` that can be read.
    fn attr(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| {
            FileSource::new(self.dir.join(name))
                .read()
                .inspect_err(|e| trace!(error = %e, "battery attribute"))
                .ok()
        })
    }

    fn number(&self, names: &[&str]) -> f64 {
        self.attr(names)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0.0)
    }
}

/// `HH:MM`, or empty when there is no estimate.
pub fn format_remaining(secs: Option<u64>) -> String {
    match secs {
        Some(secs) if secs > 0 => format!("{:02}:{:02}", secs / 3600, (secs % 3600) / 60),
        _ => String::new(),
    }
}

/// Formats the battery panel: charge percentage, a short bar delimited by
/// double bars, and the remaining-time estimate.
pub fn format_line(mode: DisplayMode, reading: &BatteryReading, icons: &BatteryIcons) -> String {
    let percent = format!("{}%", reading.capacity.round() as i64);
    let meter = bar::render(reading.capacity / 100.0, BAR_CELLS, mode);
    let remaining = format_remaining(reading.remaining_secs());

    match mode {
        DisplayMode::Unicode => {
            let icon = match reading.state {
                ChargeState::Discharging => &icons.discharging,
                ChargeState::Charging | ChargeState::Idle => &icons.charging,
            };
            format!("{icon} {percent:<LABEL_WIDTH$}║{meter}╠ {remaining}")
        }
        DisplayMode::Plain => format!("{percent:<LABEL_WIDTH$}|{meter}| {remaining}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, value: &str) {
        fs::write(dir.join(name), value).unwrap();
    }

    fn reading(state: ChargeState, capacity: f32, full: f64, now: f64, rate: f64) -> BatteryReading {
        BatteryReading {
            state,
            capacity,
            full,
            now,
            rate,
        }
    }

    #[test]
    fn test_find_battery_skips_mains() {
        let root = tempfile::tempdir().unwrap();
        let ac = root.path().join("AC");
        let bat = root.path().join("BAT0");
        fs::create_dir(&ac).unwrap();
        fs::create_dir(&bat).unwrap();
        write(&ac, "type", "Mains\n");
        write(&bat, "type", "Battery\n");

        assert_eq!(find(root.path()), Some(bat));
    }

    #[test]
    fn test_find_battery_none() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(find(root.path()), None);
        assert_eq!(find(&root.path().join("missing")), None);
    }

    #[test]
    fn test_read_charge_attributes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "status", "Discharging\n");
        write(dir.path(), "capacity", "81\n");
        write(dir.path(), "charge_full", "4000000\n");
        write(dir.path(), "charge_now", "3000000\n");
        write(dir.path(), "current_now", "1000000\n");

        let got = Battery::new(dir.path()).read();
        assert_eq!(got, reading(ChargeState::Discharging, 81.0, 4e6, 3e6, 1e6));
        assert_eq!(got.remaining_secs(), Some(3 * 3600));
    }

    #[test]
    fn test_read_energy_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "status", "Charging\n");
        write(dir.path(), "capacity", "50\n");
        write(dir.path(), "energy_full", "60000000\n");
        write(dir.path(), "energy_now", "30000000\n");
        write(dir.path(), "power_now", "20000000\n");

        let got = Battery::new(dir.path()).read();
        assert_eq!(got.state, ChargeState::Charging);
        // (60 - 30) / 20 = 1.5h
        assert_eq!(got.remaining_secs(), Some(5400));
    }

    #[test]
    fn test_unreadable_battery_degrades() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "capacity", "plenty\n");

        let got = Battery::new(dir.path()).read();
        assert_eq!(got, reading(ChargeState::Idle, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(got.remaining_secs(), None);
    }

    #[test]
    fn test_zero_rate_has_no_estimate() {
        let got = reading(ChargeState::Discharging, 90.0, 4e6, 3e6, 0.0);
        assert_eq!(got.remaining_secs(), None);
    }

    #[test]
    fn test_idle_has_no_estimate() {
        let got = reading(ChargeState::Idle, 100.0, 4e6, 4e6, 1e6);
        assert_eq!(got.remaining_secs(), None);
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Some(3 * 3600 + 25 * 60 + 59)), "03:25");
        assert_eq!(format_remaining(Some(59)), "00:00");
        assert_eq!(format_remaining(Some(0)), "");
        assert_eq!(format_remaining(None), "");
    }

    #[test]
    fn test_format_line() {
        let icons = BatteryIcons::default();
        let discharging = reading(ChargeState::Discharging, 75.0, 4e6, 3e6, 1e6);
        assert_eq!(
            format_line(DisplayMode::Unicode, &discharging, &icons),
            format!("{} 75% ║███ ╠ 03:00", icons.discharging)
        );
        assert_eq!(
            format_line(DisplayMode::Plain, &discharging, &icons),
            "75% |### | 03:00"
        );

        let full = reading(ChargeState::Idle, 100.0, 4e6, 4e6, 0.0);
        assert_eq!(
            format_line(DisplayMode::Unicode, &full, &icons),
            format!("{} 100%║████╠ ", icons.charging)
        );
    }
}
