use crate::bar::{self, DisplayMode};
use crate::source::FileSource;

pub const MEMINFO: &str = "/proc/meminfo";

const ICON: &str = "🎟  ";
const LABEL_WIDTH: usize = 8;
const BAR_CELLS: usize = 7;
const KIB_PER_GIB: f64 = 1_048_576.0;

pub fn source() -> FileSource {
    FileSource::new(MEMINFO)
}

/// The `/proc/meminfo` fields the memory panel needs, in KiB.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemInfo {
    pub total: f64,
    pub free: f64,
    pub buffers: f64,
    pub cached: f64,
}

impl MemInfo {
    /// Parses `/proc/meminfo`. Missing or unparsable fields read as zero.
    pub fn parse(meminfo: &str) -> Self {
        let mut info = MemInfo::default();
        for line in meminfo.lines() {
            let mut fields = line.split_whitespace();
            let (Some(key), Some(value)) = (fields.next(), fields.next()) else {
                continue;
            };
            let value = value.parse::<f64>().unwrap_or(0.0);
            match key.trim_end_matches(':') {
                "MemTotal" => info.total = value,
                "MemFree" => info.free = value,
                "Buffers" => info.buffers = value,
                "Cached" => info.cached = value,
                _ => {}
            }
        }
        info
    }

    /// Memory in use by processes, excluding buffers and page cache.
    pub fn used(&self) -> f64 {
        (self.total - self.free - self.buffers - self.cached).max(0.0)
    }

    pub fn used_fraction(&self) -> f32 {
        if self.total <= 0.0 {
            0.0
        } else {
            (self.used() / self.total) as f32
        }
    }
}

/// Formats the memory panel: used GiB to one decimal place and a bar.
pub fn format_line(mode: DisplayMode, info: &MemInfo) -> String {
    let icon = if mode.is_unicode() { ICON } else { "" };
    let label = format!("{:.1}GB", info.used() / KIB_PER_GIB);
    format!(
        "{icon}{label:<LABEL_WIDTH$}[{}]",
        bar::render(info.used_fraction(), BAR_CELLS, mode)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO_SAMPLE: &str = "\
MemTotal:       16000000 kB
MemFree:         8000000 kB
MemAvailable:   10000000 kB
Buffers:          500000 kB
Cached:          1500000 kB
SwapCached:            0 kB
Active:          3000000 kB
";

    #[test]
    fn test_parse_fields() {
        let info = MemInfo::parse(MEMINFO_SAMPLE);
        assert_eq!(
            info,
            MemInfo {
                total: 16_000_000.0,
                free: 8_000_000.0,
                buffers: 500_000.0,
                cached: 1_500_000.0,
            }
        );
    }

    #[test]
    fn test_used_memory() {
        let info = MemInfo::parse(MEMINFO_SAMPLE);
        assert_eq!(info.used(), 6_000_000.0);
        assert_eq!(info.used_fraction(), 0.375);
    }

    #[test]
    fn test_format_line() {
        let info = MemInfo::parse(MEMINFO_SAMPLE);
        assert_eq!(format_line(DisplayMode::Plain, &info), "5.7GB   [###    ]");
        assert_eq!(format_line(DisplayMode::Unicode, &info), "🎟  5.7GB   [██▋    ]");
    }

    #[test]
    fn test_garbage_degrades_to_zero() {
        let info = MemInfo::parse("MemTotal: lots kB\nnonsense\n\n");
        assert_eq!(info, MemInfo::default());
        assert_eq!(info.used_fraction(), 0.0);
        assert_eq!(format_line(DisplayMode::Plain, &info), "0.0GB   [       ]");
    }
}
