use crate::bar::DisplayMode;
use chrono::{DateTime, Local, TimeZone};

const FORMAT: &str = "%Y-%m-%d %H:%M";
const ICON: &str = "🕒 ";

pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Formats the clock panel: date and time to the minute, no bar.
pub fn format_line<Tz: TimeZone>(mode: DisplayMode, time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let stamp = time.format(FORMAT);
    if mode.is_unicode() {
        format!("{ICON}{stamp}")
    } else {
        stamp.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_plain_clock() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 59).unwrap();
        assert_eq!(format_line(DisplayMode::Plain, &time), "2024-03-09 07:05");
    }

    #[test]
    fn test_unicode_clock_has_icon() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let time = offset.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(format_line(DisplayMode::Unicode, &time), "🕒 2024-12-31 23:59");
    }
}
