/// Glyph set used for progress bars and panel icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Eighth-resolution block glyphs and emoji icons.
    Unicode,
    /// ASCII cells, no icons.
    Plain,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Unicode => DisplayMode::Plain,
            DisplayMode::Plain => DisplayMode::Unicode,
        }
    }

    pub fn is_unicode(self) -> bool {
        matches!(self, DisplayMode::Unicode)
    }
}

/// Block glyphs indexed by fill level, 0 (empty) through 8 (full).
const EIGHTHS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

const PLAIN_FULL: char = '#';
const PLAIN_EMPTY: char = ' ';

/// Renders `fraction` as a bar exactly `cells` cells wide.
///
/// The fraction does not need to be clamped: anything below zero draws an
/// empty bar and anything above one draws a full bar. In unicode mode the
/// cell holding the boundary is quantized to the nearest eighth; plain mode
/// rounds each cell at its midpoint instead.
pub fn render(fraction: f32, cells: usize, mode: DisplayMode) -> String {
    if cells == 0 {
        return String::new();
    }

    // NaN would fail every comparison below and leave the cells undecided.
    let fraction = if fraction.is_nan() { 0.0 } else { fraction };
    // measured in cells, not fractions of the bar.
    let filled = fraction * cells as f32;

    (0..cells)
        .map(|i| {
            let start = i as f32;
            match mode {
                DisplayMode::Unicode => {
                    let remainder = filled - start;
                    if remainder < 0.0 {
                        EIGHTHS[0]
                    } else if start + 1.0 < filled {
                        EIGHTHS[8]
                    } else {
                        let level = (remainder * 8.0).round().clamp(0.0, 8.0);
                        EIGHTHS[level as usize]
                    }
                }
                DisplayMode::Plain => {
                    if filled >= start + 0.5 {
                        PLAIN_FULL
                    } else {
                        PLAIN_EMPTY
                    }
                }
            }
        })
        .collect()
}
