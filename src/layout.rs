use crate::bar::DisplayMode;
use ratatui::layout::Rect;

/// Nominal width of the dashboard block in plain mode.
pub const BASE_WIDTH: u16 = 16;
/// Extra leading columns reserved for icons in unicode mode.
pub const ICON_MARGIN: u16 = 3;

/// One toggleable row of the dashboard, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Clock,
    Battery,
    Cpu,
    Memory,
    Temperature,
}

impl Panel {
    pub const ALL: [Panel; 5] = [
        Panel::Clock,
        Panel::Battery,
        Panel::Cpu,
        Panel::Memory,
        Panel::Temperature,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Panel::Clock => "clock",
            Panel::Battery => "battery",
            Panel::Cpu => "cpu",
            Panel::Memory => "memory",
            Panel::Temperature => "temperature",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flags {
    visible: bool,
    available: bool,
}

/// Visibility and availability of every panel.
///
/// Availability is fixed at startup; only visibility changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSet {
    flags: [Flags; 5],
}

impl PanelSet {
    /// Every available panel starts visible. Clock, cpu and memory are
    /// always available.
    pub fn new(battery: bool, temperature: bool) -> Self {
        let mut flags = [Flags {
            visible: true,
            available: true,
        }; 5];
        for (panel, available) in [(Panel::Battery, battery), (Panel::Temperature, temperature)] {
            flags[panel.index()] = Flags {
                visible: available,
                available,
            };
        }
        PanelSet { flags }
    }

    pub fn is_available(&self, panel: Panel) -> bool {
        self.flags[panel.index()].available
    }

    /// Whether the panel is drawn.
    pub fn is_shown(&self, panel: Panel) -> bool {
        let Flags { visible, available } = self.flags[panel.index()];
        visible && available
    }

    /// Flips a panel's visibility. Unavailable panels are left alone;
    /// returns whether anything changed.
    pub fn toggle(&mut self, panel: Panel) -> bool {
        let flags = &mut self.flags[panel.index()];
        if !flags.available {
            return false;
        }
        flags.visible = !flags.visible;
        true
    }

    /// Shown panels in display order.
    pub fn shown(&self) -> impl Iterator<Item = Panel> + '_ {
        Panel::ALL.into_iter().filter(|panel| self.is_shown(*panel))
    }
}

/// Size of the dashboard block, derived fresh every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub lines: u16,
    pub width: u16,
}

impl Geometry {
    pub fn compute(panels: &PanelSet, mode: DisplayMode) -> Self {
        let margin = if mode.is_unicode() { ICON_MARGIN } else { 0 };
        Geometry {
            lines: panels.shown().count() as u16,
            width: BASE_WIDTH + margin,
        }
    }

    /// Top-left corner that centers the block on a `columns` x `rows`
    /// screen, pinned to the origin when the screen is too small.
    pub fn anchor(&self, columns: u16, rows: u16) -> (u16, u16) {
        (
            columns.saturating_sub(self.width) / 2,
            rows.saturating_sub(self.lines) / 2,
        )
    }

    /// Where to draw the block inside `screen`.
    ///
    /// Rows are allowed to run past the nominal width up to the screen's
    /// right edge, so wide glyphs are not clipped.
    pub fn area(&self, screen: Rect) -> Rect {
        let (x, y) = self.anchor(screen.width, screen.height);
        let area = Rect {
            x: screen.x + x,
            y: screen.y + y,
            width: screen.width - x,
            height: self.lines,
        };
        area.intersection(screen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_show_available_panels() {
        let panels = PanelSet::new(true, true);
        assert_eq!(panels.shown().collect::<Vec<_>>(), Panel::ALL.to_vec());

        let panels = PanelSet::new(false, false);
        assert_eq!(
            panels.shown().collect::<Vec<_>>(),
            vec![Panel::Clock, Panel::Cpu, Panel::Memory]
        );
    }

    #[test]
    fn test_unavailable_panels_cannot_toggle() {
        let mut panels = PanelSet::new(false, true);
        assert!(!panels.toggle(Panel::Battery));
        assert!(!panels.is_shown(Panel::Battery));
        assert!(panels.toggle(Panel::Temperature));
        assert!(!panels.is_shown(Panel::Temperature));
    }

    #[test]
    fn test_double_toggle_restores_state() {
        for panel in Panel::ALL {
            let mut panels = PanelSet::new(true, true);
            let before = panels;
            let geometry = Geometry::compute(&panels, DisplayMode::Unicode);

            panels.toggle(panel);
            assert_ne!(panels, before);
            assert_eq!(
                Geometry::compute(&panels, DisplayMode::Unicode).lines,
                geometry.lines - 1
            );

            panels.toggle(panel);
            assert_eq!(panels, before);
            assert_eq!(Geometry::compute(&panels, DisplayMode::Unicode), geometry);
        }
    }

    #[test]
    fn test_width_depends_on_mode_only() {
        let panels = PanelSet::new(true, false);
        let unicode = Geometry::compute(&panels, DisplayMode::Unicode);
        let plain = Geometry::compute(&panels, DisplayMode::Plain);
        assert_eq!(unicode.width, 19);
        assert_eq!(plain.width, 16);
        assert_eq!(unicode.width - plain.width, ICON_MARGIN);
        assert_eq!(unicode.lines, plain.lines);
    }

    #[test]
    fn test_all_hidden_is_empty() {
        let mut panels = PanelSet::new(false, false);
        for panel in [Panel::Clock, Panel::Cpu, Panel::Memory] {
            panels.toggle(panel);
        }
        assert_eq!(Geometry::compute(&panels, DisplayMode::Plain).lines, 0);
    }

    #[test]
    fn test_anchor_centers_block() {
        let geometry = Geometry { lines: 5, width: 19 };
        assert_eq!(geometry.anchor(80, 24), (30, 9));
        assert_eq!(geometry.anchor(19, 5), (0, 0));
        // smaller than the block
        assert_eq!(geometry.anchor(10, 2), (0, 0));
    }

    #[test]
    fn test_area_extends_to_right_edge() {
        let geometry = Geometry { lines: 3, width: 16 };
        let area = geometry.area(Rect::new(0, 0, 80, 24));
        assert_eq!(area, Rect::new(32, 10, 48, 3));

        let cramped = geometry.area(Rect::new(0, 0, 10, 2));
        assert_eq!(cramped, Rect::new(0, 0, 10, 2));
    }
}
