use crate::app::DashboardState;
use crate::layout::Panel;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Text},
    widgets::{Clear, Paragraph},
};

/// Draws one frame: the panel rows centered on screen, then the help
/// block in the top-left corner when it is toggled on.
pub fn render(f: &mut Frame, state: &DashboardState, lines: &[String]) {
    let size = f.area();

    // recomputed each frame; the terminal may have been resized
    let area = state.geometry().area(size);
    let rows = lines.iter().map(|line| Line::raw(line.as_str())).collect::<Vec<_>>();
    f.render_widget(Paragraph::new(rows), area);

    if state.help_visible {
        render_help(f, state, size);
    }
}

fn help_lines(state: &DashboardState) -> Vec<Line<'static>> {
    let optional = |panel: Panel, text: &'static str| -> Line<'static> {
        if state.panels.is_available(panel) {
            Line::raw(text)
        } else {
            Line::raw(format!("{text} (not found)"))
        }
    };

    vec![
        Line::raw("tmon"),
        Line::raw("a tiny system monitor for Linux"),
        Line::raw(""),
        Line::raw("Keybinds:"),
        Line::raw("q:     Exit"),
        Line::raw("h:     Toggle this help"),
        Line::raw("Space: Toggle unicode mode (default on)"),
        Line::raw("d:     Toggle date and time"),
        optional(Panel::Battery, "b:     Toggle battery"),
        Line::raw("c:     Toggle load and CPU utilisation"),
        Line::raw("m:     Toggle memory usage"),
        optional(Panel::Temperature, "t:     Toggle CPU temperature"),
    ]
}

fn render_help(f: &mut Frame, state: &DashboardState, screen: Rect) {
    let lines = help_lines(state);
    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
    let area = Rect {
        x: screen.x,
        y: screen.y,
        width: width.min(screen.width),
        height: (lines.len() as u16).min(screen.height),
    };

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(Text::from(lines)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::DisplayMode;
    use crate::metrics::Availability;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    fn state(mode: DisplayMode) -> DashboardState {
        DashboardState::new(
            Availability {
                battery: false,
                temperature: true,
            },
            mode,
        )
    }

    fn draw(width: u16, height: u16, state: &DashboardState, lines: &[String]) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, state, lines)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn row(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_rows_are_centered() {
        let state = state(DisplayMode::Plain);
        let lines = vec![
            "2024-03-09 07:05".to_string(),
            "0.52     [####   ]".to_string(),
            "5.7GB   [###    ]".to_string(),
            "50.0°C  [####   ]".to_string(),
        ];
        // 4 lines, 16 columns wide, on 40x10: anchor (12, 3)
        let buffer = draw(40, 10, &state, &lines);

        assert_eq!(row(&buffer, 2).trim(), "");
        assert_eq!(row(&buffer, 3), format!("{:12}{:28}", "", "2024-03-09 07:05"));
        assert_eq!(row(&buffer, 4), format!("{:12}{:28}", "", "0.52     [####   ]"));
        assert_eq!(row(&buffer, 6).trim_end(), format!("{:12}50.0°C  [####   ]", ""));
        assert_eq!(row(&buffer, 7).trim(), "");
    }

    #[test]
    fn test_resize_recenters() {
        let state = state(DisplayMode::Plain);
        let lines = vec!["x".to_string(); 4];
        let small = draw(20, 4, &state, &lines);
        let large = draw(60, 20, &state, &lines);

        assert_eq!(small[(2, 0)].symbol(), "x");
        assert_eq!(large[(22, 8)].symbol(), "x");
    }

    #[test]
    fn test_help_overlays_top_left() {
        let state = state(DisplayMode::Unicode);
        let help = DashboardState {
            help_visible: true,
            ..state
        };
        let buffer = draw(60, 20, &help, &[]);

        assert!(row(&buffer, 0).starts_with("tmon"));
        let text = (0..20).map(|y| row(&buffer, y)).collect::<Vec<_>>().join("\n");
        assert!(text.contains("b:     Toggle battery (not found)"));
        assert!(text.contains("t:     Toggle CPU temperature "));

        let hidden = draw(60, 20, &state, &[]);
        assert_eq!(row(&hidden, 0).trim(), "");
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let help = DashboardState {
            help_visible: true,
            ..state(DisplayMode::Unicode)
        };
        let lines = vec!["🖥  0.52     [███▌   ]".to_string(); 4];
        draw(3, 2, &help, &lines);
    }
}
