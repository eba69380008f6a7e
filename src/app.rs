use crate::bar::DisplayMode;
use crate::layout::{Geometry, Panel, PanelSet};
use crate::metrics::{Availability, Metrics};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::time::Duration;
use tracing::debug;

/// Everything the key handlers can change. Owned by the render loop and
/// replaced wholesale on each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardState {
    pub mode: DisplayMode,
    pub panels: PanelSet,
    pub help_visible: bool,
    pub running: bool,
}

impl DashboardState {
    pub fn new(available: Availability, mode: DisplayMode) -> Self {
        DashboardState {
            mode,
            panels: PanelSet::new(available.battery, available.temperature),
            help_visible: false,
            running: true,
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::compute(&self.panels, self.mode)
    }

    /// Applies one key press.
    pub fn on_key(mut self, key: KeyEvent) -> Self {
        if key.kind != KeyEventKind::Press {
            return self;
        }

        // raw mode swallows SIGINT, so ctrl-c has to be handled here
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('c') {
                self.running = false;
            }
            return self;
        }

        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char(' ') => self.mode = self.mode.toggled(),
            KeyCode::Char('h') => self.help_visible = !self.help_visible,
            KeyCode::Char('d') => self.toggle(Panel::Clock),
            KeyCode::Char('b') => self.toggle(Panel::Battery),
            KeyCode::Char('c') => self.toggle(Panel::Cpu),
            KeyCode::Char('m') => self.toggle(Panel::Memory),
            KeyCode::Char('t') => self.toggle(Panel::Temperature),
            _ => {}
        }
        self
    }

    fn toggle(&mut self, panel: Panel) {
        if !self.panels.toggle(panel) {
            debug!(panel = panel.name(), "panel unavailable, ignoring toggle");
        }
    }
}

pub struct App {
    pub state: DashboardState,
    metrics: Metrics,
    interval: Duration,
}

impl App {
    pub fn new(metrics: Metrics, mode: DisplayMode, interval: Duration) -> Self {
        App {
            state: DashboardState::new(metrics.availability(), mode),
            metrics,
            interval,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// The formatted rows of every shown panel, top to bottom.
    pub fn lines(&mut self) -> Vec<String> {
        let mode = self.state.mode;
        self.state
            .panels
            .shown()
            .map(|panel| self.metrics.line(panel, mode))
            .collect()
    }

    /// Blocks for up to one refresh interval waiting for input and applies
    /// any key press. Returns whether an event arrived before the timeout.
    pub fn handle_event(&mut self) -> io::Result<bool> {
        if !event::poll(self.interval)? {
            return Ok(false);
        }
        if let Event::Key(key) = event::read()? {
            self.state = self.state.on_key(key);
        }
        Ok(true)
    }
}
