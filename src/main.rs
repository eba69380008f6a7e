mod app;
mod bar;
mod battery;
mod cli;
mod clock;
mod config;
mod cpu;
mod error;
mod layout;
mod logging;
mod memory;
mod metrics;
mod source;
mod temperature;
mod tui;
mod ui;

use app::App;
use bar::DisplayMode;
use clap::Parser;
use cpu::{CpuSampler, CpuUsage};
use error::{Error, Result};
use logging::profile;
use metrics::Metrics;
use std::process::ExitCode;
use tracing::{debug, info};

fn main() -> ExitCode {
    let args = cli::Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "fatal");
            println!("tmon: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: cli::Args) -> Result<()> {
    if let Some(path) = logging::init(args.log) {
        debug!(path = %path.display(), "logging to file");
    }

    let mut config = config::load(args.config.as_deref(), |path| {
        println!("Generating config file at {}", path.display());
    })?;
    if let Some(interval) = args.interval {
        config.interval = interval;
    }
    info!(?config, "starting");

    let mode = if args.plain {
        DisplayMode::Plain
    } else {
        DisplayMode::Unicode
    };

    // Initialize terminal
    let mut terminal = tui::TuiGuard::new()?;

    let usage = CpuUsage::new();
    let metrics = Metrics::probe(&config, usage.clone());
    let sampler = CpuSampler::proc_stat(usage)
        .spawn(config.cpu_interval())
        .map_err(Error::Sampler)?;

    let mut app = App::new(metrics, mode, config.refresh_interval());
    let result = event_loop(&mut terminal, &mut app);

    // Stop the sampler before the terminal is torn down
    sampler.shutdown();
    drop(terminal);

    result
}

fn event_loop(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.is_running() {
        let lines = profile!("metrics", app.lines());
        profile!(
            "draw",
            terminal.draw(|f| ui::render(f, &app.state, &lines))?
        );
        // Blocks for up to one refresh interval
        profile!("input", app.handle_event()?);
    }
    debug!("quit requested");
    Ok(())
}
