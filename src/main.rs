//! VR Walker - hold forward/sprint keys from vertical mouse motion
//!
//! Terminal control panel around the motion filter. Moving the pointer up
//! holds the forward key, fast motion adds sprint, and stopping releases both.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode as CtKeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    symbols::border,
    widgets::{Block, Borders},
    Terminal,
};
use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use vr_walker::{
    config::{self, Config, ConfigError},
    filter::{MotionFilter, Watchdog},
    keys::{DryRunSink, KeySink},
    pointer::PointerListener,
    ui::{App, AppState, HelpPanel, KeyIndicators, StatusBar, ThemeColors, TunablesPanel},
};

/// Send logs to a file, since the terminal belongs to the UI
fn init_logging() -> Result<PathBuf, ConfigError> {
    let path = config::log_path()?;
    let file = File::create(&path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(path)
}

/// First status line: the sink in use, plus any logging problem
fn startup_status(sink_status: String, logging: &Result<PathBuf, ConfigError>) -> String {
    match logging {
        Ok(_) => sink_status,
        Err(e) => format!("{} | Logging disabled: {}", sink_status, e),
    }
}

/// Pick the key sink, with a status line describing it
#[cfg(feature = "virtual-send")]
fn build_sink(config: &Config) -> (Box<dyn KeySink>, String) {
    match vr_walker::keys::EnigoSink::new(config.keys) {
        Ok(sink) => {
            let sink: Box<dyn KeySink> = Box::new(sink);
            let status = format!("Sending {} / {}", config.keys.forward, config.keys.sprint);
            (sink, status)
        }
        Err(e) => {
            warn!("Falling back to dry run: {}", e);
            let sink: Box<dyn KeySink> = Box::new(DryRunSink);
            (sink, format!("Dry run ({})", e))
        }
    }
}

#[cfg(not(feature = "virtual-send"))]
fn build_sink(_config: &Config) -> (Box<dyn KeySink>, String) {
    let sink: Box<dyn KeySink> = Box::new(DryRunSink);
    let status = "Dry run - build with --features virtual-send to send keys".to_string();
    (sink, status)
}

fn main() -> Result<()> {
    let logging = init_logging();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Using default config: {}", e);
            Config::default()
        }
    };

    let (sink, sink_status) = build_sink(&config);
    let filter = Arc::new(MotionFilter::new(sink, config.filter.clone()));

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let filter = Arc::clone(&filter);
        let interrupted = Arc::clone(&interrupted);
        ctrlc::set_handler(move || {
            filter.stop();
            interrupted.store(true, Ordering::SeqCst);
        })?;
    }

    let watchdog = Watchdog::spawn(Arc::clone(&filter), config.input.watchdog_tick())?;
    let listener =
        PointerListener::spawn_system(Arc::clone(&filter), config.input.poll_interval())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let colors = ThemeColors::from_theme(config.ui.theme);
    let tick_rate = config.refresh_interval();
    let mut app = App::new(Arc::clone(&filter), config);
    app.set_status(startup_status(sink_status, &logging));
    if let Ok(path) = &logging {
        info!("VR Walker ready, logging to {}", path.display());
    }

    let result = run(&mut terminal, &mut app, colors, tick_rate, &listener, &interrupted);

    // Keys must be up before anything else is torn down
    filter.stop();
    listener.shutdown();
    watchdog.shutdown();

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    println!("\nVR Walker stopped after {}.", app.elapsed_formatted());
    Ok(())
}

fn run<K: KeySink>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App<K>,
    colors: ThemeColors,
    tick_rate: std::time::Duration,
    listener: &vr_walker::pointer::ListenerHandle,
    interrupted: &AtomicBool,
) -> Result<()> {
    loop {
        if !listener.is_running() {
            app.mark_listener_lost();
        }

        let snapshot = app.snapshot();
        let rows = app.tunable_rows();
        let alert = app.alert(&snapshot);

        terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(5), // Lamps and speed
                    Constraint::Min(10),   // Tunables or help
                    Constraint::Length(1), // Status bar
                ])
                .split(frame.area());

            let keys_block = Block::default()
                .title(" Keys ")
                .borders(Borders::ALL)
                .border_set(border::ROUNDED)
                .border_style(Style::default().fg(colors.muted));
            let keys_inner = keys_block.inner(chunks[0]);
            frame.render_widget(keys_block, chunks[0]);
            frame.render_widget(
                KeyIndicators::new(&snapshot, &app.config.keys, colors),
                keys_inner,
            );

            if app.show_help {
                frame.render_widget(HelpPanel::new(colors), chunks[1]);
            } else {
                frame.render_widget(TunablesPanel::new(&rows, colors), chunks[1]);
            }

            let elapsed = app.elapsed_formatted();
            let status = StatusBar::new(snapshot.active, &elapsed, colors)
                .message(app.get_status())
                .alert(alert.as_deref());
            frame.render_widget(status, chunks[2]);
        })?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let steps = if key.modifiers.contains(KeyModifiers::SHIFT) {
                    10
                } else {
                    1
                };
                match key.code {
                    CtKeyCode::Char('q') | CtKeyCode::Esc => app.quit(),
                    // Raw mode swallows SIGINT
                    CtKeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit()
                    }
                    CtKeyCode::Char(' ') => app.toggle_active(Instant::now()),
                    CtKeyCode::Up => app.select_prev(),
                    CtKeyCode::Down => app.select_next(),
                    CtKeyCode::Left => app.adjust(-steps),
                    CtKeyCode::Right => app.adjust(steps),
                    CtKeyCode::Char('s') => {
                        if let Err(e) = app.save_config() {
                            warn!("Saving config failed: {}", e);
                        }
                    }
                    CtKeyCode::Char('?') | CtKeyCode::Char('h') => app.toggle_help(),
                    _ => {}
                }
            }
        }

        if interrupted.load(Ordering::SeqCst) {
            app.quit();
        }

        if app.state == AppState::Quitting {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_status_reports_logging_failure() {
        let ok = Ok(PathBuf::from("vr-walker.log"));
        assert_eq!(startup_status("Dry run".to_string(), &ok), "Dry run");

        let failed = Err(ConfigError::NoConfigDir);
        assert_eq!(
            startup_status("Dry run".to_string(), &failed),
            "Dry run | Logging disabled: Could not determine config directory"
        );
    }
}
