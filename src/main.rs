// ============================================================================
// stockdash - Terminal stock analytics dashboard
// ============================================================================
// Fetches historical prices for one ticker, renders a price chart with
// moving averages, return statistics and a raw data table, and exports
// the table as CSV. Fetches run on a background worker thread so the UI
// never blocks on the network.
// ============================================================================

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use stockdash::api::fetch_price_series;
use stockdash::app::{App, InputTarget, Tab};
use stockdash::export;
use stockdash::models::{PriceSeries, Query};
use stockdash::ui::{render, Event, EventHandler};

/// Commands sent to the fetch worker.
#[derive(Debug, Clone)]
enum AppCommand {
    /// Fetch the series for a query
    FetchSeries { query: Query },
}

/// Results sent back by the fetch worker.
#[derive(Debug)]
enum AppResult {
    /// Fetch succeeded
    SeriesLoaded { query: Query, series: PriceSeries },

    /// Fetch failed; `error` is fit for the UI banner
    FetchFailed { query: Query, error: String },
}

// ============================================================================
// Logging
// ============================================================================

/// Initializes file logging.
///
/// println! is useless once the TUI owns the terminal, so everything
/// goes to a daily-rolling file under the platform data directory.
/// Level is controlled with RUST_LOG, e.g. `RUST_LOG=stockdash=trace`.
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("stockdash").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"));

    std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "stockdash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockdash=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialized");
    Ok(())
}

// ============================================================================
// Entry point
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("Warning: failed to initialize logging: {}", e);
    });

    info!("stockdash starting up");

    let mut app = App::new();

    // Initial fetch for the default query, before the TUI takes over
    println!(
        "Fetching {} ({} → {})…",
        app.query.symbol, app.query.start, app.query.end
    );

    let runtime = tokio::runtime::Runtime::new()?;
    match runtime.block_on(fetch_price_series(&app.query)) {
        Ok(series) => {
            info!(symbol = %app.query.symbol, bars = series.len(), "Initial fetch succeeded");
            println!("Loaded {} bars.", series.len());
            app.set_series(series);
        }
        Err(e) => {
            error!(symbol = %app.query.symbol, error = ?e, "Initial fetch failed");
            println!("Fetch failed: {}", e);
            app.set_error(e.to_string());
        }
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // Shared between the UI loop and the fetch worker
    let app = Arc::new(Mutex::new(app));

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning fetch worker thread");
    spawn_fetch_worker(command_rx, result_tx, app.clone());

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Fetch worker
// ============================================================================

/// Worker thread that owns a tokio runtime and serves fetch commands so
/// the event loop never waits on the network.
fn spawn_fetch_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    app: Arc<Mutex<App>>,
) {
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

        loop {
            match command_rx.recv() {
                Ok(AppCommand::FetchSeries { query }) => {
                    info!(symbol = %query.symbol, "Worker received fetch command");

                    {
                        let mut app_lock = app.lock().unwrap();
                        app_lock.start_loading(Some(format!(
                            "Fetching {} ({} → {}, {})…",
                            query.symbol,
                            query.start,
                            query.end,
                            query.interval.label()
                        )));
                    }

                    let result = runtime.block_on(fetch_price_series(&query));

                    match result {
                        Ok(series) => {
                            info!(symbol = %query.symbol, bars = series.len(), "Fetch succeeded");
                            let _ = result_tx.send(AppResult::SeriesLoaded { query, series });
                        }
                        Err(e) => {
                            error!(symbol = %query.symbol, error = ?e, "Fetch failed");
                            let _ = result_tx.send(AppResult::FetchFailed {
                                query,
                                error: e.to_string(),
                            });
                        }
                    }

                    {
                        let mut app_lock = app.lock().unwrap();
                        app_lock.stop_loading();
                    }
                }
                Err(_) => {
                    info!("Fetch worker exiting (channel closed)");
                    break;
                }
            }
        }
    });
}

// ============================================================================
// Event loop
// ============================================================================

/// Render → input → update loop; also drains worker results.
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        {
            let app_lock = app.lock().unwrap();
            if !app_lock.is_running() {
                break;
            }
        }

        // Worker results; a result for a query the user has already
        // replaced is dropped
        match result_rx.try_recv() {
            Ok(AppResult::SeriesLoaded { query, series }) => {
                let mut app_lock = app.lock().unwrap();
                if query == app_lock.query {
                    info!(symbol = %query.symbol, bars = series.len(), "Applying fetched series");
                    app_lock.set_series(series);
                } else {
                    debug!(symbol = %query.symbol, "Dropping stale fetch result");
                }
            }
            Ok(AppResult::FetchFailed { query, error }) => {
                let mut app_lock = app.lock().unwrap();
                error!(symbol = %query.symbol, error = %error, "Fetch failed");
                if query == app_lock.query {
                    app_lock.set_error(error);
                }
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Fetch worker disconnected");
            }
        }

        // Render
        {
            let app_clone = app.clone();
            terminal.draw(|frame| {
                let app_lock = app_clone.lock().unwrap();
                render(frame, &app_lock);
            })?;
        }

        // Input
        if let Ok(event) = events.next() {
            let mut app_lock = app.lock().unwrap();
            handle_event(&mut app_lock, event, &command_tx);
        }

        // Update
        {
            let mut app_lock = app.lock().unwrap();
            app_lock.tick();
        }
    }

    Ok(())
}

// ============================================================================
// Event handling
// ============================================================================

/// Routes one event into state changes and worker commands.
///
/// Input-mode arms come first: while typing, printable keys belong to
/// the buffer, not to the global shortcuts.
fn handle_event(app: &mut App, event: Event, command_tx: &mpsc::Sender<AppCommand>) {
    use stockdash::ui::events::{
        get_char_from_event, get_digit_from_event, is_backspace_event, is_end_date_event,
        is_enter_event, is_escape_event, is_export_event, is_input_char_event, is_interval_event,
        is_long_window_down_event, is_long_window_up_event, is_next_tab_event,
        is_previous_tab_event, is_price_field_event, is_quit_event, is_refresh_event,
        is_short_window_down_event, is_short_window_up_event, is_start_date_event,
        is_ticker_event,
    };

    match event {
        // ========================================
        // Input mode
        // ========================================
        Event::Key(_) if is_escape_event(&event) && app.is_in_input_mode() => {
            debug!("Input cancelled");
            app.cancel_input();
        }

        Event::Key(_) if is_enter_event(&event) && app.is_in_input_mode() => {
            if let Some((target, value)) = app.submit_input() {
                if let Some(query) = app.apply_input(target, &value) {
                    info!(symbol = %query.symbol, start = %query.start, end = %query.end, "Query updated");
                    let _ = command_tx.send(AppCommand::FetchSeries { query });
                }
            }
        }

        Event::Key(_) if is_backspace_event(&event) && app.is_in_input_mode() => {
            app.backspace();
        }

        Event::Key(_) if app.is_in_input_mode() => {
            if is_input_char_event(&event) {
                if let Some(c) = get_char_from_event(&event) {
                    app.append_char(c);
                }
            }
        }

        // ========================================
        // Global shortcuts
        // ========================================
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_next_tab_event(&event) => {
            app.cancel_quit();
            app.next_tab();
        }

        Event::Key(_) if is_previous_tab_event(&event) => {
            app.cancel_quit();
            app.previous_tab();
        }

        Event::Key(_) if is_ticker_event(&event) => {
            app.cancel_quit();
            app.start_input(InputTarget::Ticker);
        }

        Event::Key(_) if is_start_date_event(&event) => {
            app.cancel_quit();
            app.start_input(InputTarget::StartDate);
        }

        Event::Key(_) if is_end_date_event(&event) => {
            app.cancel_quit();
            app.start_input(InputTarget::EndDate);
        }

        // Frequency change refetches: the bars themselves differ
        Event::Key(_) if is_interval_event(&event) => {
            app.cancel_quit();
            app.cycle_interval();
            info!(interval = %app.query.interval.label(), "Frequency changed");
            let _ = command_tx.send(AppCommand::FetchSeries {
                query: app.query.clone(),
            });
        }

        Event::Key(_) if is_price_field_event(&event) => {
            app.cancel_quit();
            app.cycle_price_field();
            debug!(field = %app.price_field.label(), "Price field changed");
        }

        Event::Key(_) if is_short_window_down_event(&event) => {
            app.cancel_quit();
            app.adjust_short_window(-1);
        }

        Event::Key(_) if is_short_window_up_event(&event) => {
            app.cancel_quit();
            app.adjust_short_window(1);
        }

        Event::Key(_) if is_long_window_down_event(&event) => {
            app.cancel_quit();
            app.adjust_long_window(-5);
        }

        Event::Key(_) if is_long_window_up_event(&event) => {
            app.cancel_quit();
            app.adjust_long_window(5);
        }

        Event::Key(_) if is_refresh_event(&event) => {
            app.cancel_quit();
            info!("Manual refresh requested");
            let _ = command_tx.send(AppCommand::FetchSeries {
                query: app.query.clone(),
            });
        }

        Event::Key(_) if is_export_event(&event) => {
            app.cancel_quit();
            export_current_series(app);
        }

        Event::Key(_) if get_digit_from_event(&event).is_some() => {
            app.cancel_quit();
            match get_digit_from_event(&event) {
                Some(1) => app.set_tab(Tab::Price),
                Some(2) => app.set_tab(Tab::Returns),
                Some(3) => app.set_tab(Tab::Table),
                _ => {}
            }
        }

        Event::Tick => {}

        // Any other key cancels a pending quit confirmation
        Event::Key(_) => {
            app.cancel_quit();
        }
    }
}

/// Writes `{SYMBOL}_data.csv` into the working directory.
fn export_current_series(app: &mut App) {
    match &app.series {
        Some(series) if !series.is_empty() => {
            match export::export_series(series, Path::new(".")) {
                Ok(path) => {
                    info!(path = %path.display(), "CSV export complete");
                    app.set_status(format!("Exported to {}", path.display()));
                }
                Err(e) => {
                    error!(error = ?e, "CSV export failed");
                    app.set_status(format!("Export failed: {}", e));
                }
            }
        }
        _ => {
            app.set_status("No data to export".to_string());
        }
    }
}

// ============================================================================
// Terminal setup / restore
// ============================================================================
// Raw mode plus alternate screen; always restored before exit so the
// user's shell is not left broken.
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
