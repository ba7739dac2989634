pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, ThemeColors};

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

use crate::ingest::{DataSource, IngestResult};
use crate::load::Dashboard;
use crate::scoring::ScoringConfig;

/// Upper bound for one load of the data source, downloads and retries included
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

type LoadHandle = tokio::task::JoinHandle<Result<IngestResult<Dashboard>, tokio::time::error::Elapsed>>;

fn spawn_load(source: &DataSource, scoring: &ScoringConfig) -> LoadHandle {
    let source = source.clone();
    let scoring = scoring.clone();
    tokio::spawn(async move {
        tokio::time::timeout(LOAD_TIMEOUT, crate::load::load_and_score(&source, &scoring)).await
    })
}

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    let mut events = EventHandler::new(250, app.auto_reload);

    // Initial load runs in the background so the dashboard frame shows at once
    let mut pending_load: Option<LoadHandle> = Some(spawn_load(&app.source, &app.scoring));
    app.is_loading = true;

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        match events.next().await {
            Event::Key(key) => {
                app.last_interaction = std::time::Instant::now();
                handle_key_event(&mut app, key);
            }
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
            Event::Reload => {
                app.needs_reload = true;
            }
        }

        // Check if background load has completed
        if let Some(handle) = pending_load.take_if(|h| h.is_finished()) {
            match handle.await {
                Ok(Ok(Ok(dashboard))) => app.update_dashboard(dashboard),
                Ok(Ok(Err(e))) => app.set_load_error(format!("Could not load data: {}", e)),
                Ok(Err(_elapsed)) => app.set_load_error(format!(
                    "Load timed out ({}s). Will retry on next reload.",
                    LOAD_TIMEOUT.as_secs()
                )),
                Err(e) => app.set_load_error(format!("Failed: load task panicked: {}", e)),
            }
            app.is_loading = false;
        }

        // Start a new load if needed and none is pending
        if app.needs_reload && pending_load.is_none() {
            let is_manual = app.force_reload;
            let modal_open = app.input_mode != app::InputMode::Normal;
            let recent_interaction = app.last_interaction.elapsed() < Duration::from_secs(10);

            // Auto-reload waits while a popup is open or the user is active.
            // When suppressed, needs_reload stays true so it retries on the next tick.
            if is_manual || (!modal_open && !recent_interaction) {
                app.needs_reload = false;
                app.force_reload = false;
                pending_load = Some(spawn_load(&app.source, &app.scoring));
                app.is_loading = true;
            }
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => match key.code {
            // Quit
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.should_quit = true
            }

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

            // Bucket selection on the leaders view
            KeyCode::Char('l') | KeyCode::Right if app.current_view == app::View::Leaders => {
                app.next_bucket()
            }
            KeyCode::Char('h') | KeyCode::Left if app.current_view == app::View::Leaders => {
                app.previous_bucket()
            }

            // View switching
            KeyCode::Tab => app.next_view(),
            KeyCode::Char('1') => app.select_view(app::View::Rankings),
            KeyCode::Char('2') => app.select_view(app::View::Leaders),
            KeyCode::Char('3') => app.select_view(app::View::Matrix),

            // Minimum appointments filter
            KeyCode::Char('m') => app.cycle_min_appointments(),

            // Reload (manual = skip idle checks)
            KeyCode::Char('r') => app.request_reload(),

            // Open the Google Sheet
            KeyCode::Char('o') => match app.open_sheet() {
                Ok(()) => app.show_flash("Opened sheet in browser".to_string()),
                Err(e) => app.show_flash(format!("Failed to open sheet: {}", e)),
            },

            // Help
            KeyCode::Char('?') => app.show_help(),

            // Score breakdown
            KeyCode::Char('b') | KeyCode::Enter => app.show_score_breakdown(),

            _ => {}
        },
        app::InputMode::ScoreBreakdown => match key.code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Enter => app.dismiss_score_breakdown(),
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}
