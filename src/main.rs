//! cardtrack - a terminal client for alumni membership-card shipping.
//!
//! This application provides a fast, keyboard-driven interface for the
//! alumni association's admin workflows: the shipping queue, status and
//! tracking-number updates, 4-up label printing, and reports.

mod api;
mod app;
mod auth;
mod config;
mod labels;
mod models;
mod selection;
mod toast;
mod ui;
mod utils;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Initialize the tracing subscriber, logging to a file in the data dir
/// so log lines never fight the TUI for the terminal.
/// Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(config: &config::Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = match config.data_dir() {
        Ok(dir) => dir.join("logs"),
        Err(_) => return None,
    };
    let appender = tracing_appender::rolling::daily(log_dir, "cardtrack.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = config::Config::load().unwrap_or_default();

    // CLI utility modes run without the TUI
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--login" {
        return login_cli(config).await;
    }
    if args.len() > 1 && args[1] == "--export" {
        let kind = args.get(2).map(String::as_str).unwrap_or("shipping-list");
        return export_cli(config, kind).await;
    }

    let _log_guard = init_tracing(&config);
    info!("cardtrack starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new()?;

    if app.is_authenticated() {
        app.refresh_current_view();
        app.poll_notifications();
    } else {
        app.start_login();
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("cardtrack shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Apply completed background tasks, expire toasts, fire due
        // debounced re-fetches and the notification poll
        app.check_background_tasks();
        app.tick();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

/// Log in from the command line and persist the session for the TUI
async fn login_cli(mut config: config::Config) -> Result<()> {
    use std::io::Write;

    let default_user = config.last_username.clone().unwrap_or_default();
    if default_user.is_empty() {
        print!("Username: ");
    } else {
        print!("Username [{}]: ", default_user);
    }
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            default_user
        } else {
            trimmed.to_string()
        }
    };
    if username.is_empty() {
        anyhow::bail!("A username is required");
    }

    let password = if auth::CredentialStore::has_credentials(&username) {
        print!("Use stored password? [Y/n]: ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if answer.trim().eq_ignore_ascii_case("n") {
            rpassword::prompt_password("Password: ")?
        } else {
            auth::CredentialStore::get_password(&username)?
        }
    } else {
        rpassword::prompt_password("Password: ")?
    };

    let api = api::ApiClient::new(config.api_url())?;
    let session_data = api.login(&username, &password).await?;

    if let Err(e) = auth::CredentialStore::store(&username, &password) {
        eprintln!("Warning: could not store password in keychain: {}", e);
    }

    let data_dir = config.data_dir()?;
    let mut session = auth::Session::new(data_dir);
    session.update(session_data);
    session.save()?;

    config.last_username = Some(username);
    config.save()?;

    println!("Login successful.");
    Ok(())
}

/// Download one of the spreadsheet exports without entering the TUI
async fn export_cli(config: config::Config, kind: &str) -> Result<()> {
    let (endpoint, file_stem) = match kind {
        "shipping-list" => ("/api/shipping/export/shipping-list", "shipping-list"),
        "excel" => ("/api/shipping/export/excel", "shipping-report"),
        "members" => ("/api/alumni/export/all-members-excel", "all-members"),
        other => anyhow::bail!(
            "Unknown export '{}'. Use shipping-list, excel, or members.",
            other
        ),
    };

    let data_dir = config.data_dir()?;
    let mut session = auth::Session::new(data_dir);
    if !session.load()? {
        anyhow::bail!("No saved session. Run `cardtrack --login` first.");
    }
    let token = session
        .token()
        .ok_or_else(|| anyhow::anyhow!("No saved session. Run `cardtrack --login` first."))?
        .to_string();

    let api = api::ApiClient::new(config.api_url())?.with_token(token);

    eprintln!("Downloading {}...", kind);
    let bytes = api
        .download_export(endpoint, &Default::default())
        .await?;

    let stamp = chrono::Utc::now().format("%Y-%m-%d");
    let path = std::path::PathBuf::from(format!("{}-{}.xlsx", file_stem, stamp));
    std::fs::write(&path, bytes)?;
    println!("{}", path.display());
    Ok(())
}
