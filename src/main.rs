// ============================================================================
// eSett Viewer - Visualiseur des prix de déséquilibre
// ============================================================================
// Programme TUI : choix de la zone et de la période, récupération des prix
// depuis l'API eSett OpenData, graphique, table et export CSV.
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime pour appels API
// 4. Command pattern : handle_event décrit l'action, run() l'exécute
// ============================================================================

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

use esett_viewer::api::{CachedSource, EsettClient};
use esett_viewer::app::{App, DateField, StatusKind, StatusMessage};
use esett_viewer::config::{Cli, Config};
use esett_viewer::export;
use esett_viewer::models::PriceQuery;
use esett_viewer::ui::{events::EventHandler, render, table};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

// ============================================================================
// AppCommand : actions qui sortent de la simple mise à jour d'état
// ============================================================================
// CONCEPT RUST : Command pattern
// - handle_event ne fait pas d'I/O, il retourne une commande
// - run() exécute la commande (réseau, fichier) puis met à jour App
// ============================================================================

#[derive(Debug, Clone)]
enum AppCommand {
    /// Récupérer les prix pour la requête validée
    Fetch(PriceQuery),

    /// Exporter la session courante en CSV
    Export,
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ~/.local/share/esett-viewer/logs/esett-viewer.log.*
///
/// # Contrôler le niveau de log
/// RUST_LOG=esett_viewer=trace esett-viewer
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "esett-viewer.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour esett_viewer, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "esett_viewer=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(log_dir = %log_dir.display(), "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(cli, Local::now().date_naive())?;

    // Si le logging échoue, on continue sans
    init_logging(&config.log_dir).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(
        area = %config.area.short_name(),
        start = %config.start,
        end = %config.end,
        api_url = %config.api_url,
        "eSett viewer starting up"
    );

    // CONCEPT RUST : Exécuter du code async dans du code sync
    // - Runtime::block_on() exécute une future de manière bloquante
    // - Le fetch bloque la boucle, l'écran affiche "chargement" avant
    let runtime = Runtime::new().context("Échec de la création du runtime tokio")?;
    let source = CachedSource::new(EsettClient::with_url(config.api_url.as_str())?);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(&config, Local::now().date_naive());
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &runtime, &source);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event loop
// ============================================================================

fn run(
    terminal: &mut Tui,
    app: &mut App,
    events: &EventHandler,
    runtime: &Runtime,
    source: &CachedSource<EsettClient>,
) -> Result<()> {
    while app.is_running() {
        // 1. RENDER
        terminal.draw(|frame| render(frame, app))?;
        app.table_page_rows = table::page_rows(terminal.size()?);

        // 2. INPUT
        let command = match events.next() {
            Ok(event) => handle_event(app, event),
            Err(e) => {
                warn!(error = ?e, "Failed to read terminal event");
                app.report_unexpected(&e);
                None
            }
        };

        // 3. COMMANDES
        match command {
            Some(AppCommand::Fetch(query)) => fetch(terminal, app, runtime, source, query)?,
            Some(AppCommand::Export) => export_session(app),
            None => {}
        }
    }

    Ok(())
}

/// Récupère les prix (cache ou API) et met à jour la session
fn fetch(
    terminal: &mut Tui,
    app: &mut App,
    runtime: &Runtime,
    source: &CachedSource<EsettClient>,
    query: PriceQuery,
) -> Result<()> {
    info!(
        mba = %query.area.code(),
        start = %query.start_param(),
        end = %query.end_param(),
        "Fetching prices"
    );

    app.start_loading(Some(format!(
        "Fetching data from eSett API ({}, {} → {})...",
        query.area.label(),
        query.start.date(),
        query.end.date()
    )));
    // Redessine tout de suite : le fetch bloque la boucle
    terminal.draw(|frame| render(frame, app))?;

    let result = runtime.block_on(source.fetch(&query));
    match &result {
        Ok(table) => info!(records = table.len(), "Prices fetched"),
        Err(e) => error!(error = %e, "Failed to fetch prices"),
    }

    app.apply_fetch_result(&query, result);
    app.stop_loading();
    Ok(())
}

/// Exporte la session courante dans le répertoire d'export
fn export_session(app: &mut App) {
    let Some(session) = app.session.as_ref() else {
        app.set_status(StatusMessage::new(
            StatusKind::Warning,
            "Rien à exporter : récupérez des données d'abord.",
        ));
        return;
    };

    let result = export::export_table(
        &session.table,
        session.area,
        session.start,
        session.end,
        &app.export_dir,
    );
    if let Err(e) = &result {
        error!(error = ?e, "CSV export failed");
    }
    app.apply_export_result(result);
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Le mode input est traité en premier : les touches y sont du texte
/// - Puis les écrans secondaires (table, about, erreur)
/// - Puis le dashboard
fn handle_event(app: &mut App, event: esett_viewer::ui::events::Event) -> Option<AppCommand> {
    use esett_viewer::ui::events::{
        get_char_from_event, is_about_event, is_backspace_event, is_down_event,
        is_edit_end_event, is_edit_start_event, is_enter_event, is_error_details_event,
        is_escape_event, is_export_event, is_fetch_event, is_next_area_event,
        is_previous_area_event, is_quit_event, is_table_event, is_up_event,
        series_toggle_from_event, Event,
    };

    if matches!(event, Event::Tick) {
        return None;
    }

    // ========================================
    // Input Mode : saisie d'une date
    // ========================================
    if app.is_in_input_mode() {
        if is_escape_event(&event) {
            debug!("User cancelled date input");
            app.cancel_input();
        } else if is_enter_event(&event) {
            match app.submit_input() {
                Ok(()) => info!(start = %app.start_date, end = %app.end_date, "Date updated"),
                Err(e) => {
                    warn!(error = %e, "Invalid date input");
                    app.set_status(StatusMessage::new(StatusKind::Error, e.to_string()));
                }
            }
        } else if is_backspace_event(&event) {
            app.backspace();
        } else if let Some(c) = get_char_from_event(&event) {
            app.append_char(c);
        }
        return None;
    }

    // Quit : confirmation en deux temps, toute autre touche annule
    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return None;
    }
    app.cancel_quit();

    // ========================================
    // Écrans secondaires
    // ========================================
    if !app.is_on_dashboard() {
        if is_escape_event(&event) {
            debug!("User returned to dashboard");
            app.show_dashboard();
        } else if app.is_on_table() && is_up_event(&event) {
            app.scroll_up();
        } else if app.is_on_table() && is_down_event(&event) {
            app.scroll_down();
        } else if app.is_on_table() && is_export_event(&event) {
            return Some(AppCommand::Export);
        }
        return None;
    }

    // ========================================
    // Dashboard
    // ========================================
    if is_next_area_event(&event) {
        app.next_area();
        debug!(area = %app.area.short_name(), "Area changed");
    } else if is_previous_area_event(&event) {
        app.previous_area();
        debug!(area = %app.area.short_name(), "Area changed");
    } else if let Some(series) = series_toggle_from_event(&event) {
        app.toggle_series(series);
        debug!(series = %series.column(), visible = app.is_visible(series), "Series toggled");
    } else if is_edit_start_event(&event) {
        app.start_date_input(DateField::Start);
    } else if is_edit_end_event(&event) {
        app.start_date_input(DateField::End);
    } else if is_fetch_event(&event) || is_enter_event(&event) {
        match app.build_query() {
            Ok(query) => return Some(AppCommand::Fetch(query)),
            Err(e) => {
                warn!(error = %e, "Invalid date range");
                app.set_status(StatusMessage::new(StatusKind::Error, e.to_string()));
            }
        }
    } else if is_export_event(&event) {
        return Some(AppCommand::Export);
    } else if is_table_event(&event) {
        app.show_table();
    } else if is_about_event(&event) {
        app.show_about();
    } else if is_error_details_event(&event) {
        app.show_error_details();
    }

    None
}

// ============================================================================
// Terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
