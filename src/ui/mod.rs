// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

use ratatui::Frame;

use crate::app::{App, Screen};

pub mod chart;     // Graphique des séries de prix
pub mod dashboard; // Rendu de l'interface principale
pub mod events;    // Gestion des événements clavier
pub mod info;      // Écrans About et détail d'erreur
pub mod table;     // Vue table (dernières lignes)

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};

/// Point d'entrée du rendu : dessine l'écran courant
///
/// En mode saisie, le dashboard reste visible et le footer devient
/// la ligne de saisie.
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Dashboard | Screen::InputMode => dashboard::render_dashboard(frame, app),
        Screen::TableView => table::render_table_view(frame, app),
        Screen::About => info::render_about(frame, app),
        Screen::ErrorDetails => info::render_error_details(frame, app),
    }
}
