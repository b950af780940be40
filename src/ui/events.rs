// ============================================================================
// Gestion des événements
// ============================================================================
// Lit les événements clavier et les traduit en actions de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. matches! : tester un KeyCode contre plusieurs motifs
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

use crate::models::PriceSeries;

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (aucune touche pendant le délai de poll)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release
                // On ne garde que Press pour éviter les doublons
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : identifier les touches
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter (avec confirmation)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K')))
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J')))
}

/// Flèche droite ou 'l' : zone suivante
pub fn is_next_area_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Right | KeyCode::Char('l')))
}

/// Flèche gauche ou 'h' : zone précédente
pub fn is_previous_area_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Left | KeyCode::Char('h')))
}

/// 'f' : récupérer les données
pub fn is_fetch_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('f') | KeyCode::Char('F')))
}

/// 'b' : éditer la date de début (begin)
pub fn is_edit_start_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('b') | KeyCode::Char('B')))
}

/// 'e' : éditer la date de fin (end)
pub fn is_edit_end_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('e') | KeyCode::Char('E')))
}

/// 'c' : exporter en CSV
pub fn is_export_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('c') | KeyCode::Char('C')))
}

/// 't' : vue table
pub fn is_table_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('t') | KeyCode::Char('T')))
}

/// '?' : à propos
pub fn is_about_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('?')))
}

/// 'i' : détail de la dernière erreur
pub fn is_error_details_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('i') | KeyCode::Char('I')))
}

/// Série associée à une touche '1'..'6'
pub fn series_toggle_from_event(event: &Event) -> Option<PriceSeries> {
    match key_code(event)? {
        KeyCode::Char(c) => PriceSeries::from_digit(c),
        _ => None,
    }
}

/// Caractère d'une touche (pour la saisie)
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event)? {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_area_keys() {
        assert!(is_next_area_event(&key(KeyCode::Right)));
        assert!(is_next_area_event(&key(KeyCode::Char('l'))));
        assert!(is_previous_area_event(&key(KeyCode::Left)));
        assert!(!is_previous_area_event(&key(KeyCode::Right)));
    }

    #[test]
    fn test_series_toggle_keys() {
        assert_eq!(
            series_toggle_from_event(&key(KeyCode::Char('3'))),
            Some(PriceSeries::UpRegulation)
        );
        assert_eq!(series_toggle_from_event(&key(KeyCode::Char('9'))), None);
        assert_eq!(series_toggle_from_event(&key(KeyCode::Enter)), None);
        assert_eq!(series_toggle_from_event(&Event::Tick), None);
    }

    #[test]
    fn test_get_char_from_event() {
        assert_eq!(get_char_from_event(&key(KeyCode::Char('7'))), Some('7'));
        assert_eq!(get_char_from_event(&key(KeyCode::Esc)), None);
    }
}
