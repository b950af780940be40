// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Session explicite : la dernière table récupérée vit dans un Session,
//    passé tel quel aux fonctions de rendu
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// ============================================================================

use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::api::FetchError;
use crate::config::Config;
use crate::export;
use crate::models::{Area, PriceQuery, PriceSeries, PriceTable, TIMESTAMP_FORMAT};

/// Nombre de lignes affichées dans la vue table
pub const TABLE_DISPLAY_ROWS: usize = 100;

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : paramètres + statistiques + graphique
    Dashboard,

    /// Les 100 dernières lignes de la table
    TableView,

    /// Saisie d'une date (début ou fin)
    InputMode,

    /// Description des données eSett
    About,

    /// Détail complet de la dernière erreur
    ErrorDetails,
}

/// Date en cours d'édition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

impl DateField {
    pub fn prompt(&self) -> &'static str {
        match self {
            DateField::Start => "Start date (YYYY-MM-DD): ",
            DateField::End => "End date (YYYY-MM-DD): ",
        }
    }
}

/// Niveau d'un message de statut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Message affiché dans la barre de statut
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    /// Conseil optionnel affiché sous le message
    pub hint: Option<String>,
}

impl StatusMessage {
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Plage de dates refusée avant tout appel réseau
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("la date de fin {end} est dans le futur (aujourd'hui : {today})")]
    EndInFuture { end: NaiveDate, today: NaiveDate },

    #[error("la date de début {start} est après la date de fin {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    #[error("date invalide : '{0}' (format attendu : YYYY-MM-DD)")]
    InvalidDate(String),
}

// ============================================================================
// Structure : Session
// ============================================================================
// La dernière table récupérée avec les paramètres qui l'ont produite.
// Remplacée en bloc par chaque fetch réussi et non vide.
// ============================================================================

/// Résultat du dernier fetch affiché par l'interface
#[derive(Debug, Clone)]
pub struct Session {
    pub table: Arc<PriceTable>,
    pub area: Area,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Session {
    /// Nom du fichier CSV correspondant à cette session
    pub fn csv_file_name(&self) -> String {
        export::csv_file_name(self.area, self.start, self.end)
    }

    /// Lignes affichées dans la vue table (les 100 dernières)
    pub fn display_rows(&self) -> &[crate::models::PriceRecord] {
        self.table.tail(TABLE_DISPLAY_ROWS)
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Zone sélectionnée
    pub area: Area,

    /// Bornes de la requête (dates calendaires)
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Date du jour : borne max de end_date
    pub today: NaiveDate,

    /// Cases à cocher, dans l'ordre de PriceSeries::ALL
    visible: [bool; 6],

    /// Two-step quit : première pression de 'q' -> confirmation
    pub confirm_quit: bool,

    /// Indique si une requête est en cours
    pub is_loading: bool,
    pub loading_message: Option<String>,

    /// Buffer de saisie pour le mode Input
    pub input_buffer: String,
    pub input_prompt: String,
    pub editing: Option<DateField>,

    /// Dernière table récupérée
    pub session: Option<Session>,

    /// Message de la barre de statut
    pub status: Option<StatusMessage>,

    /// Chaîne complète de la dernière erreur (écran ErrorDetails)
    pub last_error_details: Option<String>,

    /// Décalage de défilement de la vue table (depuis le bas)
    pub table_scroll: usize,

    /// Lignes de données visibles dans la vue table (mis à jour à chaque frame)
    pub table_page_rows: usize,

    /// Répertoire des exports CSV
    pub export_dir: PathBuf,
}

impl App {
    /// Crée l'état initial à partir de la configuration
    pub fn new(config: &Config, today: NaiveDate) -> Self {
        let mut visible = [false; 6];
        for (slot, series) in visible.iter_mut().zip(PriceSeries::ALL) {
            *slot = series.default_visible();
        }

        Self {
            running: true,
            current_screen: Screen::Dashboard,
            area: config.area,
            start_date: config.start,
            end_date: config.end,
            today,
            visible,
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
            input_buffer: String::new(),
            input_prompt: String::new(),
            editing: None,
            session: None,
            status: Some(StatusMessage::new(
                StatusKind::Info,
                "Configurez les paramètres puis appuyez sur [f] pour récupérer les données.",
            )),
            last_error_details: None,
            table_scroll: 0,
            table_page_rows: 1,
            export_dir: config.export_dir.clone(),
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Navigation entre écrans
    // ========================================================================

    pub fn show_dashboard(&mut self) {
        self.current_screen = Screen::Dashboard;
    }

    /// Vue table : seulement si des données sont chargées
    pub fn show_table(&mut self) {
        if self.session.is_some() {
            self.table_scroll = 0;
            self.current_screen = Screen::TableView;
        } else {
            self.set_status(StatusMessage::new(
                StatusKind::Warning,
                "Aucune donnée chargée : appuyez sur [f] d'abord.",
            ));
        }
    }

    pub fn show_about(&mut self) {
        self.current_screen = Screen::About;
    }

    /// Détail de l'erreur : seulement s'il y a eu une erreur
    pub fn show_error_details(&mut self) {
        if self.last_error_details.is_some() {
            self.current_screen = Screen::ErrorDetails;
        }
    }

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    pub fn is_on_table(&self) -> bool {
        self.current_screen == Screen::TableView
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }

    // ========================================================================
    // Paramètres de la requête
    // ========================================================================

    pub fn next_area(&mut self) {
        self.area = self.area.next();
    }

    pub fn previous_area(&mut self) {
        self.area = self.area.previous();
    }

    /// Coche / décoche une série
    pub fn toggle_series(&mut self, series: PriceSeries) {
        if let Some(index) = PriceSeries::ALL.iter().position(|s| *s == series) {
            self.visible[index] = !self.visible[index];
        }
    }

    pub fn is_visible(&self, series: PriceSeries) -> bool {
        PriceSeries::ALL
            .iter()
            .position(|s| *s == series)
            .map(|index| self.visible[index])
            .unwrap_or(false)
    }

    /// Séries cochées, dans l'ordre des cases
    pub fn visible_series(&self) -> Vec<PriceSeries> {
        PriceSeries::ALL
            .into_iter()
            .filter(|series| self.is_visible(*series))
            .collect()
    }

    /// Valide la plage et construit la requête
    ///
    /// Refuse une date de fin future et une date de début après la fin
    pub fn build_query(&self) -> Result<PriceQuery, DateRangeError> {
        if self.end_date > self.today {
            return Err(DateRangeError::EndInFuture {
                end: self.end_date,
                today: self.today,
            });
        }
        if self.start_date > self.end_date {
            return Err(DateRangeError::StartAfterEnd {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(PriceQuery::for_dates(self.start_date, self.end_date, self.area))
    }

    // ========================================================================
    // Saisie des dates
    // ========================================================================

    /// Entre en mode input pour éditer une date
    ///
    /// Le buffer est prérempli avec la valeur actuelle
    pub fn start_date_input(&mut self, field: DateField) {
        let current = match field {
            DateField::Start => self.start_date,
            DateField::End => self.end_date,
        };
        self.current_screen = Screen::InputMode;
        self.editing = Some(field);
        self.input_prompt = field.prompt().to_string();
        self.input_buffer = current.format("%Y-%m-%d").to_string();
    }

    /// Annule le mode input et retourne au dashboard
    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.editing = None;
        self.input_buffer.clear();
        self.input_prompt.clear();
    }

    /// Valide la saisie : met à jour la date si elle est correcte
    ///
    /// En cas d'erreur, on reste en mode input pour corriger
    pub fn submit_input(&mut self) -> Result<(), DateRangeError> {
        let raw = self.input_buffer.trim().to_string();
        let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|_| DateRangeError::InvalidDate(raw.clone()))?;

        match self.editing {
            Some(DateField::Start) => self.start_date = date,
            Some(DateField::End) => {
                if date > self.today {
                    return Err(DateRangeError::EndInFuture {
                        end: date,
                        today: self.today,
                    });
                }
                self.end_date = date;
            }
            None => {}
        }

        self.cancel_input();
        Ok(())
    }

    /// Ajoute un caractère au buffer (chiffres et '-' seulement)
    pub fn append_char(&mut self, c: char) {
        if (c.is_ascii_digit() || c == '-') && self.input_buffer.len() < 10 {
            self.input_buffer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    // ========================================================================
    // Quit
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Chargement et résultats
    // ========================================================================

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    /// Intègre le résultat d'un fetch
    ///
    /// - Table non vide : remplace la session
    /// - Table vide : avertissement, la session précédente reste affichée
    /// - Erreur : message + conseil, détail conservé pour l'écran ErrorDetails
    pub fn apply_fetch_result(
        &mut self,
        query: &PriceQuery,
        result: Result<Arc<PriceTable>, FetchError>,
    ) {
        match result {
            Ok(table) if table.is_empty() => {
                self.set_status(
                    StatusMessage::new(
                        StatusKind::Warning,
                        format!(
                            "Aucune donnée pour {} sur la période sélectionnée.",
                            query.area.label()
                        ),
                    )
                    .with_hint("Essayez une autre période ou une autre zone."),
                );
            }
            Ok(table) => {
                let text = match table.time_range() {
                    Some((first, last)) => format!(
                        "{} lignes récupérées, du {} au {}",
                        table.len(),
                        first.format(TIMESTAMP_FORMAT),
                        last.format(TIMESTAMP_FORMAT)
                    ),
                    None => format!("{} lignes récupérées", table.len()),
                };
                self.session = Some(Session {
                    table,
                    area: query.area,
                    start: query.start.date(),
                    end: query.end.date(),
                });
                self.table_scroll = 0;
                self.set_status(StatusMessage::new(StatusKind::Success, text));
            }
            Err(e) => {
                let prefix = if e.is_transport() {
                    "Échec de la requête API"
                } else {
                    "Erreur de format des données"
                };
                self.last_error_details = Some(error_chain(&e));
                self.set_status(
                    StatusMessage::new(StatusKind::Error, format!("{prefix} : {e}"))
                        .with_hint(format!("{} [i] Détails", e.hint())),
                );
            }
        }
    }

    /// Intègre le résultat d'un export CSV
    pub fn apply_export_result(&mut self, result: anyhow::Result<PathBuf>) {
        match result {
            Ok(path) => self.set_status(StatusMessage::new(
                StatusKind::Success,
                format!("CSV exporté : {}", path.display()),
            )),
            Err(e) => {
                self.last_error_details = Some(format!("{e:?}"));
                self.set_status(
                    StatusMessage::new(StatusKind::Error, format!("Échec de l'export : {e}"))
                        .with_hint("[i] Détails"),
                );
            }
        }
    }

    /// Signale une erreur inattendue remontée jusqu'à la boucle principale
    pub fn report_unexpected(&mut self, error: &anyhow::Error) {
        self.last_error_details = Some(format!("{error:?}"));
        self.set_status(
            StatusMessage::new(StatusKind::Error, format!("Erreur : {error}"))
                .with_hint("[i] Détails"),
        );
    }

    // ========================================================================
    // Défilement de la vue table
    // ========================================================================

    /// Remonte dans l'historique (vers les lignes plus anciennes)
    ///
    /// Borné pour que la dernière page reste pleine
    pub fn scroll_up(&mut self) {
        let page = self.table_page_rows.max(1);
        let max = self
            .session
            .as_ref()
            .map(|s| s.display_rows().len().saturating_sub(page))
            .unwrap_or(0);
        self.table_scroll = (self.table_scroll + 1).min(max);
    }

    /// Redescend vers les lignes les plus récentes
    pub fn scroll_down(&mut self) {
        self.table_scroll = self.table_scroll.saturating_sub(1);
    }
}

/// Formate une erreur avec toute sa chaîne de causes
pub fn error_chain(error: &dyn StdError) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str("\n  causé par : ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

// ============================================================================
// Tests unitaires
// ============================================================================
