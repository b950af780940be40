// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Panneau de configuration à gauche (zone, dates, séries), statistiques et
// graphique à droite, barre de statut et raccourcis en bas.
//
// CONCEPTS RATATUI :
// 1. Layout : découpage de l'espace en zones (vertical puis horizontal)
// 2. Widgets : Block, Paragraph, List
// 3. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Session, StatusKind};
use crate::models::PriceSeries;
use crate::ui::chart;

/// Séries résumées par une moyenne dans le bandeau de statistiques
const SUMMARY_SERIES: [PriceSeries; 5] = [
    PriceSeries::ImbalanceSales,
    PriceSeries::ImbalancePurchase,
    PriceSeries::UpRegulation,
    PriceSeries::DownRegulation,
    PriceSeries::SpotDifference,
];

/// Dessine le dashboard complet
pub fn render_dashboard(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, chunks[0]);
    render_body(frame, app, chunks[1]);
    render_status(frame, app, chunks[2]);

    if app.is_in_input_mode() {
        render_input_footer(frame, app, chunks[3]);
    } else {
        render_footer(frame, app, chunks[3]);
    }
}

/// Crée le layout principal (header, contenu, statut, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(4), // Statut
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" eSett Price Data Viewer ")
        .title_alignment(Alignment::Center);

    let text = vec![Line::from(Span::styled(
        "Imbalance and regulation prices from eSett OpenData API",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ))];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(0)])
        .split(area);

    render_sidebar(frame, app, columns[0]);

    match app.session.as_ref() {
        Some(session) => render_session(frame, app, session, columns[1]),
        None => render_empty_session(frame, columns[1]),
    }
}

// ============================================================================
// Panneau de configuration
// ============================================================================

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Zone
            Constraint::Length(4), // Dates
            Constraint::Min(0),    // Séries
        ])
        .split(area);

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    // Zone de marché
    let area_line = Line::from(vec![
        Span::styled("◀ ", key),
        Span::styled(app.area.label(), value),
        Span::styled(" ▶", key),
    ]);
    frame.render_widget(
        Paragraph::new(vec![area_line])
            .alignment(Alignment::Center)
            .block(sidebar_block(" Market Balance Area ")),
        chunks[0],
    );

    // Plage de dates
    let dates = vec![
        Line::from(vec![
            Span::styled("[b] ", key),
            Span::raw("Start "),
            Span::styled(app.start_date.format("%Y-%m-%d").to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("[e] ", key),
            Span::raw("End   "),
            Span::styled(app.end_date.format("%Y-%m-%d").to_string(), value),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(dates).block(sidebar_block(" Date Range ")),
        chunks[1],
    );

    // Cases à cocher
    let items: Vec<ListItem> = PriceSeries::ALL
        .iter()
        .enumerate()
        .map(|(index, series)| {
            let checked = app.is_visible(*series);
            let mark = if checked { "[x]" } else { "[ ]" };
            let style = if checked {
                Style::default().fg(series.color())
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", index + 1), key),
                Span::styled(format!("{} {}", mark, series.label()), style),
            ]))
        })
        .collect();
    frame.render_widget(
        List::new(items).block(sidebar_block(" Price Types ")),
        chunks[2],
    );
}

fn sidebar_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
}

// ============================================================================
// Contenu : statistiques + graphique
// ============================================================================

fn render_session(frame: &mut Frame, app: &App, session: &Session, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    render_summary(frame, session, chunks[0]);
    chart::render_price_chart(frame, session, &app.visible_series(), chunks[1]);
}

/// Moyennes par série, un encart par série
fn render_summary(frame: &mut Frame, session: &Session, area: Rect) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);

    for (series, cell) in SUMMARY_SERIES.iter().zip(cells.iter()) {
        let value = session
            .table
            .mean(*series)
            .map(|mean| format!("{:.2} €/MWh", mean))
            .unwrap_or_else(|| "N/A".to_string());

        let paragraph = Paragraph::new(vec![Line::from(Span::styled(
            value,
            Style::default().fg(series.color()).add_modifier(Modifier::BOLD),
        ))])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Avg {} ", short_label(*series))),
        );

        frame.render_widget(paragraph, *cell);
    }
}

fn short_label(series: PriceSeries) -> &'static str {
    match series {
        PriceSeries::ImbalanceSales => "Imbalance Sales",
        PriceSeries::ImbalancePurchase => "Imbalance Purchase",
        PriceSeries::UpRegulation => "Up Regulation",
        PriceSeries::DownRegulation => "Down Regulation",
        PriceSeries::SpotDifference => "Spot Difference",
        PriceSeries::MainDirection => "Direction",
    }
}

fn render_empty_session(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Price Time Series ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Aucune donnée chargée",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[f]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Fetch Data   "),
            Span::styled("[?]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" About eSett Data"),
        ]),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Barre de statut
// ============================================================================

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let lines = if app.is_loading {
        let message = app
            .loading_message
            .clone()
            .unwrap_or_else(|| "Chargement...".to_string());
        vec![Line::from(Span::styled(
            format!("⏳ {}", message),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))]
    } else if let Some(status) = app.status.as_ref() {
        let (icon, color) = match status.kind {
            StatusKind::Info => ("ℹ", Color::Blue),
            StatusKind::Success => ("✓", Color::Green),
            StatusKind::Warning => ("⚠", Color::Yellow),
            StatusKind::Error => ("✗", Color::Red),
        };
        let mut lines = vec![Line::from(Span::styled(
            format!("{} {}", icon, status.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))];
        if let Some(hint) = status.hint.as_ref() {
            lines.push(Line::from(Span::styled(
                hint.as_str(),
                Style::default().fg(Color::Gray),
            )));
        }
        lines
    } else {
        Vec::new()
    };

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", key),
            Span::raw(" Quit  "),
            Span::styled("[←→]", key),
            Span::raw(" Area  "),
            Span::styled("[b/e]", key),
            Span::raw(" Dates  "),
            Span::styled("[1-6]", key),
            Span::raw(" Series  "),
            Span::styled("[f]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Fetch  "),
            Span::styled("[t]", key),
            Span::raw(" Table  "),
            Span::styled("[c]", key),
            Span::raw(" CSV  "),
            Span::styled("[?]", key),
            Span::raw(" About"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Footer en mode input avec la ligne de saisie
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green)) // Vert pour indiquer mode input
        .title(" [Enter] Confirm  [ESC] Cancel ");

    let input_line = Line::from(vec![
        Span::styled(
            &app.input_prompt,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(&app.input_buffer, Style::default().fg(Color::White)),
        Span::styled(
            "█", // Curseur
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let paragraph = Paragraph::new(vec![input_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
