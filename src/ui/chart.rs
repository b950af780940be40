// ============================================================================
// Chart - Graphique des séries de prix
// ============================================================================
// Une courbe par série cochée, axe X en heure UTC+2, axe Y en €/MWh.
// L'indicateur de direction (-1/0/1) a sa propre bande sous le graphique.
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher (emprunte un slice de points)
// 3. Axis : configuration des axes X et Y
// ============================================================================

use chrono::NaiveDateTime;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::Session;
use crate::models::{PriceSeries, PriceTable};

/// Hauteur de la bande "direction principale"
const DIRECTION_STRIP_HEIGHT: u16 = 8;

/// Bornes fixes de l'axe de direction
const DIRECTION_BOUNDS: [f64; 2] = [-1.5, 1.5];

/// Abscisse d'un timestamp (secondes, heure locale UTC+2)
fn x_value(timestamp: NaiveDateTime) -> f64 {
    timestamp.and_utc().timestamp() as f64
}

/// Points (x, y) d'une série, valeurs manquantes ignorées
///
/// CONCEPT RUST : filter_map
/// - Les None (prix null dans l'API) ne produisent pas de point
pub fn series_points(table: &PriceTable, series: PriceSeries) -> Vec<(f64, f64)> {
    table
        .iter()
        .filter_map(|record| {
            record
                .value(series)
                .filter(|v| v.is_finite())
                .map(|v| (x_value(record.timestamp), v))
        })
        .collect()
}

/// Bornes Y avec une marge de 5% pour que le graphique respire
///
/// Les prix peuvent être négatifs : pas de plancher à 0
pub fn padded_bounds(min: f64, max: f64) -> [f64; 2] {
    if (max - min).abs() < f64::EPSILON {
        return [min - 1.0, max + 1.0];
    }
    let margin = (max - min) * 0.05;
    [min - margin, max + margin]
}

// ============================================================================
// Fonction principale de rendu du graphique
// ============================================================================

/// Dessine le graphique des séries cochées pour la session courante
pub fn render_price_chart(frame: &mut Frame, session: &Session, series: &[PriceSeries], area: Rect) {
    let show_direction = series.contains(&PriceSeries::MainDirection);
    let price_series: Vec<PriceSeries> = series.iter().copied().filter(|s| s.is_price()).collect();

    if price_series.is_empty() && !show_direction {
        render_no_series(frame, area);
        return;
    }

    if !show_direction {
        render_price_lines(frame, session, &price_series, area);
        return;
    }

    if price_series.is_empty() {
        render_direction_strip(frame, session, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(DIRECTION_STRIP_HEIGHT),
        ])
        .split(area);

    render_price_lines(frame, session, &price_series, chunks[0]);
    render_direction_strip(frame, session, chunks[1]);
}

/// Labels de l'axe X : début, milieu, fin
fn x_labels(table: &PriceTable) -> (Vec<Span<'static>>, [f64; 2]) {
    let Some((first, last)) = table.time_range() else {
        return (Vec::new(), [0.0, 1.0]);
    };

    let x_min = x_value(first);
    let x_max = x_value(last).max(x_min + 1.0);
    let middle = first + (last - first) / 2;

    let labels = [first, middle, last]
        .iter()
        .map(|t| Span::raw(t.format("%m-%d %H:%M").to_string()))
        .collect();

    (labels, [x_min, x_max])
}

/// Courbes de prix (€/MWh)
fn render_price_lines(frame: &mut Frame, session: &Session, series: &[PriceSeries], area: Rect) {
    let table = session.table.as_ref();

    // Les Dataset empruntent les points : on les garde vivants ici
    let points: Vec<(PriceSeries, Vec<(f64, f64)>)> = series
        .iter()
        .map(|s| (*s, series_points(table, *s)))
        .collect();

    let Some((min, max)) = table.value_bounds(series) else {
        render_no_series(frame, area);
        return;
    };
    let [y_min, y_max] = padded_bounds(min, max);
    let (labels, x_bounds) = x_labels(table);

    let datasets: Vec<Dataset> = points
        .iter()
        .map(|(s, data)| {
            Dataset::default()
                .name(s.label())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(s.color()))
                .data(data)
        })
        .collect();

    let x_axis = Axis::default()
        .title("Time (UTC+2)")
        .style(Style::default().fg(Color::Gray))
        .bounds(x_bounds)
        .labels(labels);

    let y_axis = Axis::default()
        .title("Price (€/MWh)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.0}", y_min)),
            Span::raw(format!("{:.0}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:.0}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" eSett Prices - {} ", session.area.label())),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Bande de l'indicateur de direction (-1 bas, 0 neutre, 1 haut)
fn render_direction_strip(frame: &mut Frame, session: &Session, area: Rect) {
    let table = session.table.as_ref();
    let series = PriceSeries::MainDirection;
    let data = series_points(table, series);
    let (labels, x_bounds) = x_labels(table);

    let datasets = vec![Dataset::default()
        .name(series.label())
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(series.color()))
        .data(&data)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Direction (-1=Down, 0=Neutral, 1=Up) "),
        )
        .x_axis(Axis::default().bounds(x_bounds).labels(labels))
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(DIRECTION_BOUNDS)
                .labels(vec![Span::raw("-1"), Span::raw("0"), Span::raw("1")]),
        );

    frame.render_widget(chart, area);
}

/// Message quand aucune série n'est cochée (ou aucune valeur)
fn render_no_series(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Price Time Series ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Aucune série à afficher",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "Cochez une série avec [1]-[6]",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests unitaires
// ============================================================================
