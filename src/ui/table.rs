// ============================================================================
// Vue table : les dernières lignes de la session
// ============================================================================
// Colonnes : timestamp, mba, puis les séries cochées.
// Seules les 100 dernières lignes sont affichées ; l'export CSV, lui,
// contient toute la table.
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, Session};
use crate::models::{PriceRecord, PriceSeries, TIMESTAMP_FORMAT};

/// Texte d'une cellule pour une série
pub fn format_cell(record: &PriceRecord, series: PriceSeries) -> String {
    match (series, record.value(series)) {
        (_, None) => String::new(),
        (PriceSeries::MainDirection, Some(v)) => format!("{}", v),
        (_, Some(v)) => format!("{:.2}", v),
    }
}

/// Hauteur du footer de la vue table
const FOOTER_HEIGHT: u16 = 3;

/// Bordures (2) + en-tête (1) autour des lignes de données
const TABLE_CHROME_HEIGHT: u16 = 3;

/// Nombre de lignes de données visibles pour un écran de cette taille
pub fn page_rows(screen: Rect) -> usize {
    screen
        .height
        .saturating_sub(FOOTER_HEIGHT + TABLE_CHROME_HEIGHT) as usize
}

/// Lignes visibles compte tenu du défilement
///
/// `scroll` compte depuis le bas : 0 = les lignes les plus récentes.
/// La fenêtre reste pleine : le défilement est borné à `len - height`.
pub fn visible_window(rows: &[PriceRecord], height: usize, scroll: usize) -> &[PriceRecord] {
    let scroll = scroll.min(rows.len().saturating_sub(height));
    let end = rows.len() - scroll;
    let start = end.saturating_sub(height);
    &rows[start..end]
}

/// Dessine la vue table
pub fn render_table_view(frame: &mut Frame, app: &App) {
    let Some(session) = app.session.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
        .split(frame.size());

    render_table(frame, session, &app.visible_series(), app.table_scroll, chunks[0]);
    render_table_footer(frame, session, chunks[1]);
}

fn render_table(
    frame: &mut Frame,
    session: &Session,
    series: &[PriceSeries],
    scroll: usize,
    area: Rect,
) {
    let header_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut header = vec![Cell::from("timestamp"), Cell::from("mba")];
    header.extend(series.iter().map(|s| Cell::from(s.column())));

    let height = area.height.saturating_sub(TABLE_CHROME_HEIGHT) as usize;
    let rows: Vec<Row> = visible_window(session.display_rows(), height, scroll)
        .iter()
        .map(|record| {
            let mut cells = vec![
                record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                record.mba.clone(),
            ];
            cells.extend(series.iter().map(|s| format_cell(record, *s)));
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(19), Constraint::Length(18)];
    widths.extend(series.iter().map(|s| Constraint::Length(s.column().len().max(10) as u16)));

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(header_style))
        .column_spacing(2)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(
                    " Raw Data - {} (last {} of {} rows) ",
                    session.area.label(),
                    session.display_rows().len(),
                    session.table.len()
                )),
        );

    frame.render_widget(table, area);
}

fn render_table_footer(frame: &mut Frame, session: &Session, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled("[↑↓ / j k]", key),
        Span::raw(" Scroll  "),
        Span::styled("[c]", key),
        Span::raw(format!(" Export {}  ", session.csv_file_name())),
        Span::styled("[ESC]", key),
        Span::raw(" Retour"),
    ]);

    frame.render_widget(Paragraph::new(vec![line]).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rows(n: u32) -> Vec<PriceRecord> {
        (0..n)
            .map(|h| {
                PriceRecord::new(
                    NaiveDate::from_ymd_opt(2024, 1, 1)
                        .unwrap()
                        .and_hms_opt(h, 0, 0)
                        .unwrap(),
                    "SE1",
                )
            })
            .collect()
    }

    #[test]
    fn test_visible_window() {
        let all = rows(10);

        let window = visible_window(&all, 3, 0);
        assert_eq!(window.len(), 3);
        assert_eq!(window[2], all[9]);

        let window = visible_window(&all, 3, 2);
        assert_eq!(window[2], all[7]);

        assert_eq!(visible_window(&all, 50, 0).len(), 10);

        // Défilement excessif : la fenêtre reste pleine sur les plus anciennes
        let window = visible_window(&all, 3, 20);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0], all[0]);
    }

    #[test]
    fn test_page_rows() {
        assert_eq!(page_rows(Rect::new(0, 0, 80, 24)), 18);
        assert_eq!(page_rows(Rect::new(0, 0, 80, 4)), 0);
    }

    #[test]
    fn test_format_cell() {
        let mut record = rows(1).remove(0);
        record.imbalance_sales_price = Some(12.346);
        record.main_direction = Some(1.0);

        assert_eq!(format_cell(&record, PriceSeries::ImbalanceSales), "12.35");
        assert_eq!(format_cell(&record, PriceSeries::MainDirection), "1");
        assert_eq!(format_cell(&record, PriceSeries::UpRegulation), "");
    }
}
