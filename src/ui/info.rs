// ============================================================================
// Écrans d'information : "About" et détail de la dernière erreur
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::models::{Area, PriceSeries};

/// Description courte de chaque type de prix
fn series_description(series: PriceSeries) -> &'static str {
    match series {
        PriceSeries::ImbalanceSales => "Price for selling imbalance energy",
        PriceSeries::ImbalancePurchase => "Price for purchasing imbalance energy",
        PriceSeries::UpRegulation => "Price for up-regulation",
        PriceSeries::DownRegulation => "Price for down-regulation",
        PriceSeries::SpotDifference => "Difference between imbalance and spot price",
        PriceSeries::MainDirection => "Dominant regulation direction (-1 down, 0 none, 1 up)",
    }
}

/// Zones regroupées par pays : "Sweden: SE1, SE2, SE3, SE4"
fn areas_by_country() -> Vec<String> {
    [("Sweden", "SE"), ("Finland", "FI"), ("Norway", "NO"), ("Denmark", "DK")]
        .iter()
        .map(|(country, prefix)| {
            let names: Vec<&str> = Area::ALL
                .iter()
                .map(|a| a.short_name())
                .filter(|name| name.starts_with(*prefix))
                .collect();
            format!("{}: {}", country, names.join(", "))
        })
        .collect()
}

/// Écran "About eSett Data"
pub fn render_about(frame: &mut Frame, _app: &App) {
    let title = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(Span::styled("eSett OpenData API", title)),
        Line::from(""),
        Line::from("This tool visualizes price data from the eSett OpenData API."),
        Line::from(""),
        Line::from(Span::styled("Available Price Types:", bold)),
    ];

    for series in PriceSeries::ALL {
        lines.push(Line::from(vec![
            Span::styled(format!("  • {}: ", series.label()), Style::default().fg(series.color())),
            Span::raw(series_description(series)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Market Balance Areas (MBA):", bold)));
    lines.extend(areas_by_country().into_iter().map(|l| Line::from(format!("  • {}", l))));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Data Source: ", bold),
        Span::raw("https://api.opendata.esett.com"),
    ]));
    lines.push(Line::from("Timestamps are shown in UTC+2, prices in €/MWh."));

    render_with_footer(frame, " About eSett Data ", lines, Color::Cyan);
}

/// Écran de détail de la dernière erreur (chaîne de causes complète)
pub fn render_error_details(frame: &mut Frame, app: &App) {
    let lines: Vec<Line> = match app.last_error_details.as_deref() {
        Some(details) => details.lines().map(|l| Line::from(l.to_string())).collect(),
        None => vec![Line::from("Aucune erreur enregistrée.")],
    };

    render_with_footer(frame, " Error details ", lines, Color::Red);
}

fn render_with_footer(frame: &mut Frame, title: &str, lines: Vec<Line>, color: Color) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(frame.size());

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title),
        );
    frame.render_widget(paragraph, chunks[0]);

    render_back_footer(frame, chunks[1]);
}

fn render_back_footer(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            "[ESC]",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Retour"),
    ]);
    frame.render_widget(
        Paragraph::new(vec![line]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_areas_by_country() {
        let lines = areas_by_country();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Sweden: SE1, SE2, SE3, SE4");
        assert_eq!(lines[1], "Finland: FI");
        assert_eq!(lines[2], "Norway: NO1, NO2, NO3, NO4, NO5");
        assert_eq!(lines[3], "Denmark: DK1, DK2");
    }
}
