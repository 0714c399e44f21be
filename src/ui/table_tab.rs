// ============================================================================
// Table tab: raw price data and CSV export
// ============================================================================
// Rows are built with export::csv_record, the same formatter the CSV
// writer uses, so the exported file matches the table field for field.
// ============================================================================

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

use crate::app::App;
use crate::export;
use crate::ui::dashboard::render_no_data;

pub fn render_table_tab(frame: &mut Frame, app: &App, area: Rect) {
    let series = match &app.series {
        Some(series) if !series.is_empty() => series,
        _ => {
            render_no_data(frame, area, app);
            return;
        }
    };

    // Rows that fit inside the border plus the header line
    let visible = (area.height.saturating_sub(3)) as usize;
    let skipped = series.len().saturating_sub(visible);

    let rows: Vec<Row> = series
        .candles
        .iter()
        .skip(skipped)
        .map(|candle| Row::new(export::csv_record(candle).to_vec()))
        .collect();

    let header = Row::new(export::CSV_HEADERS.to_vec()).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let title = if skipped > 0 {
        format!(
            " Raw Data - last {} of {} rows - [x] Export CSV ",
            visible.min(series.len()),
            series.len()
        )
    } else {
        format!(" Raw Data - {} rows - [x] Export CSV ", series.len())
    };

    let widths = [
        Constraint::Length(12), // Date
        Constraint::Length(10), // Open
        Constraint::Length(10), // High
        Constraint::Length(10), // Low
        Constraint::Length(10), // Close
        Constraint::Length(10), // Adj Close
        Constraint::Length(14), // Volume
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    );

    frame.render_widget(table, area);
}
