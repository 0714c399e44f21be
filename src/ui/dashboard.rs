// ============================================================================
// Dashboard: top-level rendering
// ============================================================================
// Screen layout: KPI header, tab bar, active tab content, footer with
// shortcuts / confirmation / modal input line.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, Tab};
use crate::ui::{price_tab, returns_tab, table_tab};

/// Draws the whole interface.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    render_tab_bar(frame, app, chunks[1]);

    match app.active_tab {
        Tab::Price => price_tab::render_price_tab(frame, app, chunks[2]),
        Tab::Returns => returns_tab::render_returns_tab(frame, app, chunks[2]),
        Tab::Table => table_tab::render_table_tab(frame, app, chunks[2]),
    }

    render_footer(frame, app, chunks[3]);
}

/// Header, tab bar, content, footer.
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header: query line + KPI line
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Tab content
            Constraint::Length(4), // Footer: message line + shortcuts
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header
// ============================================================================

/// Query summary and KPI row (last close, daily change, annualized
/// volatility, average volume).
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" stockdash ")
        .title_alignment(Alignment::Center);

    let query_line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.query.symbol),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " {} → {}  ",
            app.query.start, app.query.end
        )),
        Span::styled(
            format!("[{}]", app.query.interval.label()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  chart: "),
        Span::styled(
            app.price_field.label(),
            Style::default().fg(Color::Yellow),
        ),
        if app.is_loading {
            Span::styled(
                "  ⟳ loading…",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw("")
        },
    ]);

    let kpi_line = match &app.series {
        Some(series) if !series.is_empty() => {
            let last_close = series
                .last_close()
                .map(|v| format!("${:.2}", v))
                .unwrap_or_else(|| "N/A".to_string());

            let (change_text, change_color) = match series.latest_change_percent() {
                Some(change) => {
                    let arrow = if change >= 0.0 { "▲" } else { "▼" };
                    let color = if change >= 0.0 { Color::Green } else { Color::Red };
                    (format!("{} {:+.2}%", arrow, change), color)
                }
                None => ("N/A".to_string(), Color::Gray),
            };

            let vol = app
                .annualized_volatility()
                .map(|v| format!("{:.2}%", v))
                .unwrap_or_else(|| "N/A".to_string());

            let avg_volume = series
                .average_volume()
                .map(|v| group_thousands(v.round() as u64))
                .unwrap_or_else(|| "N/A".to_string());

            Line::from(vec![
                Span::raw(" Last Close "),
                Span::styled(last_close, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("   Change "),
                Span::styled(change_text, Style::default().fg(change_color)),
                Span::raw("   Ann. Vol "),
                Span::styled(vol, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("   Avg Volume "),
                Span::styled(avg_volume, Style::default().add_modifier(Modifier::BOLD)),
            ])
        }
        _ => Line::from(Span::styled(
            " No data loaded",
            Style::default().fg(Color::Gray),
        )),
    };

    let paragraph = Paragraph::new(vec![query_line, kpi_line]).block(block);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tab bar
// ============================================================================

fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!(" {} {} ", i + 1, tab.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.active_tab.index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

// ============================================================================
// Footer
// ============================================================================

/// Message line plus shortcuts; replaced by the input line in input mode.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    if app.is_in_input_mode() {
        render_input_footer(frame, app, area);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let message_line = if let Some(error) = &app.error {
        Line::from(Span::styled(
            format!("⚠ {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else if let Some(status) = &app.status {
        Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(message) = &app.loading_message {
        Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Cyan),
        ))
    } else {
        Line::from("")
    };

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Press ",
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
                " again to quit, any other key to cancel ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", key_style()),
            Span::raw(" Quit  "),
            Span::styled("[Tab/1-3]", key_style()),
            Span::raw(" Tabs  "),
            Span::styled("[t]", key_style()),
            Span::raw(" Ticker  "),
            Span::styled("[s/e]", key_style()),
            Span::raw(" Dates  "),
            Span::styled("[f]", key_style()),
            Span::raw(" Freq  "),
            Span::styled("[p]", key_style()),
            Span::raw(" Field  "),
            Span::styled("[[/]]", key_style()),
            Span::raw(" Short MA  "),
            Span::styled("[{/}]", key_style()),
            Span::raw(" Long MA  "),
            Span::styled("[r]", key_style()),
            Span::raw(" Refresh  "),
            Span::styled("[x]", key_style()),
            Span::raw(" Export"),
        ])
    };

    let paragraph = Paragraph::new(vec![message_line, shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Footer variant while typing a ticker or a date.
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input_line = Line::from(vec![
        Span::styled(
            app.input_prompt.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::White)),
        Span::styled(
            "█",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let help_line = Line::from(vec![
        Span::styled(
            "[Enter]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Confirm  "),
        Span::styled(
            "[ESC]",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Cancel"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

fn key_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Placeholder panel for tabs with nothing to show yet.
pub(crate) fn render_no_data(frame: &mut Frame, area: Rect, app: &App) {
    let (message, color) = if app.is_loading {
        (format!("Fetching {}…", app.query.symbol), Color::Cyan)
    } else if let Some(error) = &app.error {
        (error.clone(), Color::Red)
    } else {
        ("No data - press [r] to fetch".to_string(), Color::Gray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(color))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// 1234567 → "1,234,567".
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
