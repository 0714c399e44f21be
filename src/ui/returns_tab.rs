// ============================================================================
// Returns tab: daily returns chart, summary statistics, histogram
// ============================================================================

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::analytics;
use crate::app::App;
use crate::models::SummaryStats;
use crate::ui::dashboard::render_no_data;

pub fn render_returns_tab(frame: &mut Frame, app: &App, area: Rect) {
    // Stats exist exactly when the return series is non-empty
    let stats = match app.stats {
        Some(stats) => stats,
        None => {
            render_no_data(frame, area, app);
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55), // Returns line chart + stats
            Constraint::Percentage(45), // Histogram
        ])
        .split(area)
        .to_vec();

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(70), // Chart
            Constraint::Percentage(30), // Stats panel
        ])
        .split(chunks[0])
        .to_vec();

    render_returns_chart(frame, app, top[0]);
    render_stats_panel(frame, app, stats, top[1]);
    render_histogram(frame, app, chunks[1]);
}

/// Daily return per bar as a line chart around zero.
fn render_returns_chart(frame: &mut Frame, app: &App, area: Rect) {
    let points: Vec<(f64, f64)> = app
        .returns
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.pct_change))
        .collect();

    let (min, max) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(min, max), &(_x, y)| {
            (min.min(y), max.max(y))
        });
    let margin = ((max - min) * 0.05).max(0.01);
    let y_min = min - margin;
    let y_max = max + margin;

    let datasets = vec![Dataset::default()
        .name("Daily return")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points)];

    let first_date = app.returns.points[0].date;
    let last_date = app.returns.points[app.returns.len() - 1].date;

    let x_axis = Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, (points.len().saturating_sub(1)) as f64])
        .labels(vec![
            Span::raw(first_date.format("%Y-%m-%d").to_string()),
            Span::raw(last_date.format("%Y-%m-%d").to_string()),
        ]);

    let y_axis = Axis::default()
        .title("Return (%)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:+.2}", y_min)),
            Span::raw(format!("{:+.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:+.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Daily Returns "),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Summary statistics over the return series.
fn render_stats_panel(frame: &mut Frame, app: &App, stats: SummaryStats, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Summary Statistics ");

    let vol = analytics::annualized_volatility(stats.std_dev);
    let lines = vec![
        stat_line("Count", format!("{}", app.returns.len())),
        stat_line("Mean", format!("{:+.4}%", stats.mean)),
        stat_line("Std Dev", format!("{:.4}%", stats.std_dev)),
        stat_line("Min", format!("{:+.4}%", stats.min)),
        stat_line("Max", format!("{:+.4}%", stats.max)),
        stat_line("Ann. Vol", format!("{:.2}%", vol)),
    ];

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {:<9}", label),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
    ])
}

/// Return distribution as a bar chart over fixed-width bins.
fn render_histogram(frame: &mut Frame, app: &App, area: Rect) {
    let values = app.returns.values();
    let histogram = analytics::histogram(&values, analytics::HISTOGRAM_BINS);

    // One label per bin midpoint; BarChart clips what does not fit
    let bars: Vec<(String, u64)> = histogram
        .bins
        .iter()
        .map(|bin| {
            let mid = (bin.lower + bin.upper) / 2.0;
            (format!("{:+.1}", mid), bin.count as u64)
        })
        .collect();

    let bar_data: Vec<(&str, u64)> = bars.iter().map(|(label, v)| (label.as_str(), *v)).collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(
                    " Return Distribution ({} bins, {} obs) ",
                    histogram.bins.len(),
                    histogram.total_count()
                )),
        )
        .data(&bar_data)
        .bar_width(4)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    frame.render_widget(chart, area);
}
