// ============================================================================
// Price tab: line chart with moving-average overlays
// ============================================================================

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::analytics;
use crate::app::App;
use crate::ui::dashboard::render_no_data;

/// Draws the selected price field with the short and long moving
/// averages layered on top.
pub fn render_price_tab(frame: &mut Frame, app: &App, area: Rect) {
    let series = match &app.series {
        Some(series) if !series.is_empty() => series,
        _ => {
            render_no_data(frame, area, app);
            return;
        }
    };

    let values = series.field_values(app.price_field);

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v))
        .collect();

    let short_label = format!("MA {}", app.short_window);
    let short_points = ma_points(&values, app.short_window);

    let long_label = format!("MA {}", app.long_window);
    let long_points = ma_points(&values, app.long_window);

    // Bounds come from the raw prices; the averages always lie inside them
    let (min_price, max_price) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(min, max), &(_x, y)| {
            (min.min(y), max.max(y))
        });

    let margin = (max_price - min_price) * 0.05;
    let y_min = (min_price - margin).max(0.0);
    let y_max = max_price + margin;

    let price_color = match (values.first(), values.last()) {
        (Some(first), Some(last)) if last >= first => Color::Green,
        _ => Color::Red,
    };

    let datasets = vec![
        Dataset::default()
            .name(app.price_field.label())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(price_color))
            .data(&points),
        Dataset::default()
            .name(short_label.as_str())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&short_points),
        Dataset::default()
            .name(long_label.as_str())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&long_points),
    ];

    let first_date = series.candles[0].date;
    let last_date = series.candles[series.len() - 1].date;

    let x_axis = Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, (points.len().saturating_sub(1)) as f64])
        .labels(vec![
            Span::raw(first_date.format("%Y-%m-%d").to_string()),
            Span::raw(last_date.format("%Y-%m-%d").to_string()),
        ]);

    let y_axis = Axis::default()
        .title("Price ($)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.2}", y_min)),
            Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(
                    " {} - {} with MA {} / MA {} ",
                    series.symbol,
                    app.price_field.label(),
                    app.short_window,
                    app.long_window
                )),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Moving-average overlay as chart points, skipping the undefined head.
fn ma_points(values: &[f64], window: usize) -> Vec<(f64, f64)> {
    analytics::moving_average(values, window)
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect()
}
