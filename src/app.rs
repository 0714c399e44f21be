// ============================================================================
// App: application state
// ============================================================================
// Single source of truth for the UI. All mutation goes through methods
// here; rendering only reads. Derived series (returns, stats) are
// recomputed whenever the price series is replaced.
// ============================================================================

use chrono::{NaiveDate, Utc};

use crate::analytics;
use crate::models::{PriceField, PriceSeries, Query, ReturnSeries, SummaryStats};

/// Bounds for the short moving-average window.
pub const SHORT_WINDOW_MIN: usize = 5;
pub const SHORT_WINDOW_MAX: usize = 50;
pub const SHORT_WINDOW_DEFAULT: usize = 20;

/// Bounds for the long moving-average window.
pub const LONG_WINDOW_MIN: usize = 50;
pub const LONG_WINDOW_MAX: usize = 200;
pub const LONG_WINDOW_DEFAULT: usize = 50;

/// How many ticks a transient status message stays visible (~250ms each).
const STATUS_TICKS: u8 = 24;

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Price chart with moving averages
    Price,
    /// Daily returns, statistics and histogram
    Returns,
    /// Raw data table and CSV export
    Table,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Price => "Price & MAs",
            Tab::Returns => "Returns & Volatility",
            Tab::Table => "Data & Export",
        }
    }

    pub fn all() -> [Tab; 3] {
        [Tab::Price, Tab::Returns, Tab::Table]
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Price => 0,
            Tab::Returns => 1,
            Tab::Table => 2,
        }
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::Price => Tab::Returns,
            Tab::Returns => Tab::Table,
            Tab::Table => Tab::Price,
        }
    }

    pub fn previous(&self) -> Tab {
        match self {
            Tab::Price => Tab::Table,
            Tab::Returns => Tab::Price,
            Tab::Table => Tab::Returns,
        }
    }
}

/// What the modal input line is currently editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    Ticker,
    StartDate,
    EndDate,
}

/// Application state.
pub struct App {
    /// Keeps the event loop alive
    pub running: bool,

    /// The confirmed query the current series was (or is being) fetched for
    pub query: Query,

    /// Fetched series; None until the first successful fetch
    pub series: Option<PriceSeries>,

    /// Returns derived from `series`
    pub returns: ReturnSeries,

    /// Summary statistics over `returns`
    pub stats: Option<SummaryStats>,

    /// Active dashboard tab
    pub active_tab: Tab,

    /// Short moving-average window, in bars
    pub short_window: usize,

    /// Long moving-average window, in bars
    pub long_window: usize,

    /// Price column the price chart is drawn from
    pub price_field: PriceField,

    /// Two-step quit: first 'q' arms this, second quits
    pub confirm_quit: bool,

    /// A fetch is in flight
    pub is_loading: bool,

    /// Message shown while loading
    pub loading_message: Option<String>,

    /// Last fetch/input error, shown as a banner until the next fetch
    pub error: Option<String>,

    /// Transient status line (export path, discarded input), auto-expires
    pub status: Option<String>,
    status_ticks: u8,

    /// Modal input state
    pub input_target: Option<InputTarget>,
    pub input_buffer: String,
    pub input_prompt: String,
}

impl App {
    /// Fresh state with the default query: AAPL from 2020-01-01 to today,
    /// daily bars.
    pub fn new() -> Self {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid literal date");
        let end = Utc::now().date_naive();

        Self {
            running: true,
            query: Query::new("AAPL".to_string(), start, end, Default::default()),
            series: None,
            returns: ReturnSeries::default(),
            stats: None,
            active_tab: Tab::Price,
            short_window: SHORT_WINDOW_DEFAULT,
            long_window: LONG_WINDOW_DEFAULT,
            price_field: PriceField::default(),
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
            error: None,
            status: None,
            status_ticks: 0,
            input_target: None,
            input_buffer: String::new(),
            input_prompt: String::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Called once per loop iteration; ages out the status line.
    pub fn tick(&mut self) {
        if self.status_ticks > 0 {
            self.status_ticks -= 1;
            if self.status_ticks == 0 {
                self.status = None;
            }
        }
    }

    // ========================================================================
    // Series and derived data
    // ========================================================================

    /// Installs a freshly fetched series and recomputes everything
    /// derived from it.
    pub fn set_series(&mut self, series: PriceSeries) {
        self.returns = analytics::daily_returns(&series);
        self.stats = analytics::summary_stats(&self.returns.values());
        self.series = Some(series);
        self.error = None;
        self.stop_loading();
    }

    /// Records a fetch failure. The previous series, if any, stays on
    /// screen behind the banner.
    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.stop_loading();
    }

    /// Annualized volatility of the current returns, in percent.
    pub fn annualized_volatility(&self) -> Option<f64> {
        self.stats
            .map(|s| analytics::annualized_volatility(s.std_dev))
    }

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn set_status(&mut self, message: String) {
        self.status = Some(message);
        self.status_ticks = STATUS_TICKS;
    }

    // ========================================================================
    // Tabs and chart controls
    // ========================================================================

    pub fn next_tab(&mut self) {
        self.active_tab = self.active_tab.next();
    }

    pub fn previous_tab(&mut self) {
        self.active_tab = self.active_tab.previous();
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    /// Moves the short window by `delta` bars, clamped to its bounds.
    pub fn adjust_short_window(&mut self, delta: i64) {
        self.short_window = clamp_window(
            self.short_window as i64 + delta,
            SHORT_WINDOW_MIN,
            SHORT_WINDOW_MAX,
        );
    }

    /// Moves the long window by `delta` bars, clamped to its bounds.
    pub fn adjust_long_window(&mut self, delta: i64) {
        self.long_window = clamp_window(
            self.long_window as i64 + delta,
            LONG_WINDOW_MIN,
            LONG_WINDOW_MAX,
        );
    }

    pub fn cycle_interval(&mut self) {
        self.query.interval = self.query.interval.next();
    }

    pub fn cycle_price_field(&mut self) {
        self.price_field = self.price_field.next();
    }

    // ========================================================================
    // Modal input
    // ========================================================================

    /// Enters input mode for a target; the prompt shows the current value.
    pub fn start_input(&mut self, target: InputTarget) {
        self.input_prompt = match target {
            InputTarget::Ticker => format!("Ticker [{}]: ", self.query.symbol),
            InputTarget::StartDate => format!("Start date [{}] (YYYY-MM-DD): ", self.query.start),
            InputTarget::EndDate => format!("End date [{}] (YYYY-MM-DD): ", self.query.end),
        };
        self.input_buffer.clear();
        self.input_target = Some(target);
    }

    pub fn cancel_input(&mut self) {
        self.input_target = None;
        self.input_buffer.clear();
        self.input_prompt.clear();
    }

    /// Leaves input mode, handing back the target and the typed text.
    pub fn submit_input(&mut self) -> Option<(InputTarget, String)> {
        let target = self.input_target.take()?;
        let value = std::mem::take(&mut self.input_buffer);
        self.input_prompt.clear();
        Some((target, value))
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.input_target.is_some()
    }

    /// Applies a submitted input value to the query.
    ///
    /// Returns the updated query when it changed and is valid (the caller
    /// triggers the refetch). Invalid values leave the query untouched
    /// and surface a status message instead.
    pub fn apply_input(&mut self, target: InputTarget, raw: &str) -> Option<Query> {
        let mut candidate = self.query.clone();

        match target {
            InputTarget::Ticker => {
                let symbol = raw.trim().to_uppercase();
                if symbol.is_empty() {
                    self.set_status("Empty ticker, keeping previous".to_string());
                    return None;
                }
                candidate.symbol = symbol;
            }
            InputTarget::StartDate => match parse_date(raw) {
                Some(date) => candidate.start = date,
                None => {
                    self.set_status(format!("Invalid date '{}', expected YYYY-MM-DD", raw.trim()));
                    return None;
                }
            },
            InputTarget::EndDate => match parse_date(raw) {
                Some(date) => candidate.end = date,
                None => {
                    self.set_status(format!("Invalid date '{}', expected YYYY-MM-DD", raw.trim()));
                    return None;
                }
            },
        }

        if let Err(e) = candidate.validate() {
            self.set_status(e.to_string());
            return None;
        }

        if candidate == self.query {
            return None;
        }

        self.query = candidate.clone();
        Some(candidate)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_window(value: i64, min: usize, max: usize) -> usize {
    value.clamp(min as i64, max as i64) as usize
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candle, Interval};

    fn sample_series(len: usize) -> PriceSeries {
        let mut series = PriceSeries::new("AAPL".to_string(), Interval::Daily);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for i in 0..len {
            let close = 100.0 + i as f64;
            series.push(Candle::new(
                start + chrono::Duration::days(i as i64),
                close,
                close + 1.0,
                close - 1.0,
                close,
                None,
                1_000,
            ));
        }
        series
    }

    #[test]
    fn test_defaults() {
        let app = App::new();
        assert!(app.is_running());
        assert_eq!(app.query.symbol, "AAPL");
        assert_eq!(app.short_window, SHORT_WINDOW_DEFAULT);
        assert_eq!(app.long_window, LONG_WINDOW_DEFAULT);
        assert_eq!(app.active_tab, Tab::Price);
        assert!(app.series.is_none());
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new();

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        assert!(app.is_running());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_tab_cycling() {
        let mut app = App::new();
        app.next_tab();
        assert_eq!(app.active_tab, Tab::Returns);
        app.next_tab();
        assert_eq!(app.active_tab, Tab::Table);
        app.next_tab();
        assert_eq!(app.active_tab, Tab::Price);
        app.previous_tab();
        assert_eq!(app.active_tab, Tab::Table);
    }

    #[test]
    fn test_window_clamping() {
        let mut app = App::new();

        app.adjust_short_window(1000);
        assert_eq!(app.short_window, SHORT_WINDOW_MAX);
        app.adjust_short_window(-1000);
        assert_eq!(app.short_window, SHORT_WINDOW_MIN);

        app.adjust_long_window(1000);
        assert_eq!(app.long_window, LONG_WINDOW_MAX);
        app.adjust_long_window(-1000);
        assert_eq!(app.long_window, LONG_WINDOW_MIN);
    }

    #[test]
    fn test_set_series_recomputes_derived() {
        let mut app = App::new();
        app.set_series(sample_series(5));

        assert_eq!(app.returns.len(), 4);
        assert!(app.stats.is_some());
        assert!(app.error.is_none());
        assert!(app.annualized_volatility().is_some());
    }

    #[test]
    fn test_ticker_input_flow() {
        let mut app = App::new();

        app.start_input(InputTarget::Ticker);
        assert!(app.is_in_input_mode());

        for c in "msft".chars() {
            app.append_char(c);
        }
        let (target, value) = app.submit_input().unwrap();
        assert!(!app.is_in_input_mode());

        let changed = app.apply_input(target, &value);
        assert!(changed.is_some());
        assert_eq!(app.query.symbol, "MSFT");
    }

    #[test]
    fn test_invalid_date_input_keeps_query() {
        let mut app = App::new();
        let before = app.query.clone();

        let changed = app.apply_input(InputTarget::StartDate, "not-a-date");
        assert!(changed.is_none());
        assert_eq!(app.query, before);
        assert!(app.status.is_some());
    }

    #[test]
    fn test_reversed_range_rejected() {
        let mut app = App::new();
        let before = app.query.clone();

        // End date before the default 2020-01-01 start
        let changed = app.apply_input(InputTarget::EndDate, "2019-01-01");
        assert!(changed.is_none());
        assert_eq!(app.query, before);
    }

    #[test]
    fn test_unchanged_input_triggers_no_fetch() {
        let mut app = App::new();
        let changed = app.apply_input(InputTarget::Ticker, "aapl");
        assert!(changed.is_none());
    }

    #[test]
    fn test_status_expires_with_ticks() {
        let mut app = App::new();
        app.set_status("exported".to_string());
        assert!(app.status.is_some());

        for _ in 0..STATUS_TICKS {
            app.tick();
        }
        assert!(app.status.is_none());
    }
}
