// ============================================================================
// Models: price series
// ============================================================================
// One fetched query = one PriceSeries. The series is immutable once built;
// a new query replaces it wholesale.
// ============================================================================

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bar frequency requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    /// One bar per trading day
    Daily,
    /// One bar per week
    Weekly,
    /// One bar per month
    Monthly,
}

impl Interval {
    /// Interval string for the Yahoo Finance chart API.
    pub fn to_yahoo_string(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }

    /// Label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Interval::Daily => "Daily",
            Interval::Weekly => "Weekly",
            Interval::Monthly => "Monthly",
        }
    }

    /// Next interval (cycles).
    pub fn next(&self) -> Interval {
        match self {
            Interval::Daily => Interval::Weekly,
            Interval::Weekly => Interval::Monthly,
            Interval::Monthly => Interval::Daily,
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Daily
    }
}

/// Which price column feeds the price chart.
///
/// The return series is always computed from the effective close
/// (adjusted close when the provider supplies it); this selector only
/// changes what the price chart and its moving averages are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    AdjClose,
    Close,
    Open,
}

impl PriceField {
    pub fn label(&self) -> &'static str {
        match self {
            PriceField::AdjClose => "Adj Close",
            PriceField::Close => "Close",
            PriceField::Open => "Open",
        }
    }

    /// Next field (cycles).
    pub fn next(&self) -> PriceField {
        match self {
            PriceField::AdjClose => PriceField::Close,
            PriceField::Close => PriceField::Open,
            PriceField::Open => PriceField::AdjClose,
        }
    }

    /// Extracts this field's value from a candle.
    pub fn value(&self, candle: &Candle) -> f64 {
        match self {
            PriceField::AdjClose => candle.effective_close(),
            PriceField::Close => candle.close,
            PriceField::Open => candle.open,
        }
    }
}

impl Default for PriceField {
    fn default() -> Self {
        PriceField::AdjClose
    }
}

/// One OHLCV bar, keyed by trading date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// Trading date of the bar
    pub date: NaiveDate,

    /// Opening price
    pub open: f64,

    /// Highest price
    pub high: f64,

    /// Lowest price
    pub low: f64,

    /// Closing price
    pub close: f64,

    /// Split/dividend adjusted close, when the provider supplies it
    pub adj_close: Option<f64>,

    /// Traded volume
    pub volume: u64,
}

impl Candle {
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: Option<f64>,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        }
    }

    /// Adjusted close when available, raw close otherwise.
    pub fn effective_close(&self) -> f64 {
        self.adj_close.unwrap_or(self.close)
    }
}

/// What the user asked for: one symbol over one date range at one frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub interval: Interval,
}

impl Query {
    pub fn new(symbol: String, start: NaiveDate, end: NaiveDate, interval: Interval) -> Self {
        Self {
            symbol,
            start,
            end,
            interval,
        }
    }

    /// Checks the query before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            bail!("Ticker symbol is empty");
        }
        if self.start > self.end {
            bail!(
                "Start date {} is after end date {}",
                self.start,
                self.end
            );
        }
        Ok(())
    }
}

/// Ordered collection of candles for one query.
///
/// Dates are strictly increasing and unique: `push` drops any bar that is
/// not dated after the current last bar, so the invariant holds by
/// construction no matter what the provider returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Ticker symbol the series was fetched for
    pub symbol: String,

    /// Bar frequency of the series
    pub interval: Interval,

    /// Candles sorted by date, strictly increasing
    pub candles: Vec<Candle>,
}

impl PriceSeries {
    pub fn new(symbol: String, interval: Interval) -> Self {
        Self {
            symbol,
            interval,
            candles: Vec::new(),
        }
    }

    /// Appends a candle if it is dated strictly after the last one.
    ///
    /// Returns false (and drops the bar) otherwise.
    pub fn push(&mut self, candle: Candle) -> bool {
        if let Some(last) = self.candles.last() {
            if candle.date <= last.date {
                return false;
            }
        }
        self.candles.push(candle);
        true
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Values of the given price field, in date order.
    pub fn field_values(&self, field: PriceField) -> Vec<f64> {
        self.candles.iter().map(|c| field.value(c)).collect()
    }

    /// Effective close of the most recent bar.
    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.effective_close())
    }

    /// Change of the last bar's close against the previous bar's, in percent.
    ///
    /// None when the series has fewer than two bars or the previous close
    /// is zero.
    pub fn latest_change_percent(&self) -> Option<f64> {
        if self.candles.len() < 2 {
            return None;
        }
        let last = self.candles[self.candles.len() - 1].effective_close();
        let prev = self.candles[self.candles.len() - 2].effective_close();
        if prev == 0.0 {
            return None;
        }
        Some((last - prev) / prev * 100.0)
    }

    /// Mean traded volume over the series.
    pub fn average_volume(&self) -> Option<f64> {
        if self.candles.is_empty() {
            return None;
        }
        let total: u64 = self.candles.iter().map(|c| c.volume).sum();
        Some(total as f64 / self.candles.len() as f64)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn candle(d: NaiveDate, close: f64) -> Candle {
        Candle::new(d, close - 1.0, close + 2.0, close - 3.0, close, None, 1_000)
    }

    #[test]
    fn test_push_keeps_dates_strictly_increasing() {
        let mut series = PriceSeries::new("AAPL".to_string(), Interval::Daily);

        assert!(series.push(candle(date(2024, 1, 2), 100.0)));
        assert!(series.push(candle(date(2024, 1, 3), 101.0)));

        // Duplicate date and out-of-order date are both dropped
        assert!(!series.push(candle(date(2024, 1, 3), 102.0)));
        assert!(!series.push(candle(date(2024, 1, 1), 99.0)));

        assert_eq!(series.len(), 2);
        assert!(series
            .candles
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date));
    }

    #[test]
    fn test_effective_close_prefers_adjusted() {
        let raw = candle(date(2024, 1, 2), 100.0);
        assert_eq!(raw.effective_close(), 100.0);

        let adjusted = Candle::new(date(2024, 1, 2), 99.0, 102.0, 97.0, 100.0, Some(98.5), 500);
        assert_eq!(adjusted.effective_close(), 98.5);
    }

    #[test]
    fn test_latest_change_percent() {
        let mut series = PriceSeries::new("AAPL".to_string(), Interval::Daily);
        series.push(candle(date(2024, 1, 2), 100.0));
        series.push(candle(date(2024, 1, 3), 105.0));

        let change = series.latest_change_percent().unwrap();
        assert!((change - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_latest_change_percent_needs_two_bars() {
        let mut series = PriceSeries::new("AAPL".to_string(), Interval::Daily);
        assert!(series.latest_change_percent().is_none());

        series.push(candle(date(2024, 1, 2), 100.0));
        assert!(series.latest_change_percent().is_none());
    }

    #[test]
    fn test_query_validate() {
        let good = Query::new(
            "AAPL".to_string(),
            date(2020, 1, 1),
            date(2021, 1, 1),
            Interval::Daily,
        );
        assert!(good.validate().is_ok());

        let empty = Query::new(String::new(), date(2020, 1, 1), date(2021, 1, 1), Interval::Daily);
        assert!(empty.validate().is_err());

        let reversed = Query::new(
            "AAPL".to_string(),
            date(2021, 1, 1),
            date(2020, 1, 1),
            Interval::Daily,
        );
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_interval_cycle_and_strings() {
        assert_eq!(Interval::Daily.to_yahoo_string(), "1d");
        assert_eq!(Interval::Weekly.to_yahoo_string(), "1wk");
        assert_eq!(Interval::Monthly.to_yahoo_string(), "1mo");

        assert_eq!(Interval::Daily.next(), Interval::Weekly);
        assert_eq!(Interval::Monthly.next(), Interval::Daily);
    }

    #[test]
    fn test_price_field_value() {
        let c = Candle::new(date(2024, 1, 2), 99.0, 102.0, 97.0, 100.0, Some(98.5), 500);
        assert_eq!(PriceField::Open.value(&c), 99.0);
        assert_eq!(PriceField::Close.value(&c), 100.0);
        assert_eq!(PriceField::AdjClose.value(&c), 98.5);
    }
}
