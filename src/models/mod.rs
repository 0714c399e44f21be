// ============================================================================
// Module: models
// ============================================================================
// Data structures shared across the fetch, analytics and UI layers.
// ============================================================================

pub mod returns; // Derived series: returns, stats, histogram
pub mod series;  // Fetched series: candles, intervals, queries

// Re-exports so callers can use stockdash::models::PriceSeries directly
pub use returns::{Histogram, HistogramBin, ReturnPoint, ReturnSeries, SummaryStats};
pub use series::{Candle, Interval, PriceField, PriceSeries, Query};
