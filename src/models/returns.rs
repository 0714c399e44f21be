// ============================================================================
// Models: derived series
// ============================================================================
// Return series, summary statistics and histogram produced by the
// analytics pass. All are recomputed from the current PriceSeries; none
// has an independent lifecycle.
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Day-over-day percentage change for one trading date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReturnPoint {
    /// Date of the bar the change lands on
    pub date: NaiveDate,

    /// Percentage change against the previous bar's close
    pub pct_change: f64,
}

/// Percentage returns derived from a price series.
///
/// Always exactly one entry shorter than the series it came from: the
/// first bar has no prior close to compare against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Return values without their dates, in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.pct_change).collect()
    }
}

/// Summary statistics over a set of return values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Arithmetic mean
    pub mean: f64,

    /// Sample standard deviation (n-1 denominator)
    pub std_dev: f64,

    /// Smallest value
    pub min: f64,

    /// Largest value
    pub max: f64,
}

/// One histogram bucket: `[lower, upper)`, last bucket closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over return values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Total number of observations across all bins.
    pub fn total_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}
