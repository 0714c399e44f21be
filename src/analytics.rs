// ============================================================================
// Analytics: numeric reductions over the fetched series
// ============================================================================
// Pure functions from slices to derived values. Everything here is
// recomputed from scratch when the price series or a window changes;
// nothing holds state between queries.
// ============================================================================

use crate::models::{
    Histogram, HistogramBin, PriceSeries, ReturnPoint, ReturnSeries, SummaryStats,
};

/// Trading periods used to annualize volatility.
pub const TRADING_PERIODS_PER_YEAR: f64 = 252.0;

/// Bin count for the return distribution histogram.
pub const HISTOGRAM_BINS: usize = 40;

/// Simple moving average over `values` with the given window.
///
/// The output is aligned to the input: entry `i` is `None` while fewer
/// than `window` observations exist (`i < window - 1`), and the mean of
/// the `window` most recent values ending at `i` afterwards. A window of
/// zero yields all `None`.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }

    out
}

/// Day-over-day percentage returns on the effective close.
///
/// One entry per bar except the first, which has no prior close. A zero
/// previous close yields a zero return rather than an infinity.
pub fn daily_returns(series: &PriceSeries) -> ReturnSeries {
    let mut points = Vec::new();

    for pair in series.candles.windows(2) {
        let prev = pair[0].effective_close();
        let cur = pair[1].effective_close();

        let pct_change = if prev == 0.0 {
            0.0
        } else {
            (cur - prev) / prev * 100.0
        };

        points.push(ReturnPoint {
            date: pair[1].date,
            pct_change,
        });
    }

    ReturnSeries { points }
}

/// Mean, sample standard deviation, min and max over `values`.
///
/// None for an empty slice. With a single value the standard deviation
/// is reported as zero.
pub fn summary_stats(values: &[f64]) -> Option<SummaryStats> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let std_dev = if values.len() < 2 {
        0.0
    } else {
        let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        (sum_sq / (n - 1.0)).sqrt()
    };

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    Some(SummaryStats {
        mean,
        std_dev,
        min,
        max,
    })
}

/// Annualized volatility from the per-period return standard deviation.
pub fn annualized_volatility(std_dev: f64) -> f64 {
    std_dev * TRADING_PERIODS_PER_YEAR.sqrt()
}

/// Equal-width histogram over `values`.
///
/// Bins span `[min, max]`; every value lands in exactly one bin (the
/// last bin is closed on the right). When all values are equal a single
/// bin holds everything. Empty input or a zero bin count yields an
/// empty histogram.
pub fn histogram(values: &[f64], bin_count: usize) -> Histogram {
    if values.is_empty() || bin_count == 0 {
        return Histogram::default();
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    if span == 0.0 {
        return Histogram {
            bins: vec![HistogramBin {
                lower: min,
                upper: max,
                count: values.len(),
            }],
        };
    }

    let width = span / bin_count as f64;
    let mut counts = vec![0usize; bin_count];

    for &value in values {
        let index = (((value - min) / width) as usize).min(bin_count - 1);
        counts[index] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + i as f64 * width,
            upper: min + (i + 1) as f64 * width,
            count,
        })
        .collect();

    Histogram { bins }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Candle, Interval};
    use chrono::NaiveDate;

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let mut series = PriceSeries::new("TEST".to_string(), Interval::Daily);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for (i, &close) in closes.iter().enumerate() {
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
    fn test_moving_average_alignment() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ma = moving_average(&values, 3);

        assert_eq!(ma.len(), values.len());
        assert_eq!(ma[0], None);
        assert_eq!(ma[1], None);
        assert_eq!(ma[2], Some(2.0));
        assert_eq!(ma[3], Some(3.0));
        assert_eq!(ma[4], Some(4.0));
    }

    #[test]
    fn test_moving_average_window_larger_than_input() {
        let values = [1.0, 2.0];
        let ma = moving_average(&values, 5);
        assert_eq!(ma, vec![None, None]);
    }

    #[test]
    fn test_moving_average_window_one_is_identity() {
        let values = [3.0, 1.0, 4.0];
        let ma = moving_average(&values, 1);
        assert_eq!(ma, vec![Some(3.0), Some(1.0), Some(4.0)]);
    }

    #[test]
    fn test_returns_length_invariant() {
        for n in 0..6 {
            let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
            let series = series_from_closes(&closes);
            let returns = daily_returns(&series);
            assert_eq!(returns.len(), series.len().saturating_sub(1));
        }
    }

    #[test]
    fn test_returns_values() {
        let series = series_from_closes(&[100.0, 110.0, 99.0]);
        let returns = daily_returns(&series);

        assert_eq!(returns.len(), 2);
        assert!((returns.points[0].pct_change - 10.0).abs() < 1e-9);
        assert!((returns.points[1].pct_change - -10.0).abs() < 1e-9);
    }

    #[test]
    fn test_returns_zero_previous_close() {
        let series = series_from_closes(&[0.0, 10.0]);
        let returns = daily_returns(&series);
        assert_eq!(returns.len(), 1);
        assert_eq!(returns.points[0].pct_change, 0.0);
    }

    #[test]
    fn test_summary_stats_mean_min_max() {
        let stats = summary_stats(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((stats.mean - 2.5).abs() < 1e-9);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn test_summary_stats_sample_std() {
        // Sample std of [2, 4, 4, 4, 5, 5, 7, 9] with n-1 denominator
        let stats = summary_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((stats.std_dev - 2.138089935).abs() < 1e-6);
    }

    #[test]
    fn test_summary_stats_edge_cases() {
        assert!(summary_stats(&[]).is_none());

        let single = summary_stats(&[3.0]).unwrap();
        assert_eq!(single.mean, 3.0);
        assert_eq!(single.std_dev, 0.0);
        assert_eq!(single.min, 3.0);
        assert_eq!(single.max, 3.0);
    }

    #[test]
    fn test_summary_stats_idempotent() {
        let values = [0.3, -1.2, 2.5, 0.0, -0.7];
        let first = summary_stats(&values).unwrap();
        let second = summary_stats(&values).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_annualized_volatility() {
        let vol = annualized_volatility(2.0);
        assert!((vol - 2.0 * 252.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_histogram_counts_sum_to_input_len() {
        let values: Vec<f64> = (0..100).map(|i| (i as f64) * 0.13 - 5.0).collect();
        let hist = histogram(&values, HISTOGRAM_BINS);

        assert_eq!(hist.bins.len(), HISTOGRAM_BINS);
        assert_eq!(hist.total_count(), values.len());
    }

    #[test]
    fn test_histogram_max_lands_in_last_bin() {
        let values = [0.0, 0.5, 1.0];
        let hist = histogram(&values, 2);

        assert_eq!(hist.bins.len(), 2);
        assert_eq!(hist.bins[0].count, 2); // 0.0 and 0.5
        assert_eq!(hist.bins[1].count, 1); // 1.0, closed right edge
    }

    #[test]
    fn test_histogram_identical_values() {
        let hist = histogram(&[1.5, 1.5, 1.5], 40);
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].count, 3);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 40).bins.is_empty());
        assert!(histogram(&[1.0], 0).bins.is_empty());
    }
}
