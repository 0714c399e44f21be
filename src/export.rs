// ============================================================================
// Export: CSV download of the raw data table
// ============================================================================
// The table view and the CSV writer share `csv_record`, so the exported
// file reproduces the displayed table field for field.
// ============================================================================

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::models::{Candle, PriceSeries};

/// Column headers, matching the provider's conventional naming.
pub const CSV_HEADERS: [&str; 7] = [
    "Date",
    "Open",
    "High",
    "Low",
    "Close",
    "Adj Close",
    "Volume",
];

/// Formats one candle as a displayed/exported row.
///
/// Missing adjusted closes export as an empty field.
pub fn csv_record(candle: &Candle) -> [String; 7] {
    [
        candle.date.format("%Y-%m-%d").to_string(),
        format!("{:.2}", candle.open),
        format!("{:.2}", candle.high),
        format!("{:.2}", candle.low),
        format!("{:.2}", candle.close),
        candle
            .adj_close
            .map(|v| format!("{:.2}", v))
            .unwrap_or_default(),
        candle.volume.to_string(),
    ]
}

/// Writes the series as CSV to any writer.
pub fn write_csv<W: Write>(series: &PriceSeries, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    out.write_record(CSV_HEADERS)
        .context("Failed to write CSV header")?;

    for candle in &series.candles {
        out.write_record(csv_record(candle))
            .context("Failed to write CSV row")?;
    }

    out.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Export file name for a symbol, e.g. `AAPL_data.csv`.
pub fn export_file_name(symbol: &str) -> String {
    format!("{}_data.csv", symbol.to_uppercase())
}

/// Writes `{SYMBOL}_data.csv` into `dir` and returns the full path.
pub fn export_series(series: &PriceSeries, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(export_file_name(&series.symbol));

    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(series, file)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), rows = series.len(), "Exported series to CSV");
    Ok(path)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Interval, PriceSeries};
    use chrono::NaiveDate;

    fn sample_series() -> PriceSeries {
        let mut series = PriceSeries::new("AAPL".to_string(), Interval::Daily);
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        for i in 0..5i64 {
            let base = 100.0 + i as f64;
            series.push(Candle::new(
                start + chrono::Duration::days(i),
                base,
                base + 2.0,
                base - 2.0,
                base + 1.0,
                Some(base + 0.5),
                1_000_000 + i as u64,
            ));
        }
        series
    }

    #[test]
    fn test_csv_round_trip_reproduces_table() {
        let series = sample_series();

        let mut buffer = Vec::new();
        write_csv(&series, &mut buffer).unwrap();

        let mut reader = csv::Reader::from_reader(buffer.as_slice());

        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(|h| h.to_string())
            .collect();
        assert_eq!(headers, CSV_HEADERS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), series.len());

        for (row, candle) in rows.iter().zip(&series.candles) {
            let expected = csv_record(candle);
            let actual: Vec<&str> = row.iter().collect();
            assert_eq!(actual, expected.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_missing_adj_close_exports_empty_field() {
        let mut series = PriceSeries::new("TEST".to_string(), Interval::Daily);
        series.push(Candle::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            10.0,
            11.0,
            9.0,
            10.5,
            None,
            42,
        ));

        let record = csv_record(&series.candles[0]);
        assert_eq!(record[5], "");
        assert_eq!(record[6], "42");
    }

    #[test]
    fn test_export_series_writes_named_file() {
        let series = sample_series();
        let dir = tempfile::tempdir().unwrap();

        let path = export_series(&series, dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "AAPL_data.csv");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Date,Open,High,Low,Close,Adj Close,Volume"));
        // Header plus one line per candle
        assert_eq!(content.lines().count(), series.len() + 1);
    }

    #[test]
    fn test_export_file_name_uppercases() {
        assert_eq!(export_file_name("msft"), "MSFT_data.csv");
    }
}
