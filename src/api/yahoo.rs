// ============================================================================
// API client: Yahoo Finance
// ============================================================================
// Fetches historical OHLCV bars (plus adjusted close) for one query from
// the v8 chart endpoint. The serde structs below mirror the JSON shape
// exactly so deserialization is automatic.
// ============================================================================

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::models::{Candle, PriceSeries, Query};

// ============================================================================
// Response mirror structs
// ============================================================================

#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

/// Provider-reported failure, e.g. an unknown ticker.
#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteBlock>,
    adjclose: Option<Vec<AdjCloseBlock>>,
}

/// OHLCV arrays; individual entries are null for bars Yahoo has no data for.
#[derive(Debug, Deserialize)]
struct QuoteBlock {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    adjclose: Option<Vec<Option<f64>>>,
}

// ============================================================================
// Public API
// ============================================================================

/// Fetches the price series for a query from Yahoo Finance.
///
/// Fails on transport errors, non-2xx statuses, provider-reported errors
/// (unknown ticker) and empty result sets. All failures carry a message
/// fit for the UI error banner.
#[instrument(skip(query), fields(symbol = %query.symbol, interval = ?query.interval))]
pub async fn fetch_price_series(query: &Query) -> Result<PriceSeries> {
    let url = build_chart_url(query);
    debug!(url = %url, "Built Yahoo Finance chart URL");

    // Yahoo rejects requests without a browser-looking User-Agent
    let client = reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()
        .context("Failed to build HTTP client")?;

    debug!("Sending request to Yahoo Finance");
    let response = client
        .get(&url)
        .send()
        .await
        .context("Request to Yahoo Finance failed")?;

    let status = response.status();
    debug!(status = %status, "Received response");

    if !status.is_success() {
        error!(status = %status, "Yahoo Finance returned error status");
        anyhow::bail!(
            "Could not download data for {} (HTTP {}). Check the ticker symbol.",
            query.symbol,
            status
        );
    }

    let yahoo_response: YahooResponse = response
        .json()
        .await
        .context("Failed to parse Yahoo Finance response")?;

    let series = parse_chart_response(yahoo_response, query)?;

    info!(bars = series.len(), "Fetched price series");
    Ok(series)
}

/// Builds the chart URL for a query.
///
/// `period2` is the day after the requested end date so the range is
/// inclusive on both sides.
fn build_chart_url(query: &Query) -> String {
    let period1 = query.start.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp()).unwrap_or(0);
    let period2 = (query.end + chrono::Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0);

    format!(
        "https://query1.finance.yahoo.com/v8/finance/chart/{}?interval={}&period1={}&period2={}&events=div%7Csplit",
        query.symbol,
        query.interval.to_yahoo_string(),
        period1,
        period2
    )
}

/// Converts the chart response into a PriceSeries.
///
/// Bars with any missing OHLC value are skipped and counted; the series
/// itself drops out-of-order or duplicate dates on push.
fn parse_chart_response(response: YahooResponse, query: &Query) -> Result<PriceSeries> {
    if let Some(err) = response.chart.error {
        let description = err
            .description
            .or(err.code)
            .unwrap_or_else(|| "unknown error".to_string());
        error!(error = %description, "Yahoo Finance reported an error");
        anyhow::bail!("Yahoo Finance: {}", description);
    }

    let result = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .with_context(|| format!("No data returned for {}", query.symbol))?;

    let timestamps = result.timestamp.unwrap_or_default();
    debug!(timestamps = timestamps.len(), "Received timestamps");

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .context("No OHLC arrays in the response")?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let adj_closes = result
        .indicators
        .adjclose
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|block| block.adjclose)
        .unwrap_or_default();

    let mut series = PriceSeries::new(query.symbol.clone(), query.interval);
    let mut skipped = 0usize;

    for (i, &timestamp) in timestamps.iter().enumerate() {
        let open = match opens.get(i).and_then(|&v| v) {
            Some(v) => v,
            None => {
                skipped += 1;
                continue;
            }
        };
        let high = match highs.get(i).and_then(|&v| v) {
            Some(v) => v,
            None => {
                skipped += 1;
                continue;
            }
        };
        let low = match lows.get(i).and_then(|&v| v) {
            Some(v) => v,
            None => {
                skipped += 1;
                continue;
            }
        };
        let close = match closes.get(i).and_then(|&v| v) {
            Some(v) => v,
            None => {
                skipped += 1;
                continue;
            }
        };
        let volume = volumes.get(i).and_then(|&v| v).unwrap_or(0);
        let adj_close = adj_closes.get(i).and_then(|&v| v);

        let date = DateTime::from_timestamp(timestamp, 0)
            .context("Invalid timestamp in response")?
            .date_naive();

        if !series.push(Candle::new(date, open, high, low, close, adj_close, volume)) {
            skipped += 1;
        }
    }

    if skipped > 0 {
        warn!(
            skipped,
            total = timestamps.len(),
            "Skipped bars with missing or out-of-order data"
        );
    }

    if series.is_empty() {
        error!("No usable bars in response");
        anyhow::bail!(
            "No data returned for {} in the selected range.",
            query.symbol
        );
    }

    Ok(series)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Interval;
    use chrono::NaiveDate;

    fn query() -> Query {
        Query::new(
            "AAPL".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            Interval::Daily,
        )
    }

    #[test]
    fn test_build_chart_url() {
        let url = build_chart_url(&query());

        assert!(url.contains("/v8/finance/chart/AAPL"));
        assert!(url.contains("interval=1d"));
        // 2024-01-01T00:00:00Z and 2024-02-01T00:00:00Z (end inclusive)
        assert!(url.contains("period1=1704067200"));
        assert!(url.contains("period2=1706745600"));
    }

    #[test]
    fn test_parse_chart_response() {
        // Three timestamps; the middle bar has a null close and is skipped
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000, 1704326400],
                    "indicators": {
                        "quote": [{
                            "open":   [100.0, 101.0, 102.0],
                            "high":   [103.0, 104.0, 105.0],
                            "low":    [ 99.0, 100.0, 101.0],
                            "close":  [102.0, null,  104.0],
                            "volume": [1000,  2000,  3000]
                        }],
                        "adjclose": [{
                            "adjclose": [101.5, null, 103.5]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let response: YahooResponse = serde_json::from_str(json).unwrap();
        let series = parse_chart_response(response, &query()).unwrap();

        assert_eq!(series.symbol, "AAPL");
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.candles[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
        assert_eq!(series.candles[0].adj_close, Some(101.5));
        assert_eq!(series.candles[1].close, 104.0);
        assert_eq!(series.candles[1].volume, 3000);
    }

    #[test]
    fn test_parse_provider_error() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {
                    "code": "Not Found",
                    "description": "No data found, symbol may be delisted"
                }
            }
        }"#;

        let response: YahooResponse = serde_json::from_str(json).unwrap();
        let err = parse_chart_response(response, &query()).unwrap_err();
        assert!(err.to_string().contains("symbol may be delisted"));
    }

    #[test]
    fn test_parse_empty_result() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [],
                    "indicators": { "quote": [{}] }
                }],
                "error": null
            }
        }"#;

        let response: YahooResponse = serde_json::from_str(json).unwrap();
        let err = parse_chart_response(response, &query()).unwrap_err();
        assert!(err.to_string().contains("No data returned"));
    }

    // Live API call; only asserts basic shape so network flakiness does
    // not fail the suite.
    #[tokio::test]
    async fn test_fetch_price_series_live() {
        let result = fetch_price_series(&query()).await;

        match result {
            Ok(series) => {
                assert_eq!(series.symbol, "AAPL");
                assert!(!series.is_empty());
            }
            Err(e) => {
                println!("skipped (no network?): {}", e);
            }
        }
    }
}
