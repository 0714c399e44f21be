// ============================================================================
// Module: api
// ============================================================================
// Market-data provider clients.
// ============================================================================

pub mod yahoo;

pub use yahoo::fetch_price_series;
