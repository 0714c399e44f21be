// ============================================================================
// Module: ui
// ============================================================================
// Everything drawn on the terminal.
// ============================================================================

pub mod dashboard;   // Layout, header, tab bar, footer
pub mod events;      // Keyboard events and predicates
pub mod price_tab;   // Price chart with moving averages
pub mod returns_tab; // Returns chart, stats, histogram
pub mod table_tab;   // Raw data table

pub use dashboard::render;
pub use events::{Event, EventHandler};
