// ============================================================================
// Event handling
// ============================================================================
// Polls the terminal for key events; when nothing arrives within the
// poll timeout a Tick is emitted so the loop keeps rendering.
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Application events.
#[derive(Debug, Clone)]
pub enum Event {
    /// Key pressed
    Key(KeyEvent),

    /// Regular tick (no input within the poll window)
    Tick,
}

/// Blocking event reader with a tick timeout.
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    /// Reads the next event, waiting at most 250ms.
    pub fn next(&self) -> Result<Event> {
        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                CrosstermEvent::Key(key) => {
                    // Some platforms deliver Press and Release; only
                    // Press counts
                    if key.kind == KeyEventKind::Press {
                        Ok(Event::Key(key))
                    } else {
                        Ok(Event::Tick)
                    }
                }
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Key predicates
// ============================================================================

fn is_char(event: &Event, options: &[char]) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char(c) if options.contains(&c))
    } else {
        false
    }
}

/// 'q': quit (two-step confirmation).
pub fn is_quit_event(event: &Event) -> bool {
    is_char(event, &['q', 'Q'])
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Esc)
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Enter)
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Backspace)
}

/// Tab: next dashboard tab.
pub fn is_next_tab_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Tab)
}

/// Shift-Tab: previous dashboard tab.
pub fn is_previous_tab_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::BackTab)
}

/// 't': edit the ticker symbol.
pub fn is_ticker_event(event: &Event) -> bool {
    is_char(event, &['t', 'T'])
}

/// 's': edit the start date.
pub fn is_start_date_event(event: &Event) -> bool {
    is_char(event, &['s', 'S'])
}

/// 'e': edit the end date.
pub fn is_end_date_event(event: &Event) -> bool {
    is_char(event, &['e', 'E'])
}

/// 'f': cycle the bar frequency (daily / weekly / monthly).
pub fn is_interval_event(event: &Event) -> bool {
    is_char(event, &['f', 'F'])
}

/// 'p': cycle the charted price field.
pub fn is_price_field_event(event: &Event) -> bool {
    is_char(event, &['p', 'P'])
}

/// '[' / ']': shrink / grow the short moving-average window.
pub fn is_short_window_down_event(event: &Event) -> bool {
    is_char(event, &['['])
}

pub fn is_short_window_up_event(event: &Event) -> bool {
    is_char(event, &[']'])
}

/// '{' / '}': shrink / grow the long moving-average window.
pub fn is_long_window_down_event(event: &Event) -> bool {
    is_char(event, &['{'])
}

pub fn is_long_window_up_event(event: &Event) -> bool {
    is_char(event, &['}'])
}

/// 'x': export the raw table as CSV.
pub fn is_export_event(event: &Event) -> bool {
    is_char(event, &['x', 'X'])
}

/// 'r': refetch the current query.
pub fn is_refresh_event(event: &Event) -> bool {
    is_char(event, &['r', 'R'])
}

/// Digit keys jump straight to a tab.
pub fn get_digit_from_event(event: &Event) -> Option<u32> {
    if let Event::Key(key) = event {
        if let KeyCode::Char(c) = key.code {
            return c.to_digit(10);
        }
    }
    None
}

/// Characters accepted by the input line: ticker symbols and ISO dates.
pub fn is_input_char_event(event: &Event) -> bool {
    if let Event::Key(key) = event {
        matches!(key.code, KeyCode::Char(c) if c.is_alphanumeric() || c == '-' || c == '.' || c == '^' || c == '=')
    } else {
        false
    }
}

pub fn get_char_from_event(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if let KeyCode::Char(c) = key.code {
            return Some(c);
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key('q')));
        assert!(is_quit_event(&key('Q')));
        assert!(!is_quit_event(&key('a')));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_window_keys() {
        assert!(is_short_window_down_event(&key('[')));
        assert!(is_short_window_up_event(&key(']')));
        assert!(is_long_window_down_event(&key('{')));
        assert!(is_long_window_up_event(&key('}')));
    }

    #[test]
    fn test_input_chars_accept_ticker_and_date() {
        assert!(is_input_char_event(&key('A')));
        assert!(is_input_char_event(&key('3')));
        assert!(is_input_char_event(&key('-')));
        assert!(is_input_char_event(&key('.')));
        assert!(is_input_char_event(&key('^')));
        assert!(!is_input_char_event(&key(' ')));
    }

    #[test]
    fn test_get_digit_from_event() {
        assert_eq!(get_digit_from_event(&key('2')), Some(2));
        assert_eq!(get_digit_from_event(&key('x')), None);
        assert_eq!(get_digit_from_event(&Event::Tick), None);
    }
}
