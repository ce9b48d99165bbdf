/*
 *  display/drivers/mock.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock character display for testing without hardware
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::display::error::DisplayError;
use crate::display::traits::CharDisplay;

/// One call made against the mock, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOp {
    Write(String),
    Clear,
    Cursor(bool),
    Blink(bool),
    Backlight(bool),
    Home,
}

/// Mock display driver for testing
///
/// The mock records every operation and exposes the shared state so a test
/// can keep a handle after the driver has been boxed into the controller.
#[derive(Debug, Clone)]
pub struct MockDisplay {
    columns: u8,
    rows: u8,
    state: Arc<Mutex<MockDisplayState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDisplayState {
    /// Every call in order
    pub ops: Vec<MockOp>,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Number of times write_text() succeeded
    pub write_count: usize,

    /// Number of times set_backlight() was called
    pub backlight_calls: usize,

    /// Last backlight state set
    pub backlight: Option<bool>,

    /// Last cursor visibility set
    pub cursor_visible: Option<bool>,

    /// Last blink state set
    pub blink: Option<bool>,

    /// Most recent text written
    pub last_text: Option<String>,

    /// Simulate failures (for error testing)
    pub simulate_write_failure: bool,
}

impl MockDisplay {
    pub fn new(columns: u8, rows: u8) -> Self {
        Self {
            columns,
            rows,
            state: Arc::new(Mutex::new(MockDisplayState::default())),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDisplayState>> {
        Arc::clone(&self.state)
    }

    /// Lock the shared state
    pub fn lock(&self) -> MutexGuard<'_, MockDisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset state counters (useful between test phases)
    pub fn reset_state(&self) {
        *self.lock() = MockDisplayState::default();
    }
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::new(16, 2)
    }
}

impl CharDisplay for MockDisplay {
    fn dimensions(&self) -> (u8, u8) {
        (self.columns, self.rows)
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        let mut state = self.lock();
        if state.simulate_write_failure {
            return Err(DisplayError::WriteFailed("Simulated write failure".to_string()));
        }
        state.ops.push(MockOp::Write(text.to_string()));
        state.write_count += 1;
        state.last_text = Some(text.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.ops.push(MockOp::Clear);
        state.clear_count += 1;
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.ops.push(MockOp::Cursor(visible));
        state.cursor_visible = Some(visible);
        Ok(())
    }

    fn set_blink(&mut self, blink: bool) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.ops.push(MockOp::Blink(blink));
        state.blink = Some(blink);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.ops.push(MockOp::Backlight(on));
        state.backlight_calls += 1;
        state.backlight = Some(on);
        Ok(())
    }

    fn home_cursor(&mut self) -> Result<(), DisplayError> {
        self.lock().ops.push(MockOp::Home);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_operations_in_order() {
        let mut driver = MockDisplay::default();
        let handle = driver.clone();

        driver.clear().unwrap();
        driver.write_text("hello").unwrap();
        driver.home_cursor().unwrap();

        let state = handle.lock();
        assert_eq!(state.ops, vec![MockOp::Clear, MockOp::Write("hello".into()), MockOp::Home]);
        assert_eq!(state.clear_count, 1);
        assert_eq!(state.last_text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_mock_simulated_failure() {
        let mut driver = MockDisplay::default();

        driver.lock().simulate_write_failure = true;
        assert!(driver.write_text("x").is_err());
        assert_eq!(driver.lock().write_count, 0);

        driver.lock().simulate_write_failure = false;
        assert!(driver.write_text("x").is_ok());
    }

    #[test]
    fn test_mock_reset_state() {
        let mut driver = MockDisplay::default();
        driver.set_backlight(true).unwrap();
        driver.reset_state();
        assert_eq!(driver.lock().backlight_calls, 0);
        assert!(driver.lock().ops.is_empty());
    }
}
