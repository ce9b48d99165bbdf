/*
 *  display/drivers/console.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Emulated character display that renders into the log
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

use log::{debug, info};

use crate::display::error::DisplayError;
use crate::display::traits::CharDisplay;

/// Console display for development hosts without the LCD attached
///
/// Keeps a character grid the same shape as the real panel and logs it when
/// the visible text changes. The tick and idle redraws repeat the same frame
/// and stay quiet.
#[derive(Debug, Clone)]
pub struct ConsoleDisplay {
    columns: u8,
    rows: Vec<String>,
    shown: Vec<String>,
    frames: usize,
    backlight: bool,
}

impl ConsoleDisplay {
    pub fn new(columns: u8, rows: u8) -> Self {
        Self {
            columns,
            rows: vec![blank(columns); rows.max(1) as usize],
            shown: Vec::new(),
            frames: 0,
            backlight: true,
        }
    }

    /// Current contents, one string per row
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    /// Number of distinct frames logged so far
    pub fn frames(&self) -> usize {
        self.frames
    }
}

fn blank(columns: u8) -> String {
    " ".repeat(columns as usize)
}

impl CharDisplay for ConsoleDisplay {
    fn dimensions(&self) -> (u8, u8) {
        (self.columns, self.rows.len() as u8)
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        let columns = self.columns as usize;
        for (row, line) in self.rows.iter_mut().zip(text.split('\n')) {
            let mut padded: String = line.chars().take(columns).collect();
            let pad = columns.saturating_sub(padded.chars().count());
            padded.push_str(&" ".repeat(pad));
            *row = padded;
        }
        if self.rows == self.shown {
            return Ok(());
        }
        let lamp = if self.backlight { "*" } else { " " };
        for row in &self.rows {
            info!("lcd{}|{}|", lamp, row);
        }
        self.shown.clone_from(&self.rows);
        self.frames += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        debug!("lcd clear");
        for row in self.rows.iter_mut() {
            *row = blank(self.columns);
        }
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<(), DisplayError> {
        debug!("lcd cursor {}", if visible { "on" } else { "off" });
        Ok(())
    }

    fn set_blink(&mut self, blink: bool) -> Result<(), DisplayError> {
        debug!("lcd blink {}", if blink { "on" } else { "off" });
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        if on != self.backlight {
            info!("lcd backlight {}", if on { "on" } else { "off" });
        }
        self.backlight = on;
        Ok(())
    }

    fn home_cursor(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_overwrites_and_pads_rows() {
        let mut lcd = ConsoleDisplay::new(8, 2);
        lcd.write_text("12:00:00\nlong line here").unwrap();
        assert_eq!(lcd.rows(), ["12:00:00", "long lin"]);

        lcd.write_text("x").unwrap();
        assert_eq!(lcd.rows(), ["x       ", "long lin"]);

        lcd.clear().unwrap();
        assert_eq!(lcd.rows(), ["        ", "        "]);
    }

    #[test]
    fn test_console_logs_only_changed_frames() {
        let mut lcd = ConsoleDisplay::new(16, 2);
        lcd.write_text("Stats here").unwrap();
        assert_eq!(lcd.frames(), 1);

        // idle redraws of the same page
        for _ in 0..20 {
            lcd.write_text("Stats here").unwrap();
        }
        assert_eq!(lcd.frames(), 1);

        // clear then the same text again is not a new frame either
        lcd.clear().unwrap();
        lcd.write_text("Stats here").unwrap();
        assert_eq!(lcd.frames(), 1);

        lcd.write_text("IP: 10.0.0.1\n3s ago.").unwrap();
        assert_eq!(lcd.frames(), 2);
    }

    #[test]
    fn test_console_backlight() {
        let mut lcd = ConsoleDisplay::new(16, 2);
        assert!(lcd.backlight());
        lcd.set_backlight(false).unwrap();
        assert!(!lcd.backlight());
    }
}
