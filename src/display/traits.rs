/*
 *  display/traits.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Character display abstraction
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

use crate::display::error::DisplayError;

/// Minimal hardware abstraction - every character display must implement this trait
///
/// The page controller is the only writer; it owns the boxed driver and calls
/// it from the single serialized draw path.
pub trait CharDisplay: Send {
    /// Display geometry as (columns, rows)
    fn dimensions(&self) -> (u8, u8);

    /// Write text starting at the top-left; `\n` moves to the next row
    fn write_text(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Clear the display and return the cursor home
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Show or hide the underline cursor
    fn set_cursor_visible(&mut self, visible: bool) -> Result<(), DisplayError>;

    /// Enable or disable the blinking block cursor
    fn set_blink(&mut self, blink: bool) -> Result<(), DisplayError>;

    /// Switch the backlight on or off
    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Move the cursor back to row 0, column 0
    fn home_cursor(&mut self) -> Result<(), DisplayError>;
}

/// Type alias for boxed display trait objects
pub type BoxedDisplay = Box<dyn CharDisplay>;
