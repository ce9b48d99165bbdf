/*
 *  input/mod.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Button input - switch decoding and the two input source shapes
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

use tokio::sync::mpsc::UnboundedSender;

use crate::display::error::DisplayError;

#[cfg(feature = "gpio")]
pub mod gpio;
pub mod keyboard;
pub mod mock;

/// Everything the page controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Previous page
    Left,
    /// Next page
    Right,
    /// Some other button combination, reserved for page specific actions
    Unhandled(u8),
    /// No button held while polling: refresh the visible page
    Idle,
    /// Periodic timer: ambient refresh and redraw
    Tick,
}

/// Channel end that input sources and the timer push into
pub type EventSender = UnboundedSender<InputEvent>;

/// Maps a composite switch value onto an [`InputEvent`].
///
/// Bit *i* of the value is button *i*. Only an exact match of the left or
/// right bit navigates; chords fall through to `Unhandled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchDecoder {
    left: u8,
    right: u8,
}

pub const DEFAULT_LEFT_BIT: u8 = 6;
pub const DEFAULT_RIGHT_BIT: u8 = 7;

impl SwitchDecoder {
    pub fn new(left_bit: u8, right_bit: u8) -> Self {
        Self {
            left: 1u8.checked_shl(left_bit as u32).unwrap_or(0),
            right: 1u8.checked_shl(right_bit as u32).unwrap_or(0),
        }
    }

    pub fn decode(&self, value: u8) -> InputEvent {
        match value {
            0 => InputEvent::Idle,
            v if v == self.left => InputEvent::Left,
            v if v == self.right => InputEvent::Right,
            v => InputEvent::Unhandled(v),
        }
    }

    /// Event for a falling edge on the single button `bit`
    pub fn decode_button(&self, bit: u8) -> InputEvent {
        match 1u8.checked_shl(bit as u32) {
            Some(value) => self.decode(value),
            None => InputEvent::Idle,
        }
    }
}

impl Default for SwitchDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_LEFT_BIT, DEFAULT_RIGHT_BIT)
    }
}

/// Polled input: one composite switch register
pub trait SwitchPort: Send {
    fn read_switches(&mut self) -> Result<u8, DisplayError>;
}

/// Event driven input: per-button falling-edge callbacks
pub trait EdgeSource: Send {
    /// Start delivering decoded button presses into `events`
    fn listen(&mut self, decoder: SwitchDecoder, events: EventSender) -> Result<(), DisplayError>;

    /// Detach every callback; nothing is delivered after this returns
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_reference_values() {
        let decoder = SwitchDecoder::default();
        assert_eq!(decoder.decode(64), InputEvent::Left);
        assert_eq!(decoder.decode(128), InputEvent::Right);
        assert_eq!(decoder.decode(0), InputEvent::Idle);
        assert_eq!(decoder.decode(1), InputEvent::Unhandled(1));
        // both navigation buttons at once is a chord, not a page turn
        assert_eq!(decoder.decode(192), InputEvent::Unhandled(192));
    }

    #[test]
    fn test_decode_button_bits() {
        let decoder = SwitchDecoder::new(0, 1);
        assert_eq!(decoder.decode_button(0), InputEvent::Left);
        assert_eq!(decoder.decode_button(1), InputEvent::Right);
        assert_eq!(decoder.decode_button(4), InputEvent::Unhandled(16));
        assert_eq!(decoder.decode_button(9), InputEvent::Idle);
    }
}
