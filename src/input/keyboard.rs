/*
 *  input/keyboard.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Terminal keys standing in for buttons when running emulated
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

use log::{debug, info, warn};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use super::{EdgeSource, EventSender, SwitchDecoder, SwitchPort};
use crate::display::error::DisplayError;

/// Keyboard controls:
///   a, h, left    previous page (left button)
///   d, l, right   next page (right button)
///   1 .. 8        press button 1 .. 8 (bit 0 .. 7)
pub fn parse_key(line: &str, decoder_bits: (u8, u8)) -> Option<u8> {
    let (left_bit, right_bit) = decoder_bits;
    match line.trim().to_ascii_lowercase().as_str() {
        "a" | "h" | "left" => 1u8.checked_shl(left_bit as u32),
        "d" | "l" | "right" => 1u8.checked_shl(right_bit as u32),
        other => match other.parse::<u8>() {
            Ok(n @ 1..=8) => Some(1 << (n - 1)),
            _ => None,
        },
    }
}

type Listener = Option<(SwitchDecoder, EventSender)>;

/// Reads one command per line from stdin on a background thread.
///
/// As a [`SwitchPort`] a key press is latched until the next poll; as an
/// [`EdgeSource`] it is forwarded straight away.
pub struct KeyboardInput {
    bits: (u8, u8),
    latched: Arc<AtomicU8>,
    listener: Arc<Mutex<Listener>>,
    stopped: Arc<AtomicBool>,
    started: bool,
}

impl KeyboardInput {
    pub fn new(left_bit: u8, right_bit: u8) -> Self {
        Self {
            bits: (left_bit, right_bit),
            latched: Arc::new(AtomicU8::new(0)),
            listener: Arc::new(Mutex::new(None)),
            stopped: Arc::new(AtomicBool::new(false)),
            started: false,
        }
    }

    fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        info!("Keyboard input: a/d or left/right to turn pages, 1-8 to press a button");

        let bits = self.bits;
        let latched = Arc::clone(&self.latched);
        let listener = Arc::clone(&self.listener);
        let stopped = Arc::clone(&self.stopped);

        // blocking stdin read; detached, it dies with the process
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                if stopped.load(Ordering::SeqCst) {
                    break;
                }
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("stdin read failed: {}", e);
                        break;
                    }
                };
                let Some(value) = parse_key(&line, bits) else {
                    debug!("ignoring key input {:?}", line);
                    continue;
                };
                let guard = listener.lock().unwrap_or_else(PoisonError::into_inner);
                match guard.as_ref() {
                    Some((decoder, events)) => {
                        if events.send(decoder.decode(value)).is_err() {
                            break;
                        }
                    }
                    None => latched.store(value, Ordering::SeqCst),
                }
            }
            debug!("keyboard reader finished");
        });
    }
}

impl SwitchPort for KeyboardInput {
    fn read_switches(&mut self) -> Result<u8, DisplayError> {
        self.start();
        // a press reads once, then the switch is released
        Ok(self.latched.swap(0, Ordering::SeqCst))
    }
}

impl EdgeSource for KeyboardInput {
    fn listen(&mut self, decoder: SwitchDecoder, events: EventSender) -> Result<(), DisplayError> {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some((decoder, events));
        self.start();
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.listener.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        let bits = (6, 7);
        assert_eq!(parse_key("a", bits), Some(64));
        assert_eq!(parse_key(" Right \n", bits), Some(128));
        assert_eq!(parse_key("1", bits), Some(1));
        assert_eq!(parse_key("8", bits), Some(128));
        assert_eq!(parse_key("9", bits), None);
        assert_eq!(parse_key("0", bits), None);
        assert_eq!(parse_key("", bits), None);
    }

    #[test]
    fn test_stop_detaches_listener() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mut keyboard = KeyboardInput::new(6, 7);
        *keyboard.listener.lock().unwrap() = Some((SwitchDecoder::default(), tx));
        keyboard.stop();
        assert!(keyboard.listener.lock().unwrap().is_none());
        assert!(keyboard.stopped.load(Ordering::SeqCst));
    }
}
