/*
 *  input/mock.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scripted input sources for testing without buttons
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

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{EdgeSource, EventSender, SwitchDecoder, SwitchPort};
use crate::display::error::DisplayError;

/// Replays a fixed sequence of switch values, then reads 0 forever
#[derive(Debug, Clone, Default)]
pub struct ScriptedSwitches {
    script: VecDeque<u8>,
    reads: Arc<AtomicUsize>,
}

impl ScriptedSwitches {
    pub fn new(script: impl IntoIterator<Item = u8>) -> Self {
        Self {
            script: script.into_iter().collect(),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared read counter, valid after the port is boxed
    pub fn reads(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.reads)
    }
}

impl SwitchPort for ScriptedSwitches {
    fn read_switches(&mut self) -> Result<u8, DisplayError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.script.pop_front().unwrap_or(0))
    }
}

type Listener = Option<(SwitchDecoder, EventSender)>;

/// Edge source pressed by hand; clones share the listener
#[derive(Debug, Clone, Default)]
pub struct ManualButtons {
    listener: Arc<Mutex<Listener>>,
}

impl ManualButtons {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a falling edge on button `bit`; false when nobody listens
    pub fn press(&self, bit: u8) -> bool {
        let guard = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some((decoder, events)) => events.send(decoder.decode_button(bit)).is_ok(),
            None => false,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

impl EdgeSource for ManualButtons {
    fn listen(&mut self, decoder: SwitchDecoder, events: EventSender) -> Result<(), DisplayError> {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some((decoder, events));
        Ok(())
    }

    fn stop(&mut self) {
        self.listener.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;
    use tokio::sync::mpsc;

    #[test]
    fn test_script_then_zero() {
        let mut port = ScriptedSwitches::new([64, 128]);
        let reads = port.reads();
        assert_eq!(port.read_switches().unwrap(), 64);
        assert_eq!(port.read_switches().unwrap(), 128);
        assert_eq!(port.read_switches().unwrap(), 0);
        assert_eq!(reads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_manual_buttons_deliver_until_stopped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let buttons = ManualButtons::new();
        let mut source = buttons.clone();

        assert!(!buttons.press(6));
        source.listen(SwitchDecoder::default(), tx).unwrap();
        assert!(buttons.press(6));
        assert!(buttons.press(0));
        assert_eq!(rx.try_recv().unwrap(), InputEvent::Left);
        assert_eq!(rx.try_recv().unwrap(), InputEvent::Unhandled(1));

        source.stop();
        assert!(!buttons.is_listening());
        assert!(!buttons.press(7));
    }
}
