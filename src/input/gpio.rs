/*
 *  input/gpio.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Push buttons on the Raspberry Pi GPIO header
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
use rppal::gpio::{Gpio, InputPin, Trigger};

use super::{EdgeSource, EventSender, SwitchDecoder, SwitchPort};
use crate::display::error::DisplayError;

/// Up to eight buttons wired to ground, read through the internal pull-ups.
///
/// `pins[i]` is bit *i* of the composite switch value, so a pressed (low)
/// button reads as a set bit.
pub struct GpioButtons {
    pins: Vec<InputPin>,
}

impl GpioButtons {
    pub fn new(bcm_pins: &[u8]) -> Result<Self, DisplayError> {
        if bcm_pins.is_empty() || bcm_pins.len() > 8 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "expected 1..=8 button pins, got {}",
                bcm_pins.len()
            )));
        }
        let gpio = Gpio::new()?;
        let mut pins = Vec::with_capacity(bcm_pins.len());
        for &bcm in bcm_pins {
            pins.push(gpio.get(bcm)?.into_input_pullup());
        }
        info!("Buttons on BCM pins {:?}", bcm_pins);
        Ok(Self { pins })
    }
}

impl SwitchPort for GpioButtons {
    fn read_switches(&mut self) -> Result<u8, DisplayError> {
        let value = self
            .pins
            .iter()
            .enumerate()
            .filter(|(_, pin)| pin.is_low())
            .fold(0u8, |acc, (bit, _)| acc | (1 << bit));
        Ok(value)
    }
}

impl EdgeSource for GpioButtons {
    fn listen(&mut self, decoder: SwitchDecoder, events: EventSender) -> Result<(), DisplayError> {
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            let events = events.clone();
            let bit = bit as u8;
            // runs on rppal's interrupt thread, not on the runtime
            pin.set_async_interrupt(Trigger::FallingEdge, move |_level| {
                let event = decoder.decode_button(bit);
                debug!("button {} falling edge -> {:?}", bit, event);
                if events.send(event).is_err() {
                    debug!("button {} pressed after shutdown", bit);
                }
            })?;
        }
        Ok(())
    }

    fn stop(&mut self) {
        for pin in self.pins.iter_mut() {
            if let Err(e) = pin.clear_async_interrupt() {
                warn!("Failed to detach button interrupt on BCM {}: {}", pin.pin(), e);
            }
        }
    }
}

impl Drop for GpioButtons {
    fn drop(&mut self) {
        self.stop();
    }
}
