/*
 *  display/drivers/lcm1602.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  HD44780 character LCD behind a PCF8574 I2C backpack (LCM1602 and kin)
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

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use linux_embedded_hal::{Delay, I2cdev};
use log::{debug, info};

use crate::display::error::DisplayError;
use crate::display::traits::CharDisplay;

// PCF8574 pin mapping: P0=RS P1=RW P2=EN P3=backlight P4..P7=D4..D7
const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

// HD44780 instruction set
const CMD_CLEAR: u8 = 0x01;
const CMD_HOME: u8 = 0x02;
const CMD_ENTRY_MODE: u8 = 0x04;
const CMD_DISPLAY_CONTROL: u8 = 0x08;
const CMD_FUNCTION_SET: u8 = 0x20;
const CMD_SET_DDRAM: u8 = 0x80;

const ENTRY_INCREMENT: u8 = 0x02;
const DISPLAY_ON: u8 = 0x04;
const CURSOR_ON: u8 = 0x02;
const BLINK_ON: u8 = 0x01;
const FUNCTION_8BIT: u8 = 0x10;
const FUNCTION_2LINE: u8 = 0x08;

/// Widest panel the controller addresses; each DDRAM line holds 40 cells
pub const MAX_COLUMNS: u8 = 40;
pub const MAX_ROWS: u8 = 4;

/// DDRAM start address of `row`.
///
/// Four line panels are two long lines folded, so rows 2 and 3 continue rows
/// 0 and 1 one panel width further on (0x14/0x54 on a 20x4, 0x10/0x50 on a
/// 16x4).
fn row_offset(row: usize, columns: u8) -> u8 {
    match row {
        0 => 0x00,
        1 => 0x40,
        2 => columns,
        _ => 0x40 + columns,
    }
}

/// LCM1602-style display driver
///
/// Generic over the embedded-hal 1.0 I2C bus and delay so the same code runs
/// against `/dev/i2c-*` on the Pi and against a recording bus in tests.
pub struct Lcm1602Display<I, D> {
    i2c: I,
    delay: D,
    address: u8,
    columns: u8,
    rows: u8,
    backlight: bool,
    cursor: bool,
    blink: bool,
}

impl Lcm1602Display<I2cdev, Delay> {
    /// Open the Linux I2C bus and initialise the panel
    pub fn open(bus: &str, address: u8, columns: u8, rows: u8) -> Result<Self, DisplayError> {
        info!("Opening LCM1602 on {} at 0x{:02X} ({}x{})", bus, address, columns, rows);
        let i2c = I2cdev::new(bus)
            .map_err(|e| DisplayError::InitializationFailed(format!("{}: {:?}", bus, e)))?;
        let mut display = Self::new(i2c, Delay, address, columns, rows);
        display.init()?;
        Ok(display)
    }
}

impl<I, D> Lcm1602Display<I, D>
where
    I: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I, delay: D, address: u8, columns: u8, rows: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            columns: columns.clamp(1, MAX_COLUMNS),
            rows: rows.clamp(1, MAX_ROWS),
            backlight: true,
            cursor: false,
            blink: false,
        }
    }

    /// Power-on initialisation into 4-bit mode.
    ///
    /// Three 8-bit function sets resynchronise the controller whatever state
    /// it was left in, then the fourth switches to 4-bit transfers.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(50);

        let mode_8bit = CMD_FUNCTION_SET | FUNCTION_8BIT;
        self.write_nibble(mode_8bit)?;
        self.delay.delay_ms(5);
        self.write_nibble(mode_8bit)?;
        self.delay.delay_ms(5);
        self.write_nibble(mode_8bit)?;
        self.delay.delay_ms(1);
        self.write_nibble(CMD_FUNCTION_SET)?;

        let lines = if self.rows > 1 { FUNCTION_2LINE } else { 0x00 };
        self.command(CMD_FUNCTION_SET | lines)?;
        self.update_display_control()?;
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        self.command(CMD_ENTRY_MODE | ENTRY_INCREMENT)?;
        self.expander_write(0x00)?;
        debug!("LCM1602 initialised");
        Ok(())
    }

    fn expander_write(&mut self, byte: u8) -> Result<(), DisplayError> {
        let byte = if self.backlight { byte | BACKLIGHT } else { byte & !BACKLIGHT };
        self.i2c
            .write(self.address, &[byte])
            .map_err(|e| DisplayError::I2cError(format!("{:?}", e.kind())))
    }

    /// Latch the high nibble of `data` (plus RS) on the falling edge of EN
    fn write_nibble(&mut self, data: u8) -> Result<(), DisplayError> {
        self.expander_write(data | EN)?;
        self.delay.delay_us(1);
        self.expander_write(data & !EN)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<(), DisplayError> {
        self.write_nibble((value & 0xF0) | mode)?;
        self.write_nibble(((value << 4) & 0xF0) | mode)
    }

    fn command(&mut self, value: u8) -> Result<(), DisplayError> {
        self.send(value, 0x00)
    }

    fn data(&mut self, value: u8) -> Result<(), DisplayError> {
        self.send(value, RS)
    }

    fn update_display_control(&mut self) -> Result<(), DisplayError> {
        let mut ctrl = CMD_DISPLAY_CONTROL | DISPLAY_ON;
        if self.cursor {
            ctrl |= CURSOR_ON;
        }
        if self.blink {
            ctrl |= BLINK_ON;
        }
        self.command(ctrl)
    }
}

impl<I, D> CharDisplay for Lcm1602Display<I, D>
where
    I: I2c + Send,
    D: DelayNs + Send,
{
    fn dimensions(&self) -> (u8, u8) {
        (self.columns, self.rows)
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        for (row, line) in text.split('\n').take(self.rows as usize).enumerate() {
            self.command(CMD_SET_DDRAM | row_offset(row, self.columns))?;
            let mut written = 0u8;
            for c in line.chars().take(self.columns as usize) {
                // character ROM A00 is ASCII in the printable range only
                let byte = if c.is_ascii() && !c.is_ascii_control() { c as u8 } else { b'?' };
                self.data(byte)?;
                written += 1;
            }
            // pad so a shorter refresh leaves nothing stale behind
            for _ in written..self.columns {
                self.data(b' ')?;
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    fn set_cursor_visible(&mut self, visible: bool) -> Result<(), DisplayError> {
        self.cursor = visible;
        self.update_display_control()
    }

    fn set_blink(&mut self, blink: bool) -> Result<(), DisplayError> {
        self.blink = blink;
        self.update_display_control()
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.backlight = on;
        self.expander_write(0x00)
    }

    fn home_cursor(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_HOME)?;
        self.delay.delay_ms(2);
        Ok(())
    }
}
