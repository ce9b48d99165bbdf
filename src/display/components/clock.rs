/*
 *  display/components/clock.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Date and time page
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

use crate::clock::Timestamp;

const FORMAT_MINUTES: &str = "%a, %-d %b %Y\n%H:%M";
const FORMAT_SECONDS: &str = "%a, %-d %b %Y\n%H:%M:%S";

/// Clock page: `Tue, 5 Mar 2024` over `14:07`
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockPage {
    show_seconds: bool,
}

impl ClockPage {
    pub fn new(show_seconds: bool) -> Self {
        Self { show_seconds }
    }

    pub fn render(&self, now: Timestamp) -> String {
        let fmt = if self.show_seconds { FORMAT_SECONDS } else { FORMAT_MINUTES };
        now.format(fmt).to_string()
    }
}
