/*
 *  display/components/stats.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Statistics page
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

use crate::metrics::MetricsReader;

pub const PLACEHOLDER_TEXT: &str = "Stats here";

/// Where the stats page gets its numbers from
#[derive(Debug, Clone, Default)]
pub enum StatsSource {
    /// Fixed placeholder text
    #[default]
    Placeholder,
    /// Load, temperature and uptime of this machine
    Machine(MetricsReader),
}

#[derive(Debug, Clone, Default)]
pub struct StatsPage {
    source: StatsSource,
}

impl StatsPage {
    pub fn new(source: StatsSource) -> Self {
        Self { source }
    }

    pub fn render(&self) -> String {
        match &self.source {
            StatsSource::Placeholder => PLACEHOLDER_TEXT.to_string(),
            StatsSource::Machine(reader) => reader.check().summary(),
        }
    }
}
