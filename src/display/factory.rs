/*
 *  display/factory.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Builds the display driver and the page set from configuration
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
use std::sync::Arc;

use crate::cache::TimedCache;
use crate::clock::SharedClock;
use crate::config::{DisplayConfig, DriverKind, IpSourceKind, PagesConfig, StatsKind};
use crate::display::components::{ClockPage, IpPage, StatsPage, StatsSource};
use crate::display::drivers::console::ConsoleDisplay;
use crate::display::drivers::lcm1602::Lcm1602Display;
use crate::display::error::DisplayError;
use crate::display::page::PageRegistry;
use crate::display::traits::BoxedDisplay;
use crate::metrics::MetricsReader;
use crate::netinfo::{HostnameCommand, InterfaceAddresses, IpSource};

/// Factory for creating display drivers from configuration
pub struct DisplayFactory;

impl DisplayFactory {
    /// Open the configured driver.
    ///
    /// For the LCM1602 this touches the I2C bus and runs the panel's
    /// power-on sequence, so a missing or unwired device fails here.
    pub fn create_from_config(config: &DisplayConfig) -> Result<BoxedDisplay, DisplayError> {
        match config.driver {
            DriverKind::Lcm1602 => Ok(Box::new(Lcm1602Display::open(
                &config.bus,
                config.address,
                config.columns,
                config.rows,
            )?)),
            DriverKind::Console => {
                info!("Using console display ({}x{})", config.columns, config.rows);
                Ok(Box::new(ConsoleDisplay::new(config.columns, config.rows)))
            }
        }
    }

    /// The standard clock / stats / IP page set
    pub fn create_pages(config: &PagesConfig, clock: SharedClock) -> PageRegistry {
        let source: Box<dyn IpSource> = match config.ip_source {
            IpSourceKind::Hostname => Box::new(
                HostnameCommand::new(config.ip_command.clone()).with_timeout(config.ip_timeout()),
            ),
            IpSourceKind::Interfaces => Box::new(InterfaceAddresses),
        };
        let stats = match config.stats {
            StatsKind::Placeholder => StatsSource::Placeholder,
            StatsKind::Machine => StatsSource::Machine(MetricsReader::default()),
        };
        debug!(
            "Pages: clock seconds={}, ip source {:?}, ttl {}s, stats {:?}",
            config.clock_seconds, config.ip_source, config.ip_ttl_secs, config.stats
        );
        let cache = TimedCache::new(config.cache_capacity, config.ip_ttl(), Arc::clone(&clock));
        PageRegistry::standard(
            ClockPage::new(config.clock_seconds),
            StatsPage::new(stats),
            IpPage::new(source, cache),
        )
    }
}
