/*
 *  display/components/ip.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  IP address page with a cached lookup
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

use crate::cache::{CacheEntry, TimedCache};
use crate::clock::Timestamp;
use crate::error::CommandError;
use crate::netinfo::IpSource;

pub const IP_CACHE_KEY: &str = "ip";

/// Shown in place of the addresses when the lookup fails
pub const UNAVAILABLE_TEXT: &str = "IP: unavailable\nlookup failed";

/// IP page: `IP: <addresses>` over `<n>s ago.`
///
/// The lookup result is memoised in a private [`TimedCache`]; a failed lookup
/// writes nothing, so the next render retries.
pub struct IpPage {
    source: Box<dyn IpSource>,
    cache: TimedCache<String>,
}

impl IpPage {
    pub fn new(source: Box<dyn IpSource>, cache: TimedCache<String>) -> Self {
        Self { source, cache }
    }

    pub fn render(&mut self, now: Timestamp) -> Result<String, CommandError> {
        let entry = match self.cache.get_entry(IP_CACHE_KEY) {
            Some(entry) => entry,
            None => {
                debug!("IP cache miss, querying addresses");
                let value = self.source.addresses()?;
                info!("Local addresses: {}", value);
                let inserted_at = self.cache.put(IP_CACHE_KEY, value.clone());
                CacheEntry { value, inserted_at }
            }
        };

        let age = (now - entry.inserted_at).num_seconds().max(0);
        Ok(format!("IP: {}\n{}s ago.", entry.value, age))
    }

    pub fn cache(&self) -> &TimedCache<String> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TimedCache<String> {
        &mut self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
    use crate::clock::{Clock, ManualClock};
    use chrono::{NaiveDate, TimeDelta};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl IpSource for CountingSource {
        fn addresses(&mut self) -> Result<String, CommandError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(CommandError::Empty)
            } else {
                Ok("10.0.0.1".to_string())
            }
        }
    }

    fn page(fail: bool) -> (IpPage, ManualClock, Arc<AtomicUsize>) {
        let clock = ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap(),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CountingSource { calls: Arc::clone(&calls), fail };
        let cache = TimedCache::new(DEFAULT_CAPACITY, DEFAULT_TTL, Arc::new(clock.clone()));
        (IpPage::new(Box::new(source), cache), clock, calls)
    }

    #[test]
    fn test_fresh_lookup_renders_zero_age() {
        let (mut page, clock, calls) = page(false);
        assert_eq!(page.render(clock.now()).unwrap(), "IP: 10.0.0.1\n0s ago.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cached_lookup_ages_until_ttl() {
        let (mut page, clock, calls) = page(false);
        page.render(clock.now()).unwrap();

        clock.advance(TimeDelta::seconds(42));
        assert_eq!(page.render(clock.now()).unwrap(), "IP: 10.0.0.1\n42s ago.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(TimeDelta::seconds(300));
        assert_eq!(page.render(clock.now()).unwrap(), "IP: 10.0.0.1\n0s ago.");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_lookup_leaves_cache_empty_and_retries() {
        let (mut page, clock, calls) = page(true);
        assert!(page.render(clock.now()).is_err());
        assert!(page.render(clock.now()).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(page.cache_mut().get(IP_CACHE_KEY), None);
    }
}
