/*
 *  cache.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Expiring key/value store with insertion-order eviction
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

use chrono::TimeDelta;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::clock::{SharedClock, Timestamp};

/// Default time-to-live, five minutes
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
/// Default number of entries held before the oldest is evicted
pub const DEFAULT_CAPACITY: usize = 100;

/// A cached value together with the moment it was stored
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    pub value: V,
    pub inserted_at: Timestamp,
}

/// Expiring key/value store.
///
/// Entries are visible while `now - inserted_at < ttl`; expiry is checked on
/// read and stale entries are purged lazily. When the store is full a new key
/// evicts the oldest inserted key, reads never affect the eviction order.
/// Not synchronised: owners run on the single serialized draw path.
pub struct TimedCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: VecDeque<String>,
    ttl: TimeDelta,
    capacity: usize,
    clock: SharedClock,
}

impl<V: Clone> TimedCache<V> {
    pub fn new(capacity: usize, ttl: Duration, clock: SharedClock) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            capacity,
            clock,
        }
    }

    /// Value for `key`, or `None` when absent or expired
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_entry(key).map(|entry| entry.value)
    }

    /// Value and insertion time for `key`, or `None` when absent or expired
    pub fn get_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let now = self.clock.now();
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => now - entry.inserted_at >= self.ttl,
        };
        if expired {
            debug!("cache entry '{}' expired", key);
            self.remove(key);
            return None;
        }
        self.entries.get(key).cloned()
    }

    /// Store `value` under `key`, returning the insertion timestamp.
    ///
    /// Re-inserting an existing key refreshes its timestamp and makes it the
    /// newest entry.
    pub fn put(&mut self, key: impl Into<String>, value: V) -> Timestamp {
        let key = key.into();
        let inserted_at = self.clock.now();

        if self.entries.contains_key(&key) {
            self.order.retain(|k| k != &key);
        } else {
            while self.entries.len() >= self.capacity {
                let Some(oldest) = self.order.pop_front() else { break };
                debug!("cache full, evicting '{}'", oldest);
                self.entries.remove(&oldest);
            }
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, CacheEntry { value, inserted_at });
        inserted_at
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.order.retain(|k| k != key);
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{FixedOffset, NaiveDate};
    use std::sync::Arc;

    fn clock() -> ManualClock {
        ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_round_trip_before_ttl() {
        let clock = clock();
        let mut cache = TimedCache::new(DEFAULT_CAPACITY, DEFAULT_TTL, Arc::new(clock.clone()));

        cache.put("ip", "10.0.0.1".to_string());
        clock.advance(TimeDelta::seconds(299));
        assert_eq!(cache.get("ip"), Some("10.0.0.1".to_string()));
    }

    #[test]
    fn test_expires_at_ttl_and_purges() {
        let clock = clock();
        let mut cache = TimedCache::new(DEFAULT_CAPACITY, DEFAULT_TTL, Arc::new(clock.clone()));

        cache.put("ip", "10.0.0.1".to_string());
        clock.advance(TimeDelta::seconds(300));
        assert_eq!(cache.get("ip"), None);
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_capacity_evicts_first_inserted() {
        let clock = clock();
        let mut cache = TimedCache::new(3, DEFAULT_TTL, Arc::new(clock.clone()));

        for key in ["a", "b", "c"] {
            cache.put(key, key.to_string());
        }
        // reading "a" must not protect it
        assert!(cache.get("a").is_some());
        cache.put("d", "d".to_string());

        assert_eq!(cache.size(), 3);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some("b".to_string()));
        assert_eq!(cache.get("d"), Some("d".to_string()));
    }

    #[test]
    fn test_overwrite_refreshes_timestamp_and_order() {
        let clock = clock();
        let mut cache = TimedCache::new(2, DEFAULT_TTL, Arc::new(clock.clone()));

        let first = cache.put("a", 1);
        cache.put("b", 2);
        clock.advance(TimeDelta::seconds(10));
        let second = cache.put("a", 3);
        assert_eq!(second - first, TimeDelta::seconds(10));
        assert_eq!(cache.size(), 2);

        // "b" is now the oldest
        cache.put("c", 4);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get_entry("a").map(|e| (e.value, e.inserted_at)), Some((3, second)));
    }

    #[test]
    fn test_ttl_counts_real_time_across_clock_change() {
        // 01:50 summer time; clocks go back an hour ten minutes later
        let summer = FixedOffset::east_opt(3600).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap().and_hms_opt(1, 50, 0).unwrap();
        let clock = ManualClock::starting_at(start.and_local_timezone(summer).unwrap());
        let mut cache = TimedCache::new(DEFAULT_CAPACITY, DEFAULT_TTL, Arc::new(clock.clone()));

        cache.put("ip", "10.0.0.1".to_string());
        clock.set_offset(FixedOffset::east_opt(0).unwrap());
        clock.advance(TimeDelta::seconds(299));
        assert_eq!(cache.get("ip"), Some("10.0.0.1".to_string()));

        clock.advance(TimeDelta::seconds(1));
        assert_eq!(cache.get("ip"), None);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut cache = TimedCache::new(0, DEFAULT_TTL, Arc::new(clock()));
        cache.put("a", 1);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.get("a"), Some(1));
    }
}
