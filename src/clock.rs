/*
 *  clock.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Wall clock source shared by pages, cache and controller
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

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeDelta};
use std::sync::{Arc, Mutex, PoisonError};

/// A point in time carrying the local UTC offset in force when it was read.
///
/// Differences between two timestamps are absolute, so they do not jump when
/// daylight saving moves the wall clock. The wall fields (`hour()`, `format`)
/// read as local time.
pub type Timestamp = DateTime<FixedOffset>;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// The real local clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now().fixed_offset()
    }
}

/// Hand-cranked clock for tests and demos.
///
/// Clones share the same instant, so a test can keep one handle and pass
/// another into the controller.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Starts at `start` read as UTC
    pub fn new(start: NaiveDateTime) -> Self {
        Self::starting_at(start.and_utc().fixed_offset())
    }

    pub fn starting_at(start: Timestamp) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Timestamp> {
        self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Jump to wall time `at`, keeping the current offset
    pub fn set(&self, at: NaiveDateTime) {
        let mut now = self.lock();
        if let Some(at) = at.and_local_timezone(*now.offset()).single() {
            *now = at;
        }
    }

    /// Same instant seen under another offset, as on a daylight saving switch
    pub fn set_offset(&self, offset: FixedOffset) {
        let mut now = self.lock();
        *now = now.with_timezone(&offset);
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_manual_clock_clones_share_time() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let other = clock.clone();

        other.advance(TimeDelta::seconds(90));
        assert_eq!(clock.now().naive_local(), start + TimeDelta::seconds(90));

        clock.set(start);
        assert_eq!(other.now().naive_local(), start);
    }

    #[test]
    fn test_offset_change_moves_wall_time_not_instant() {
        let summer = FixedOffset::east_opt(3600).unwrap();
        let wall = NaiveDate::from_ymd_opt(2024, 10, 27).unwrap().and_hms_opt(1, 50, 0).unwrap();
        let clock = ManualClock::starting_at(wall.and_local_timezone(summer).unwrap());
        let before = clock.now();

        clock.set_offset(FixedOffset::east_opt(0).unwrap());
        let after = clock.now();
        assert_eq!(after.hour(), 0);
        assert_eq!(after - before, TimeDelta::zero());

        // set() keeps the offset now in force
        clock.set(wall);
        assert_eq!(clock.now() - before, TimeDelta::hours(1));
    }
}
