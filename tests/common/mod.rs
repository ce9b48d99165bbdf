/*
 *  tests/common/mod.rs
 *
 *  Shared fixtures for the integration tests
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 */

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cadpager::cache::TimedCache;
use cadpager::clock::{ManualClock, SharedClock};
use cadpager::display::components::{ClockPage, IpPage, StatsPage};
use cadpager::display::drivers::mock::MockDisplay;
use cadpager::display::{BacklightWindow, PageController, PageRegistry};
use cadpager::error::CommandError;
use cadpager::netinfo::IpSource;
use chrono::{NaiveDate, NaiveDateTime};

/// IP lookup whose answer the test can change; `None` fails the lookup
#[derive(Clone, Default)]
pub struct StubIp {
    reply: Arc<Mutex<Option<String>>>,
    calls: Arc<AtomicUsize>,
}

impl StubIp {
    pub fn answering(addresses: &str) -> Self {
        let stub = Self::default();
        stub.set(Some(addresses));
        stub
    }

    pub fn set(&self, reply: Option<&str>) {
        *self.reply.lock().unwrap() = reply.map(str::to_string);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IpSource for StubIp {
    fn addresses(&mut self) -> Result<String, CommandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply.lock().unwrap().clone() {
            Some(reply) => Ok(reply),
            None => Err(CommandError::Exit {
                command: "hostname --all-ip-addresses".into(),
                status: "exit status: 1".into(),
                stderr: "hostname: not available".into(),
            }),
        }
    }
}

pub fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(hour, min, sec).unwrap()
}

pub struct Rig {
    pub controller: PageController,
    pub display: MockDisplay,
    pub clock: ManualClock,
    pub ip: StubIp,
}

/// Clock, stats and IP pages over a mock display, noon on a Tuesday
pub fn rig(ip: StubIp) -> Rig {
    let clock = ManualClock::new(at(12, 0, 0));
    let shared: SharedClock = Arc::new(clock.clone());
    let cache = TimedCache::new(100, Duration::from_secs(300), Arc::clone(&shared));
    let registry = PageRegistry::standard(
        ClockPage::default(),
        StatsPage::default(),
        IpPage::new(Box::new(ip.clone()), cache),
    );
    let display = MockDisplay::default();
    let controller = PageController::new(
        Box::new(display.clone()),
        registry,
        shared,
        BacklightWindow::default(),
    )
    .unwrap();
    Rig { controller, display, clock, ip }
}
