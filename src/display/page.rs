/*
 *  display/page.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Page registry - the fixed, ordered set of pages and cyclic navigation
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
use std::collections::BTreeMap;

use super::components::{ClockPage, IpPage, StatsPage};
use crate::error::PagerError;

/// One-based page number
pub type PageIndex = u8;

/// What a page shows
pub enum PageContent {
    Clock(ClockPage),
    Stats(StatsPage),
    Ip(IpPage),
}

impl PageContent {
    pub fn name(&self) -> &'static str {
        match self {
            PageContent::Clock(_) => "clock",
            PageContent::Stats(_) => "stats",
            PageContent::Ip(_) => "ip",
        }
    }

    /// Produce the text for this page
    pub fn render(&mut self, now: Timestamp) -> Result<String, PagerError> {
        match self {
            PageContent::Clock(page) => Ok(page.render(now)),
            PageContent::Stats(page) => Ok(page.render()),
            PageContent::Ip(page) => Ok(page.render(now)?),
        }
    }
}

/// Page following `current` in a cycle of `count` pages
pub fn next_page(current: PageIndex, count: u8) -> PageIndex {
    if current >= count { 1 } else { current + 1 }
}

/// Page preceding `current` in a cycle of `count` pages
pub fn previous_page(current: PageIndex, count: u8) -> PageIndex {
    if current <= 1 { count.max(1) } else { current - 1 }
}

/// Ordered collection of pages keyed by one-based index
#[derive(Default)]
pub struct PageRegistry {
    pages: BTreeMap<PageIndex, PageContent>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard layout: 1 clock, 2 stats, 3 IP
    pub fn standard(clock: ClockPage, stats: StatsPage, ip: IpPage) -> Self {
        let mut registry = Self::new();
        registry.register(1, PageContent::Clock(clock));
        registry.register(2, PageContent::Stats(stats));
        registry.register(3, PageContent::Ip(ip));
        registry
    }

    /// Bind `content` to `index`, returning whatever was there before
    pub fn register(&mut self, index: PageIndex, content: PageContent) -> Option<PageContent> {
        self.pages.insert(index, content)
    }

    pub fn count(&self) -> u8 {
        self.pages.len() as u8
    }

    pub fn contains(&self, index: PageIndex) -> bool {
        self.pages.contains_key(&index)
    }

    /// First index in 1..=count that has nothing registered
    pub fn first_gap(&self) -> Option<PageIndex> {
        (1..=self.count()).find(|index| !self.contains(*index))
    }

    pub fn get(&self, index: PageIndex) -> Option<&PageContent> {
        self.pages.get(&index)
    }

    pub fn get_mut(&mut self, index: PageIndex) -> Option<&mut PageContent> {
        self.pages.get_mut(&index)
    }

    pub fn render(&mut self, index: PageIndex, now: Timestamp) -> Result<String, PagerError> {
        self.pages
            .get_mut(&index)
            .ok_or(PagerError::NotFound(index))?
            .render(now)
    }

    pub fn next(&self, current: PageIndex) -> PageIndex {
        next_page(current, self.count())
    }

    pub fn previous(&self, current: PageIndex) -> PageIndex {
        previous_page(current, self.count())
    }
}
