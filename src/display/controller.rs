/*
 *  display/controller.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Page controller - current page state, navigation and the draw path
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

use chrono::Timelike;
use log::{debug, info, warn};

use super::components::ip::UNAVAILABLE_TEXT;
use super::page::{PageIndex, PageRegistry};
use super::traits::BoxedDisplay;
use crate::clock::SharedClock;
use crate::error::PagerError;
use crate::input::InputEvent;

/// Hours during which the backlight stays on, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacklightWindow {
    pub on_hour: u32,
    pub off_hour: u32,
}

impl Default for BacklightWindow {
    fn default() -> Self {
        Self { on_hour: 6, off_hour: 23 }
    }
}

impl BacklightWindow {
    pub fn is_lit(&self, hour: u32) -> bool {
        hour >= self.on_hour && hour <= self.off_hour
    }
}

/// Which page is selected and which one the panel currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub current_page: PageIndex,
    /// `None` until the first draw, and again after a failed write
    pub last_drawn_page: Option<PageIndex>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self { current_page: 1, last_drawn_page: None }
    }
}

/// Page controller - the only writer to the display.
///
/// Owns the display handle, the page registry (and through it the IP cache)
/// and the navigation state. It is not shared: the event coordinator moves it
/// into a single task, which is what serializes every draw.
pub struct PageController {
    display: BoxedDisplay,
    registry: PageRegistry,
    clock: SharedClock,
    backlight: BacklightWindow,
    state: ControllerState,
}

impl PageController {
    /// Fails with `NotFound` if the registry is empty or has a hole in 1..=count
    pub fn new(
        display: BoxedDisplay,
        registry: PageRegistry,
        clock: SharedClock,
        backlight: BacklightWindow,
    ) -> Result<Self, PagerError> {
        if registry.count() == 0 {
            return Err(PagerError::NotFound(1));
        }
        if let Some(gap) = registry.first_gap() {
            return Err(PagerError::NotFound(gap));
        }
        debug!("Initializing the page controller with {} pages", registry.count());
        Ok(Self {
            display,
            registry,
            clock,
            backlight,
            state: ControllerState::default(),
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn current_page(&self) -> PageIndex {
        self.state.current_page
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PageRegistry {
        &mut self.registry
    }

    /// Dispatch one input event
    pub fn handle(&mut self, event: InputEvent) -> Result<(), PagerError> {
        match event {
            InputEvent::Left => self.go_left(),
            InputEvent::Right => self.go_right(),
            InputEvent::Unhandled(value) => {
                self.page_react(value);
                Ok(())
            }
            InputEvent::Idle => self.refresh(),
            InputEvent::Tick => self.tick(),
        }
    }

    pub fn go_left(&mut self) -> Result<(), PagerError> {
        debug!("Turning page left!");
        self.state.current_page = self.registry.previous(self.state.current_page);
        self.draw(self.state.current_page)
    }

    pub fn go_right(&mut self) -> Result<(), PagerError> {
        debug!("Turning page right!");
        self.state.current_page = self.registry.next(self.state.current_page);
        self.draw(self.state.current_page)
    }

    /// Jump straight to `page`
    pub fn show(&mut self, page: PageIndex) -> Result<(), PagerError> {
        if !self.registry.contains(page) {
            return Err(PagerError::NotFound(page));
        }
        self.state.current_page = page;
        self.draw(page)
    }

    /// Redraw whatever page is selected
    pub fn refresh(&mut self) -> Result<(), PagerError> {
        self.draw(self.state.current_page)
    }

    /// Periodic refresh: backlight by hour, cursor off, redraw
    pub fn tick(&mut self) -> Result<(), PagerError> {
        let hour = self.clock.now().hour();
        let lit = self.backlight.is_lit(hour);
        debug!("Tick at hour {}, backlight {}", hour, if lit { "on" } else { "off" });
        self.display.set_backlight(lit)?;
        self.display.set_cursor_visible(false)?;
        self.display.set_blink(false)?;
        self.draw(self.state.current_page)
    }

    /// Render `page` and put it on the panel.
    ///
    /// The panel is cleared only when switching to a different page than the
    /// one last drawn. A failed IP lookup is shown as an error text instead of
    /// failing the draw. A failed write forgets the last drawn page so the
    /// next draw starts from a clean panel.
    pub fn draw(&mut self, page: PageIndex) -> Result<(), PagerError> {
        debug!("Showing page number: {}", page);
        let now = self.clock.now();
        let text = match self.registry.render(page, now) {
            Ok(text) => text,
            Err(PagerError::Command(err)) => {
                warn!("Page {} render failed: {}", page, err);
                UNAVAILABLE_TEXT.to_string()
            }
            Err(err) => return Err(err),
        };

        let painted = self.paint(page, &text);
        if painted.is_err() {
            self.state.last_drawn_page = None;
        }
        painted
    }

    fn paint(&mut self, page: PageIndex, text: &str) -> Result<(), PagerError> {
        if self.state.last_drawn_page != Some(page) {
            debug!("Clearing display for page {}", page);
            self.display.clear()?;
        }
        self.state.last_drawn_page = Some(page);
        self.display.write_text(text)?;
        self.display.home_cursor()?;
        Ok(())
    }

    /// Hook for button combinations that are not navigation
    pub fn page_react(&mut self, input: u8) {
        debug!("Reacting on page {} with input: {}", self.state.current_page, input);
    }

    /// Blank the panel on the way out
    pub fn shutdown(&mut self) -> Result<(), PagerError> {
        info!("Blanking display");
        self.display.clear()?;
        self.display.set_backlight(false)?;
        self.state.last_drawn_page = None;
        Ok(())
    }
}
