/*
 *  display/mod.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - character LCD drivers, pages and the page controller
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod factory;

// Display drivers
pub mod drivers;

// Page renderers and the page table
pub mod components;
pub mod page;

// Page controller, sole writer to the display
pub mod controller;

// Re-exports for convenience
pub use traits::{BoxedDisplay, CharDisplay};
pub use error::DisplayError;
pub use factory::DisplayFactory;
pub use page::{PageContent, PageIndex, PageRegistry};
pub use controller::{BacklightWindow, ControllerState, PageController};
