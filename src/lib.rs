/*
 *  lib.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Library root - the binary in main.rs is thin wiring on top of this
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
//! Drives a 2-line character LCD with a row of buttons: a clock page, an IP
//! address page and a stats page, cycled with left/right buttons and
//! refreshed by a periodic tick.

pub mod cache;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod display;
pub mod error;
pub mod input;
pub mod metrics;
pub mod netinfo;

pub use error::{CommandError, PagerError};
