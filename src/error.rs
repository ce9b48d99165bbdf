/*
 *  error.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error taxonomy for page rendering and navigation
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

use std::time::Duration;
use thiserror::Error;

use crate::display::error::DisplayError;
use crate::display::page::PageIndex;

/// Top level error for the pager.
///
/// `NotFound` is a wiring defect and is treated as fatal by the coordinator,
/// `Command` is recovered inside the draw path, `Device` is fatal at startup
/// and logged at runtime.
#[derive(Debug, Error)]
pub enum PagerError {
    #[error("page {0} is not registered")]
    NotFound(PageIndex),
    #[error("IP lookup failed: {0}")]
    Command(#[from] CommandError),
    #[error("display device error: {0}")]
    Device(#[from] DisplayError),
}

/// Failure of the "list all IP addresses" lookup.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Exit {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("`{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },
    #[error("no addresses reported")]
    Empty,
    #[error("interface query failed: {0}")]
    Interfaces(String),
}

impl PagerError {
    /// True for errors the coordinator must not keep running through.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PagerError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_not_found_is_fatal() {
        assert!(PagerError::NotFound(4).is_fatal());
        assert!(!PagerError::Command(CommandError::Empty).is_fatal());
        assert!(!PagerError::Device(DisplayError::UnsupportedOperation).is_fatal());
    }

    #[test]
    fn test_command_error_message() {
        let err = CommandError::Exit {
            command: "hostname -I".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "`hostname -I` exited with exit status: 1: boom");
    }
}
