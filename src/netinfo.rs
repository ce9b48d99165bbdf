/*
 *  netinfo.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Local IP address lookup strategies
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

use log::{debug, warn};
use std::net::IpAddr;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::CommandError;

pub const DEFAULT_IP_COMMAND: &str = "hostname --all-ip-addresses";
pub const DEFAULT_IP_TIMEOUT: Duration = Duration::from_secs(5);

const WAIT_STEP: Duration = Duration::from_millis(20);

/// Something that can list the local IP addresses as one display string.
///
/// This is the only slow, platform specific call in the pager.
pub trait IpSource: Send {
    fn addresses(&mut self) -> Result<String, CommandError>;
}

/// Runs a shell command and uses its trimmed stdout.
///
/// A command still running after `timeout` is killed and reported as
/// [`CommandError::Timeout`], so a hung lookup cannot stall the pager.
#[derive(Debug, Clone)]
pub struct HostnameCommand {
    command: String,
    timeout: Duration,
}

impl HostnameCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self { command: command.into(), timeout: DEFAULT_IP_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for HostnameCommand {
    fn default() -> Self {
        Self::new(DEFAULT_IP_COMMAND)
    }
}

impl IpSource for HostnameCommand {
    fn addresses(&mut self) -> Result<String, CommandError> {
        debug!("running `{}`", self.command);
        let spawn_error = |source: std::io::Error| CommandError::Spawn { command: self.command.clone(), source };
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let deadline = Instant::now() + self.timeout;
        while child.try_wait().map_err(spawn_error)?.is_none() {
            if Instant::now() >= deadline {
                warn!("`{}` still running after {:?}, killing it", self.command, self.timeout);
                // already exited is fine here, reap either way
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::Timeout { command: self.command.clone(), after: self.timeout });
            }
            thread::sleep(WAIT_STEP);
        }
        let output = child.wait_with_output().map_err(spawn_error)?;

        if !output.status.success() {
            return Err(CommandError::Exit {
                command: self.command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let addresses = stdout.trim_end();
        if addresses.is_empty() {
            return Err(CommandError::Empty);
        }
        Ok(addresses.to_string())
    }
}

/// Lists interface addresses natively, no shell involved
#[derive(Debug, Default, Clone, Copy)]
pub struct InterfaceAddresses;

impl IpSource for InterfaceAddresses {
    fn addresses(&mut self) -> Result<String, CommandError> {
        let interfaces = local_ip_address::list_afinet_netifas()
            .map_err(|e| CommandError::Interfaces(e.to_string()))?;
        let addresses = format_addresses(interfaces.into_iter().map(|(_, ip)| ip));
        if addresses.is_empty() {
            return Err(CommandError::Empty);
        }
        Ok(addresses)
    }
}

/// Space separated, IPv4 first, loopback and link-local dropped
pub fn format_addresses(addresses: impl IntoIterator<Item = IpAddr>) -> String {
    let mut usable: Vec<IpAddr> = addresses
        .into_iter()
        .filter(|ip| !ip.is_loopback())
        .filter(|ip| match ip {
            IpAddr::V4(v4) => !v4.is_link_local(),
            IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) != 0xfe80,
        })
        .collect();
    usable.dedup();
    usable.sort_by_key(|ip| ip.is_ipv6());
    usable.iter().map(IpAddr::to_string).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_command_output_is_trimmed() {
        let mut source = HostnameCommand::new("printf '10.0.0.1 192.168.1.4 \\n'");
        assert_eq!(source.addresses().unwrap(), "10.0.0.1 192.168.1.4");
    }

    #[test]
    fn test_command_failure_is_an_error() {
        let mut source = HostnameCommand::new("echo nope >&2; exit 3");
        match source.addresses() {
            Err(CommandError::Exit { stderr, .. }) => assert_eq!(stderr, "nope"),
            other => panic!("expected exit error, got {:?}", other),
        }
    }

    #[test]
    fn test_hung_command_times_out() {
        let mut source = HostnameCommand::new("sleep 5").with_timeout(Duration::from_millis(200));
        let started = Instant::now();
        match source.addresses() {
            Err(CommandError::Timeout { after, .. }) => assert_eq!(after, Duration::from_millis(200)),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_empty_output_is_an_error() {
        let mut source = HostnameCommand::new("true");
        assert!(matches!(source.addresses(), Err(CommandError::Empty)));
    }

    #[test]
    fn test_format_addresses_filters_and_orders() {
        let list = vec![
            IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1)),
            IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 5)),
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
        ];
        assert_eq!(format_addresses(list), "10.0.0.1 2001:db8::5");
    }
}
