/*
 *  metrics.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  Machine statistics gathered from /proc and /sys
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
//! Machine metrics for the stats page, read from /proc and /sys files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const LOADAVG: &str = "proc/loadavg";
const UPTIME: &str = "proc/uptime";
const THERMAL: &str = "sys/class/thermal/thermal_zone0/temp";

/// A snapshot of machine metrics.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MachineMetrics {
    /// 1-minute load average as a percentage
    pub cpu_load: f64,
    /// Celsius
    pub cpu_temp: f64,
    /// Hours
    pub up_time: f64,
}

/// Reads metrics below a filesystem root, `/` on a real machine
#[derive(Debug, Clone)]
pub struct MetricsReader {
    root: PathBuf,
}

impl Default for MetricsReader {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MetricsReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reads the first whitespace separated float from a file below the root.
    fn read_first_float(&self, path: &str) -> io::Result<f64> {
        let content = fs::read_to_string(self.root.join(path))?;
        let first_word = content.split_whitespace().next().unwrap_or("0.0");
        first_word.parse::<f64>().map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Any value that cannot be read is reported as 0.0.
    pub fn check(&self) -> MachineMetrics {
        MachineMetrics {
            cpu_load: self.read_first_float(LOADAVG).map(|l| 100.0 * l).unwrap_or(0.0),
            // millidegrees
            cpu_temp: self.read_first_float(THERMAL).map(|t| t / 1000.0).unwrap_or(0.0),
            up_time: self.read_first_float(UPTIME).map(|s| s / 3600.0).unwrap_or(0.0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MachineMetrics {
    /// Two display lines, each short enough for a 16 column panel
    pub fn summary(&self) -> String {
        format!(
            "Load {:.0}% {:.0}C\nUp {:.1}h",
            self.cpu_load, self.cpu_temp, self.up_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("cadpager-metrics-{}-{}", name, std::process::id()));
        fs::create_dir_all(root.join("proc")).unwrap();
        fs::create_dir_all(root.join("sys/class/thermal/thermal_zone0")).unwrap();
        root
    }

    #[test]
    fn test_check_reads_proc_files() {
        let root = fake_root("full");
        fs::write(root.join(LOADAVG), "0.42 0.30 0.25 1/123 4567\n").unwrap();
        fs::write(root.join(UPTIME), "7200.55 14000.00\n").unwrap();
        fs::write(root.join(THERMAL), "48312\n").unwrap();

        let metrics = MetricsReader::new(&root).check();
        assert!((metrics.cpu_load - 42.0).abs() < 1e-9);
        assert!((metrics.cpu_temp - 48.312).abs() < 1e-9);
        assert!((metrics.up_time - 2.000_152_777).abs() < 1e-6);
        assert_eq!(metrics.summary(), "Load 42% 48C\nUp 2.0h");

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn test_missing_files_read_as_zero() {
        let root = fake_root("empty");
        let metrics = MetricsReader::new(&root).check();
        assert_eq!(metrics, MachineMetrics::default());
        fs::remove_dir_all(root).ok();
    }
}
