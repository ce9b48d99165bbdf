/*
 *  config.rs
 *
 *  cadpager - every page in its turn
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML configuration with command line overrides
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

use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::display::controller::BacklightWindow;
use crate::display::drivers::lcm1602::MAX_COLUMNS;
use crate::netinfo::{DEFAULT_IP_COMMAND, DEFAULT_IP_TIMEOUT};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>, // e.g., "info" | "debug"
    /// console display and keyboard buttons instead of hardware
    pub emulated: bool,
    pub display: DisplayConfig,
    pub input: InputConfig,
    pub pages: PagesConfig,
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    #[default]
    Lcm1602,
    Console,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub driver: DriverKind,
    pub bus: String,  // e.g. "/dev/i2c-1"
    pub address: u8,  // PCF8574 backpack, 7-bit
    pub columns: u8,
    pub rows: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            driver: DriverKind::Lcm1602,
            bus: "/dev/i2c-1".to_string(),
            address: 0x27,
            columns: 16,
            rows: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputModeKind {
    /// falling-edge callbacks per button
    #[default]
    Events,
    /// read the switch value on a fixed interval
    Polling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub mode: InputModeKind,
    pub poll_interval_ms: u64,
    /// BCM pin numbers, bit i of the switch value is pins[i]
    pub pins: Vec<u8>,
    pub left_bit: u8,
    pub right_bit: u8,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mode: InputModeKind::Events,
            poll_interval_ms: 150,
            pins: vec![5, 6, 13, 19, 26, 16, 20, 21],
            left_bit: crate::input::DEFAULT_LEFT_BIT,
            right_bit: crate::input::DEFAULT_RIGHT_BIT,
        }
    }
}

impl InputConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IpSourceKind {
    #[default]
    Hostname,
    Interfaces,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatsKind {
    #[default]
    Placeholder,
    Machine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    pub clock_seconds: bool,
    pub ip_source: IpSourceKind,
    pub ip_command: String,
    pub ip_ttl_secs: u64,
    pub ip_timeout_secs: u64,
    pub cache_capacity: usize,
    pub stats: StatsKind,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            clock_seconds: false,
            ip_source: IpSourceKind::Hostname,
            ip_command: DEFAULT_IP_COMMAND.to_string(),
            ip_ttl_secs: 300,
            ip_timeout_secs: DEFAULT_IP_TIMEOUT.as_secs(),
            cache_capacity: 100,
            stats: StatsKind::Placeholder,
        }
    }
}

impl PagesConfig {
    pub fn ip_ttl(&self) -> Duration {
        Duration::from_secs(self.ip_ttl_secs)
    }

    pub fn ip_timeout(&self) -> Duration {
        Duration::from_secs(self.ip_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_secs: u64,
    pub backlight_on_hour: u32,
    pub backlight_off_hour: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { tick_secs: 10, backlight_on_hour: 6, backlight_off_hour: 23 }
    }
}

impl TimingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    pub fn backlight(&self) -> BacklightWindow {
        BacklightWindow { on_hour: self.backlight_on_hour, off_hour: self.backlight_off_hour }
    }
}

/// CLI overrides, layered over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "cadpager", about = "Character LCD page controller", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// Console display and keyboard input, no hardware needed
    #[arg(long, action = ArgAction::SetTrue)]
    pub emulated: bool,
    /// Button input strategy
    #[arg(long, value_enum)]
    pub mode: Option<InputModeKind>,
    /// I2C bus device, e.g. /dev/i2c-1
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub i2c_bus: Option<String>,
    /// I2C address of the LCD backpack, decimal or 0x hex
    #[arg(long, value_parser = parse_address)]
    pub address: Option<u8>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid I2C address {s:?}: {e}"))
}

/// Public entry point: read YAML, apply `cli`, validate.
pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) YAML file (explicit path or search), defaults fill the gaps
    let mut cfg = match cli.config.as_ref() {
        Some(p) if p.exists() => read_yaml(p)?,
        Some(p) => {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        None => match find_config_file() {
            Some(p) => read_yaml(&p)?,
            None => Config::default(),
        },
    };

    // 2) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 3) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Pretty YAML of the effective config
pub fn dump_config(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/cadpager/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/cadpager/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/cadpager.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["cadpager.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    // an empty file is a valid, all-defaults config
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(s)?)
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.debug                 { cfg.log_level = Some("debug".to_string()); }
    if cli.emulated              { cfg.emulated = true; }
    if cfg.emulated              { cfg.display.driver = DriverKind::Console; }
    if let Some(mode) = cli.mode { cfg.input.mode = mode; }
    if let Some(bus) = cli.i2c_bus.as_ref() { cfg.display.bus = bus.clone(); }
    if let Some(address) = cli.address      { cfg.display.address = address; }
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    let fail = |msg: &str| Err(ConfigError::Validation(msg.to_string()));

    let display = &cfg.display;
    if display.columns == 0 || display.columns > MAX_COLUMNS {
        return fail("display columns must be 1..=40");
    }
    if !(1..=4).contains(&display.rows) {
        return fail("display rows must be 1..=4");
    }
    if display.address > 0x7f {
        return fail("display address must be a 7-bit I2C address");
    }

    let input = &cfg.input;
    if input.poll_interval_ms == 0 {
        return fail("input poll_interval_ms must be > 0");
    }
    if input.pins.is_empty() || input.pins.len() > 8 {
        return fail("input pins must list 1..=8 BCM pins");
    }
    let pin_count = input.pins.len();
    if input.left_bit as usize >= pin_count || input.right_bit as usize >= pin_count {
        return fail("input left_bit/right_bit must index into pins");
    }
    if input.left_bit == input.right_bit {
        return fail("input left_bit and right_bit must differ");
    }

    let pages = &cfg.pages;
    if pages.ip_ttl_secs == 0 {
        return fail("pages ip_ttl_secs must be > 0");
    }
    if pages.ip_timeout_secs == 0 {
        return fail("pages ip_timeout_secs must be > 0");
    }
    if pages.cache_capacity == 0 {
        return fail("pages cache_capacity must be > 0");
    }
    if pages.ip_source == IpSourceKind::Hostname && pages.ip_command.trim().is_empty() {
        return fail("pages ip_command must not be empty");
    }

    let timing = &cfg.timing;
    if timing.tick_secs == 0 {
        return fail("timing tick_secs must be > 0");
    }
    if timing.backlight_on_hour > 23 || timing.backlight_off_hour > 23 {
        return fail("timing backlight hours must be 0..=23");
    }
    if timing.backlight_on_hour > timing.backlight_off_hour {
        return fail("timing backlight_on_hour must not be after backlight_off_hour");
    }
    Ok(())
}
