/*
 *  config.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, command-line overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, str::FromStr};
use thiserror::Error;

use crate::commands::Command;
use crate::display::state::{Bias, DisplayConfig, TemperatureCoefficient, DEFAULT_CONTRAST, MAX_CONTRAST};

/// PCD8544 serial clock ceiling
const MAX_SPI_SPEED_HZ: u32 = 4_000_000;

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
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// General options
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    /// panel settings and wiring
    pub display: Option<PanelConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PanelConfig {
    pub contrast: Option<u8>,                // Vop 0-127
    pub bias: Option<u8>,                    // 0-7
    pub temperature_coefficient: Option<u8>, // 0-3
    pub invert: Option<bool>,
    pub bus: Option<BusConfig>,              // spi wiring
}

/// SPI wiring. Line numbers are offsets on the gpio character device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BusConfig {
    pub bus: String,               // e.g. "/dev/spidev0.0"
    pub speed_hz: Option<u32>,
    pub gpio_chip: Option<String>, // e.g. "/dev/gpiochip0"
    pub dc_pin: u32,
    pub rst_pin: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            bus: "/dev/spidev0.0".to_string(),
            speed_hz: None,
            gpio_chip: None,
            dc_pin: 23,
            rst_pin: 24,
        }
    }
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Contrast handed to init
    pub fn contrast(&self) -> u8 {
        self.display.as_ref().and_then(|d| d.contrast).unwrap_or(DEFAULT_CONTRAST)
    }

    /// Controller settings the engine starts from
    pub fn display_config(&self) -> DisplayConfig {
        let mut config = DisplayConfig { contrast: self.contrast(), ..Default::default() };
        if let Some(display) = self.display.as_ref() {
            if let Some(b) = display.bias { config.bias = Bias::from_level(b); }
            if let Some(tc) = display.temperature_coefficient {
                config.temperature_coefficient = TemperatureCoefficient::from_level(tc);
            }
            if let Some(inv) = display.invert { config.inverted = inv; }
        }
        config
    }

    pub fn bus(&self) -> BusConfig {
        self.display.as_ref().and_then(|d| d.bus.clone()).unwrap_or_default()
    }

    /// Pretty YAML of effective config (nice for debugging)
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "lcd5110", version, about = "Nokia 5110 / PCD8544 display tool")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// SPI device, e.g. /dev/spidev0.0
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub spi_bus: Option<String>,
    #[arg(long)]
    pub spi_speed_hz: Option<u32>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub gpio_chip: Option<String>,
    #[arg(long)]
    pub dc_pin: Option<u32>,
    #[arg(long)]
    pub rst_pin: Option<u32>,
    /// Contrast used at init (0-127)
    #[arg(long)]
    pub contrast: Option<u8>,
    #[arg(long)]
    pub bias: Option<u8>,
    #[arg(long)]
    pub temperature_coefficient: Option<u8>,
    #[arg(long, action = ArgAction::Set)]
    pub invert: Option<bool>,
    /// Drive an emulated panel and print it instead of touching hardware
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,
    /// With --dry-run, also save the emulated panel as a PBM image
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub pbm: Option<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Public entry point: read YAML, merge, apply CLI overrides, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/lcd5110/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/lcd5110/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/lcd5110.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["lcd5110.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    // display
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut PanelConfig, src: PanelConfig) {
    if src.contrast.is_some()                { dst.contrast = src.contrast; }
    if src.bias.is_some()                    { dst.bias = src.bias; }
    if src.temperature_coefficient.is_some() { dst.temperature_coefficient = src.temperature_coefficient; }
    if src.invert.is_some()                  { dst.invert = src.invert; }
    if src.bus.is_some()                     { dst.bus = src.bus; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }

    let any_panel = cli.contrast.is_some()
        || cli.bias.is_some()
        || cli.temperature_coefficient.is_some()
        || cli.invert.is_some();
    let any_bus = cli.spi_bus.is_some()
        || cli.spi_speed_hz.is_some()
        || cli.gpio_chip.is_some()
        || cli.dc_pin.is_some()
        || cli.rst_pin.is_some();

    if (any_panel || any_bus) && cfg.display.is_none() {
        cfg.display = Some(PanelConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.contrast.is_some()                { display.contrast = cli.contrast; }
        if cli.bias.is_some()                    { display.bias = cli.bias; }
        if cli.temperature_coefficient.is_some() { display.temperature_coefficient = cli.temperature_coefficient; }
        if cli.invert.is_some()                  { display.invert = cli.invert; }

        if any_bus {
            let bus = display.bus.get_or_insert_with(BusConfig::default);
            if let Some(path) = cli.spi_bus.as_ref()   { bus.bus = path.clone(); }
            if cli.spi_speed_hz.is_some()              { bus.speed_hz = cli.spi_speed_hz; }
            if cli.gpio_chip.is_some()                 { bus.gpio_chip = cli.gpio_chip.clone(); }
            if let Some(dc) = cli.dc_pin               { bus.dc_pin = dc; }
            if let Some(rst) = cli.rst_pin             { bus.rst_pin = rst; }
        }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        if LevelFilter::from_str(level).is_err() {
            return Err(ConfigError::Validation(format!("unknown log_level '{}'", level)));
        }
    }
    if let Some(display) = cfg.display.as_ref() {
        if let Some(c) = display.contrast {
            if c > MAX_CONTRAST {
                return Err(ConfigError::Validation(format!("display contrast must be 0..={}", MAX_CONTRAST)));
            }
        }
        if let Some(b) = display.bias {
            if b > 7 {
                return Err(ConfigError::Validation("display bias must be 0..=7".into()));
            }
        }
        if let Some(tc) = display.temperature_coefficient {
            if tc > 3 {
                return Err(ConfigError::Validation("display temperature_coefficient must be 0..=3".into()));
            }
        }
        if let Some(bus) = display.bus.as_ref() {
            if bus.bus.is_empty() {
                return Err(ConfigError::Validation("display bus path must not be empty".into()));
            }
            if let Some(speed) = bus.speed_hz {
                if speed == 0 || speed > MAX_SPI_SPEED_HZ {
                    return Err(ConfigError::Validation(format!(
                        "display bus speed_hz must be 1..={}", MAX_SPI_SPEED_HZ
                    )));
                }
            }
            if bus.dc_pin == bus.rst_pin {
                return Err(ConfigError::Validation("display dc_pin and rst_pin must differ".into()));
            }
        }
    }
    Ok(())
}
