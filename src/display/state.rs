/*
 *  display/state.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Text cursor and controller configuration state
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

use crate::display::{HEIGHT, WIDTH};

/// Highest operating voltage (Vop) setting accepted by the controller
pub const MAX_CONTRAST: u8 = 0x7F;

/// Power-on contrast used when nothing else is configured
pub const DEFAULT_CONTRAST: u8 = 0x46;

/// Text insertion point in pixel coordinates
///
/// `y` may run past the bottom edge after wrapping; glyphs drawn there are
/// clipped by the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub x: i32,
    pub y: i32,
}

impl Cursor {
    pub const HOME: Cursor = Cursor { x: 0, y: 0 };

    /// Cursor clamped onto the panel
    pub fn clamped(x: i32, y: i32) -> Cursor {
        Cursor {
            x: x.clamp(0, WIDTH as i32 - 1),
            y: y.clamp(0, HEIGHT as i32 - 1),
        }
    }
}

/// LCD bias system (multiplex rate), encoded in the low 3 bits of SET_BIAS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bias {
    Bias1To100 = 0,
    Bias1To80 = 1,
    Bias1To65 = 2,
    Bias1To48 = 3,
    Bias1To40 = 4,
    Bias1To24 = 5,
    Bias1To18 = 6,
    Bias1To10 = 7,
}

impl Bias {
    /// Out-of-range levels clamp to the last setting
    pub fn from_level(level: u8) -> Bias {
        match level {
            0 => Bias::Bias1To100,
            1 => Bias::Bias1To80,
            2 => Bias::Bias1To65,
            3 => Bias::Bias1To48,
            4 => Bias::Bias1To40,
            5 => Bias::Bias1To24,
            6 => Bias::Bias1To18,
            _ => Bias::Bias1To10,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Temperature coefficient of Vop, low 2 bits of SET_TEMP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TemperatureCoefficient {
    Tc0 = 0,
    Tc1 = 1,
    Tc2 = 2,
    Tc3 = 3,
}

impl TemperatureCoefficient {
    pub fn from_level(level: u8) -> TemperatureCoefficient {
        match level {
            0 => TemperatureCoefficient::Tc0,
            1 => TemperatureCoefficient::Tc1,
            2 => TemperatureCoefficient::Tc2,
            _ => TemperatureCoefficient::Tc3,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Controller settings replayed by every init
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Vop, 0..=127
    pub contrast: u8,
    pub bias: Bias,
    pub temperature_coefficient: TemperatureCoefficient,
    pub inverted: bool,
    /// Whether the controller is currently in the extended instruction set
    pub extended: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            contrast: DEFAULT_CONTRAST,
            bias: Bias::Bias1To48,
            temperature_coefficient: TemperatureCoefficient::Tc2,
            inverted: false,
            extended: false,
        }
    }
}

/// Clamp a requested contrast into the valid Vop range
pub fn clamp_contrast(value: u8) -> u8 {
    value.min(MAX_CONTRAST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contrast_clamp() {
        assert_eq!(clamp_contrast(0), 0);
        assert_eq!(clamp_contrast(40), 40);
        assert_eq!(clamp_contrast(127), 127);
        assert_eq!(clamp_contrast(200), 127);
    }

    #[test]
    fn test_cursor_clamp() {
        assert_eq!(Cursor::clamped(100, 60), Cursor { x: 83, y: 47 });
        assert_eq!(Cursor::clamped(-3, 12), Cursor { x: 0, y: 12 });
    }

    #[test]
    fn test_level_clamping() {
        assert_eq!(Bias::from_level(3), Bias::Bias1To48);
        assert_eq!(Bias::from_level(42).level(), 7);
        assert_eq!(TemperatureCoefficient::from_level(9).level(), 3);
    }

    #[test]
    fn test_defaults() {
        let config = DisplayConfig::default();
        assert_eq!(config.contrast, 0x46);
        assert_eq!(config.bias.level(), 3);
        assert_eq!(config.temperature_coefficient.level(), 2);
        assert!(!config.inverted);
        assert!(!config.extended);
    }
}
