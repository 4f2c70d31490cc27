/*
 *  display/protocol.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  PCD8544 instruction encoding and the reset/init step sequence
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

use crate::display::state::DisplayConfig;

/// PCD8544 instruction bytes
pub mod cmd {
    pub const FUNCTION_SET: u8 = 0x20;
    pub const POWER_DOWN: u8 = 0x04;
    pub const ENTRY_MODE_VERTICAL: u8 = 0x02;
    pub const EXTENDED_INSTRUCTION: u8 = 0x01;

    // basic instruction set (H = 0)
    pub const DISPLAY_CONTROL: u8 = 0x08;
    pub const DISPLAY_BLANK: u8 = 0x00;
    pub const DISPLAY_NORMAL: u8 = 0x04;
    pub const DISPLAY_ALL_ON: u8 = 0x01;
    pub const DISPLAY_INVERTED: u8 = 0x05;
    pub const SET_Y_ADDR: u8 = 0x40;
    pub const SET_X_ADDR: u8 = 0x80;

    // extended instruction set (H = 1)
    pub const SET_TEMP: u8 = 0x04;
    pub const SET_BIAS: u8 = 0x10;
    pub const SET_VOP: u8 = 0x80;
}

/// State of the D/C line for the next byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteType {
    Command,
    Data,
}

/// Logic level on a control pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

pub fn set_x_address(x: u8) -> u8 {
    cmd::SET_X_ADDR | (x & 0x7F)
}

pub fn set_y_address(bank: u8) -> u8 {
    cmd::SET_Y_ADDR | (bank & 0x07)
}

pub fn function_set(extended: bool) -> u8 {
    if extended {
        cmd::FUNCTION_SET | cmd::EXTENDED_INSTRUCTION
    } else {
        cmd::FUNCTION_SET
    }
}

pub fn display_control(inverted: bool) -> u8 {
    if inverted {
        cmd::DISPLAY_CONTROL | cmd::DISPLAY_INVERTED
    } else {
        cmd::DISPLAY_CONTROL | cmd::DISPLAY_NORMAL
    }
}

/// One step of the power-on procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    ResetLow,
    ResetHigh,
    ExtendedInstructions,
    TemperatureCoefficient,
    Bias,
    Contrast,
    BasicInstructions,
    DisplayMode,
}

/// What a step puts on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Reset(Level),
    Command(u8),
}

impl InitStep {
    /// Bring-up order; every init replays it from the top
    pub const SEQUENCE: [InitStep; 8] = [
        InitStep::ResetLow,
        InitStep::ResetHigh,
        InitStep::ExtendedInstructions,
        InitStep::TemperatureCoefficient,
        InitStep::Bias,
        InitStep::Contrast,
        InitStep::BasicInstructions,
        InitStep::DisplayMode,
    ];

    pub fn action(self, config: &DisplayConfig) -> StepAction {
        match self {
            InitStep::ResetLow => StepAction::Reset(Level::Low),
            InitStep::ResetHigh => StepAction::Reset(Level::High),
            InitStep::ExtendedInstructions => StepAction::Command(function_set(true)),
            InitStep::TemperatureCoefficient => {
                StepAction::Command(cmd::SET_TEMP | config.temperature_coefficient.level())
            }
            InitStep::Bias => StepAction::Command(cmd::SET_BIAS | config.bias.level()),
            InitStep::Contrast => StepAction::Command(cmd::SET_VOP | (config.contrast & 0x7F)),
            InitStep::BasicInstructions => StepAction::Command(function_set(false)),
            InitStep::DisplayMode => StepAction::Command(display_control(config.inverted)),
        }
    }

    /// Instruction set the controller is in once this step has run
    pub fn leaves_extended(self, was_extended: bool) -> bool {
        match self {
            InitStep::ResetLow | InitStep::ResetHigh => false,
            InitStep::ExtendedInstructions => true,
            InitStep::BasicInstructions => false,
            _ => was_extended,
        }
    }
}
