/*
 *  display/drivers/panel.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Software model of the PCD8544 controller fed from the wire
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

use std::io::{self, Write};

use crate::display::framebuffer::{render_ascii, write_pbm, Pixel};
use crate::display::protocol::{cmd, WriteType};
use crate::display::{BANKS, BANK_HEIGHT, BUFFER_SIZE, HEIGHT, WIDTH};

/// Display control setting (D and E bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Blank,
    Normal,
    AllSegmentsOn,
    Inverted,
}

/// What the controller would hold after receiving the same bytes
///
/// Decodes both instruction sets and stores data bytes into display RAM
/// with the controller's address auto-increment.
#[derive(Debug, Clone)]
pub struct PanelModel {
    ram: [u8; BUFFER_SIZE],
    x: u8,
    bank: u8,
    extended: bool,
    vertical: bool,
    powered_down: bool,
    vop: u8,
    bias: u8,
    temperature_coefficient: u8,
    mode: DisplayMode,
}

impl Default for PanelModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelModel {
    /// Power-on state: chip powered down, display blank, RAM cleared
    pub fn new() -> Self {
        Self {
            ram: [0; BUFFER_SIZE],
            x: 0,
            bank: 0,
            extended: false,
            vertical: false,
            powered_down: true,
            vop: 0,
            bias: 0,
            temperature_coefficient: 0,
            mode: DisplayMode::Blank,
        }
    }

    /// Reset pulse. Registers return to power-on values, RAM is kept.
    pub fn reset(&mut self) {
        let ram = self.ram;
        *self = Self { ram, ..Self::new() };
    }

    pub fn feed(&mut self, kind: WriteType, byte: u8) {
        match kind {
            WriteType::Command => self.execute(byte),
            WriteType::Data => self.store(byte),
        }
    }

    fn execute(&mut self, byte: u8) {
        if byte & 0xF8 == cmd::FUNCTION_SET {
            self.powered_down = byte & cmd::POWER_DOWN != 0;
            self.vertical = byte & cmd::ENTRY_MODE_VERTICAL != 0;
            self.extended = byte & cmd::EXTENDED_INSTRUCTION != 0;
        } else if self.extended {
            if byte & cmd::SET_VOP != 0 {
                self.vop = byte & 0x7F;
            } else if byte & 0xF8 == cmd::SET_BIAS {
                self.bias = byte & 0x07;
            } else if byte & 0xFC == cmd::SET_TEMP {
                self.temperature_coefficient = byte & 0x03;
            }
        } else if byte & cmd::SET_X_ADDR != 0 {
            let x = byte & 0x7F;
            if (x as usize) < WIDTH {
                self.x = x;
            }
        } else if byte & 0xF8 == cmd::SET_Y_ADDR {
            let bank = byte & 0x07;
            if (bank as usize) < BANKS {
                self.bank = bank;
            }
        } else if byte & 0xFA == cmd::DISPLAY_CONTROL {
            self.mode = match byte & cmd::DISPLAY_INVERTED {
                cmd::DISPLAY_BLANK => DisplayMode::Blank,
                cmd::DISPLAY_NORMAL => DisplayMode::Normal,
                cmd::DISPLAY_ALL_ON => DisplayMode::AllSegmentsOn,
                _ => DisplayMode::Inverted,
            };
        }
    }

    fn store(&mut self, byte: u8) {
        self.ram[self.bank as usize * WIDTH + self.x as usize] = byte;

        if self.vertical {
            self.bank += 1;
            if self.bank as usize == BANKS {
                self.bank = 0;
                self.x = (self.x + 1) % WIDTH as u8;
            }
        } else {
            self.x += 1;
            if self.x as usize == WIDTH {
                self.x = 0;
                self.bank = (self.bank + 1) % BANKS as u8;
            }
        }
    }

    pub fn ram(&self) -> &[u8; BUFFER_SIZE] {
        &self.ram
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Pixel {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return Pixel::Clear;
        }
        let (x, y) = (x as usize, y as usize);
        Pixel::from(self.ram[(y / BANK_HEIGHT) * WIDTH + x] & (1 << (y % BANK_HEIGHT)) != 0)
    }

    /// Current (column, bank) address counter
    pub fn address(&self) -> (u8, u8) {
        (self.x, self.bank)
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    pub fn is_powered_down(&self) -> bool {
        self.powered_down
    }

    pub fn vop(&self) -> u8 {
        self.vop
    }

    pub fn bias(&self) -> u8 {
        self.bias
    }

    pub fn temperature_coefficient(&self) -> u8 {
        self.temperature_coefficient
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// RAM contents as text, ignoring the display mode
    pub fn to_ascii(&self) -> String {
        render_ascii(&self.ram)
    }

    pub fn write_pbm<W: Write>(&self, out: W) -> io::Result<()> {
        write_pbm(&self.ram, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_commands(panel: &mut PanelModel, bytes: &[u8]) {
        for &b in bytes {
            panel.feed(WriteType::Command, b);
        }
    }

    #[test]
    fn test_decodes_init_commands() {
        let mut panel = PanelModel::new();
        assert!(panel.is_powered_down());

        feed_commands(&mut panel, &[0x21, 0x06, 0x13, 0x80 | 40, 0x20, 0x0C]);
        assert!(!panel.is_powered_down());
        assert!(!panel.is_extended());
        assert_eq!(panel.temperature_coefficient(), 2);
        assert_eq!(panel.bias(), 3);
        assert_eq!(panel.vop(), 40);
        assert_eq!(panel.mode(), DisplayMode::Normal);

        feed_commands(&mut panel, &[0x0D]);
        assert_eq!(panel.mode(), DisplayMode::Inverted);
    }

    #[test]
    fn test_address_commands_depend_on_instruction_set() {
        let mut panel = PanelModel::new();
        feed_commands(&mut panel, &[0x20, 0x80 | 17, 0x43]);
        assert_eq!(panel.address(), (17, 3));

        // in the extended set 0x80 is Vop, not an X address
        feed_commands(&mut panel, &[0x21, 0x80 | 5]);
        assert_eq!(panel.address(), (17, 3));
        assert_eq!(panel.vop(), 5);
    }

    #[test]
    fn test_horizontal_auto_increment_wraps() {
        let mut panel = PanelModel::new();
        feed_commands(&mut panel, &[0x20, 0x80 | 83, 0x40]);
        panel.feed(WriteType::Data, 0xFF);
        panel.feed(WriteType::Data, 0x01);
        assert_eq!(panel.ram()[83], 0xFF);
        assert_eq!(panel.ram()[WIDTH], 0x01);
        assert_eq!(panel.address(), (1, 1));

        feed_commands(&mut panel, &[0x80 | 83, 0x45]);
        panel.feed(WriteType::Data, 0x80);
        assert_eq!(panel.address(), (0, 0));
        assert_eq!(panel.get_pixel(83, 47), Pixel::Set);
    }

    #[test]
    fn test_vertical_addressing() {
        let mut panel = PanelModel::new();
        feed_commands(&mut panel, &[0x22, 0x80 | 2, 0x40]);
        for _ in 0..BANKS {
            panel.feed(WriteType::Data, 0x01);
        }
        assert_eq!(panel.address(), (3, 0));
        assert!((0..BANKS).all(|bank| panel.ram()[bank * WIDTH + 2] == 0x01));
    }

    #[test]
    fn test_reset_keeps_ram() {
        let mut panel = PanelModel::new();
        feed_commands(&mut panel, &[0x20, 0x0C]);
        panel.feed(WriteType::Data, 0xAA);
        panel.reset();
        assert_eq!(panel.ram()[0], 0xAA);
        assert_eq!(panel.mode(), DisplayMode::Blank);
        assert_eq!(panel.address(), (0, 0));
    }
}
