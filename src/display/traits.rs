/*
 *  display/traits.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Wire transport abstraction between the engine and the panel
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

use crate::display::error::TransportError;
use crate::display::protocol::{Level, WriteType};

/// Minimal hardware abstraction - every panel connection implements this
///
/// The engine only ever needs three primitives: select command or data mode,
/// clock out one byte, and drive the reset line. Everything above that
/// (instruction encoding, addressing, flushing) lives in the engine so it is
/// identical for real hardware and the test mock.
pub trait Transport: Send {
    /// Drive the D/C line; Command is low, Data is high
    fn set_control_line(&mut self, kind: WriteType) -> Result<(), TransportError>;

    /// Clock one byte out with chip-enable asserted around it
    fn transfer_byte(&mut self, byte: u8) -> Result<(), TransportError>;

    /// Drive the active-low reset line
    fn set_reset_line(&mut self, level: Level) -> Result<(), TransportError>;

    /// Select the mode and send one byte
    fn write(&mut self, kind: WriteType, byte: u8) -> Result<(), TransportError> {
        self.set_control_line(kind)?;
        self.transfer_byte(byte)
    }

    /// Send a run of bytes in one mode
    ///
    /// The default selects the mode once and then sends byte by byte;
    /// transports with a burst path may override it.
    fn write_all(&mut self, kind: WriteType, bytes: &[u8]) -> Result<(), TransportError> {
        self.set_control_line(kind)?;
        for &byte in bytes {
            self.transfer_byte(byte)?;
        }
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn set_control_line(&mut self, kind: WriteType) -> Result<(), TransportError> {
        (**self).set_control_line(kind)
    }

    fn transfer_byte(&mut self, byte: u8) -> Result<(), TransportError> {
        (**self).transfer_byte(byte)
    }

    fn set_reset_line(&mut self, level: Level) -> Result<(), TransportError> {
        (**self).set_reset_line(level)
    }

    fn write_all(&mut self, kind: WriteType, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).write_all(kind, bytes)
    }
}
