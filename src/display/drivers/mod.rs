/*
 *  display/drivers/mod.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel transports: SPI hardware, recording mock and controller model
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

// SPI over embedded-hal; Linux binding behind the hardware feature
pub mod spi;

// Mock transport for testing and dry runs
pub mod mock;

// Controller model fed by the mock
pub mod panel;

pub use mock::{MockTransport, WireEvent};
pub use panel::{DisplayMode, PanelModel};
pub use spi::SpiTransport;
#[cfg(feature = "hardware")]
pub use spi::{open_linux, LinuxSpiTransport};
