/*
 *  display/mod.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - framebuffer, rasteriser, text and panel drivers
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod protocol;

// Drawing surface
pub mod dirty;
pub mod framebuffer;
pub mod glyphs;
pub mod raster;
pub mod text;
pub mod state;

// Engine and request dispatch
pub mod engine;
pub mod dispatch;

// Wire transports (SPI hardware and the recording mock)
pub mod drivers;

/// Panel width in pixels
pub const WIDTH: usize = 84;
/// Panel height in pixels
pub const HEIGHT: usize = 48;
/// Rows per controller bank
pub const BANK_HEIGHT: usize = 8;
pub const BANKS: usize = HEIGHT / BANK_HEIGHT;
pub const BUFFER_SIZE: usize = WIDTH * BANKS;
/// Longest string a WriteString request carries
pub const MAX_MESSAGE_LEN: usize = 24;

// Re-exports for convenience
pub use traits::Transport;
pub use error::{DisplayError, TransportError};
pub use protocol::{InitStep, Level, WriteType};
pub use dirty::{Area, DirtyRegion};
pub use framebuffer::{FrameBuffer, Pixel, PixelSink};
pub use glyphs::FontSize;
pub use state::{Bias, Cursor, DisplayConfig, TemperatureCoefficient};
pub use engine::Pcd8544Driver;
pub use dispatch::{Request, SharedDisplay};
