/*
 *  display/engine.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  PCD8544 driver - owns framebuffer, cursor, controller state and transport
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

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::Drawable;
use log::{debug, info, warn};

use crate::display::dirty::DirtyRegion;
use crate::display::error::DisplayError;
use crate::display::framebuffer::{FrameBuffer, Pixel};
use crate::display::glyphs::FontSize;
use crate::display::protocol::{self, InitStep, StepAction, WriteType};
use crate::display::raster;
use crate::display::state::{clamp_contrast, Bias, Cursor, DisplayConfig, TemperatureCoefficient};
use crate::display::text;
use crate::display::traits::Transport;
use crate::display::{BANK_HEIGHT, BUFFER_SIZE, WIDTH};

/// Nokia 5110 / PCD8544 engine
///
/// Drawing only touches the framebuffer; nothing reaches the panel until
/// [`flush`](Self::flush) or [`send_buffer`](Self::send_buffer) is called.
/// The dirty region is reset only once a flush has gone out in full, so a
/// failed transfer can simply be retried.
pub struct Pcd8544Driver<T: Transport> {
    transport: T,
    framebuffer: FrameBuffer,
    cursor: Cursor,
    config: DisplayConfig,
}

impl<T: Transport> Pcd8544Driver<T> {
    /// Attach to a transport. The panel is not touched until `init`.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DisplayConfig::default())
    }

    /// Attach with explicit bias, temperature coefficient and invert settings
    pub fn with_config(transport: T, config: DisplayConfig) -> Self {
        Self {
            transport,
            framebuffer: FrameBuffer::new(),
            cursor: Cursor::HOME,
            config: DisplayConfig { extended: false, ..config },
        }
    }

    /// Reset the controller and bring it up with the given contrast
    ///
    /// Replays the full step sequence, then homes the address counters and
    /// pushes a blank framebuffer. Calling it again produces the same wire
    /// traffic and leaves the same configuration behind.
    ///
    /// On a transport failure the framebuffer, dirty region, cursor and
    /// contrast are left as they were; only the instruction-set flag follows
    /// what actually reached the controller.
    pub fn init(&mut self, contrast: u8) -> Result<(), DisplayError> {
        let contrast = self.checked_contrast(contrast);
        let target = DisplayConfig { contrast, ..self.config };

        for step in InitStep::SEQUENCE {
            match step.action(&target) {
                StepAction::Reset(level) => self.transport.set_reset_line(level)?,
                StepAction::Command(byte) => self.transport.write(WriteType::Command, byte)?,
            }
            self.config.extended = step.leaves_extended(self.config.extended);
        }

        self.write_address(0, 0)?;
        self.transport.write_all(WriteType::Data, &[0; BUFFER_SIZE])?;

        self.config.contrast = contrast;
        self.cursor = Cursor::HOME;
        self.framebuffer.clear();
        self.framebuffer.mark_clean();

        info!(
            "PCD8544 initialised: contrast {:#04x}, bias {}, tc {}, {}",
            self.config.contrast,
            self.config.bias.level(),
            self.config.temperature_coefficient.level(),
            if self.config.inverted { "inverted" } else { "normal" }
        );
        Ok(())
    }

    /// Change Vop; values above 127 are clamped
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError> {
        let contrast = self.checked_contrast(contrast);

        self.command(protocol::function_set(true))?;
        self.config.extended = true;
        self.command(protocol::cmd::SET_VOP | contrast)?;
        self.command(protocol::function_set(false))?;
        self.config.extended = false;

        self.config.contrast = contrast;
        info!("Contrast set to {:#04x}", contrast);
        Ok(())
    }

    /// Switch between normal and inverse video
    pub fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        if self.config.extended {
            self.command(protocol::function_set(false))?;
            self.config.extended = false;
        }
        self.command(protocol::display_control(inverted))?;
        self.config.inverted = inverted;
        info!("Display {}", if inverted { "inverted" } else { "normal" });
        Ok(())
    }

    /// Bias and temperature coefficient only take effect on the next `init`
    pub fn set_bias(&mut self, bias: Bias) {
        self.config.bias = bias;
    }

    pub fn set_temperature_coefficient(&mut self, tc: TemperatureCoefficient) {
        self.config.temperature_coefficient = tc;
    }

    pub fn home(&mut self) -> Result<(), DisplayError> {
        self.goto_xy(0, 0)
    }

    /// Move the text cursor and the controller's address counters
    pub fn goto_xy(&mut self, x: i32, y: i32) -> Result<(), DisplayError> {
        let cursor = Cursor::clamped(x, y);
        if (cursor.x, cursor.y) != (x, y) {
            warn!("goto ({}, {}) clamped to ({}, {})", x, y, cursor.x, cursor.y);
        }
        self.write_address(cursor.x as u8, (cursor.y as usize / BANK_HEIGHT) as u8)?;
        self.cursor = cursor;
        Ok(())
    }

    /// Blank the framebuffer; the panel follows on the next flush
    pub fn clear(&mut self) {
        self.framebuffer.clear();
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, pixel: Pixel) {
        self.framebuffer.set_pixel(x, y, pixel);
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Pixel {
        self.framebuffer.get_pixel(x, y)
    }

    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, pixel: Pixel) {
        raster::draw_line(&mut self.framebuffer, x0, y0, x1, y1, pixel);
    }

    pub fn draw_rectangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, pixel: Pixel) {
        raster::draw_rectangle(&mut self.framebuffer, x0, y0, x1, y1, pixel);
    }

    pub fn draw_filled_rectangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, pixel: Pixel) {
        raster::draw_filled_rectangle(&mut self.framebuffer, x0, y0, x1, y1, pixel);
    }

    pub fn draw_circle(&mut self, xc: i32, yc: i32, r: i32, pixel: Pixel) {
        raster::draw_circle(&mut self.framebuffer, xc, yc, r, pixel);
    }

    pub fn draw_filled_circle(&mut self, xc: i32, yc: i32, r: i32, pixel: Pixel) {
        raster::draw_filled_circle(&mut self.framebuffer, xc, yc, r, pixel);
    }

    pub fn put_char(&mut self, c: char, color: Pixel, size: FontSize) {
        text::put_char(&mut self.framebuffer, &mut self.cursor, c, color, size);
    }

    pub fn put_string(&mut self, s: &str, color: Pixel, size: FontSize) {
        text::put_string(&mut self.framebuffer, &mut self.cursor, s, color, size);
    }

    /// Render any embedded-graphics drawable into the framebuffer
    pub fn draw<D>(&mut self, item: &D) -> D::Output
    where
        D: Drawable<Color = BinaryColor>,
    {
        let Ok(output) = item.draw(&mut self.framebuffer);
        output
    }

    /// Send the banks touched since the last flush
    ///
    /// Returns the number of data bytes written, zero when nothing was dirty.
    pub fn flush(&mut self) -> Result<usize, DisplayError> {
        let Some(area) = self.framebuffer.dirty().area() else {
            return Ok(0);
        };

        let mut sent = 0;
        for bank in area.banks() {
            self.write_address(area.x_min, bank)?;
            let start = bank as usize * WIDTH;
            let bytes = &self.framebuffer.as_bytes()[start + area.x_min as usize..=start + area.x_max as usize];
            self.transport.write_all(WriteType::Data, bytes)?;
            sent += bytes.len();
        }

        self.framebuffer.mark_clean();
        debug!(
            "Flushed banks {:?} columns {:?} ({} bytes)",
            area.banks(),
            area.columns(),
            sent
        );
        Ok(sent)
    }

    /// Send the whole framebuffer from (0, 0)
    pub fn send_buffer(&mut self) -> Result<(), DisplayError> {
        self.write_address(0, 0)?;
        self.transport.write_all(WriteType::Data, self.framebuffer.as_bytes())?;
        self.framebuffer.mark_clean();
        debug!("Sent full buffer ({} bytes)", self.framebuffer.as_bytes().len());
        Ok(())
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn config(&self) -> DisplayConfig {
        self.config
    }

    pub fn dirty_region(&self) -> DirtyRegion {
        self.framebuffer.dirty()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Detach, handing the transport back
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn checked_contrast(&self, contrast: u8) -> u8 {
        let clamped = clamp_contrast(contrast);
        if clamped != contrast {
            warn!("Contrast {} out of range, clamped to {}", contrast, clamped);
        }
        clamped
    }

    fn command(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.transport.write(WriteType::Command, byte)?;
        Ok(())
    }

    /// X and Y address commands are basic-set instructions
    fn write_address(&mut self, x: u8, bank: u8) -> Result<(), DisplayError> {
        if self.config.extended {
            self.command(protocol::function_set(false))?;
            self.config.extended = false;
        }
        self.command(protocol::set_y_address(bank))?;
        self.command(protocol::set_x_address(x))
    }
}
