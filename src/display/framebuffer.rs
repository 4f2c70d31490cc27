/*
 *  display/framebuffer.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bit-packed, bank-organised framebuffer with dirty-region tracking
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

use core::convert::Infallible;
use std::io::{self, Write};
use std::ops::Not;

use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::display::dirty::DirtyRegion;
use crate::display::{BANKS, BANK_HEIGHT, BUFFER_SIZE, HEIGHT, WIDTH};

/// Logical pixel value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pixel {
    #[default]
    Clear,
    Set,
}

impl Pixel {
    pub fn is_set(self) -> bool {
        self == Pixel::Set
    }
}

impl Not for Pixel {
    type Output = Pixel;

    fn not(self) -> Pixel {
        match self {
            Pixel::Clear => Pixel::Set,
            Pixel::Set => Pixel::Clear,
        }
    }
}

impl From<bool> for Pixel {
    fn from(on: bool) -> Self {
        if on { Pixel::Set } else { Pixel::Clear }
    }
}

impl From<BinaryColor> for Pixel {
    fn from(color: BinaryColor) -> Self {
        Pixel::from(color.is_on())
    }
}

impl From<Pixel> for BinaryColor {
    fn from(pixel: Pixel) -> Self {
        if pixel.is_set() { BinaryColor::On } else { BinaryColor::Off }
    }
}

/// Anything the raster and text routines can plot into
///
/// Coordinates are signed and unclipped; implementations decide what to do
/// with points that fall off the surface.
pub trait PixelSink {
    fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel);
}

/// 84x48 monochrome framebuffer, 6 banks of 84 column bytes
///
/// Byte `bank * WIDTH + x` holds rows `bank * 8 ..= bank * 8 + 7` of column
/// `x`, least significant bit on top. This is the controller's own RAM
/// layout, so banks can be streamed to the panel unchanged.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    bytes: [u8; BUFFER_SIZE],
    dirty: DirtyRegion,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            bytes: [0; BUFFER_SIZE],
            dirty: DirtyRegion::Empty,
        }
    }

    /// Map (x,y) to (byte index, bit mask); None if out of bounds
    #[inline]
    fn locate(x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some(((y / BANK_HEIGHT) * WIDTH + x, 1 << (y % BANK_HEIGHT)))
    }

    /// Set or clear one pixel. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel) {
        let Some((index, mask)) = Self::locate(x, y) else {
            return;
        };
        match pixel {
            Pixel::Set => self.bytes[index] |= mask,
            Pixel::Clear => self.bytes[index] &= !mask,
        }
        self.dirty.include(x as u8, y as u8);
    }

    /// Read one pixel; anything off the surface reads as Clear
    pub fn get_pixel(&self, x: i32, y: i32) -> Pixel {
        match Self::locate(x, y) {
            Some((index, mask)) => Pixel::from(self.bytes[index] & mask != 0),
            None => Pixel::Clear,
        }
    }

    /// Zero the buffer and mark the whole surface dirty so the panel is
    /// wiped on the next flush
    pub fn clear(&mut self) {
        self.bytes.fill(0);
        self.dirty.mark_all();
    }

    pub fn dirty(&self) -> DirtyRegion {
        self.dirty
    }

    /// Only the engine marks the buffer clean, after a successful flush
    pub(crate) fn mark_clean(&mut self) {
        self.dirty.reset();
    }

    /// Raw controller-layout bytes
    pub fn as_bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.bytes
    }

    /// Column byte `x` of `bank`, None past the last bank or column
    pub fn bank_byte(&self, bank: u8, x: u8) -> Option<u8> {
        if bank as usize >= BANKS || x as usize >= WIDTH {
            return None;
        }
        Some(self.bytes[bank as usize * WIDTH + x as usize])
    }

    pub fn count_set_pixels(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Text preview, one line per row, '#' for set pixels
    pub fn to_ascii(&self) -> String {
        render_ascii(&self.bytes)
    }

    /// Save the framebuffer as a plain PBM (P1) image
    pub fn write_pbm<W: Write>(&self, out: W) -> io::Result<()> {
        write_pbm(&self.bytes, out)
    }
}

impl PixelSink for FrameBuffer {
    fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel) {
        FrameBuffer::set_pixel(self, x, y, pixel);
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

// embedded-graphics drawing goes through set_pixel so it is dirty-tracked too
impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = embedded_graphics::Pixel<Self::Color>>,
    {
        for embedded_graphics::Pixel(p, color) in pixels {
            FrameBuffer::set_pixel(self, p.x, p.y, color.into());
        }
        Ok(())
    }
}

/// Shared by the framebuffer and the emulated panel RAM, which use the same layout
pub(crate) fn render_ascii(bytes: &[u8; BUFFER_SIZE]) -> String {
    let mut out = String::with_capacity((WIDTH + 1) * HEIGHT);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let byte = bytes[(y / BANK_HEIGHT) * WIDTH + x];
            out.push(if byte & (1 << (y % BANK_HEIGHT)) != 0 { '#' } else { '.' });
        }
        out.push('\n');
    }
    out
}

pub(crate) fn write_pbm<W: Write>(bytes: &[u8; BUFFER_SIZE], mut out: W) -> io::Result<()> {
    writeln!(out, "P1")?;
    writeln!(out, "{} {}", WIDTH, HEIGHT)?;
    for y in 0..HEIGHT {
        let row: Vec<&str> = (0..WIDTH)
            .map(|x| {
                let byte = bytes[(y / BANK_HEIGHT) * WIDTH + x];
                if byte & (1 << (y % BANK_HEIGHT)) != 0 { "1" } else { "0" }
            })
            .collect();
        writeln!(out, "{}", row.join(" "))?;
    }
    Ok(())
}

const _: () = assert!(BANKS * WIDTH == BUFFER_SIZE);
