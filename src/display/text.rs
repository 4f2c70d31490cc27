/*
 *  display/text.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Glyph blitting and cursor advance
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

use log::warn;

use crate::display::framebuffer::{Pixel, PixelSink};
use crate::display::glyphs::FontSize;
use crate::display::state::Cursor;
use crate::display::{MAX_MESSAGE_LEN, WIDTH};

/// Draw one character at the cursor and advance it
///
/// The glyph cell (glyph plus the spacing row below it) is painted in full:
/// with `color` Set the ink is set and the background cleared, with Clear
/// the polarity flips. The spacing column is left alone.
pub fn put_char<S: PixelSink + ?Sized>(sink: &mut S, cursor: &mut Cursor, c: char, color: Pixel, size: FontSize) {
    if cursor.x + size.advance() > WIDTH as i32 {
        cursor.x = 0;
        cursor.y = cursor.y.saturating_add(size.line_height());
    }

    for (col, &bits) in size.glyph(c).iter().enumerate() {
        let x = cursor.x + col as i32;
        for row in 0..size.line_height() {
            let ink = bits & (1 << row) != 0;
            sink.set_pixel(x, cursor.y + row, if ink { color } else { !color });
        }
    }

    cursor.x += size.advance();
}

/// Draw up to `MAX_MESSAGE_LEN` characters; the rest are dropped
pub fn put_string<S: PixelSink + ?Sized>(sink: &mut S, cursor: &mut Cursor, s: &str, color: Pixel, size: FontSize) {
    let count = s.chars().count();
    if count > MAX_MESSAGE_LEN {
        warn!("Truncating {}-character message to {}", count, MAX_MESSAGE_LEN);
    }
    for c in s.chars().take(MAX_MESSAGE_LEN) {
        put_char(sink, cursor, c, color, size);
    }
}
