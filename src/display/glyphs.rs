/*
 *  display/glyphs.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed-width bitmap fonts for the 84x48 panel
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

//! Glyphs are stored column-major, one byte per column, bit 0 being the top row.
//! Both tables cover printable ASCII, 0x20 (space) through 0x7E (tilde).

use std::fmt;
use std::str::FromStr;

/// First character code present in the tables
pub const FIRST_GLYPH: u8 = 0x20;

/// Last character code present in the tables
pub const LAST_GLYPH: u8 = 0x7E;

const GLYPH_COUNT: usize = (LAST_GLYPH - FIRST_GLYPH + 1) as usize;

/// Available font sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSize {
    #[default]
    Font5x7,
    Font3x5,
}

impl FontSize {
    /// Glyph width in pixels, spacing not included
    pub const fn width(self) -> i32 {
        match self {
            FontSize::Font5x7 => 5,
            FontSize::Font3x5 => 3,
        }
    }

    /// Glyph height in pixels, spacing not included
    pub const fn height(self) -> i32 {
        match self {
            FontSize::Font5x7 => 7,
            FontSize::Font3x5 => 5,
        }
    }

    /// Horizontal cursor advance per character (glyph plus 1px spacing)
    pub const fn advance(self) -> i32 {
        self.width() + 1
    }

    /// Vertical cursor advance on wrap (glyph plus 1px spacing)
    pub const fn line_height(self) -> i32 {
        self.height() + 1
    }

    /// Column bitmap for `c`; unsupported characters map to a blank glyph
    pub fn glyph(self, c: char) -> &'static [u8] {
        let index = glyph_index(c);
        match self {
            FontSize::Font5x7 => &FONT_5X7[index],
            FontSize::Font3x5 => &FONT_3X5[index],
        }
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSize::Font5x7 => write!(f, "5x7"),
            FontSize::Font3x5 => write!(f, "3x5"),
        }
    }
}

impl FromStr for FontSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5x7" | "large" => Ok(FontSize::Font5x7),
            "3x5" | "small" => Ok(FontSize::Font3x5),
            other => Err(format!("unknown font size '{}' (expected 5x7 or 3x5)", other)),
        }
    }
}

#[inline]
fn glyph_index(c: char) -> usize {
    match u8::try_from(c) {
        Ok(code) if (FIRST_GLYPH..=LAST_GLYPH).contains(&code) => (code - FIRST_GLYPH) as usize,
        _ => 0,
    }
}

pub static FONT_5X7: [[u8; 5]; GLYPH_COUNT] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // space
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x14, 0x08, 0x3E, 0x08, 0x14], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x08, 0x14, 0x22, 0x41, 0x00], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x00, 0x41, 0x22, 0x14, 0x08], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x09, 0x01], // F
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x07, 0x08, 0x70, 0x08, 0x07], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x7F, 0x41, 0x41, 0x00], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x20, 0x54, 0x54, 0x54, 0x78], // a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // b
    [0x38, 0x44, 0x44, 0x44, 0x20], // c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // d
    [0x38, 0x54, 0x54, 0x54, 0x18], // e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // f
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // j
    [0x7F, 0x10, 0x28, 0x44, 0x00], // k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // n
    [0x38, 0x44, 0x44, 0x44, 0x38], // o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // r
    [0x48, 0x54, 0x54, 0x54, 0x20], // s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // w
    [0x44, 0x28, 0x10, 0x28, 0x44], // x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // z
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x10, 0x08, 0x08, 0x10, 0x08], // ~
];

// Lowercase letters reuse the uppercase shapes at this size
pub static FONT_3X5: [[u8; 3]; GLYPH_COUNT] = [
    [0x00, 0x00, 0x00], // space
    [0x00, 0x17, 0x00], // !
    [0x03, 0x00, 0x03], // "
    [0x1F, 0x0A, 0x1F], // #
    [0x12, 0x1F, 0x09], // $
    [0x19, 0x04, 0x13], // %
    [0x0A, 0x15, 0x1A], // &
    [0x00, 0x03, 0x00], // '
    [0x00, 0x0E, 0x11], // (
    [0x11, 0x0E, 0x00], // )
    [0x05, 0x02, 0x05], // *
    [0x04, 0x0E, 0x04], // +
    [0x10, 0x08, 0x00], // ,
    [0x04, 0x04, 0x04], // -
    [0x00, 0x10, 0x00], // .
    [0x18, 0x04, 0x03], // /
    [0x1F, 0x11, 0x1F], // 0
    [0x12, 0x1F, 0x10], // 1
    [0x1D, 0x15, 0x17], // 2
    [0x11, 0x15, 0x1F], // 3
    [0x07, 0x04, 0x1F], // 4
    [0x17, 0x15, 0x1D], // 5
    [0x1F, 0x15, 0x1D], // 6
    [0x01, 0x19, 0x07], // 7
    [0x1F, 0x15, 0x1F], // 8
    [0x17, 0x15, 0x1F], // 9
    [0x00, 0x0A, 0x00], // :
    [0x10, 0x0A, 0x00], // ;
    [0x04, 0x0A, 0x11], // <
    [0x0A, 0x0A, 0x0A], // =
    [0x11, 0x0A, 0x04], // >
    [0x01, 0x15, 0x07], // ?
    [0x0E, 0x15, 0x16], // @
    [0x1E, 0x05, 0x1E], // A
    [0x1F, 0x15, 0x0A], // B
    [0x0E, 0x11, 0x11], // C
    [0x1F, 0x11, 0x0E], // D
    [0x1F, 0x15, 0x11], // E
    [0x1F, 0x05, 0x01], // F
    [0x0E, 0x11, 0x1D], // G
    [0x1F, 0x04, 0x1F], // H
    [0x11, 0x1F, 0x11], // I
    [0x08, 0x10, 0x0F], // J
    [0x1F, 0x04, 0x1B], // K
    [0x1F, 0x10, 0x10], // L
    [0x1F, 0x06, 0x1F], // M
    [0x1F, 0x01, 0x1E], // N
    [0x0E, 0x11, 0x0E], // O
    [0x1F, 0x05, 0x02], // P
    [0x0E, 0x19, 0x16], // Q
    [0x1F, 0x05, 0x1A], // R
    [0x12, 0x15, 0x09], // S
    [0x01, 0x1F, 0x01], // T
    [0x0F, 0x10, 0x1F], // U
    [0x07, 0x18, 0x07], // V
    [0x1F, 0x0C, 0x1F], // W
    [0x1B, 0x04, 0x1B], // X
    [0x03, 0x1C, 0x03], // Y
    [0x19, 0x15, 0x13], // Z
    [0x1F, 0x11, 0x00], // [
    [0x03, 0x04, 0x18], // backslash
    [0x00, 0x11, 0x1F], // ]
    [0x02, 0x01, 0x02], // ^
    [0x10, 0x10, 0x10], // _
    [0x01, 0x02, 0x00], // `
    [0x1E, 0x05, 0x1E], // a
    [0x1F, 0x15, 0x0A], // b
    [0x0E, 0x11, 0x11], // c
    [0x1F, 0x11, 0x0E], // d
    [0x1F, 0x15, 0x11], // e
    [0x1F, 0x05, 0x01], // f
    [0x0E, 0x11, 0x1D], // g
    [0x1F, 0x04, 0x1F], // h
    [0x11, 0x1F, 0x11], // i
    [0x08, 0x10, 0x0F], // j
    [0x1F, 0x04, 0x1B], // k
    [0x1F, 0x10, 0x10], // l
    [0x1F, 0x06, 0x1F], // m
    [0x1F, 0x01, 0x1E], // n
    [0x0E, 0x11, 0x0E], // o
    [0x1F, 0x05, 0x02], // p
    [0x0E, 0x19, 0x16], // q
    [0x1F, 0x05, 0x1A], // r
    [0x12, 0x15, 0x09], // s
    [0x01, 0x1F, 0x01], // t
    [0x0F, 0x10, 0x1F], // u
    [0x07, 0x18, 0x07], // v
    [0x1F, 0x0C, 0x1F], // w
    [0x1B, 0x04, 0x1B], // x
    [0x03, 0x1C, 0x03], // y
    [0x19, 0x15, 0x13], // z
    [0x04, 0x1F, 0x11], // {
    [0x00, 0x1F, 0x00], // |
    [0x11, 0x1F, 0x04], // }
    [0x02, 0x06, 0x04], // ~
];
