/*
 *  display/dispatch.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Discrete display requests, their byte framing, and the shared dispatcher
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

use std::sync::{Arc, Mutex};

use arrayvec::ArrayVec;
use log::debug;

use crate::display::engine::Pcd8544Driver;
use crate::display::error::DisplayError;
use crate::display::framebuffer::Pixel;
use crate::display::glyphs::FontSize;
use crate::display::traits::Transport;
use crate::display::MAX_MESSAGE_LEN;

/// Request operation codes
pub mod code {
    pub const CLEAR: u8 = 0;
    pub const HOME: u8 = 1;
    pub const SET_CONTRAST: u8 = 2;
    pub const GOTO_XY: u8 = 3;
    pub const DRAW_PIXEL: u8 = 4;
    pub const DRAW_LINE: u8 = 5;
    pub const DRAW_RECT: u8 = 6;
    pub const DRAW_FILL_RECT: u8 = 7;
    pub const DRAW_CIRCLE: u8 = 8;
    pub const DRAW_FILL_CIRCLE: u8 = 9;
    pub const SEND_BUFFER: u8 = 10;
    pub const WRITE_STRING: u8 = 11;
    pub const FLUSH: u8 = 12;
    pub const INVERT: u8 = 13;
}

/// Message field of a WriteString payload, NUL padded
const MESSAGE_FIELD_LEN: usize = MAX_MESSAGE_LEN + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawPixel {
    pub x: u8,
    pub y: u8,
    pub pixel: Pixel,
}

/// Two-corner payload shared by lines and rectangles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawShape {
    pub x0: u8,
    pub y0: u8,
    pub x1: u8,
    pub y1: u8,
    pub pixel: Pixel,
}

/// Circle payload; signed so centres may sit off the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCircle {
    pub x: i8,
    pub y: i8,
    pub r: i8,
    pub pixel: Pixel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawString {
    /// Counted in characters; every payload byte is one glyph cell
    pub message: ArrayVec<char, MAX_MESSAGE_LEN>,
    pub pixel: Pixel,
    pub font: FontSize,
}

impl DrawString {
    /// Keeps as many leading characters of `text` as fit
    pub fn new(text: &str, pixel: Pixel, font: FontSize) -> Self {
        let message = text.chars().take(MAX_MESSAGE_LEN).collect();
        Self { message, pixel, font }
    }

    pub fn text(&self) -> String {
        self.message.iter().collect()
    }
}

/// One operation against the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Clear,
    Home,
    SetContrast(u8),
    GotoXY(Position),
    DrawPixel(DrawPixel),
    DrawLine(DrawShape),
    DrawRect(DrawShape),
    DrawFillRect(DrawShape),
    DrawCircle(DrawCircle),
    DrawFillCircle(DrawCircle),
    SendBuffer,
    WriteString(DrawString),
    Flush,
    Invert(bool),
}

fn pixel_from_byte(byte: u8) -> Pixel {
    Pixel::from(byte != 0)
}

fn font_from_byte(byte: u8) -> FontSize {
    if byte == 0 { FontSize::Font5x7 } else { FontSize::Font3x5 }
}

/// Copy the fixed-size head of a payload
fn take<const N: usize>(payload: &[u8], what: &str) -> Result<[u8; N], DisplayError> {
    payload
        .get(..N)
        .and_then(|head| <[u8; N]>::try_from(head).ok())
        .ok_or_else(|| {
            DisplayError::PayloadCopyFailure(format!("{} needs {} bytes, got {}", what, N, payload.len()))
        })
}

impl Request {
    pub fn code(&self) -> u8 {
        match self {
            Request::Clear => code::CLEAR,
            Request::Home => code::HOME,
            Request::SetContrast(_) => code::SET_CONTRAST,
            Request::GotoXY(_) => code::GOTO_XY,
            Request::DrawPixel(_) => code::DRAW_PIXEL,
            Request::DrawLine(_) => code::DRAW_LINE,
            Request::DrawRect(_) => code::DRAW_RECT,
            Request::DrawFillRect(_) => code::DRAW_FILL_RECT,
            Request::DrawCircle(_) => code::DRAW_CIRCLE,
            Request::DrawFillCircle(_) => code::DRAW_FILL_CIRCLE,
            Request::SendBuffer => code::SEND_BUFFER,
            Request::WriteString(_) => code::WRITE_STRING,
            Request::Flush => code::FLUSH,
            Request::Invert(_) => code::INVERT,
        }
    }

    /// Decode an operation code and its packed payload
    ///
    /// Layouts (all single bytes, pixel 0 = clear, font 0 = 5x7):
    ///
    /// | code | payload |
    /// |---|---|
    /// | SET_CONTRAST | value |
    /// | GOTO_XY | x, y |
    /// | DRAW_PIXEL | x, y, pixel |
    /// | DRAW_LINE, DRAW_RECT, DRAW_FILL_RECT | x0, y0, x1, y1, pixel |
    /// | DRAW_CIRCLE, DRAW_FILL_CIRCLE | x, y, r (signed), pixel |
    /// | WRITE_STRING | message\[25\] (NUL padded), pixel, font |
    /// | INVERT | flag |
    ///
    /// Bytes past the layout are ignored.
    pub fn decode(op: u8, payload: &[u8]) -> Result<Request, DisplayError> {
        let request = match op {
            code::CLEAR => Request::Clear,
            code::HOME => Request::Home,
            code::SET_CONTRAST => {
                let [value] = take::<1>(payload, "SetContrast")?;
                Request::SetContrast(value)
            }
            code::GOTO_XY => {
                let [x, y] = take::<2>(payload, "GotoXY")?;
                Request::GotoXY(Position { x, y })
            }
            code::DRAW_PIXEL => {
                let [x, y, pixel] = take::<3>(payload, "DrawPixel")?;
                Request::DrawPixel(DrawPixel { x, y, pixel: pixel_from_byte(pixel) })
            }
            code::DRAW_LINE | code::DRAW_RECT | code::DRAW_FILL_RECT => {
                let [x0, y0, x1, y1, pixel] = take::<5>(payload, "DrawShape")?;
                let shape = DrawShape { x0, y0, x1, y1, pixel: pixel_from_byte(pixel) };
                match op {
                    code::DRAW_LINE => Request::DrawLine(shape),
                    code::DRAW_RECT => Request::DrawRect(shape),
                    _ => Request::DrawFillRect(shape),
                }
            }
            code::DRAW_CIRCLE | code::DRAW_FILL_CIRCLE => {
                let [x, y, r, pixel] = take::<4>(payload, "DrawCircle")?;
                let circle = DrawCircle {
                    x: x as i8,
                    y: y as i8,
                    r: r as i8,
                    pixel: pixel_from_byte(pixel),
                };
                if op == code::DRAW_CIRCLE {
                    Request::DrawCircle(circle)
                } else {
                    Request::DrawFillCircle(circle)
                }
            }
            code::SEND_BUFFER => Request::SendBuffer,
            code::WRITE_STRING => {
                let raw = take::<{ MESSAGE_FIELD_LEN + 2 }>(payload, "WriteString")?;
                let (message, tail) = raw.split_at(MESSAGE_FIELD_LEN);
                let message = message
                    .iter()
                    .take(MAX_MESSAGE_LEN)
                    .take_while(|&&b| b != 0)
                    .map(|&b| char::from(b))
                    .collect();
                Request::WriteString(DrawString {
                    message,
                    pixel: pixel_from_byte(tail[0]),
                    font: font_from_byte(tail[1]),
                })
            }
            code::FLUSH => Request::Flush,
            code::INVERT => {
                let [flag] = take::<1>(payload, "Invert")?;
                Request::Invert(flag != 0)
            }
            other => return Err(DisplayError::UnsupportedOperation(other)),
        };
        Ok(request)
    }

    /// Carry out the request on an engine
    pub fn apply<T: Transport>(&self, driver: &mut Pcd8544Driver<T>) -> Result<(), DisplayError> {
        match self {
            Request::Clear => driver.clear(),
            Request::Home => driver.home()?,
            Request::SetContrast(value) => driver.set_contrast(*value)?,
            Request::GotoXY(p) => driver.goto_xy(p.x as i32, p.y as i32)?,
            Request::DrawPixel(p) => driver.draw_pixel(p.x as i32, p.y as i32, p.pixel),
            Request::DrawLine(s) => {
                driver.draw_line(s.x0 as i32, s.y0 as i32, s.x1 as i32, s.y1 as i32, s.pixel)
            }
            Request::DrawRect(s) => {
                driver.draw_rectangle(s.x0 as i32, s.y0 as i32, s.x1 as i32, s.y1 as i32, s.pixel)
            }
            Request::DrawFillRect(s) => {
                driver.draw_filled_rectangle(s.x0 as i32, s.y0 as i32, s.x1 as i32, s.y1 as i32, s.pixel)
            }
            Request::DrawCircle(c) => driver.draw_circle(c.x as i32, c.y as i32, c.r as i32, c.pixel),
            Request::DrawFillCircle(c) => {
                driver.draw_filled_circle(c.x as i32, c.y as i32, c.r as i32, c.pixel)
            }
            Request::SendBuffer => driver.send_buffer()?,
            Request::WriteString(s) => {
                for &c in &s.message {
                    driver.put_char(c, s.pixel, s.font);
                }
            }
            Request::Flush => {
                driver.flush()?;
            }
            Request::Invert(on) => driver.set_invert(*on)?,
        }
        Ok(())
    }
}

/// The engine shared between callers
///
/// Each request runs to completion under one lock, so concurrent callers
/// never interleave their drawing or wire traffic.
pub struct SharedDisplay<T: Transport> {
    inner: Arc<Mutex<Pcd8544Driver<T>>>,
}

impl<T: Transport> Clone for SharedDisplay<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Transport> SharedDisplay<T> {
    pub fn new(driver: Pcd8544Driver<T>) -> Self {
        Self { inner: Arc::new(Mutex::new(driver)) }
    }

    pub fn dispatch(&self, request: &Request) -> Result<(), DisplayError> {
        let mut driver = self.inner.lock().map_err(|_| DisplayError::LockPoisoned)?;
        debug!("Dispatching op {} {:?}", request.code(), request);
        request.apply(&mut *driver)
    }

    /// Decode and dispatch; malformed input is rejected before the lock is taken
    pub fn dispatch_raw(&self, op: u8, payload: &[u8]) -> Result<(), DisplayError> {
        let request = Request::decode(op, payload)?;
        self.dispatch(&request)
    }

    /// Run a closure with exclusive access to the engine
    pub fn with<R>(&self, f: impl FnOnce(&mut Pcd8544Driver<T>) -> R) -> Result<R, DisplayError> {
        let mut driver = self.inner.lock().map_err(|_| DisplayError::LockPoisoned)?;
        Ok(f(&mut *driver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::MockTransport;
    use crate::display::state::Cursor;
    use std::thread;

    fn shared() -> (SharedDisplay<MockTransport>, MockTransport) {
        let mock = MockTransport::new();
        let mut driver = Pcd8544Driver::new(mock.clone());
        driver.init(40).unwrap();
        mock.clear_events();
        (SharedDisplay::new(driver), mock)
    }

    #[test]
    fn test_decode_packed_payloads() {
        assert_eq!(Request::decode(code::CLEAR, &[]).unwrap(), Request::Clear);
        assert_eq!(Request::decode(code::SET_CONTRAST, &[40]).unwrap(), Request::SetContrast(40));
        assert_eq!(
            Request::decode(code::DRAW_RECT, &[1, 2, 3, 4, 1]).unwrap(),
            Request::DrawRect(DrawShape { x0: 1, y0: 2, x1: 3, y1: 4, pixel: Pixel::Set })
        );
        assert_eq!(
            Request::decode(code::DRAW_FILL_CIRCLE, &[0xF6, 10, 5, 0]).unwrap(),
            Request::DrawFillCircle(DrawCircle { x: -10, y: 10, r: 5, pixel: Pixel::Clear })
        );
        assert_eq!(Request::decode(code::INVERT, &[1]).unwrap(), Request::Invert(true));

        for op in [code::HOME, code::SEND_BUFFER, code::FLUSH] {
            assert_eq!(Request::decode(op, &[]).unwrap().code(), op);
        }
    }

    #[test]
    fn test_decode_write_string() {
        let mut payload = [0u8; MESSAGE_FIELD_LEN + 2];
        payload[..5].copy_from_slice(b"Hello");
        payload[MESSAGE_FIELD_LEN] = 1;
        payload[MESSAGE_FIELD_LEN + 1] = 1;

        match Request::decode(code::WRITE_STRING, &payload).unwrap() {
            Request::WriteString(s) => {
                assert_eq!(s.text(), "Hello");
                assert_eq!(s.pixel, Pixel::Set);
                assert_eq!(s.font, FontSize::Font3x5);
            }
            other => panic!("unexpected {:?}", other),
        }

        // an unterminated field still stops at 24 characters
        let mut payload = [b'x'; MESSAGE_FIELD_LEN + 2];
        payload[MESSAGE_FIELD_LEN] = 0;
        payload[MESSAGE_FIELD_LEN + 1] = 0;
        match Request::decode(code::WRITE_STRING, &payload).unwrap() {
            Request::WriteString(s) => assert_eq!(s.message.len(), MAX_MESSAGE_LEN),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            Request::decode(code::GOTO_XY, &[1]),
            Err(DisplayError::PayloadCopyFailure(_))
        ));
        assert!(matches!(
            Request::decode(code::WRITE_STRING, b"short"),
            Err(DisplayError::PayloadCopyFailure(_))
        ));
        assert!(matches!(Request::decode(99, &[]), Err(DisplayError::UnsupportedOperation(99))));
    }

    #[test]
    fn test_bad_requests_leave_state_alone() {
        let (display, mock) = shared();
        display.dispatch(&Request::DrawPixel(DrawPixel { x: 1, y: 1, pixel: Pixel::Set })).unwrap();
        let before = display.with(|d| (d.framebuffer().as_bytes().to_vec(), d.dirty_region())).unwrap();

        assert!(display.dispatch_raw(code::DRAW_LINE, &[0, 0, 83]).is_err());
        assert!(display.dispatch_raw(0xEE, &[0; 8]).is_err());

        let after = display.with(|d| (d.framebuffer().as_bytes().to_vec(), d.dirty_region())).unwrap();
        assert_eq!(before, after);
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_draw_string_truncates() {
        let s = DrawString::new(&"abc".repeat(10), Pixel::Set, FontSize::Font5x7);
        assert_eq!(s.message.len(), MAX_MESSAGE_LEN);
        assert_eq!(s.text(), "abc".repeat(8));
    }

    #[test]
    fn test_write_string_request_advances_cursor() {
        let (display, _mock) = shared();
        let request = Request::WriteString(DrawString::new("AB", Pixel::Set, FontSize::Font5x7));
        display.dispatch(&request).unwrap();
        assert_eq!(display.with(|d| d.cursor()).unwrap(), Cursor { x: 12, y: 0 });
    }

    #[test]
    fn test_flush_request_reaches_panel() {
        let (display, mock) = shared();
        display.dispatch_raw(code::DRAW_LINE, &[0, 0, 83, 47, 1]).unwrap();
        display.dispatch_raw(code::FLUSH, &[]).unwrap();

        let fb = display.with(|d| *d.framebuffer().as_bytes()).unwrap();
        assert_eq!(mock.panel().ram(), &fb);
    }

    #[test]
    fn test_high_bytes_count_as_one_cell_each() {
        let (display, _mock) = shared();
        let mut payload = [0xB0u8; MESSAGE_FIELD_LEN + 2];
        payload[MAX_MESSAGE_LEN] = 0;
        payload[MESSAGE_FIELD_LEN] = 1;
        payload[MESSAGE_FIELD_LEN + 1] = 1;

        match Request::decode(code::WRITE_STRING, &payload).unwrap() {
            Request::WriteString(s) => assert_eq!(s.message.len(), MAX_MESSAGE_LEN),
            other => panic!("unexpected {:?}", other),
        }

        // 21 cells of 3x5 fill the first row, the last 3 wrap onto the next
        display.dispatch_raw(code::WRITE_STRING, &payload).unwrap();
        assert_eq!(display.with(|d| d.cursor()).unwrap(), Cursor { x: 12, y: 6 });
    }

    #[test]
    fn test_draw_string_counts_characters() {
        let s = DrawString::new(&"é".repeat(30), Pixel::Set, FontSize::Font5x7);
        assert_eq!(s.message.len(), MAX_MESSAGE_LEN);
        assert_eq!(s.text().chars().count(), MAX_MESSAGE_LEN);
    }

    #[test]
    fn test_concurrent_dispatch_is_serialised() {
        let (display, mock) = shared();

        let handles: Vec<_> = (0..4u8)
            .map(|t| {
                let display = display.clone();
                thread::spawn(move || {
                    for x in 0..84u8 {
                        let row = Request::DrawPixel(DrawPixel { x, y: t * 12, pixel: Pixel::Set });
                        display.dispatch(&row).unwrap();
                    }
                    display.dispatch(&Request::Flush).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let fb = display.with(|d| *d.framebuffer().as_bytes()).unwrap();
        assert_eq!(display.with(|d| d.framebuffer().count_set_pixels()).unwrap(), 4 * 84);
        assert_eq!(mock.panel().ram(), &fb);
    }
}
