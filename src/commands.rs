/*
 *  commands.rs
 *
 *  lcd5110 - PCD8544 graphics engine
 *  (c) 2020-26 Stuart Hunter
 *
 *  Command-line subcommands, script files and the demo screen
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

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueHint};
use log::debug;
use thiserror::Error;

use crate::display::dispatch::{DrawCircle, DrawPixel, DrawShape, DrawString, Position, Request};
use crate::display::{FontSize, Pixel};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("cannot read script {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}:{line}: {message}")]
    Script {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Corner pair for lines and rectangles
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ShapeArgs {
    pub x0: u8,
    pub y0: u8,
    pub x1: u8,
    pub y1: u8,
    /// Draw with cleared pixels
    #[arg(long)]
    pub clear: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct CircleArgs {
    #[arg(allow_negative_numbers = true)]
    pub x: i8,
    #[arg(allow_negative_numbers = true)]
    pub y: i8,
    #[arg(allow_negative_numbers = true)]
    pub r: i8,
    /// Draw with cleared pixels
    #[arg(long)]
    pub clear: bool,
}

/// Operations, one per display request
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Blank the framebuffer
    Clear,
    /// Move the cursor and address counters to (0, 0)
    Home,
    /// Set the operating voltage, 0..=127
    Contrast { value: u8 },
    /// Move the text cursor
    Goto { x: u8, y: u8 },
    /// Set or clear one pixel
    Pixel {
        x: u8,
        y: u8,
        #[arg(long)]
        clear: bool,
    },
    /// Line between two points
    Line(ShapeArgs),
    /// Rectangle outline
    Rect(ShapeArgs),
    FillRect(ShapeArgs),
    /// Circle outline around (x, y)
    Circle(CircleArgs),
    FillCircle(CircleArgs),
    /// Write text at the cursor (at most 24 characters)
    Text {
        #[arg(required = true)]
        words: Vec<String>,
        /// 5x7 or 3x5
        #[arg(long, default_value_t = FontSize::Font5x7)]
        font: FontSize,
        /// Clear ink on a set background
        #[arg(long)]
        clear: bool,
    },
    /// Inverse video on, or off with --off
    Invert {
        #[arg(long)]
        off: bool,
    },
    /// Send the whole framebuffer
    SendBuffer,
    /// Send only what changed
    Flush,
    /// Draw a sample screen
    Demo,
    /// Run subcommands from a file, one per line
    Script {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
}

fn pixel(clear: bool) -> Pixel {
    if clear { Pixel::Clear } else { Pixel::Set }
}

impl From<&ShapeArgs> for DrawShape {
    fn from(a: &ShapeArgs) -> Self {
        DrawShape { x0: a.x0, y0: a.y0, x1: a.x1, y1: a.y1, pixel: pixel(a.clear) }
    }
}

impl From<&CircleArgs> for DrawCircle {
    fn from(a: &CircleArgs) -> Self {
        DrawCircle { x: a.x, y: a.y, r: a.r, pixel: pixel(a.clear) }
    }
}

impl Command {
    /// Expand into display requests; scripts are read from disk here
    pub fn to_requests(&self) -> Result<Vec<Request>, CommandError> {
        let request = match self {
            Command::Script { file } => return read_script(file),
            Command::Demo => return Ok(demo_requests()),
            Command::Clear => Request::Clear,
            Command::Home => Request::Home,
            Command::Contrast { value } => Request::SetContrast(*value),
            Command::Goto { x, y } => Request::GotoXY(Position { x: *x, y: *y }),
            Command::Pixel { x, y, clear } => Request::DrawPixel(DrawPixel { x: *x, y: *y, pixel: pixel(*clear) }),
            Command::Line(a) => Request::DrawLine(a.into()),
            Command::Rect(a) => Request::DrawRect(a.into()),
            Command::FillRect(a) => Request::DrawFillRect(a.into()),
            Command::Circle(a) => Request::DrawCircle(a.into()),
            Command::FillCircle(a) => Request::DrawFillCircle(a.into()),
            Command::Text { words, font, clear } => {
                let text = words.join(" ");
                Request::WriteString(DrawString::new(text.trim_matches('"'), pixel(*clear), *font))
            }
            Command::Invert { off } => Request::Invert(!off),
            Command::SendBuffer => Request::SendBuffer,
            Command::Flush => Request::Flush,
        };
        Ok(vec![request])
    }
}

/// One script line, parsed with the same grammar as the command line
#[derive(Debug, Parser)]
#[command(no_binary_name = true)]
struct ScriptLine {
    #[command(subcommand)]
    command: Command,
}

pub fn parse_script(path: &Path, source: &str) -> Result<Vec<Request>, CommandError> {
    let mut requests = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fail = |message: String| CommandError::Script {
            path: path.to_path_buf(),
            line: index + 1,
            message,
        };

        let parsed = ScriptLine::try_parse_from(line.split_whitespace()).map_err(|e| {
            let rendered = e.to_string();
            fail(rendered.lines().next().unwrap_or("parse error").to_string())
        })?;
        if matches!(parsed.command, Command::Script { .. }) {
            return Err(fail("scripts cannot include other scripts".to_string()));
        }
        requests.extend(parsed.command.to_requests()?);
    }

    debug!("{}: {} requests", path.display(), requests.len());
    Ok(requests)
}

fn read_script(path: &Path) -> Result<Vec<Request>, CommandError> {
    let source = fs::read_to_string(path).map_err(|source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(path, &source)
}

/// Sample screen touching every primitive and both fonts
pub fn demo_requests() -> Vec<Request> {
    let shape = |x0, y0, x1, y1| DrawShape { x0, y0, x1, y1, pixel: Pixel::Set };
    vec![
        Request::Clear,
        Request::DrawRect(shape(0, 0, 83, 47)),
        Request::GotoXY(Position { x: 3, y: 3 }),
        Request::WriteString(DrawString::new("lcd5110", Pixel::Set, FontSize::Font5x7)),
        Request::GotoXY(Position { x: 3, y: 13 }),
        Request::WriteString(DrawString::new("PCD8544 84x48", Pixel::Set, FontSize::Font3x5)),
        Request::DrawLine(shape(3, 21, 80, 21)),
        Request::DrawCircle(DrawCircle { x: 16, y: 34, r: 9, pixel: Pixel::Set }),
        Request::DrawFillCircle(DrawCircle { x: 40, y: 34, r: 9, pixel: Pixel::Set }),
        Request::DrawFillRect(shape(56, 26, 78, 43)),
        Request::DrawLine(DrawShape { x0: 56, y0: 26, x1: 78, y1: 43, pixel: Pixel::Clear }),
        Request::SendBuffer,
    ]
}
