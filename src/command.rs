//! Text commands accepted on the serial console.
//!
//! ```text
//! A x y r g b   light cell (x,y) with the given color
//! P x y         clear cell (x,y)
//! ```

use core::fmt;
use core::str::{FromStr, SplitAsciiWhitespace};

use heapless::Vec;

use crate::frame::FrameBuffer;
use crate::protocol::Color;
use crate::sink::WordSink;

pub const BANNER: &str = "=== 5x5 LED matrix control ===\r\n\
Type: A x y r g b  -> light LED\r\n\
      P x y        -> clear LED\r\n";

/// Channel values as typed. Only the low byte of each reaches the LEDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Channels {
    pub red: i32,
    pub green: i32,
    pub blue: i32,
}

impl Channels {
    pub const fn to_color(self) -> Color {
        Color {
            r: (self.red & 0xFF) as u8,
            g: (self.green & 0xFF) as u8,
            b: (self.blue & 0xFF) as u8,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Light { column: i32, row: i32, channels: Channels },
    Clear { column: i32, row: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand(char),
    MissingArgument,
    InvalidNumber,
    TrailingInput,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty command"),
            Self::UnknownCommand(c) => write!(f, "unknown command '{}'", c),
            Self::MissingArgument => f.write_str("missing argument"),
            Self::InvalidNumber => f.write_str("argument is not a number"),
            Self::TrailingInput => f.write_str("too many arguments"),
        }
    }
}

struct Args<'a>(SplitAsciiWhitespace<'a>);

impl Args<'_> {
    fn next<T: FromStr>(&mut self) -> Result<T, ParseError> {
        self.0
            .next()
            .ok_or(ParseError::MissingArgument)?
            .parse()
            .map_err(|_| ParseError::InvalidNumber)
    }

    fn finish(mut self) -> Result<(), ParseError> {
        match self.0.next() {
            Some(_) => Err(ParseError::TrailingInput),
            None => Ok(()),
        }
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_ascii_whitespace();
        let verb = words.next().ok_or(ParseError::Empty)?;
        let mut chars = verb.chars();
        let letter = chars.next().ok_or(ParseError::Empty)?;
        if chars.next().is_some() {
            return Err(ParseError::UnknownCommand(letter));
        }

        let mut args = Args(words);
        let command = match letter {
            'A' => Self::Light {
                column: args.next()?,
                row: args.next()?,
                channels: Channels {
                    red: args.next()?,
                    green: args.next()?,
                    blue: args.next()?,
                },
            },
            'P' => Self::Clear {
                column: args.next()?,
                row: args.next()?,
            },
            other => return Err(ParseError::UnknownCommand(other)),
        };
        args.finish()?;
        Ok(command)
    }

    /// Applies the command to the matrix and returns the confirmation to echo.
    pub fn apply<S: WordSink, const N: usize>(
        &self,
        frame: &mut FrameBuffer<S, N>,
    ) -> Result<Ack, S::Error> {
        match *self {
            Self::Light { column, row, channels } => frame.set(column, row, channels.to_color())?,
            Self::Clear { column, row } => frame.clear(column, row)?,
        }
        Ok(Ack(*self))
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Confirmation printed after a command ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ack(pub Command);

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Command::Light { column, row, channels } => write!(
                f,
                "LED ({},{}) lit with RGB({},{},{})",
                column, row, channels.red, channels.green, channels.blue
            ),
            Command::Clear { column, row } => write!(f, "LED ({},{}) cleared", column, row),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineError {
    /// The line outgrew the buffer and was dropped.
    Overflow,
    /// The line is not valid UTF-8.
    Encoding,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow => f.write_str("line too long"),
            Self::Encoding => f.write_str("line is not valid text"),
        }
    }
}

/// Collects console bytes into lines.
pub struct LineReader<const CAP: usize> {
    buffer: Vec<u8, CAP>,
    overflowed: bool,
    complete: bool,
}

impl<const CAP: usize> LineReader<CAP> {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
            complete: false,
        }
    }

    /// Feeds one byte. Returns a line once a terminator arrives.
    ///
    /// Blank lines are skipped. After an overflow the rest of the line is
    /// discarded and the error is reported at its terminator.
    pub fn push(&mut self, byte: u8) -> Option<Result<&str, LineError>> {
        if self.complete {
            self.buffer.clear();
            self.complete = false;
        }

        if byte != b'\r' && byte != b'\n' {
            if !self.overflowed && self.buffer.push(byte).is_err() {
                self.overflowed = true;
            }
            return None;
        }

        if self.overflowed {
            self.overflowed = false;
            self.buffer.clear();
            return Some(Err(LineError::Overflow));
        }
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            return None;
        }

        self.complete = true;
        Some(core::str::from_utf8(&self.buffer).map_err(|_| LineError::Encoding))
    }
}

impl<const CAP: usize> Default for LineReader<CAP> {
    fn default() -> Self {
        Self::new()
    }
}
