use core::fmt;

use crate::layout::{GridLayout, LayoutError, OutOfRange, PIXEL_COUNT};
use crate::protocol::{self, Color, OFF};
use crate::sink::WordSink;

#[derive(Debug, PartialEq, Eq)]
pub enum InitError<E> {
    /// The layout does not describe exactly the number of slots in the buffer.
    Layout { cells: usize, capacity: usize },
    InvalidLayout(LayoutError),
    Transmit(E),
}

impl<E: fmt::Display> fmt::Display for InitError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout { cells, capacity } => {
                write!(f, "layout has {} cells but the buffer holds {}", cells, capacity)
            }
            Self::InvalidLayout(e) => write!(f, "invalid layout: {}", e),
            Self::Transmit(e) => write!(f, "initial transmit failed: {}", e),
        }
    }
}

impl<E> From<LayoutError> for InitError<E> {
    fn from(e: LayoutError) -> Self {
        Self::InvalidLayout(e)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SetError<E> {
    OutOfRange(OutOfRange),
    Transmit(E),
}

impl<E: fmt::Display> fmt::Display for SetError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(e) => e.fmt(f),
            Self::Transmit(e) => write!(f, "transmit failed: {}", e),
        }
    }
}

/// Colors of every cell on the chain, plus the sink they are written to.
///
/// Any change re-sends the whole frame. Sending needs `&mut self`, so two
/// frames can never be interleaved on the sink.
pub struct FrameBuffer<S, const N: usize> {
    layout: GridLayout,
    pixels: [Color; N],
    sink: S,
}

pub type Matrix5x5<S> = FrameBuffer<S, PIXEL_COUNT>;

impl<S: WordSink> Matrix5x5<S> {
    /// Blanks the 5x5 matrix and hands it back ready for updates.
    pub fn matrix_5x5(sink: S) -> Result<Self, S::Error> {
        let mut buffer = Self {
            layout: GridLayout::MATRIX_5X5,
            pixels: [OFF; PIXEL_COUNT],
            sink,
        };
        buffer.transmit()?;
        Ok(buffer)
    }
}

impl<S: WordSink, const N: usize> FrameBuffer<S, N> {
    /// Builds a zeroed buffer for a `width` by `height` grid and sends it once.
    pub fn initialize(width: usize, height: usize, sink: S) -> Result<Self, InitError<S::Error>> {
        Self::new(GridLayout::new(width, height)?, sink)
    }

    pub fn new(layout: GridLayout, sink: S) -> Result<Self, InitError<S::Error>> {
        if layout.cell_count() != N {
            return Err(InitError::Layout {
                cells: layout.cell_count(),
                capacity: N,
            });
        }

        let mut buffer = Self {
            layout,
            pixels: [OFF; N],
            sink,
        };
        buffer.transmit().map_err(InitError::Transmit)?;
        Ok(buffer)
    }

    /// Lights a cell. Coordinates outside the grid are ignored without sending.
    pub fn set(&mut self, column: i32, row: i32, color: Color) -> Result<(), S::Error> {
        match self.try_set(column, row, color) {
            Ok(()) | Err(SetError::OutOfRange(_)) => Ok(()),
            Err(SetError::Transmit(e)) => Err(e),
        }
    }

    pub fn clear(&mut self, column: i32, row: i32) -> Result<(), S::Error> {
        self.set(column, row, OFF)
    }

    /// Like [`set`](Self::set), but reports coordinates outside the grid.
    pub fn try_set(&mut self, column: i32, row: i32, color: Color) -> Result<(), SetError<S::Error>> {
        let index = self.layout.map(column, row).map_err(SetError::OutOfRange)?;
        self.pixels[index.get()] = color;
        self.transmit().map_err(SetError::Transmit)
    }

    pub fn try_clear(&mut self, column: i32, row: i32) -> Result<(), SetError<S::Error>> {
        self.try_set(column, row, OFF)
    }

    /// Sends every cell, index 0 first.
    pub fn transmit(&mut self) -> Result<(), S::Error> {
        self.sink.begin_frame()?;
        for &color in self.pixels.iter() {
            self.sink.accept(protocol::encode(color))?;
        }
        self.sink.end_frame()
    }

    /// Stored color of a cell.
    pub fn color_at(&self, column: i32, row: i32) -> Result<Color, OutOfRange> {
        let index = self.layout.map(column, row)?;
        Ok(self.pixels[index.get()])
    }

    /// Stored colors in chain order.
    pub fn pixels(&self) -> &[Color; N] {
        &self.pixels
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
