use core::fmt;

/// Columns of the matrix.
pub const WIDTH: usize = 5;
/// Rows of the matrix.
pub const HEIGHT: usize = 5;
pub const PIXEL_COUNT: usize = WIDTH * HEIGHT;

/// Position of a cell along the serial chain.
///
/// Only [`GridLayout::map`] hands these out, so a value is always inside the
/// layout that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysicalIndex(usize);

impl PhysicalIndex {
    pub const fn get(self) -> usize {
        self.0
    }
}

/// The coordinate lies outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfRange {
    pub column: i32,
    pub row: i32,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell ({},{}) is outside the grid", self.column, self.row)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// Width or height is zero.
    Empty,
    /// The cell count does not fit the coordinate or index types.
    TooLarge,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("grid must have at least one row and one column"),
            Self::TooLarge => f.write_str("grid has too many cells"),
        }
    }
}

/// Dimensions of a serpentine-wired matrix.
///
/// The chain starts at the top-left cell, runs left to right along even rows
/// and right to left along odd rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    width: usize,
    height: usize,
}

impl GridLayout {
    pub const MATRIX_5X5: Self = Self {
        width: WIDTH,
        height: HEIGHT,
    };

    pub const fn new(width: usize, height: usize) -> Result<Self, LayoutError> {
        if width == 0 || height == 0 {
            return Err(LayoutError::Empty);
        }
        // Coordinates arrive as i32, so each side has to be addressable by one.
        if width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(LayoutError::TooLarge);
        }
        if width.checked_mul(height).is_none() {
            return Err(LayoutError::TooLarge);
        }
        Ok(Self { width, height })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Translates a grid coordinate into its place on the chain.
    pub fn map(&self, column: i32, row: i32) -> Result<PhysicalIndex, OutOfRange> {
        let out_of_range = OutOfRange { column, row };
        let x = usize::try_from(column).map_err(|_| out_of_range)?;
        let y = usize::try_from(row).map_err(|_| out_of_range)?;
        if x >= self.width || y >= self.height {
            return Err(out_of_range);
        }

        let offset = if y % 2 == 0 { x } else { self.width - 1 - x };
        Ok(PhysicalIndex(y * self.width + offset))
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::MATRIX_5X5
    }
}
