use deepsize::DeepSizeOf;
use serde::{Deserialize, Serialize};

/// Position of a cell in the grid
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    DeepSizeOf,
)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    #[inline(always)]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance between two coordinates
    /// ```
    /// use maze::Coord;
    ///
    /// assert_eq!(Coord::new(1, 4).manhattan(&Coord::new(3, 1)), 5)
    /// ```
    #[inline(always)]
    #[must_use]
    pub const fn manhattan(&self, other: &Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Offset this coordinate, if the result is not negative
    #[inline(always)]
    #[must_use]
    pub fn offset(&self, (drow, dcol): (isize, isize)) -> Option<Coord> {
        Some(Coord {
            row: self.row.checked_add_signed(drow)?,
            col: self.col.checked_add_signed(dcol)?,
        })
    }

    /// Check if the two coordinates are next to each other (no diagonals)
    #[inline(always)]
    #[must_use]
    pub const fn is_adjacent(&self, other: &Coord) -> bool {
        self.manhattan(other) == 1
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// Size of a grid
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, DeepSizeOf)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    #[inline(always)]
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Check if a coordinate is inside this shape
    /// ```
    /// use maze::{Coord, Shape};
    ///
    /// let shape = Shape::new(3, 4);
    /// assert!(shape.contains(&Coord::new(2, 3)));
    /// assert!(!shape.contains(&Coord::new(3, 0)));
    /// ```
    #[inline(always)]
    #[must_use]
    pub const fn contains(&self, coord: &Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Same as `contains`, but accepts out of range signed coordinates
    #[inline(always)]
    #[must_use]
    pub fn checked(&self, row: isize, col: isize) -> Option<Coord> {
        let coord = Coord {
            row: row.try_into().ok()?,
            col: col.try_into().ok()?,
        };
        self.contains(&coord).then_some(coord)
    }

    /// Number of cells
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a coordinate lies on the outer ring
    #[inline(always)]
    #[must_use]
    pub const fn is_edge(&self, coord: &Coord) -> bool {
        self.contains(coord)
            && (coord.row == 0
                || coord.row == self.rows - 1
                || coord.col == 0
                || coord.col == self.cols - 1)
    }

    /// Convert a coordinate to its linearized index
    ///
    /// ```
    /// use maze::{Coord, Shape};
    ///
    /// let shape = Shape::new(3, 4);
    /// assert_eq!(shape.linear(&Coord::new(1, 2)), 6);
    /// ```
    #[inline(always)]
    #[must_use]
    pub const fn linear(&self, coord: &Coord) -> usize {
        debug_assert!(self.contains(coord));
        coord.row * self.cols + coord.col
    }

    /// Convert a linearized index back to a coordinate
    ///
    /// ```
    /// use maze::{Coord, Shape};
    ///
    /// let shape = Shape::new(3, 4);
    /// assert_eq!(shape.delinear(6), Coord::new(1, 2));
    /// ```
    #[inline(always)]
    #[must_use]
    pub const fn delinear(&self, idx: usize) -> Coord {
        debug_assert!(idx < self.len());
        Coord {
            row: idx / self.cols,
            col: idx % self.cols,
        }
    }

    /// All coordinates, in linear order
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.len()).map(move |idx| self.delinear(idx))
    }
}
