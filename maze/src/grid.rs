use deepsize::DeepSizeOf;
use glam::Vec2;
use rand::Rng;

use crate::{Cell, Coord, Direction, Shape};

/// The grid of cells, single source of truth for the maze topology
///
/// Everything that changes walls needs `&mut Grid`. The [`crate::Maze`]
/// facade only lends out shared references, so during a session the
/// generator is the sole writer.
#[derive(Debug, Clone, DeepSizeOf)]
pub struct Grid {
    shape: Shape,
    /// Side of a cell in world units
    cell_size: f32,
    /// Cells, in linear order
    cells: Box<[Cell]>,
    escape: Option<Coord>,
}

impl Grid {
    /// A grid with no cells, waiting for the first generation
    pub fn empty(cell_size: f32) -> Self {
        Self {
            shape: Shape::default(),
            cell_size,
            cells: Box::new([]),
            escape: None,
        }
    }

    /// Assemble a grid from cells in linear order
    pub(crate) fn from_cells(shape: Shape, cell_size: f32, cells: Box<[Cell]>) -> Self {
        debug_assert_eq!(cells.len(), shape.len());
        debug_assert!(cells
            .iter()
            .enumerate()
            .all(|(i, c)| shape.linear(&c.coord()) == i));
        Self {
            shape,
            cell_size,
            cells,
            escape: None,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }
    pub fn rows(&self) -> usize {
        self.shape.rows
    }
    pub fn cols(&self) -> usize {
        self.shape.cols
    }
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.shape
            .contains(&coord)
            .then(|| &self.cells[self.shape.linear(&coord)])
    }

    pub(crate) fn cell_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        if self.shape.contains(&coord) {
            Some(&mut self.cells[self.shape.linear(&coord)])
        } else {
            None
        }
    }

    /// Cell at a possibly out of range position
    /// ```
    /// use maze::{Grid, MazeGenerator, GenerateParams};
    ///
    /// let mut grid = Grid::empty(1.);
    /// MazeGenerator::default()
    ///     .generate(&mut grid, &GenerateParams::new(3, 3), &mut rand::thread_rng())
    ///     .unwrap();
    /// assert!(grid.get(2, 2).is_some());
    /// assert!(grid.get(-1, 0).is_none());
    /// assert!(grid.get(0, 3).is_none());
    /// ```
    pub fn get(&self, row: isize, col: isize) -> Option<&Cell> {
        self.cell(self.shape.checked(row, col)?)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Take the cells out, leaving the grid empty
    pub(crate) fn take_cells(&mut self) -> Box<[Cell]> {
        self.escape = None;
        self.shape = Shape::default();
        std::mem::take(&mut self.cells)
    }

    /// Grid-adjacent cell in a direction, walls notwithstanding
    pub fn neighbor(&self, coord: Coord, dir: Direction) -> Option<&Cell> {
        self.cell(coord.offset(dir.delta())?)
    }

    /// Adjacent coordinates, in scan order.
    ///
    /// With `ignore_walls` unset only neighbours behind an open wall are listed.
    pub fn neighbors(&self, coord: Coord, ignore_walls: bool) -> Vec<Coord> {
        let Some(cell) = self.cell(coord) else {
            return Vec::new();
        };
        Direction::SCAN_ORDER
            .into_iter()
            .filter(|dir| ignore_walls || !cell.has_wall(*dir))
            .filter_map(|dir| self.neighbor(coord, dir).map(Cell::coord))
            .collect()
    }

    /// Remove the pair of walls between two adjacent cells.
    ///
    /// Returns `false`, leaving the grid untouched, if the cells are not adjacent.
    pub fn remove_wall_between(&mut self, a: Coord, b: Coord) -> bool {
        let Some(dir) = Direction::between(&a, &b) else {
            return false;
        };
        if !(self.shape.contains(&a) && self.shape.contains(&b)) {
            return false;
        }
        self.cells[self.shape.linear(&a)].remove_wall(dir);
        self.cells[self.shape.linear(&b)].remove_wall(dir.opposite());
        true
    }

    /// Check if the wall on one side of a cell leads outside the grid
    pub fn is_outward(&self, coord: Coord, dir: Direction) -> bool {
        self.shape.contains(&coord) && self.neighbor(coord, dir).is_none()
    }

    pub fn is_edge(&self, coord: Coord) -> bool {
        self.shape.is_edge(&coord)
    }

    pub fn edge_cells(&self) -> impl Iterator<Item = &Cell> {
        let shape = self.shape;
        self.cells.iter().filter(move |c| shape.is_edge(&c.coord()))
    }

    pub fn random_cell<R>(&self, rng: &mut R) -> Option<&Cell>
    where
        R: Rng + ?Sized,
    {
        if self.is_empty() {
            return None;
        }
        self.cell(Coord::new(
            rng.gen_range(0..self.shape.rows),
            rng.gen_range(0..self.shape.cols),
        ))
    }

    /// Random boundary cell.
    ///
    /// First the side is chosen, then the position along it. On non square
    /// grids the cells of the shorter sides are more likely.
    pub fn random_edge_cell<R>(&self, rng: &mut R) -> Option<&Cell>
    where
        R: Rng + ?Sized,
    {
        if self.is_empty() {
            return None;
        }
        let Shape { rows, cols } = self.shape;
        let coord = match rng.gen_range(0..4) {
            0 => Coord::new(0, rng.gen_range(0..cols)),
            1 => Coord::new(rng.gen_range(0..rows), cols - 1),
            2 => Coord::new(rows - 1, rng.gen_range(0..cols)),
            _ => Coord::new(rng.gen_range(0..rows), 0),
        };
        self.cell(coord)
    }

    pub fn escape_cell(&self) -> Option<&Cell> {
        self.cell(self.escape?)
    }

    /// Mark the escape cell and open its outward wall
    pub(crate) fn set_escape(&mut self, coord: Coord) -> bool {
        let Shape { rows, cols } = self.shape;
        let outward = if coord.row == 0 {
            Direction::North
        } else if coord.row == rows - 1 {
            Direction::South
        } else if coord.col == 0 {
            Direction::West
        } else if coord.col == cols - 1 {
            Direction::East
        } else {
            log::error!("{coord:?} is not on the boundary, cannot be an exit");
            return false;
        };
        if let Some(old) = self.escape {
            if let Some(old) = self.cell_mut(old) {
                old.is_escape = false;
            }
        }
        let Some(cell) = self.cell_mut(coord) else {
            return false;
        };
        cell.is_escape = true;
        cell.remove_wall(outward);
        self.escape = Some(coord);
        true
    }

    /// Number of open walls between pairs of grid cells.
    ///
    /// The opening of the exit is not counted.
    pub fn open_passages(&self) -> usize {
        self.cells
            .iter()
            .map(|c| {
                [Direction::South, Direction::East]
                    .into_iter()
                    .filter(|d| !c.has_wall(*d) && self.neighbor(c.coord(), *d).is_some())
                    .count()
            })
            .sum()
    }

    /// Check that every pair of adjacent cells agrees on the wall between them
    pub fn walls_symmetric(&self) -> bool {
        self.cells.iter().all(|c| {
            Direction::SCAN_ORDER.into_iter().all(|d| {
                self.neighbor(c.coord(), d)
                    .map_or(true, |n| c.has_wall(d) == n.has_wall(d.opposite()))
            })
        })
    }

    /// World position of the center of a cell
    pub fn center(&self, coord: Coord) -> Vec2 {
        Vec2::new(coord.row as f32, coord.col as f32) * self.cell_size
    }

    /// Cell containing a world position
    pub fn coord_at(&self, pos: Vec2) -> Option<Coord> {
        let [row, col] = (pos / self.cell_size).round().to_array();
        if !(row.is_finite() && col.is_finite()) {
            return None;
        }
        self.shape.checked(row as isize, col as isize)
    }

    pub fn cell_at(&self, pos: Vec2) -> Option<&Cell> {
        self.cell(self.coord_at(pos)?)
    }

    /// Size of the grid in world units
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.shape.rows as f32, self.shape.cols as f32) * self.cell_size
    }
}
