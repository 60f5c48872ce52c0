use bitflags::bitflags;
use deepsize::DeepSizeOf;
use glam::Vec2;

use crate::Coord;

bitflags! {
    /// Walls around a cell
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Walls: u8 {
        const NORTH = 0b0001;
        const EAST  = 0b0010;
        const SOUTH = 0b0100;
        const WEST  = 0b1000;
    }
}

deepsize::known_deep_size!(0; Walls, Direction);

/// Cardinal directions
///
/// Rows grow toward the south, columns toward the east.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    /// Order used for every neighbour scan.
    ///
    /// Searches break ties in this order, so changing it changes which of two
    /// equally short paths is returned.
    pub const SCAN_ORDER: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[inline(always)]
    #[must_use]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
        }
    }

    #[inline(always)]
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    #[inline(always)]
    #[must_use]
    pub const fn wall(self) -> Walls {
        match self {
            Direction::North => Walls::NORTH,
            Direction::South => Walls::SOUTH,
            Direction::East => Walls::EAST,
            Direction::West => Walls::WEST,
        }
    }

    /// Unit vector in world space (rows along x, columns along y)
    #[inline(always)]
    #[must_use]
    pub const fn vector(self) -> Vec2 {
        match self {
            Direction::North => Vec2::NEG_X,
            Direction::South => Vec2::X,
            Direction::East => Vec2::Y,
            Direction::West => Vec2::NEG_Y,
        }
    }

    /// Direction leading from `from` to the adjacent `to`
    /// ```
    /// use maze::{Coord, Direction};
    ///
    /// assert_eq!(Direction::between(&Coord::new(2, 2), &Coord::new(2, 3)), Some(Direction::East));
    /// assert_eq!(Direction::between(&Coord::new(2, 2), &Coord::new(3, 3)), None);
    /// ```
    #[must_use]
    pub fn between(from: &Coord, to: &Coord) -> Option<Direction> {
        Self::SCAN_ORDER
            .into_iter()
            .find(|dir| from.offset(dir.delta()).as_ref() == Some(to))
    }
}

/// Identity of a materialized cell.
///
/// Survives a preserving regeneration, while the surrounding cells get new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, DeepSizeOf)]
pub struct CellId(pub u64);

/// A single maze cell
#[derive(Debug, Clone, PartialEq, Eq, DeepSizeOf)]
pub struct Cell {
    id: CellId,
    coord: Coord,
    walls: Walls,
    /// Reached by the carving pass
    pub(crate) in_maze: bool,
    pub(crate) is_escape: bool,
}

impl Cell {
    /// A fresh cell, closed on all sides
    pub fn new(id: CellId, coord: Coord) -> Self {
        Self {
            id,
            coord,
            walls: Walls::all(),
            in_maze: false,
            is_escape: false,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }
    pub fn coord(&self) -> Coord {
        self.coord
    }
    pub fn walls(&self) -> Walls {
        self.walls
    }
    pub fn has_wall(&self, dir: Direction) -> bool {
        self.walls.contains(dir.wall())
    }
    pub fn in_maze(&self) -> bool {
        self.in_maze
    }
    pub fn is_escape(&self) -> bool {
        self.is_escape
    }

    pub(crate) fn remove_wall(&mut self, dir: Direction) {
        self.walls -= dir.wall();
    }

    /// Back to the state of a freshly created cell, keeping identity and position
    pub(crate) fn reset(&mut self) {
        self.walls = Walls::all();
        self.in_maze = false;
        self.is_escape = false;
    }
}

/// Materializes the cells of a new grid
///
/// The orchestrator can hook here to attach its own resources to each cell.
pub trait CellFactory {
    fn create_cell(&mut self, coord: Coord, center: Vec2) -> Cell;
}

/// Default factory, handing out increasing ids
#[derive(Debug, Clone, Default)]
pub struct SequentialCells {
    next_id: u64,
}

impl CellFactory for SequentialCells {
    fn create_cell(&mut self, coord: Coord, _center: Vec2) -> Cell {
        let id = CellId(self.next_id);
        self.next_id += 1;
        Cell::new(id, coord)
    }
}
