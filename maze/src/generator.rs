use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
};

use glam::Vec2;
use rand::{seq::SliceRandom, Rng};

use crate::{Cell, CellFactory, Coord, Direction, Grid, SequentialCells, Shape};

/// Smallest side of a grid
pub const MIN_SIZE: usize = 1;
/// Largest side of a grid
pub const MAX_SIZE: usize = 30;
/// Upper bound for the loop carving density
pub const MAX_LOOP_PROBABILITY: f64 = 0.5;

/// What to generate
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateParams {
    pub rows: usize,
    pub cols: usize,
    /// Side of a cell in world units
    pub cell_size: f32,
    /// Density of extra passages, in `[0, 0.5]`
    pub loop_probability: f64,
    /// Cells carried over from the previous grid
    pub keep: BTreeSet<Coord>,
    /// Keep the exit at least this far (manhattan) from a cell
    pub avoid: Option<(Coord, usize)>,
}

impl GenerateParams {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cell_size: 1.,
            loop_probability: 0.,
            keep: BTreeSet::new(),
            avoid: None,
        }
    }

    #[must_use]
    pub fn with_loops(mut self, loop_probability: f64) -> Self {
        self.loop_probability = loop_probability;
        self
    }

    #[must_use]
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Keep the cell at `coord`, and place the exit away from it
    #[must_use]
    pub fn preserving(mut self, coord: Coord, exit_min_distance: usize) -> Self {
        self.keep.insert(coord);
        self.avoid = Some((coord, exit_min_distance));
        self
    }

    /// Shape and loop density, clamped to the supported ranges
    pub fn clamped(&self) -> (Shape, f64) {
        let shape = Shape::new(
            self.rows.clamp(MIN_SIZE, MAX_SIZE),
            self.cols.clamp(MIN_SIZE, MAX_SIZE),
        );
        if shape != Shape::new(self.rows, self.cols) {
            log::warn!(
                "Requested size {}x{} clamped to {}x{}",
                self.rows,
                self.cols,
                shape.rows,
                shape.cols
            );
        }
        let loop_probability = if self.loop_probability.is_nan() {
            0.
        } else {
            self.loop_probability.clamp(0., MAX_LOOP_PROBABILITY)
        };
        (shape, loop_probability)
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateError {
    #[error("No cell factory available, generation aborted")]
    MissingCellFactory,
    #[error("Could not place an exit on the boundary")]
    NoExit,
}

/// Diagnostics collected while generating
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub shape: Shape,
    /// Cells reached by the carving pass
    pub in_maze: usize,
    /// Open wall sides, counted per cell (the exit included)
    pub removed_walls: usize,
    /// Passages added on top of the spanning tree
    pub loops: usize,
    pub escape: Coord,
    /// Cells carried over from the previous grid
    pub preserved: Vec<Coord>,
}

/// Builds mazes into a [`Grid`]
pub struct MazeGenerator {
    factory: Option<Box<dyn CellFactory + Send>>,
}

impl Default for MazeGenerator {
    fn default() -> Self {
        Self::new(SequentialCells::default())
    }
}

impl Debug for MazeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MazeGenerator")
            .field("has_factory", &self.has_factory())
            .finish()
    }
}

impl MazeGenerator {
    pub fn new(factory: impl CellFactory + Send + 'static) -> Self {
        Self {
            factory: Some(Box::new(factory)),
        }
    }

    /// A generator that will refuse to run
    pub fn without_factory() -> Self {
        Self { factory: None }
    }

    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Rebuild `grid` as a new maze.
    ///
    /// A missing factory is reported before the grid is touched.
    pub fn generate<R>(
        &mut self,
        grid: &mut Grid,
        params: &GenerateParams,
        rng: &mut R,
    ) -> Result<GenerationReport, GenerateError>
    where
        R: Rng + ?Sized,
    {
        let Some(factory) = self.factory.as_deref_mut() else {
            log::error!("No cell factory set, cannot generate");
            return Err(GenerateError::MissingCellFactory);
        };
        let (shape, loop_probability) = params.clamped();
        log::info!("Generating {}x{} maze", shape.rows, shape.cols);

        let preserved = initialize(grid, factory, shape, params.cell_size, &params.keep);
        carve_spanning_tree(grid, rng);
        let loops = if loop_probability > 0. {
            carve_loops(grid, loop_probability, rng)
        } else {
            0
        };
        let escape = place_exit(grid, params.avoid, rng).ok_or(GenerateError::NoExit)?;

        let (in_maze, removed_walls) = verify(grid);
        log::info!(
            "Cells: {in_maze}/{}, walls removed: {removed_walls}, exit at {escape:?}",
            shape.len()
        );
        Ok(GenerationReport {
            shape,
            in_maze,
            removed_walls,
            loops,
            escape,
            preserved,
        })
    }
}

/// Lay out a closed grid, moving the kept cells over from the old one
fn initialize(
    grid: &mut Grid,
    factory: &mut (dyn CellFactory + Send),
    shape: Shape,
    cell_size: f32,
    keep: &BTreeSet<Coord>,
) -> Vec<Coord> {
    let mut kept: BTreeMap<Coord, Cell> = grid
        .take_cells()
        .into_vec()
        .into_iter()
        .filter(|c| keep.contains(&c.coord()) && shape.contains(&c.coord()))
        .map(|c| (c.coord(), c))
        .collect();
    for coord in keep.iter().filter(|c| !kept.contains_key(c)) {
        log::warn!("Cannot preserve {coord:?}: not present in both the old and the new grid");
    }
    let preserved: Vec<Coord> = kept.keys().copied().collect();

    let cells = shape
        .coords()
        .map(|coord| match kept.remove(&coord) {
            Some(mut cell) => {
                log::debug!("Preserved cell restored at {coord:?}");
                cell.reset();
                cell
            }
            None => factory.create_cell(
                coord,
                Vec2::new(coord.row as f32, coord.col as f32) * cell_size,
            ),
        })
        .collect();
    *grid = Grid::from_cells(shape, cell_size, cells);
    preserved
}

/// A pending step of the depth first visit
struct Frame {
    coord: Coord,
    /// Neighbours not yet in the maze when the cell was entered, shuffled
    pending: Vec<Coord>,
    next: usize,
}

impl Frame {
    fn enter<R>(grid: &mut Grid, coord: Coord, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        if let Some(cell) = grid.cell_mut(coord) {
            cell.in_maze = true;
        }
        let mut pending: Vec<Coord> = grid
            .neighbors(coord, true)
            .into_iter()
            .filter(|n| grid.cell(*n).is_some_and(|c| !c.in_maze()))
            .collect();
        pending.shuffle(rng);
        Self {
            coord,
            pending,
            next: 0,
        }
    }
}

/// Randomized depth first carving of a spanning tree
fn carve_spanning_tree<R>(grid: &mut Grid, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let start = Coord::new(
        rng.gen_range(0..grid.rows()),
        rng.gen_range(0..grid.cols()),
    );
    log::debug!("Carving spanning tree from {start:?}");
    let mut stack = vec![Frame::enter(grid, start, rng)];
    while let Some(frame) = stack.last_mut() {
        let Some(&next) = frame.pending.get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;
        let current = frame.coord;
        // it could have been reached by a deeper branch in the meantime
        if grid.cell(next).is_some_and(|c| !c.in_maze()) {
            grid.remove_wall_between(current, next);
            stack.push(Frame::enter(grid, next, rng));
        }
    }
}

/// Open extra passages, returning how many were made
fn carve_loops<R>(grid: &mut Grid, loop_probability: f64, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let target = (grid.shape().len() as f64 * loop_probability).floor() as usize;
    let mut created = 0;
    let mut attempts = 0;
    while attempts < target * 5 && created < target {
        attempts += 1;
        let Some(cell) = grid.random_cell(rng) else {
            continue;
        };
        let coord = cell.coord();
        let first = rng.gen_range(0..Direction::SCAN_ORDER.len());
        let found = (0..Direction::SCAN_ORDER.len())
            .map(|i| Direction::SCAN_ORDER[(first + i) % Direction::SCAN_ORDER.len()])
            .find_map(|dir| {
                let cell = grid.cell(coord)?;
                if !cell.has_wall(dir) {
                    return None;
                }
                grid.neighbor(coord, dir).map(Cell::coord)
            });
        if let Some(neighbor) = found {
            grid.remove_wall_between(coord, neighbor);
            created += 1;
        }
    }
    log::debug!("Created {created}/{target} loops in {attempts} attempts");
    created
}

/// Choose and open the exit
fn place_exit<R>(grid: &mut Grid, avoid: Option<(Coord, usize)>, rng: &mut R) -> Option<Coord>
where
    R: Rng + ?Sized,
{
    let coord = match avoid {
        Some((avoid, min_distance)) if min_distance > 0 => {
            let candidates: Vec<Coord> = grid
                .edge_cells()
                .map(Cell::coord)
                .filter(|c| c.manhattan(&avoid) >= min_distance)
                .collect();
            match candidates.choose(rng) {
                Some(coord) => Some(*coord),
                None => {
                    log::warn!(
                        "No edge cell at distance {min_distance} from {avoid:?}, using any edge cell"
                    );
                    grid.random_edge_cell(rng).map(Cell::coord)
                }
            }
        }
        _ => grid.random_edge_cell(rng).map(Cell::coord),
    }?;
    grid.set_escape(coord).then_some(coord)
}

/// Count the cells in the maze and the open wall sides
fn verify(grid: &Grid) -> (usize, usize) {
    grid.cells().fold((0, 0), |(in_maze, removed), cell| {
        (
            in_maze + usize::from(cell.in_maze()),
            removed + (4 - cell.walls().bits().count_ones() as usize),
        )
    })
}

/// Pick distinct random cells, skipping the ones in `avoid`.
///
/// Aims for `max(1, round(cells * fraction))` cells, giving up after ten
/// attempts per wanted cell.
pub fn scatter<R>(grid: &Grid, fraction: f64, avoid: &[Coord], rng: &mut R) -> Vec<Coord>
where
    R: Rng + ?Sized,
{
    if grid.is_empty() || !(fraction > 0.) {
        return Vec::new();
    }
    let target = ((grid.shape().len() as f64 * fraction).round() as usize).max(1);
    let mut chosen = Vec::with_capacity(target);
    let mut attempts = 0;
    while chosen.len() < target && attempts < target * 10 {
        attempts += 1;
        let Some(coord) = grid.random_cell(rng).map(Cell::coord) else {
            break;
        };
        if avoid.contains(&coord) || chosen.contains(&coord) {
            continue;
        }
        chosen.push(coord);
    }
    log::debug!("Scattered {}/{target} cells", chosen.len());
    chosen
}
