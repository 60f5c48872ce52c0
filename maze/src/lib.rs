use rand::SeedableRng;
use rand_wyrand::WyRand;

mod coords;
pub use coords::{Coord, Shape};

mod cell;
pub use cell::{Cell, CellFactory, CellId, Direction, SequentialCells, Walls};

mod grid;
pub use grid::Grid;

pub mod generator;
pub use generator::{GenerateError, GenerateParams, GenerationReport, MazeGenerator};

pub mod pathfinding;
pub use pathfinding::{Path, PathFinder, SearchAlgorithm};

pub mod config;
pub use config::{MazeConfig, PartialMazeConfig};

/// A maze, with its generator and random source
///
/// Only shared references to the grid are handed out, so walls change only
/// through [`Maze::generate`] and [`Maze::generate_preserving`].
/// ```
/// use maze::{Maze, MazeConfig};
///
/// let mut maze = Maze::new(MazeConfig::default());
/// assert!(!maze.is_generated());
/// maze.generate().unwrap();
///
/// let exit = maze.escape_cell().unwrap().coord();
/// let path = maze.find_path_astar((0, 0).into(), exit);
/// assert_eq!(path.len(), maze.find_path_bfs((0, 0).into(), exit).len());
/// ```
pub struct Maze {
    config: MazeConfig,
    grid: Grid,
    generator: MazeGenerator,
    rng: WyRand,
    generated: bool,
    hazards: Vec<Coord>,
}

impl std::fmt::Debug for Maze {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Maze")
            .field("config", &self.config)
            .field("shape", &self.grid.shape())
            .field("generated", &self.generated)
            .field("hazards", &self.hazards)
            .finish_non_exhaustive()
    }
}

impl Maze {
    /// Create a new, still empty, maze
    pub fn new(config: MazeConfig) -> Self {
        Self::with_generator(config, MazeGenerator::default())
    }

    pub fn with_generator(config: MazeConfig, generator: MazeGenerator) -> Self {
        Self {
            grid: Grid::empty(config.cell_size),
            rng: WyRand::seed_from_u64(config.seed),
            config,
            generator,
            generated: false,
            hazards: Vec::new(),
        }
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    /// Whether a generation has completed
    pub fn is_generated(&self) -> bool {
        self.generated
    }
    /// Cells marked as hazards by the last generation
    pub fn hazards(&self) -> &[Coord] {
        &self.hazards
    }

    /// Set the size used by the next generation
    pub fn set_size(&mut self, rows: usize, cols: usize) {
        let clamped = (
            rows.clamp(generator::MIN_SIZE, generator::MAX_SIZE),
            cols.clamp(generator::MIN_SIZE, generator::MAX_SIZE),
        );
        if clamped != (rows, cols) {
            log::warn!(
                "Maze size {rows}x{cols} clamped to {}x{}",
                clamped.0,
                clamped.1
            );
        }
        (self.config.rows, self.config.cols) = clamped;
        log::debug!("Maze size set to {}x{}", clamped.0, clamped.1);
    }

    /// Generate a brand new maze
    pub fn generate(&mut self) -> Result<GenerationReport, GenerateError> {
        self.run(self.config.params())
    }

    /// Generate a new maze, keeping the cell at `keep` and placing the exit
    /// away from it
    pub fn generate_preserving(&mut self, keep: Coord) -> Result<GenerationReport, GenerateError> {
        self.run(
            self.config
                .params()
                .preserving(keep, self.config.exit_min_distance),
        )
    }

    fn run(&mut self, params: GenerateParams) -> Result<GenerationReport, GenerateError> {
        let report = self
            .generator
            .generate(&mut self.grid, &params, &mut self.rng)?;
        let mut avoid = report.preserved.clone();
        avoid.push(report.escape);
        self.hazards = generator::scatter(
            &self.grid,
            self.config.hazard_fraction,
            &avoid,
            &mut self.rng,
        );
        self.generated = true;
        Ok(report)
    }

    pub fn find_path_bfs(&self, start: Coord, goal: Coord) -> Path {
        PathFinder::new(&self.grid).bfs(start, goal)
    }

    pub fn find_path_astar(&self, start: Coord, goal: Coord) -> Path {
        PathFinder::new(&self.grid).astar(start, goal)
    }

    pub fn get_cell(&self, row: isize, col: isize) -> Option<&Cell> {
        self.grid.get(row, col)
    }

    pub fn random_cell(&mut self) -> Option<&Cell> {
        self.grid.random_cell(&mut self.rng)
    }

    pub fn random_edge_cell(&mut self) -> Option<&Cell> {
        self.grid.random_edge_cell(&mut self.rng)
    }

    pub fn escape_cell(&self) -> Option<&Cell> {
        self.grid.escape_cell()
    }

    /// Shortest way out from `from`, empty if there is none
    pub fn reveal_path(&self, from: Coord) -> Path {
        match self.grid.escape_cell() {
            Some(exit) => self.find_path_bfs(from, exit.coord()),
            None => Path::new(),
        }
    }
}
