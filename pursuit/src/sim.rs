//! Headless chase: a runner heading for the exit, an agent after it

use glam::Vec2;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_wyrand::WyRand;
use serde::{Deserialize, Serialize};

use maze::{Coord, GenerateError, Maze, MazeConfig, Path, PathFinder};

use crate::{ChaseError, GridWorld, PursuitAgent, PursuitConfig, TargetId};

/// The runner is the only target of a simulation
pub const RUNNER: TargetId = TargetId(0);

/// Settings of a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seconds per tick
    pub dt: f32,
    /// Seconds before the run is called off
    pub max_time: f32,
    /// World units per second, 0 for a runner that stands still
    pub runner_speed: f32,
    /// Least walking distance, in cells, between the agent and the runner at start
    pub spawn_min_cells: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1. / 30.,
            max_time: 300.,
            runner_speed: 200.,
            spawn_min_cells: 5,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    #[error("While generating the maze")]
    Generate(#[from] GenerateError),
    #[error("While starting the chase")]
    Chase(#[from] ChaseError),
    #[error("The tick length must be positive and the time limit finite")]
    InvalidTiming,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// The agent got the runner
    Caught,
    /// The runner reached the exit
    Escaped,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub seed: u64,
    pub outcome: Outcome,
    /// Simulated seconds
    pub time: f32,
    /// Walking distance between the agent and the runner at start
    pub spawn_distance: usize,
}

/// A target walking the shortest way out
#[derive(Debug, Clone)]
pub struct Runner {
    position: Vec2,
    path: Path,
    next: usize,
    speed: f32,
}

impl Runner {
    pub fn new(maze: &Maze, start: Coord, speed: f32) -> Self {
        Self {
            position: maze.grid().center(start),
            path: maze.reveal_path(start),
            next: 1,
            speed,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Reached the escape cell
    pub fn escaped(&self) -> bool {
        !self.path.is_empty() && self.next >= self.path.len()
    }

    pub fn step(&mut self, dt: f32, maze: &Maze) {
        let mut budget = self.speed * dt;
        while budget > 0. {
            let Some(&next) = self.path.get(self.next) else {
                return;
            };
            let goal = maze.grid().center(next);
            let distance = self.position.distance(goal);
            if distance <= budget {
                self.position = goal;
                self.next += 1;
                budget -= distance;
            } else {
                self.position += (goal - self.position) / distance * budget;
                budget = 0.;
            }
        }
    }
}

/// One chase, from spawn to outcome
#[derive(Debug)]
pub struct Simulation {
    maze: Maze,
    runner: Runner,
    agent: PursuitAgent,
    config: SimConfig,
    time: f32,
    spawn_distance: usize,
}

impl Simulation {
    /// Generate the maze and place the runner and the agent
    pub fn new(
        maze: MazeConfig,
        pursuit: PursuitConfig,
        config: SimConfig,
    ) -> Result<Self, SimError> {
        if !(config.dt > 0. && config.dt.is_finite()) || !config.max_time.is_finite() {
            log::error!("Invalid timing: dt = {}, max_time = {}", config.dt, config.max_time);
            return Err(SimError::InvalidTiming);
        }
        let seed = maze.seed;
        let mut maze = Maze::new(maze);
        maze.generate()?;
        let mut rng = WyRand::seed_from_u64(seed.wrapping_add(1));

        let grid = maze.grid();
        let escape = grid.escape_cell().map(|c| c.coord());
        let start = grid
            .shape()
            .coords()
            .filter(|c| Some(*c) != escape)
            .collect::<Vec<_>>()
            .choose(&mut rng)
            .copied()
            .unwrap_or_default();
        let (spawn, spawn_distance) = spawn_point(&maze, start, config.spawn_min_cells, &mut rng);
        log::info!(
            "Runner at {start:?}, agent at {spawn:?}, {spawn_distance} cells apart, exit at {escape:?}"
        );

        let runner = Runner::new(&maze, start, config.runner_speed);
        let mut agent = PursuitAgent::new(pursuit, maze.grid().center(spawn));
        {
            let world = GridWorld::new(maze.grid()).with_target(RUNNER, runner.position());
            agent.start_chasing(RUNNER, maze.grid(), &world)?;
        }

        Ok(Self {
            maze,
            runner,
            agent,
            config,
            time: 0.,
            spawn_distance,
        })
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }
    pub fn runner(&self) -> &Runner {
        &self.runner
    }
    pub fn agent(&self) -> &PursuitAgent {
        &self.agent
    }
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advance by one tick, returning the outcome once there is one
    pub fn step(&mut self) -> Option<Outcome> {
        let dt = self.config.dt;
        self.runner.step(dt, &self.maze);
        if self.runner.escaped() {
            return Some(Outcome::Escaped);
        }
        let world = GridWorld::new(self.maze.grid()).with_target(RUNNER, self.runner.position());
        self.agent.tick(dt, self.maze.grid(), &world);
        self.time += dt;
        if self.agent.has_caught_target(&world) {
            Some(Outcome::Caught)
        } else if self.time >= self.config.max_time {
            Some(Outcome::TimedOut)
        } else {
            None
        }
    }

    /// Step until there is an outcome
    pub fn run(mut self) -> SimReport {
        let outcome = loop {
            if let Some(outcome) = self.step() {
                break outcome;
            }
        };
        log::info!("{outcome:?} after {:.1}s", self.time);
        SimReport {
            seed: self.maze.config().seed,
            outcome,
            time: self.time,
            spawn_distance: self.spawn_distance,
        }
    }
}

/// A cell at least `min_cells` steps from `from`, or the farthest one
fn spawn_point<R>(maze: &Maze, from: Coord, min_cells: usize, rng: &mut R) -> (Coord, usize)
where
    R: Rng + ?Sized,
{
    let grid = maze.grid();
    let distances: Vec<(Coord, usize)> = PathFinder::new(grid)
        .distances(from)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, d)| Some((grid.shape().delinear(idx), d?)))
        .collect();
    let far: Vec<_> = distances
        .iter()
        .filter(|(_, d)| *d >= min_cells)
        .copied()
        .collect();
    match far.choose(rng) {
        Some(spawn) => *spawn,
        None => {
            log::warn!("No cell {min_cells} steps away from {from:?}, using the farthest");
            distances
                .into_iter()
                .max_by_key(|(_, d)| *d)
                .unwrap_or((from, 0))
        }
    }
}
