use glam::Vec2;

use maze::{Coord, Grid, Path, PathFinder};

use crate::{steering, Environment, PursuitConfig, TargetId};

/// Number of leading waypoints compared when a new path comes in
const REPLAN_PREFIX: usize = 3;
/// Walking straight, the agent stops this close to the waypoint
const LEGACY_STOP_DISTANCE: f32 = 10.;
const STEERING_TURN_RATE: f32 = 10.;
const LEGACY_TURN_RATE: f32 = 20.;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChaseState {
    #[default]
    Idle,
    Chasing,
    Stopped,
    /// Still chasing, with the target in reach
    Caught,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaseError {
    #[error("Target {0:?} cannot be located")]
    UnknownTarget(TargetId),
    #[error("The maze has not been generated")]
    MazeNotReady,
}

/// An agent chasing a target through a maze
///
/// The path is searched periodically over the grid cells, and followed either
/// walking straight between the waypoints or through the steering blend.
#[derive(Debug, Clone)]
pub struct PursuitAgent {
    config: PursuitConfig,
    position: Vec2,
    facing: Vec2,
    state: ChaseState,
    target: Option<TargetId>,
    path: Path,
    waypoint: usize,
    replan_timer: f32,
    steering_timer: f32,
    /// Last steering output, applied between updates
    direction: Vec2,
    last_target_position: Option<Vec2>,
    target_velocity: Vec2,
}

impl PursuitAgent {
    pub fn new(config: PursuitConfig, position: Vec2) -> Self {
        Self {
            config,
            position,
            facing: Vec2::X,
            state: ChaseState::Idle,
            target: None,
            path: Path::new(),
            waypoint: 0,
            replan_timer: 0.,
            steering_timer: 0.,
            direction: Vec2::ZERO,
            last_target_position: None,
            target_velocity: Vec2::ZERO,
        }
    }

    pub fn config(&self) -> &PursuitConfig {
        &self.config
    }
    pub fn position(&self) -> Vec2 {
        self.position
    }
    /// Move the agent, as when it is respawned
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
    pub fn facing(&self) -> Vec2 {
        self.facing
    }
    pub fn state(&self) -> ChaseState {
        self.state
    }
    pub fn target(&self) -> Option<TargetId> {
        self.target
    }
    pub fn path(&self) -> &[Coord] {
        &self.path
    }
    pub fn waypoint_index(&self) -> usize {
        self.waypoint
    }
    pub fn current_waypoint(&self) -> Option<Coord> {
        self.path.get(self.waypoint).copied()
    }
    /// Target velocity, as seen over the last tick
    pub fn target_velocity(&self) -> Vec2 {
        self.target_velocity
    }

    pub fn is_chasing(&self) -> bool {
        matches!(self.state, ChaseState::Chasing | ChaseState::Caught)
    }

    /// Start chasing `target`, searching a first path right away
    pub fn start_chasing<E>(
        &mut self,
        target: TargetId,
        grid: &Grid,
        env: &E,
    ) -> Result<(), ChaseError>
    where
        E: Environment + ?Sized,
    {
        if grid.is_empty() {
            log::error!("Cannot start chasing: the maze is not generated");
            return Err(ChaseError::MazeNotReady);
        }
        let Some(target_position) = env.locate(target) else {
            log::error!("Cannot start chasing: {target:?} not found");
            return Err(ChaseError::UnknownTarget(target));
        };
        self.target = Some(target);
        self.state = ChaseState::Chasing;
        self.last_target_position = Some(target_position);
        self.target_velocity = Vec2::ZERO;
        self.replan(grid, target_position);
        self.update_caught(target_position);
        log::info!("Started chasing {target:?}");
        Ok(())
    }

    pub fn stop_chasing(&mut self) {
        self.state = ChaseState::Stopped;
        self.path.clear();
        self.waypoint = 0;
        log::info!("Stopped chasing");
    }

    /// Re-arm an agent freshly placed in `env`
    ///
    /// The target is resolved again, and all the chasing state is dropped.
    pub fn initialize<E>(&mut self, env: &E)
    where
        E: Environment + ?Sized,
    {
        self.target = env.default_target();
        if self.target.is_none() {
            log::warn!("No target to chase after initialization");
        }
        self.path.clear();
        self.waypoint = 0;
        self.replan_timer = 0.;
        self.steering_timer = 0.;
        self.direction = Vec2::ZERO;
        self.last_target_position = self.target.and_then(|t| env.locate(t));
        self.target_velocity = Vec2::ZERO;
        self.state = ChaseState::Chasing;
        log::debug!("Agent initialized, chasing {:?}", self.target);
    }

    /// Whether the target is within `catch_distance` right now
    pub fn has_caught_target<E>(&self, env: &E) -> bool
    where
        E: Environment + ?Sized,
    {
        self.target
            .and_then(|t| env.locate(t))
            .is_some_and(|t| self.in_reach(t))
    }

    fn in_reach(&self, target_position: Vec2) -> bool {
        target_position.distance(self.position) < self.config.catch_distance
    }

    /// Advance the agent by `dt` seconds
    pub fn tick<E>(&mut self, dt: f32, grid: &Grid, env: &E)
    where
        E: Environment + ?Sized,
    {
        if !self.is_chasing() || !(dt > 0.) {
            return;
        }
        let Some(target) = self.target else {
            return;
        };
        let Some(target_position) = env.locate(target) else {
            log::debug!("{target:?} lost, holding position");
            return;
        };
        if let Some(last) = self.last_target_position {
            self.target_velocity = (target_position - last) / dt;
        }
        self.last_target_position = Some(target_position);

        self.replan_timer += dt;
        if self.replan_timer >= self.config.path_update_interval {
            self.replan_timer = 0.;
            self.replan(grid, target_position);
        }

        self.follow_path(dt, grid, env, target_position);
        self.update_caught(target_position);
    }

    fn replan(&mut self, grid: &Grid, target_position: Vec2) {
        let (Some(from), Some(to)) = (grid.coord_at(self.position), grid.coord_at(target_position))
        else {
            log::warn!("Could not determine the cells to search a path between");
            return;
        };
        let path = PathFinder::new(grid).astar(from, to);
        if path.is_empty() {
            log::debug!("No path from {from:?} to {to:?}, keeping the current one");
            return;
        }
        self.adopt_path(path);
    }

    /// Swap in a new path.
    ///
    /// If it starts like the current one the waypoint index is kept, so the
    /// agent does not turn back. Returns whether the index was reset.
    pub(crate) fn adopt_path(&mut self, path: Path) -> bool {
        debug_assert!(!path.is_empty());
        let prefix = REPLAN_PREFIX.min(self.path.len());
        let same_start = prefix > 0 && path.get(..prefix) == self.path.get(..prefix);
        self.path = path;
        if same_start {
            self.waypoint = self.waypoint.min(self.path.len() - 1);
            log::trace!("Path updated, continuing from waypoint {}", self.waypoint);
        } else {
            self.waypoint = 0;
            log::debug!("Path changed, {} waypoints", self.path.len());
        }
        !same_start
    }

    fn follow_path<E>(&mut self, dt: f32, grid: &Grid, env: &E, target_position: Vec2)
    where
        E: Environment + ?Sized,
    {
        let Some(mut waypoint) = self.current_waypoint() else {
            return;
        };
        if self.position.distance(grid.center(waypoint)) < self.config.waypoint_reached_distance {
            self.waypoint += 1;
            log::trace!("Reached waypoint {waypoint:?}");
            match self.current_waypoint() {
                Some(next) => waypoint = next,
                None => return,
            }
        }
        let waypoint_position = grid.center(waypoint);
        let distance = self.position.distance(waypoint_position);

        if self.config.steering {
            self.steer(dt, grid, env, waypoint, waypoint_position, target_position);
        } else {
            let direction = steering::seek(self.position, waypoint_position);
            if distance > LEGACY_STOP_DISTANCE {
                self.advance(direction, dt, env);
            }
            if direction != Vec2::ZERO {
                self.facing = steering::turn_toward(self.facing, direction, dt, LEGACY_TURN_RATE);
            }
        }
    }

    fn steer<E>(
        &mut self,
        dt: f32,
        grid: &Grid,
        env: &E,
        waypoint: Coord,
        waypoint_position: Vec2,
        target_position: Vec2,
    ) where
        E: Environment + ?Sized,
    {
        self.steering_timer += dt;
        if self.steering_timer >= self.config.steering_update_interval
            || self.direction == Vec2::ZERO
        {
            self.steering_timer = 0.;
            let seek_point =
                if self.config.predictive && grid.coord_at(target_position) == Some(waypoint) {
                    steering::predict(
                        target_position,
                        self.target_velocity,
                        self.position.distance(target_position),
                        self.config.prediction_time,
                        grid.extent(),
                    )
                } else {
                    waypoint_position
                };
            let seek = steering::seek(self.position, seek_point);
            let avoid = steering::avoidance(
                env,
                self.position,
                self.facing,
                self.config.avoidance_radius,
            );
            let direction = steering::blend(seek, avoid);
            if direction != Vec2::ZERO {
                self.direction = direction;
                self.facing =
                    steering::turn_toward(self.facing, direction, dt, STEERING_TURN_RATE);
            }
        }
        self.advance(self.direction, dt, env);
    }

    fn advance<E>(&mut self, direction: Vec2, dt: f32, env: &E)
    where
        E: Environment + ?Sized,
    {
        self.position = env.resolve_move(self.position, direction * self.config.move_speed * dt);
    }

    fn update_caught(&mut self, target_position: Vec2) {
        match (self.state, self.in_reach(target_position)) {
            (ChaseState::Chasing, true) => {
                self.state = ChaseState::Caught;
                log::info!("Target caught");
            }
            (ChaseState::Caught, false) => {
                self.state = ChaseState::Chasing;
                log::debug!("Target got out of reach");
            }
            _ => (),
        }
    }
}
