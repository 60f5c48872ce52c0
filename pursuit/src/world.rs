use glam::Vec2;
use serde::{Deserialize, Serialize};

use maze::{Direction, Grid};

/// Identifies a chased actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Where a probe ray met an obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    /// Unit normal of the surface, facing the ray origin
    pub normal: Vec2,
}

/// What the agent needs to know about the world around it
pub trait Environment {
    /// First obstacle on the segment `from -> to`
    fn raycast(&self, from: Vec2, to: Vec2) -> Option<RayHit>;

    /// Current position of a target
    fn locate(&self, target: TargetId) -> Option<Vec2>;

    /// The target an agent placed in this world should chase
    fn default_target(&self) -> Option<TargetId>;

    /// Position reached moving by `delta` from `from`
    fn resolve_move(&self, from: Vec2, delta: Vec2) -> Vec2 {
        from + delta
    }
}

/// Distance kept from a wall when a move is blocked
const SKIN: f32 = 0.5;

/// The walls of a maze grid as obstacles
///
/// Walls lie on the cell borders, half a cell away from the centers. The
/// opening of the exit leads out of the grid, where nothing blocks.
#[derive(Debug, Clone)]
pub struct GridWorld<'g> {
    grid: &'g Grid,
    targets: Vec<(TargetId, Vec2)>,
}

impl<'g> GridWorld<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            targets: Vec::new(),
        }
    }

    /// Place a target, the first one placed is the default
    #[must_use]
    pub fn with_target(mut self, target: TargetId, position: Vec2) -> Self {
        self.set_target(target, position);
        self
    }

    pub fn set_target(&mut self, target: TargetId, position: Vec2) {
        match self.targets.iter_mut().find(|(id, _)| *id == target) {
            Some((_, pos)) => *pos = position,
            None => self.targets.push((target, position)),
        }
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    /// Parameter along `delta` where the ray leaves the cell at `center`,
    /// with the side it crosses
    fn exit_of(&self, center: Vec2, from: Vec2, delta: Vec2) -> Option<(f32, Direction)> {
        let half = self.grid.cell_size() / 2.;
        let along_rows = if delta.x > 0. {
            Some(((center.x + half - from.x) / delta.x, Direction::South))
        } else if delta.x < 0. {
            Some(((center.x - half - from.x) / delta.x, Direction::North))
        } else {
            None
        };
        let along_cols = if delta.y > 0. {
            Some(((center.y + half - from.y) / delta.y, Direction::East))
        } else if delta.y < 0. {
            Some(((center.y - half - from.y) / delta.y, Direction::West))
        } else {
            None
        };
        match (along_rows, along_cols) {
            (Some(r), Some(c)) => Some(if r.0 <= c.0 { r } else { c }),
            (r, c) => r.or(c),
        }
    }
}

impl Environment for GridWorld<'_> {
    fn raycast(&self, from: Vec2, to: Vec2) -> Option<RayHit> {
        let delta = to - from;
        let mut coord = self.grid.coord_at(from)?;
        // a straight segment crosses each row and column at most once
        for _ in 0..=self.grid.rows() + self.grid.cols() {
            let (t, side) = self.exit_of(self.grid.center(coord), from, delta)?;
            if t > 1. {
                return None;
            }
            let cell = self.grid.cell(coord)?;
            if cell.has_wall(side) {
                return Some(RayHit {
                    point: from + delta * t.max(0.),
                    normal: -side.vector(),
                });
            }
            coord = self.grid.neighbor(coord, side)?.coord();
        }
        None
    }

    fn locate(&self, target: TargetId) -> Option<Vec2> {
        self.targets
            .iter()
            .find(|(id, _)| *id == target)
            .map(|(_, pos)| *pos)
    }

    fn default_target(&self) -> Option<TargetId> {
        self.targets.first().map(|(id, _)| *id)
    }

    /// Stop in front of walls, sliding along them with what is left of the move
    fn resolve_move(&self, from: Vec2, delta: Vec2) -> Vec2 {
        let Some(hit) = self.raycast(from, from + delta) else {
            return from + delta;
        };
        let stop = hit.point + hit.normal * SKIN;
        let remaining = from + delta - stop;
        let slide = remaining - hit.normal * remaining.dot(hit.normal);
        match self.raycast(stop, stop + slide) {
            Some(second) => second.point + second.normal * SKIN,
            None => stop + slide,
        }
    }
}

#[cfg(test)]
mod tests {
    use maze::{Coord, GenerateParams, MazeGenerator};
    use rand::SeedableRng;
    use rand_wyrand::WyRand;

    use super::*;

    fn corridor() -> Grid {
        // 1x3 generated grid is always a straight corridor
        let mut grid = Grid::empty(100.);
        MazeGenerator::default()
            .generate(
                &mut grid,
                &GenerateParams::new(1, 3).with_cell_size(100.),
                &mut WyRand::seed_from_u64(0),
            )
            .unwrap();
        grid
    }

    mod raycast {
        use super::*;

        #[test]
        fn open_passage_does_not_block() {
            let grid = corridor();
            let world = GridWorld::new(&grid);
            assert_eq!(world.raycast(Vec2::new(0., 0.), Vec2::new(0., 200.)), None);
        }

        #[test]
        fn side_walls_block() {
            let grid = corridor();
            let world = GridWorld::new(&grid);
            // the exit is on the north side, so the south one is closed
            let hit = world
                .raycast(Vec2::new(0., 100.), Vec2::new(120., 100.))
                .unwrap();
            assert!((hit.point - Vec2::new(50., 100.)).length() < 1e-3);
            assert_eq!(hit.normal, Vec2::NEG_X);
        }

        #[test]
        fn end_of_corridor_blocks() {
            let grid = corridor();
            let world = GridWorld::new(&grid);
            let hit = world
                .raycast(Vec2::new(0., 160.), Vec2::new(0., 400.))
                .unwrap();
            assert!((hit.point - Vec2::new(0., 250.)).length() < 1e-3);
            assert_eq!(hit.normal, Vec2::NEG_Y);
        }

        #[test]
        fn short_ray_inside_cell() {
            let grid = corridor();
            let world = GridWorld::new(&grid);
            assert_eq!(world.raycast(Vec2::ZERO, Vec2::new(30., 20.)), None);
            assert_eq!(world.raycast(Vec2::ZERO, Vec2::ZERO), None);
        }
    }

    mod movement {
        use super::*;

        #[test]
        fn blocked_moves_stop_at_wall() {
            let grid = corridor();
            let world = GridWorld::new(&grid);
            let end = world.resolve_move(Vec2::new(0., 200.), Vec2::new(0., 300.));
            assert!(end.y < 250. && end.y > 249.);
            assert!(grid.coord_at(end) == Some(Coord::new(0, 2)));
        }

        #[test]
        fn slides_along_walls() {
            let grid = corridor();
            let world = GridWorld::new(&grid);
            let end = world.resolve_move(Vec2::new(0., 0.), Vec2::new(80., 60.));
            assert!(end.x < 50.);
            assert!((end.y - 60.).abs() < 1e-3);
        }

        #[test]
        fn free_moves_are_unchanged() {
            let grid = corridor();
            let world = GridWorld::new(&grid);
            assert_eq!(
                world.resolve_move(Vec2::ZERO, Vec2::new(10., 150.)),
                Vec2::new(10., 150.)
            );
        }
    }

    #[test]
    fn targets() {
        let grid = corridor();
        let mut world = GridWorld::new(&grid)
            .with_target(TargetId(3), Vec2::ONE)
            .with_target(TargetId(1), Vec2::ZERO);
        assert_eq!(world.default_target(), Some(TargetId(3)));
        world.set_target(TargetId(3), Vec2::X);
        assert_eq!(world.locate(TargetId(3)), Some(Vec2::X));
        assert_eq!(world.locate(TargetId(1)), Some(Vec2::ZERO));
        assert_eq!(world.locate(TargetId(2)), None);
    }
}
