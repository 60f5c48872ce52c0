use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{Coord, Grid};

/// A sequence of adjacent cells, start and goal included.
///
/// Empty when no path exists.
pub type Path = Vec<Coord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchAlgorithm {
    Bfs,
    #[default]
    AStar,
}

/// Shortest path searches over a grid.
///
/// Searches only read the grid. All their bookkeeping lives in arrays local
/// to the call, indexed by the linearized coordinate, so concurrent searches
/// on the same grid are fine.
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'g> {
    grid: &'g Grid,
}

impl<'g> PathFinder<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self { grid }
    }

    pub fn find(&self, algorithm: SearchAlgorithm, start: Coord, goal: Coord) -> Path {
        match algorithm {
            SearchAlgorithm::Bfs => self.bfs(start, goal),
            SearchAlgorithm::AStar => self.astar(start, goal),
        }
    }

    fn endpoints_valid(&self, start: Coord, goal: Coord) -> bool {
        let shape = self.grid.shape();
        shape.contains(&start) && shape.contains(&goal)
    }

    /// Follow the parent links back from `goal`
    fn reconstruct(&self, parents: &[Option<usize>], goal: Coord) -> Path {
        let shape = self.grid.shape();
        let mut path = vec![goal];
        let mut idx = shape.linear(&goal);
        while let Some(parent) = parents[idx] {
            path.push(shape.delinear(parent));
            idx = parent;
        }
        path.reverse();
        path
    }

    /// Breadth first search
    pub fn bfs(&self, start: Coord, goal: Coord) -> Path {
        if !self.endpoints_valid(start, goal) {
            return Path::new();
        }
        let shape = self.grid.shape();
        let mut visited = vec![false; shape.len()];
        let mut parents = vec![None; shape.len()];
        let mut queue = VecDeque::from([start]);
        visited[shape.linear(&start)] = true;

        while let Some(current) = queue.pop_front() {
            if current == goal {
                return self.reconstruct(&parents, goal);
            }
            for next in self.grid.neighbors(current, false) {
                let idx = shape.linear(&next);
                if !visited[idx] {
                    visited[idx] = true;
                    parents[idx] = Some(shape.linear(&current));
                    queue.push_back(next);
                }
            }
        }
        log::trace!("No path from {start:?} to {goal:?}");
        Path::new()
    }

    /// A* with the manhattan distance as heuristic.
    ///
    /// The open set is scanned linearly; among equal scores the node inserted
    /// first is expanded.
    pub fn astar(&self, start: Coord, goal: Coord) -> Path {
        if !self.endpoints_valid(start, goal) {
            return Path::new();
        }
        let shape = self.grid.shape();
        let mut g = vec![usize::MAX; shape.len()];
        let mut f = vec![usize::MAX; shape.len()];
        let mut parents = vec![None; shape.len()];
        let mut closed = vec![false; shape.len()];
        let mut in_open = vec![false; shape.len()];

        let start_idx = shape.linear(&start);
        g[start_idx] = 0;
        f[start_idx] = start.manhattan(&goal);
        in_open[start_idx] = true;
        let mut open = vec![start];

        while !open.is_empty() {
            let best = (1..open.len()).fold(0, |best, i| {
                if f[shape.linear(&open[i])] < f[shape.linear(&open[best])] {
                    i
                } else {
                    best
                }
            });
            let current = open.remove(best);
            let current_idx = shape.linear(&current);
            in_open[current_idx] = false;
            if current == goal {
                return self.reconstruct(&parents, goal);
            }
            closed[current_idx] = true;

            for next in self.grid.neighbors(current, false) {
                let idx = shape.linear(&next);
                if closed[idx] {
                    continue;
                }
                let tentative = g[current_idx] + 1;
                if tentative < g[idx] {
                    parents[idx] = Some(current_idx);
                    g[idx] = tentative;
                    f[idx] = tentative + next.manhattan(&goal);
                    if !in_open[idx] {
                        in_open[idx] = true;
                        open.push(next);
                    }
                }
            }
        }
        log::trace!("No path from {start:?} to {goal:?}");
        Path::new()
    }

    /// Walking distance from `start` to every cell, in linear order.
    ///
    /// `None` marks unreachable cells.
    pub fn distances(&self, start: Coord) -> Vec<Option<usize>> {
        let shape = self.grid.shape();
        let mut distances = vec![None; shape.len()];
        if !shape.contains(&start) {
            return distances;
        }
        distances[shape.linear(&start)] = Some(0);
        let mut queue = VecDeque::from([(start, 0)]);
        while let Some((current, dist)) = queue.pop_front() {
            for next in self.grid.neighbors(current, false) {
                let slot = &mut distances[shape.linear(&next)];
                if slot.is_none() {
                    *slot = Some(dist + 1);
                    queue.push_back((next, dist + 1));
                }
            }
        }
        distances
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_wyrand::WyRand;

    use super::*;
    use crate::{CellFactory, GenerateParams, MazeGenerator, SequentialCells, Shape};

    fn closed(rows: usize, cols: usize) -> Grid {
        let shape = Shape::new(rows, cols);
        let mut factory = SequentialCells::default();
        let cells = shape
            .coords()
            .map(|c| factory.create_cell(c, Vec2::ZERO))
            .collect();
        Grid::from_cells(shape, 1., cells)
    }

    fn open(rows: usize, cols: usize) -> Grid {
        let mut grid = closed(rows, cols);
        for coord in grid.shape().coords().collect::<Vec<_>>() {
            grid.remove_wall_between(coord, Coord::new(coord.row + 1, coord.col));
            grid.remove_wall_between(coord, Coord::new(coord.row, coord.col + 1));
        }
        grid
    }

    fn generated(rows: usize, cols: usize, loops: f64, seed: u64) -> Grid {
        let mut grid = Grid::empty(1.);
        MazeGenerator::default()
            .generate(
                &mut grid,
                &GenerateParams::new(rows, cols).with_loops(loops),
                &mut WyRand::seed_from_u64(seed),
            )
            .unwrap();
        grid
    }

    fn is_walkable(grid: &Grid, path: &Path) -> bool {
        path.windows(2)
            .all(|pair| grid.neighbors(pair[0], false).contains(&pair[1]))
    }

    mod degenerate {
        use super::*;

        #[test]
        fn start_is_goal() {
            let grid = generated(4, 4, 0., 0);
            let c = Coord::new(2, 1);
            let finder = PathFinder::new(&grid);
            assert_eq!(finder.bfs(c, c), vec![c]);
            assert_eq!(finder.astar(c, c), vec![c]);
        }

        #[test]
        fn unreachable_is_empty() {
            let grid = closed(3, 3);
            let finder = PathFinder::new(&grid);
            assert!(finder.bfs(Coord::new(0, 0), Coord::new(2, 2)).is_empty());
            assert!(finder.astar(Coord::new(0, 0), Coord::new(2, 2)).is_empty());
            let distances = finder.distances(Coord::new(0, 0));
            assert_eq!(distances.iter().flatten().count(), 1);
        }

        #[test]
        fn out_of_bounds_is_empty() {
            let grid = open(3, 3);
            let finder = PathFinder::new(&grid);
            assert!(finder.bfs(Coord::new(0, 0), Coord::new(3, 0)).is_empty());
            assert!(finder.astar(Coord::new(5, 5), Coord::new(0, 0)).is_empty());
            assert!(finder.distances(Coord::new(9, 9)).iter().all(Option::is_none));
        }
    }

    mod optimality {
        use super::*;

        #[test]
        fn open_grid_is_manhattan() {
            let grid = open(6, 5);
            let finder = PathFinder::new(&grid);
            let (a, b) = (Coord::new(0, 4), Coord::new(5, 0));
            assert_eq!(finder.bfs(a, b).len(), a.manhattan(&b) + 1);
            assert_eq!(finder.astar(a, b).len(), a.manhattan(&b) + 1);
        }

        #[test]
        fn ties_follow_scan_order() {
            let grid = open(2, 2);
            let finder = PathFinder::new(&grid);
            let expected = vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(1, 1)];
            assert_eq!(finder.bfs(Coord::new(0, 0), Coord::new(1, 1)), expected);
            assert_eq!(finder.astar(Coord::new(0, 0), Coord::new(1, 1)), expected);
        }

        #[test]
        fn bfs_and_astar_agree_on_length() {
            let mut rng = WyRand::seed_from_u64(11);
            for seed in 0..10 {
                let grid = generated(12, 9, 0.2, seed);
                let finder = PathFinder::new(&grid);
                for _ in 0..20 {
                    let a = grid.random_cell(&mut rng).unwrap().coord();
                    let b = grid.random_cell(&mut rng).unwrap().coord();
                    let bfs = finder.bfs(a, b);
                    let astar = finder.astar(a, b);
                    assert!(!bfs.is_empty());
                    assert_eq!(bfs.len(), astar.len());
                    assert_eq!((bfs[0], *bfs.last().unwrap()), (a, b));
                    assert_eq!((astar[0], *astar.last().unwrap()), (a, b));
                    assert!(is_walkable(&grid, &bfs));
                    assert!(is_walkable(&grid, &astar));
                    let distances = finder.distances(a);
                    assert_eq!(distances[grid.shape().linear(&b)], Some(bfs.len() - 1));
                }
            }
        }

        #[test]
        fn tree_paths_are_unique() {
            // without loops there is exactly one simple path, both must find it
            let grid = generated(10, 10, 0., 3);
            let finder = PathFinder::new(&grid);
            let (a, b) = (Coord::new(0, 0), Coord::new(9, 9));
            assert_eq!(finder.bfs(a, b), finder.astar(a, b));
        }
    }

    mod isolation {
        use super::*;

        #[test]
        fn repeated_searches_are_identical() {
            let grid = generated(15, 15, 0.15, 8);
            let finder = PathFinder::new(&grid);
            let (a, b) = (Coord::new(0, 14), Coord::new(14, 0));
            let first = (finder.bfs(a, b), finder.astar(a, b));
            // unrelated searches in between
            finder.bfs(b, a);
            finder.astar(Coord::new(7, 7), a);
            finder.distances(b);
            assert_eq!((finder.bfs(a, b), finder.astar(a, b)), first);
        }
    }
}
