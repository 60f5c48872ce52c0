use futures::future::join_all;
use rand::{thread_rng, Rng};

use maze::{Coord, Direction, Maze, MazeConfig, PathFinder};

fn random_config(rng: &mut impl Rng) -> MazeConfig {
    MazeConfig {
        seed: rng.gen(),
        rows: rng.gen_range(1..=30),
        cols: rng.gen_range(1..=30),
        cell_size: rng.gen_range((10.)..(1000.)),
        loop_probability: rng.gen_range((0.)..(0.5)),
        exit_min_distance: rng.gen_range(0..8),
        hazard_fraction: rng.gen_range((0.)..(0.2)),
    }
}

/// Check every structural property of a generated maze
fn check(maze: &Maze) {
    let grid = maze.grid();
    assert!(maze.is_generated());
    assert!(grid.walls_symmetric(), "Asymmetric walls in {maze:?}");

    let reached = PathFinder::new(grid).distances(Coord::new(0, 0));
    assert!(
        reached.iter().all(Option::is_some),
        "Disconnected cells in {maze:?}"
    );

    let exits: Vec<_> = grid.cells().filter(|c| c.is_escape()).collect();
    assert_eq!(exits.len(), 1);
    let exit = exits[0];
    assert!(grid.is_edge(exit.coord()));
    assert!(Direction::SCAN_ORDER
        .into_iter()
        .any(|d| grid.is_outward(exit.coord(), d) && !exit.has_wall(d)));
    assert!(!maze.hazards().contains(&exit.coord()));
}

/// BFS and A* agree, and asking twice gives the same answer
fn check_searches(maze: &Maze, rng: &mut impl Rng) {
    let grid = maze.grid();
    for _ in 0..10 {
        let [a, b] = [(); 2].map(|_| {
            Coord::new(
                rng.gen_range(0..grid.rows()),
                rng.gen_range(0..grid.cols()),
            )
        });
        let bfs = maze.find_path_bfs(a, b);
        let astar = maze.find_path_astar(a, b);
        assert_eq!(bfs.len(), astar.len());
        assert_eq!(bfs.first(), Some(&a));
        assert_eq!(astar.last(), Some(&b));
        assert_eq!(maze.find_path_bfs(a, b), bfs);
        assert_eq!(maze.find_path_astar(a, b), astar);
    }
}

#[tokio::test]
async fn coherency() {
    join_all((0..20).map(|_| async {
        let mut rng = thread_rng();
        let config = random_config(&mut rng);
        let mut maze = Maze::new(config);
        maze.generate().unwrap();
        check(&maze);
        check_searches(&maze, &mut rng);

        // regenerations around a trapped cell
        for _ in 0..5 {
            let keep = maze.random_cell().unwrap().coord();
            let id = maze.grid().cell(keep).unwrap().id();
            maze.generate_preserving(keep).unwrap();
            check(&maze);
            check_searches(&maze, &mut rng);
            assert_eq!(maze.grid().cell(keep).unwrap().id(), id);
            assert!(!maze.hazards().contains(&keep));
        }
    }))
    .await;
}
