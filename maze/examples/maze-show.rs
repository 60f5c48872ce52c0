use std::{collections::BTreeSet, fs::read_to_string, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use simple_logger::SimpleLogger;

use maze::{Coord, Direction, Maze, PartialMazeConfig};

#[derive(Debug, Parser)]
struct Args {
    /// Configuration file for the maze
    #[clap(short)]
    config: Option<PathBuf>,
    /// Overrides of the configuration file
    #[clap(flatten)]
    overrides: PartialMazeConfig,
    /// Show the way out from this cell, as `row,col`
    #[clap(short, long, value_parser = parse_coord)]
    reveal: Option<Coord>,
}

fn parse_coord(s: &str) -> anyhow::Result<Coord> {
    let (row, col) = s.split_once(',').context("Expected `row,col`")?;
    Ok(Coord::new(
        row.trim().parse().context("Invalid row")?,
        col.trim().parse().context("Invalid column")?,
    ))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Config {
    maze: PartialMazeConfig,
}

fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .without_timestamps()
        .with_level(if cfg!(debug_assertions) {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .env()
        .init()
        .context("While initializing logging")?;

    let Args {
        config,
        overrides,
        reveal,
    } = Args::parse();
    let config: Config = config
        .map(|path| {
            read_to_string(path)
                .context("Cannot read config file")
                .and_then(|s| toml::from_str(&s).context("Cannot parse config file"))
        })
        .transpose()
        .context("While loading configs")?
        .unwrap_or_default();

    let mut maze = Maze::new(config.maze.merge(overrides).or_defaults());
    maze.generate().context("While generating the maze")?;

    let path: BTreeSet<Coord> = reveal
        .map(|from| maze.reveal_path(from))
        .unwrap_or_default()
        .into_iter()
        .collect();
    if reveal.is_some() && path.is_empty() {
        log::warn!("No way out from {reveal:?}");
    }

    let grid = maze.grid();
    let mut out = String::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let cell = grid.cell(Coord::new(row, col)).context("Cell out of grid")?;
            out.push('+');
            out.push_str(if cell.has_wall(Direction::North) {
                "---"
            } else {
                "   "
            });
        }
        out.push_str("+\n");
        for col in 0..grid.cols() {
            let coord = Coord::new(row, col);
            let cell = grid.cell(coord).context("Cell out of grid")?;
            out.push(if cell.has_wall(Direction::West) { '|' } else { ' ' });
            out.push_str(if cell.is_escape() {
                " E "
            } else if path.contains(&coord) {
                " * "
            } else if maze.hazards().contains(&coord) {
                " ~ "
            } else {
                "   "
            });
        }
        let last = grid
            .cell(Coord::new(row, grid.cols() - 1))
            .context("Cell out of grid")?;
        out.push(if last.has_wall(Direction::East) { '|' } else { ' ' });
        out.push('\n');
    }
    for col in 0..grid.cols() {
        let cell = grid
            .cell(Coord::new(grid.rows() - 1, col))
            .context("Cell out of grid")?;
        out.push('+');
        out.push_str(if cell.has_wall(Direction::South) {
            "---"
        } else {
            "   "
        });
    }
    out.push_str("+\n");
    print!("{out}");
    Ok(())
}
