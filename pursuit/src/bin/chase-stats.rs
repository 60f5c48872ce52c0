use std::{fs::read_to_string, panic, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use deepsize::DeepSizeOf;
use futures::future::join_all;
use humansize::{format_size, BINARY};
use log::LevelFilter::Warn;
use simple_logger::SimpleLogger;

use maze::{Maze, PartialMazeConfig};
use pursuit::{Config, Outcome, SimReport, Simulation};

#[derive(Debug, Parser)]
struct Args {
    /// Configuration file, with `[maze]`, `[pursuit]` and `[sim]` sections
    #[clap(short)]
    config: Option<PathBuf>,
    /// Overrides of the maze configuration, the seed is the first of the runs
    #[clap(flatten)]
    maze: PartialMazeConfig,
    /// Number of simulations
    #[clap(long, short = 'n', default_value = "100")]
    runs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .without_timestamps()
        .with_level(Warn)
        .env()
        .init()
        .context("While initializing logging")?;

    let Args { config, maze, runs } = Args::parse();
    let Config {
        maze: file_maze,
        pursuit,
        sim,
    } = config
        .map(|path| {
            read_to_string(path)
                .context("Cannot read config file")
                .and_then(|s| Config::from_toml(&s).context("Cannot parse config file"))
        })
        .transpose()
        .context("While loading configs")?
        .unwrap_or_default();
    let base = file_maze.merge(maze).or_defaults();

    let tasks = (0..runs).map(|i| {
        let mut maze = base;
        maze.seed = base.seed.wrapping_add(i);
        tokio::spawn(async move { Simulation::new(maze, pursuit, sim).map(Simulation::run) })
    });
    let mut reports: Vec<SimReport> = Vec::new();
    for task in join_all(tasks).await {
        match task {
            Ok(report) => reports.push(report.context("While running a simulation")?),
            Err(err) => panic::resume_unwind(err.into_panic()),
        }
    }

    let count = |outcome: Outcome| reports.iter().filter(|r| r.outcome == outcome).count();
    let caught: Vec<_> = reports
        .iter()
        .filter(|r| r.outcome == Outcome::Caught)
        .collect();
    println!("Runs: {}", reports.len());
    println!(
        "Caught: {} ({:.1}%)",
        caught.len(),
        100. * caught.len() as f64 / reports.len().max(1) as f64
    );
    println!("Escaped: {}", count(Outcome::Escaped));
    println!("Timed out: {}", count(Outcome::TimedOut));
    if !caught.is_empty() {
        println!(
            "Mean time to catch: {:.1}s",
            caught.iter().map(|r| r.time).sum::<f32>() / caught.len() as f32
        );
    }
    println!(
        "Mean spawn distance: {:.1} cells",
        reports.iter().map(|r| r.spawn_distance).sum::<usize>() as f64
            / reports.len().max(1) as f64
    );

    let mut sample = Maze::new(base);
    sample.generate().context("While generating the sample maze")?;
    println!(
        "Grid memory: {}",
        format_size(sample.grid().deep_size_of(), BINARY)
    );
    Ok(())
}
