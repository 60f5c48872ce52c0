use std::{fs::read_to_string, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use simple_logger::SimpleLogger;

use maze::PartialMazeConfig;
use pursuit::{Config, Simulation};

#[derive(Debug, Parser)]
struct Args {
    /// Configuration file, with `[maze]`, `[pursuit]` and `[sim]` sections
    #[clap(short)]
    config: Option<PathBuf>,
    /// Overrides of the maze configuration
    #[clap(flatten)]
    maze: PartialMazeConfig,
    /// Walk straight to the waypoints, without steering
    #[clap(long)]
    legacy: bool,
    /// Aim at the predicted target position when close
    #[clap(long)]
    predictive: bool,
    /// Seconds between two status lines
    #[clap(long, default_value = "5")]
    every: f32,
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
        maze,
        legacy,
        predictive,
        every,
    } = Args::parse();
    let Config {
        maze: file_maze,
        mut pursuit,
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
    pursuit.steering &= !legacy;
    pursuit.predictive |= predictive;

    let mut simulation = Simulation::new(file_maze.merge(maze).or_defaults(), pursuit, sim)
        .context("While setting up the simulation")?;
    let mut next_status = 0.;
    let outcome = loop {
        if simulation.time() >= next_status {
            let agent = simulation.agent();
            let grid = simulation.maze().grid();
            println!(
                "{:>6.1}s  agent {:?} ({:?})  runner {:?}  waypoint {}/{}",
                simulation.time(),
                grid.coord_at(agent.position()),
                agent.state(),
                grid.coord_at(simulation.runner().position()),
                agent.waypoint_index(),
                agent.path().len(),
            );
            next_status += every.max(sim.dt);
        }
        if let Some(outcome) = simulation.step() {
            break outcome;
        }
    };
    println!("{outcome:?} after {:.1}s", simulation.time());
    Ok(())
}
