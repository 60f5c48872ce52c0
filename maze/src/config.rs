use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::GenerateParams;

/// Config for a maze
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MazeConfig {
    /// Seed of the maze
    pub seed: u64,
    /// Number of rows, in `1..=30`
    pub rows: usize,
    /// Number of columns, in `1..=30`
    pub cols: usize,
    /// Side of a cell in world units
    pub cell_size: f32,
    /// Density of the extra passages
    /// -> 0   gives a perfect maze, with a single path between any two cells
    /// -> 0.5 is the maximum, higher values are clamped
    pub loop_probability: f64,
    /// Minimum distance of the exit from a preserved cell
    pub exit_min_distance: usize,
    /// Fraction of the cells marked as hazards, 0 to disable
    pub hazard_fraction: f64,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            rows: 15,
            cols: 15,
            cell_size: 500.,
            loop_probability: 0.15,
            exit_min_distance: 4,
            hazard_fraction: 0.05,
        }
    }
}

impl MazeConfig {
    /// Generation parameters for a fresh maze
    pub fn params(&self) -> GenerateParams {
        GenerateParams::new(self.rows, self.cols)
            .with_cell_size(self.cell_size)
            .with_loops(self.loop_probability)
    }
}

/// Partial config for a maze
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Parser, Default)]
pub struct PartialMazeConfig {
    /// Seed of the maze
    #[clap(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Number of rows
    #[clap(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    /// Number of columns
    #[clap(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<usize>,
    /// Side of a cell in world units
    #[clap(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_size: Option<f32>,
    /// Density of the extra passages
    #[clap(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_probability: Option<f64>,
    /// Minimum distance of the exit from a preserved cell
    #[clap(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_min_distance: Option<usize>,
    /// Fraction of the cells marked as hazards
    #[clap(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazard_fraction: Option<f64>,
}
impl PartialMazeConfig {
    pub fn merge(self, other: PartialMazeConfig) -> Self {
        Self {
            seed: other.seed.or(self.seed),
            rows: other.rows.or(self.rows),
            cols: other.cols.or(self.cols),
            cell_size: other.cell_size.or(self.cell_size),
            loop_probability: other.loop_probability.or(self.loop_probability),
            exit_min_distance: other.exit_min_distance.or(self.exit_min_distance),
            hazard_fraction: other.hazard_fraction.or(self.hazard_fraction),
        }
    }
    pub fn or_defaults(self) -> MazeConfig {
        let default = MazeConfig::default();
        MazeConfig {
            seed: self.seed.unwrap_or(default.seed),
            rows: self.rows.unwrap_or(default.rows),
            cols: self.cols.unwrap_or(default.cols),
            cell_size: self.cell_size.unwrap_or(default.cell_size),
            loop_probability: self.loop_probability.unwrap_or(default.loop_probability),
            exit_min_distance: self.exit_min_distance.unwrap_or(default.exit_min_distance),
            hazard_fraction: self.hazard_fraction.unwrap_or(default.hazard_fraction),
        }
    }
}
