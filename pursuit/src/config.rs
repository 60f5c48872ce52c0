use serde::{Deserialize, Serialize};

use maze::PartialMazeConfig;

use crate::sim::SimConfig;

/// Tuning of a pursuit agent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    /// World units per second
    pub move_speed: f32,
    /// Seconds between two path searches
    pub path_update_interval: f32,
    /// Blend avoidance into the movement, instead of walking straight to the waypoints
    pub steering: bool,
    /// Seek the predicted target position once the target's cell is the waypoint
    pub predictive: bool,
    /// Longest prediction horizon, in seconds
    pub prediction_time: f32,
    /// Seconds between two steering updates
    pub steering_update_interval: f32,
    /// Length of the obstacle probes
    pub avoidance_radius: f32,
    /// Distance under which the target counts as caught
    pub catch_distance: f32,
    /// Distance under which a waypoint counts as reached
    pub waypoint_reached_distance: f32,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            move_speed: 300.,
            path_update_interval: 1.,
            steering: true,
            predictive: false,
            prediction_time: 0.5,
            steering_update_interval: 0.1,
            avoidance_radius: 200.,
            catch_distance: 250.,
            waypoint_reached_distance: 100.,
        }
    }
}

/// Content of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub maze: PartialMazeConfig,
    pub pursuit: PursuitConfig,
    pub sim: SimConfig,
}

impl Config {
    pub fn from_toml(src: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(src)
    }
}
