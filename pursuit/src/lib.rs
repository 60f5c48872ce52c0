pub mod agent;
pub use agent::{ChaseError, ChaseState, PursuitAgent};

pub mod config;
pub use config::{Config, PursuitConfig};

pub mod sim;
pub use sim::{Outcome, SimConfig, SimReport, Simulation};

pub mod steering;

pub mod world;
pub use world::{Environment, GridWorld, RayHit, TargetId};
