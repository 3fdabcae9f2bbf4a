pub mod config;
pub mod error;
pub mod types;

pub use config::{Difficulty, SimulationConfig};
pub use error::{Result, SimError};
