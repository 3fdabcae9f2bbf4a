//! Resource economy: production, consumption, accumulation, death

mod engine;
mod stats;

pub use engine::{ConsumptionReport, EconomyCycleReport, EconomyEngine};
pub use stats::{EconomicStats, WealthStrata};
