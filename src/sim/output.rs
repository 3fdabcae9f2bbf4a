//! Per-cycle reports and final simulation output

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clan::ClanStatistics;
use crate::conflict::ConflictOutcome;
use crate::core::types::{Cycle, CycleKind};
use crate::economy::{EconomicStats, EconomyCycleReport};

/// Aggregate record of one cycle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: Cycle,
    pub kind: CycleKind,
    /// Present on economic cycles only
    pub economy: Option<EconomyCycleReport>,
    pub clans: usize,
    pub conflicts: usize,
    pub living: usize,
}

/// Run-level counters
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RunStats {
    pub cycles: u64,
    pub economic_cycles: u64,
    pub simulation_time_ms: u64,
    pub total_conflicts: usize,
    pub living_at_end: usize,
}

/// Complete simulation output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub reports: Vec<CycleReport>,
    pub economy: EconomicStats,
    pub clans: ClanStatistics,
    pub conflicts: Vec<ConflictOutcome>,
    pub statistics: RunStats,
}

impl SimulationOutput {
    pub fn new(
        reports: Vec<CycleReport>,
        economy: EconomicStats,
        clans: ClanStatistics,
        conflicts: Vec<ConflictOutcome>,
        elapsed: Duration,
    ) -> Self {
        let economic_cycles = reports
            .iter()
            .filter(|r| r.kind == CycleKind::Economic)
            .count() as u64;
        let living_at_end = reports.last().map(|r| r.living).unwrap_or(0);

        let statistics = RunStats {
            cycles: reports.len() as u64,
            economic_cycles,
            simulation_time_ms: elapsed.as_millis() as u64,
            total_conflicts: conflicts.len(),
            living_at_end,
        };

        Self {
            reports,
            economy,
            clans,
            conflicts,
            statistics,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        format!(
            "Simulated {} cycles ({} economic) in {}ms\n{} clans, {} conflicts, {} agents alive",
            self.statistics.cycles,
            self.statistics.economic_cycles,
            self.statistics.simulation_time_ms,
            self.clans.clan_count,
            self.statistics.total_conflicts,
            self.statistics.living_at_end,
        )
    }
}
