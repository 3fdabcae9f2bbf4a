//! Clan statistics recomputed from live membership at query time

use serde::{Deserialize, Serialize};

use crate::core::types::ClanId;
use crate::population::Population;

use super::{Clan, ClanRule};

/// Per-clan metrics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClanRecord {
    pub id: ClanId,
    pub members: usize,
    pub living: usize,
    pub survival_rate: f64,
    pub density: f64,
    pub strength: f64,
    /// Living members' current resources right now, not the formation
    /// snapshot
    pub current_resources: f64,
    pub mean_resources: f64,
    pub mean_recent_production: f64,
    pub decision: Option<ClanRule>,
}

/// Aggregate view over all clans of the current pass
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClanStatistics {
    pub clan_count: usize,
    pub agents_in_clans: usize,
    pub mean_density: f64,
    pub mean_strength: f64,
    pub total_resources: f64,
    pub clans: Vec<ClanRecord>,
}

/// Measure every clan against the population as it stands now
pub fn clan_statistics(clans: &[Clan], population: &Population) -> ClanStatistics {
    let mut records = Vec::with_capacity(clans.len());

    for clan in clans {
        let living = clan.living_members(population);

        let current_resources: f64 = living
            .iter()
            .filter_map(|&m| population.get(m))
            .map(|a| a.econ.current_resources)
            .sum();
        let mean_recent_production = if living.is_empty() {
            0.0
        } else {
            living
                .iter()
                .filter_map(|&m| population.get(m))
                .map(|a| a.econ.recent_production())
                .sum::<f64>()
                / living.len() as f64
        };

        records.push(ClanRecord {
            id: clan.id,
            members: clan.members.len(),
            living: living.len(),
            survival_rate: living.len() as f64 / clan.members.len().max(1) as f64,
            density: clan.density,
            strength: clan.strength,
            current_resources,
            mean_resources: if living.is_empty() {
                0.0
            } else {
                current_resources / living.len() as f64
            },
            mean_recent_production,
            decision: clan.decision,
        });
    }

    let clan_count = clans.len();
    ClanStatistics {
        clan_count,
        agents_in_clans: clans.iter().map(|c| c.members.len()).sum(),
        mean_density: if clan_count > 0 {
            records.iter().map(|r| r.density).sum::<f64>() / clan_count as f64
        } else {
            0.0
        },
        mean_strength: if clan_count > 0 {
            records.iter().map(|r| r.strength).sum::<f64>() / clan_count as f64
        } else {
            0.0
        },
        total_resources: records.iter().map(|r| r.current_resources).sum(),
        clans: records,
    }
}
