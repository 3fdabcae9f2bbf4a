//! Clan detection, governance, and resource distribution
//!
//! Clans are recomputed from cluster labels and graph density each
//! pass, vote themselves a governance rule, and redistribute resources
//! under it.

mod detection;
mod distribution;
mod governance;
mod stats;

pub use detection::{agent_strength, identify_clans, weighted_density};
pub use distribution::{distribute_between_clans, distribute_resources};
pub use governance::decide_rule;
pub use stats::{clan_statistics, ClanRecord, ClanStatistics};

use serde::{Deserialize, Serialize};

use crate::core::types::ClanId;
use crate::population::Population;

/// Democracy sub-rule for dividing the pooled surplus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareRule {
    Equal,
    Half,
    Third,
    Quarter,
    Fifth,
}

impl ShareRule {
    pub const ALL: [ShareRule; 5] = [
        ShareRule::Equal,
        ShareRule::Half,
        ShareRule::Third,
        ShareRule::Quarter,
        ShareRule::Fifth,
    ];

    /// Fraction of the remaining pool the strongest remaining member
    /// takes, or None for the flat split
    pub fn fraction(&self) -> Option<f64> {
        match self {
            ShareRule::Equal => None,
            ShareRule::Half => Some(0.5),
            ShareRule::Third => Some(1.0 / 3.0),
            ShareRule::Quarter => Some(0.25),
            ShareRule::Fifth => Some(0.2),
        }
    }
}

/// Governance rule a clan votes itself for one pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClanRule {
    /// The strongest member taxes everyone else's surplus
    Dictatorship,
    /// Surplus is pooled and divided by the sub-rule
    Democracy(ShareRule),
    /// No sharing; the clan raids another clan instead
    Lawlessness,
}

/// A detected clan
///
/// Ephemeral: each detection pass replaces the whole list, and the id
/// is the clan's position in that pass. Membership continuity across
/// passes is not guaranteed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Clan {
    pub id: ClanId,
    /// Arena indices of the members, all living at detection time
    pub members: Vec<usize>,
    pub density: f64,
    pub strength: f64,
    /// Members' current resources summed at detection time
    pub total_resources: f64,
    /// Governance rule for this pass, set on the first vote or
    /// distribution call
    pub decision: Option<ClanRule>,
}

impl Clan {
    /// Member indices still alive right now
    pub fn living_members(&self, population: &Population) -> Vec<usize> {
        self.members
            .iter()
            .copied()
            .filter(|&m| population.is_alive(m))
            .collect()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }
}
