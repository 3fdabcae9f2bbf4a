//! Clan governance voting
//!
//! Each living member casts one vote resolved by a single uniform draw
//! against a probability triple chosen from its economic position
//! within the clan.

use rand::Rng;

use crate::core::types::Cycle;
use crate::graph::ConnectionGraph;
use crate::population::Population;
use crate::sim::events::{EventSink, Severity, SimEvent};

use super::{agent_strength, Clan, ClanRule, ShareRule};

/// (dictatorship, democracy, lawlessness) vote probabilities
type VoteProfile = (f64, f64, f64);

/// Strong and rich members prefer concentrated power
const STRONG_RICH: VoteProfile = (0.6, 0.3, 0.1);
/// Weak and poor members prefer redistribution
const WEAK_POOR: VoteProfile = (0.2, 0.6, 0.2);
/// Members under survival pressure gamble on raiding
const DESPERATE: VoteProfile = (0.1, 0.3, 0.6);
/// Everyone else leans moderate
const MODERATE: VoteProfile = (0.2, 0.7, 0.1);

/// A member is desperate when 10 / current resources exceeds this
const PRESSURE_CUTOFF: f64 = 1.5;

/// Vote a governance rule for this clan
///
/// Plurality wins; the first rule to reach the running maximum keeps a
/// tie, and democracy is the fallback when nothing beats zero votes.
pub fn decide_rule(
    clan: &Clan,
    population: &Population,
    graph: &ConnectionGraph,
    rng: &mut impl Rng,
    sink: &mut dyn EventSink,
    cycle: Cycle,
) -> ClanRule {
    let living = clan.living_members(population);

    let mut votes = [0u32; 3];
    if !living.is_empty() {
        let strengths: Vec<f64> = living
            .iter()
            .map(|&m| agent_strength(m, &clan.members, population, graph))
            .collect();
        let mean_strength = strengths.iter().sum::<f64>() / living.len() as f64;
        let mean_resources = living
            .iter()
            .filter_map(|&m| population.get(m))
            .map(|a| a.econ.current_resources)
            .sum::<f64>()
            / living.len() as f64;

        for (&member, &strength) in living.iter().zip(&strengths) {
            let Some(agent) = population.get(member) else {
                continue;
            };
            let resources = agent.econ.current_resources;

            let profile = if strength > mean_strength && resources > mean_resources {
                STRONG_RICH
            } else if strength < mean_strength && resources < mean_resources {
                WEAK_POOR
            } else if 10.0 / resources > PRESSURE_CUTOFF {
                DESPERATE
            } else {
                MODERATE
            };

            let draw: f64 = rng.gen();
            if draw < profile.0 {
                votes[0] += 1;
            } else if draw < profile.0 + profile.1 {
                votes[1] += 1;
            } else {
                votes[2] += 1;
            }
        }
    }

    let mut max_votes = 0;
    let mut winner = 1usize; // democracy unless something beats zero
    for (slot, &count) in votes.iter().enumerate() {
        if count > max_votes {
            max_votes = count;
            winner = slot;
        }
    }

    let rule = match winner {
        0 => ClanRule::Dictatorship,
        2 => ClanRule::Lawlessness,
        _ => ClanRule::Democracy(random_share_rule(rng)),
    };

    sink.record(
        cycle,
        SimEvent::ClanDecision {
            clan: clan.id,
            rule,
        },
        Severity::Info,
    );
    tracing::debug!(
        "clan {:?} voted {:?} ({}/{}/{} dictatorship/democracy/lawlessness)",
        clan.id,
        rule,
        votes[0],
        votes[1],
        votes[2]
    );

    rule
}

fn random_share_rule(rng: &mut impl Rng) -> ShareRule {
    ShareRule::ALL[rng.gen_range(0..ShareRule::ALL.len())]
}
