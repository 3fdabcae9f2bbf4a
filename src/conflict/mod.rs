//! Conflict resolution between clans
//!
//! One call resolves one engagement: bystanders pick sides by
//! connection weight, the attacker steals resources scaled by relative
//! strength, and the connections between the two clans weaken.

use ahash::AHashSet;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clan::{Clan, ClanRule};
use crate::core::config::SimulationConfig;
use crate::core::types::{AgentId, ClanId, Cycle};
use crate::graph::ConnectionGraph;
use crate::population::Population;
use crate::sim::events::{EventSink, Severity, SimEvent};

/// Margin one adjusted side score must hold over the other before a
/// bystander commits
const SIDE_THRESHOLD: f64 = 0.5;
/// Current-resource theft only reaches the surplus above this multiple
/// of min survival
const THEFT_FLOOR_MULTIPLE: f64 = 1.2;
/// Steal-rate discount per living defender, capped at 0.5
const DEFENSE_PER_MEMBER: f64 = 0.05;

/// How the uninvolved population split over one engagement
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SideSelection {
    pub attacker_supporters: Vec<AgentId>,
    pub victim_supporters: Vec<AgentId>,
    pub neutral: Vec<AgentId>,
    /// Raw connection weight the attacker's supporters contribute
    pub attacker_support: f64,
    pub victim_support: f64,
}

/// Record of one attacker-vs-victim engagement
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConflictOutcome {
    pub attacker: ClanId,
    pub victim: ClanId,
    pub attacker_size: usize,
    pub victim_size: usize,
    /// Clan strength plus accumulated supporter strength
    pub attacker_strength: f64,
    pub victim_strength: f64,
    pub success_chance: f64,
    pub resources_stolen: f64,
    pub connections_polarized: u32,
    pub sides: SideSelection,
}

impl ConflictOutcome {
    /// Zero-valued outcome for malformed engagements
    fn neutral(attacker: ClanId, victim: ClanId) -> Self {
        Self {
            attacker,
            victim,
            attacker_size: 0,
            victim_size: 0,
            attacker_strength: 0.0,
            victim_strength: 0.0,
            success_chance: 0.0,
            resources_stolen: 0.0,
            connections_polarized: 0,
            sides: SideSelection::default(),
        }
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Every living agent in neither clan weighs its ties to each side
///
/// Wealth skews the adjusted score toward the aggressor, poverty
/// toward the victim; a committed supporter contributes its raw tie
/// weight to that side's support strength.
fn select_sides(
    attacker: &Clan,
    victim: &Clan,
    population: &Population,
    graph: &ConnectionGraph,
    config: &SimulationConfig,
) -> SideSelection {
    let engaged: AHashSet<usize> = attacker
        .members
        .iter()
        .chain(victim.members.iter())
        .copied()
        .collect();

    let mut sides = SideSelection::default();
    for (index, agent) in population.iter_living() {
        if engaged.contains(&index) {
            continue;
        }

        let toward_attacker = graph.weight_sum(index, &attacker.members);
        let toward_victim = graph.weight_sum(index, &victim.members);

        let bias = ((agent.econ.current_resources / config.min_survival - 1.5) * 0.1)
            .clamp(-0.25, 0.25);

        let attacker_score = toward_attacker + bias;
        let victim_score = toward_victim - bias;

        if attacker_score > victim_score + SIDE_THRESHOLD {
            sides.attacker_supporters.push(agent.id);
            sides.attacker_support += toward_attacker;
        } else if victim_score > attacker_score + SIDE_THRESHOLD {
            sides.victim_supporters.push(agent.id);
            sides.victim_support += toward_victim;
        } else {
            sides.neutral.push(agent.id);
        }
    }

    sides
}

/// Resolve one engagement: side selection, theft, polarization
pub fn resolve_conflict(
    attacker: &Clan,
    victim: &Clan,
    population: &mut Population,
    graph: &mut ConnectionGraph,
    config: &SimulationConfig,
    sink: &mut dyn EventSink,
    cycle: Cycle,
) -> ConflictOutcome {
    if attacker.id == victim.id || attacker.members.is_empty() || victim.members.is_empty() {
        tracing::warn!(
            "malformed conflict between {:?} and {:?}, returning neutral outcome",
            attacker.id,
            victim.id
        );
        return ConflictOutcome::neutral(attacker.id, victim.id);
    }

    sink.record(
        cycle,
        SimEvent::ConflictInitiated {
            attacker: attacker.id,
            victim: victim.id,
        },
        Severity::Critical,
    );

    let sides = select_sides(attacker, victim, population, graph, config);

    let attacker_strength = attacker.strength + sides.attacker_support;
    let victim_strength = victim.strength + sides.victim_support;

    let ratio = attacker_strength / victim_strength.max(1.0);
    let success_chance = sigmoid(ratio - 1.0);
    let base_rate = 0.3 + success_chance * 0.4;

    let victim_living = victim.living_members(population);
    let defense = (DEFENSE_PER_MEMBER * victim_living.len() as f64).min(0.5);
    let rate = base_rate * (1.0 - defense);

    let theft_floor = THEFT_FLOOR_MULTIPLE * config.min_survival;
    let mut stolen = 0.0;
    for &member in &victim_living {
        let Some(agent) = population.get_mut(member) else {
            continue;
        };
        let econ = &mut agent.econ;

        // Theft reaches the surplus above the floor and never pushes a
        // victim below min survival
        let surplus = (econ.current_resources - theft_floor).max(0.0);
        let from_current =
            (rate * surplus).min((econ.current_resources - config.min_survival).max(0.0));
        econ.current_resources -= from_current;

        let from_accumulated = (rate * config.resource_steal_ratio * econ.accumulated_resources)
            .min(econ.accumulated_resources);
        econ.accumulated_resources -= from_accumulated;

        stolen += from_current + from_accumulated;
    }

    if stolen > 0.0 {
        distribute_loot(attacker, stolen, population, graph);
        sink.record(
            cycle,
            SimEvent::ResourceTheft {
                attacker: attacker.id,
                victim: victim.id,
                amount: stolen,
            },
            Severity::Warning,
        );
    }

    // Polarization: every existing cross-clan tie weakens
    let intensity = (attacker_strength / victim_strength.max(1.0)).clamp(0.5, 2.0);
    let factor = 1.0 - config.polarization_factor * (1.0 - (-intensity / 2.0).exp());
    let mut polarized = 0u32;
    for &a in &attacker.members {
        for &v in &victim.members {
            if graph.weight(a, v) > 0.0 {
                graph.scale(a, v, factor);
                polarized += 1;
            }
        }
    }

    tracing::debug!(
        "clan {:?} raided {:?}: stole {:.1}, polarized {} connections (success {:.2})",
        attacker.id,
        victim.id,
        stolen,
        polarized,
        success_chance
    );

    ConflictOutcome {
        attacker: attacker.id,
        victim: victim.id,
        attacker_size: attacker.members.len(),
        victim_size: victim.members.len(),
        attacker_strength,
        victim_strength,
        success_chance,
        resources_stolen: stolen,
        connections_polarized: polarized,
        sides,
    }
}

/// Split loot over living attacker members proportional to their
/// intra-clan tie weight, evenly when nobody has any
fn distribute_loot(
    attacker: &Clan,
    loot: f64,
    population: &mut Population,
    graph: &ConnectionGraph,
) {
    let living = attacker.living_members(population);
    if living.is_empty() {
        return;
    }

    let weights: Vec<f64> = living
        .iter()
        .map(|&m| graph.weight_sum(m, &attacker.members))
        .collect();
    let total: f64 = weights.iter().sum();

    for (&member, &weight) in living.iter().zip(&weights) {
        let share = if total > 0.0 {
            loot * weight / total
        } else {
            loot / living.len() as f64
        };
        if let Some(agent) = population.get_mut(member) {
            agent.econ.current_resources += share;
        }
    }
}

/// Run every lawless clan's raid for this pass
///
/// Attackers act independently: two clans may raid the same victim,
/// and an attacker may itself be raided in the same pass.
pub fn process_conflicts(
    clans: &[Clan],
    population: &mut Population,
    graph: &mut ConnectionGraph,
    config: &SimulationConfig,
    rng: &mut impl Rng,
    sink: &mut dyn EventSink,
    cycle: Cycle,
) -> Vec<ConflictOutcome> {
    let mut outcomes = Vec::new();

    for (index, attacker) in clans.iter().enumerate() {
        if attacker.decision != Some(ClanRule::Lawlessness) {
            continue;
        }

        if clans.len() < 2 {
            tracing::debug!("clan {:?} is lawless but has no one to raid", attacker.id);
            continue;
        }

        // Uniform pick among the other clans
        let mut pick = rng.gen_range(0..clans.len() - 1);
        if pick >= index {
            pick += 1;
        }
        let victim = &clans[pick];

        outcomes.push(resolve_conflict(
            attacker, victim, population, graph, config, sink, cycle,
        ));
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AgentId;
    use crate::sim::events::NullSink;

    #[test]
    fn test_sigmoid_reference_points() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!((sigmoid(1.0) - 0.7310585786).abs() < 1e-9);
        assert!(sigmoid(-5.0) < 0.01);
    }

    #[test]
    fn test_malformed_conflict_is_neutral() {
        let mut population =
            Population::from_seeds((0..4).map(|i| (AgentId::new(i), 0u32)));
        let mut graph = ConnectionGraph::new(4);
        let config = SimulationConfig::default();

        let clan = Clan {
            id: crate::core::types::ClanId::new(0),
            members: vec![0, 1],
            density: 0.5,
            strength: 1.0,
            total_resources: 0.0,
            decision: Some(ClanRule::Lawlessness),
        };

        let outcome = resolve_conflict(
            &clan,
            &clan.clone(),
            &mut population,
            &mut graph,
            &config,
            &mut NullSink,
            1,
        );

        assert_eq!(outcome.resources_stolen, 0.0);
        assert_eq!(outcome.connections_polarized, 0);
        assert!(outcome.sides.neutral.is_empty());
    }
}
