//! Intra-clan and inter-clan resource distribution

use ahash::AHashSet;
use ordered_float::OrderedFloat;
use rand::Rng;

use crate::core::config::SimulationConfig;
use crate::core::types::Cycle;
use crate::graph::ConnectionGraph;
use crate::population::Population;
use crate::sim::events::{EventSink, Severity, SimEvent};

use super::{agent_strength, decide_rule, Clan, ClanRule, ShareRule};

/// Multiple of min survival a taxed member keeps; the surplus above it
/// is surrendered
const TAX_FLOOR_MULTIPLE: f64 = 1.5;
/// Share of the surrendered surplus collected as tax
const TAX_RATE: f64 = 0.6;
/// Dictator's cut of the collected tax
const TAX_KEPT: f64 = 0.9;
/// Multiple of min survival exempt from inter-clan pooling
const BUFFER_MULTIPLE: f64 = 2.5;
/// Share of the inter-clan pool that goes to clans; the rest goes to
/// unaffiliated agents
const CLAN_POOL_SHARE: f64 = 0.8;

/// Apply the clan's governance rule to its members' resources
///
/// Votes a rule first if no decision has been made this pass. After
/// the rule runs, every living member's current resources are also
/// counted into accumulated savings.
pub fn distribute_resources(
    clan: &mut Clan,
    population: &mut Population,
    graph: &ConnectionGraph,
    config: &SimulationConfig,
    rng: &mut impl Rng,
    sink: &mut dyn EventSink,
    cycle: Cycle,
) {
    let rule = match clan.decision {
        Some(rule) => rule,
        None => {
            let rule = decide_rule(clan, population, graph, rng, sink, cycle);
            clan.decision = Some(rule);
            rule
        }
    };

    let living = clan.living_members(population);
    if living.is_empty() {
        tracing::warn!(
            "distribution skipped for clan {:?}: no living members",
            clan.id
        );
        return;
    }

    match rule {
        ClanRule::Dictatorship => apply_dictatorship(clan, &living, population, graph, config),
        ClanRule::Democracy(share) => {
            apply_democracy(clan, &living, population, graph, config, share)
        }
        ClanRule::Lawlessness => {
            // Raiding instead of sharing; the conflict pass handles it
        }
    }

    for &member in &living {
        if let Some(agent) = population.get_mut(member) {
            agent.econ.accumulated_resources += agent.econ.current_resources;
        }
    }
}

/// The strongest member collects tax from everyone else
///
/// Taxed members surrender their whole surplus above the floor; only
/// the tax rate's worth of it is collected, and the dictator keeps 90%
/// of the collection.
fn apply_dictatorship(
    clan: &Clan,
    living: &[usize],
    population: &mut Population,
    graph: &ConnectionGraph,
    config: &SimulationConfig,
) {
    let strongest = living
        .iter()
        .copied()
        .max_by_key(|&m| OrderedFloat(agent_strength(m, &clan.members, population, graph)));
    let Some(strongest) = strongest else {
        return;
    };

    let floor = TAX_FLOOR_MULTIPLE * config.min_survival;
    let mut collected = 0.0;

    for &member in living {
        if member == strongest {
            continue;
        }
        let Some(agent) = population.get_mut(member) else {
            continue;
        };
        let surplus = agent.econ.current_resources - floor;
        if surplus > 0.0 {
            agent.econ.current_resources = floor;
            collected += surplus * TAX_RATE;
        }
    }

    if let Some(agent) = population.get_mut(strongest) {
        agent.econ.current_resources += collected * TAX_KEPT;
    }
}

/// Pool everything above personal survival and divide it by sub-rule
fn apply_democracy(
    clan: &Clan,
    living: &[usize],
    population: &mut Population,
    graph: &ConnectionGraph,
    config: &SimulationConfig,
    share: ShareRule,
) {
    let mut pool = 0.0;
    for &member in living {
        if let Some(agent) = population.get_mut(member) {
            let excess = agent.econ.current_resources - config.min_survival;
            if excess > 0.0 {
                agent.econ.current_resources = config.min_survival;
                pool += excess;
            }
        }
    }
    if pool <= 0.0 {
        return;
    }

    match share.fraction() {
        None => {
            let each = pool / living.len() as f64;
            for &member in living {
                if let Some(agent) = population.get_mut(member) {
                    agent.econ.current_resources += each;
                }
            }
        }
        Some(fraction) => {
            // Strength-ordered walk: each member takes its fraction of
            // what is left, the last member takes the remainder
            let mut order = living.to_vec();
            order.sort_by_key(|&m| {
                std::cmp::Reverse(OrderedFloat(agent_strength(
                    m,
                    &clan.members,
                    population,
                    graph,
                )))
            });

            let mut remaining = pool;
            for (position, &member) in order.iter().enumerate() {
                let grant = if position + 1 == order.len() {
                    remaining
                } else {
                    remaining * fraction
                };
                remaining -= grant;
                if let Some(agent) = population.get_mut(member) {
                    agent.econ.current_resources += grant;
                }
            }
        }
    }
}

/// Pool surplus above the buffer zone and share it out: 80% across
/// clans proportional to strength, 20% evenly across living agents in
/// no clan
///
/// With no unaffiliated agents the whole pool goes to the clans. Zero
/// surplus or zero total strength is a no-op with nothing collected.
pub fn distribute_between_clans(
    population: &mut Population,
    clans: &[Clan],
    config: &SimulationConfig,
    sink: &mut dyn EventSink,
    cycle: Cycle,
) {
    let buffer = BUFFER_MULTIPLE * config.min_survival;

    let total_strength: f64 = clans.iter().map(|c| c.strength).sum();
    let pool: f64 = population
        .iter_living()
        .map(|(_, a)| (a.econ.current_resources - buffer).max(0.0))
        .sum();
    if pool <= 0.0 || total_strength <= 0.0 {
        return;
    }

    for agent in population.agents_mut() {
        if agent.econ.alive && agent.econ.current_resources > buffer {
            agent.econ.current_resources = buffer;
        }
    }

    let clan_members: AHashSet<usize> = clans
        .iter()
        .flat_map(|c| c.members.iter().copied())
        .collect();
    let unaffiliated: Vec<usize> = population
        .iter_living()
        .map(|(i, _)| i)
        .filter(|i| !clan_members.contains(i))
        .collect();

    let clan_pool = if unaffiliated.is_empty() {
        pool
    } else {
        pool * CLAN_POOL_SHARE
    };

    for clan in clans {
        let living = clan.living_members(population);
        if living.is_empty() {
            continue;
        }
        let each = clan_pool * clan.strength / total_strength / living.len() as f64;
        for &member in &living {
            if let Some(agent) = population.get_mut(member) {
                agent.econ.current_resources += each;
            }
        }
    }

    if !unaffiliated.is_empty() {
        let each = pool * (1.0 - CLAN_POOL_SHARE) / unaffiliated.len() as f64;
        for &index in &unaffiliated {
            if let Some(agent) = population.get_mut(index) {
                agent.econ.current_resources += each;
            }
        }
    }

    sink.record(
        cycle,
        SimEvent::InterClanDistribution {
            pool,
            clans: clans.len(),
        },
        Severity::Info,
    );
    tracing::debug!(
        "inter-clan distribution moved {:.1} across {} clans and {} unaffiliated agents",
        pool,
        clans.len(),
        unaffiliated.len()
    );
}
