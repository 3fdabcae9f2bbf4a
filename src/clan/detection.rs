//! Clan detection from cluster labels and weighted graph density

use ahash::AHashMap;

use crate::core::config::SimulationConfig;
use crate::core::types::{ClanId, Cycle};
use crate::graph::ConnectionGraph;
use crate::population::Population;
use crate::sim::events::{EventSink, Severity, SimEvent};

use super::Clan;

/// Minimum weight for a pair to count toward density
const SIGNIFICANT_WEIGHT: f64 = 0.1;

/// Weighted internal density of a candidate group
///
/// Only pairs at or above the significance threshold count; the
/// coverage fraction is scaled by the average weight of those pairs.
pub fn weighted_density(members: &[usize], graph: &ConnectionGraph) -> f64 {
    if members.len() < 2 {
        return 0.0;
    }

    let possible = members.len() * (members.len() - 1) / 2;
    let mut significant = 0usize;
    let mut weight_sum = 0.0;

    for (position, &i) in members.iter().enumerate() {
        for &j in &members[position + 1..] {
            let weight = graph.weight(i, j);
            if weight >= SIGNIFICANT_WEIGHT {
                significant += 1;
                weight_sum += weight;
            }
        }
    }

    if significant == 0 {
        return 0.0;
    }

    let coverage = significant as f64 / possible as f64;
    let average = weight_sum / significant as f64;
    coverage * average
}

/// Strength of one member relative to its clan
///
/// Ties inside the clan count double, ties outside count at half
/// weight. The weighted average influence is boosted by the square
/// root of the tie count, so more connections help with diminishing
/// returns. No living ties means no strength.
pub fn agent_strength(
    index: usize,
    members: &[usize],
    population: &Population,
    graph: &ConnectionGraph,
) -> f64 {
    let mut influence = 0.0;
    let mut weight_total = 0.0;
    let mut count = 0u32;

    for (neighbor, weight) in graph.neighbors(index) {
        if !population.is_alive(neighbor) {
            continue;
        }
        influence += if members.contains(&neighbor) {
            weight * 2.0
        } else {
            weight * 0.5
        };
        weight_total += weight;
        count += 1;
    }

    if count == 0 || weight_total <= 0.0 {
        return 0.0;
    }

    (influence / weight_total) * (count as f64).sqrt()
}

/// Group living agents by cluster label and keep the dense groups
///
/// Replaces any previous clan list; ids are positions in the returned
/// list and carry no meaning across passes.
pub fn identify_clans(
    population: &Population,
    graph: &ConnectionGraph,
    config: &SimulationConfig,
    sink: &mut dyn EventSink,
    cycle: Cycle,
) -> Vec<Clan> {
    let mut groups: AHashMap<u32, Vec<usize>> = AHashMap::new();
    for (index, agent) in population.iter_living() {
        groups.entry(agent.cluster).or_default().push(index);
    }

    // Visit clusters in sorted order so clan ids are reproducible
    let mut clusters: Vec<u32> = groups.keys().copied().collect();
    clusters.sort_unstable();

    let mut clans = Vec::new();
    for cluster in clusters {
        let members = groups.remove(&cluster).unwrap_or_default();
        if members.len() < config.min_clan_size {
            continue;
        }

        let density = weighted_density(&members, graph);
        if density < config.density_threshold {
            continue;
        }

        let strength: f64 = members
            .iter()
            .map(|&m| agent_strength(m, &members, population, graph))
            .sum();
        let total_resources: f64 = members
            .iter()
            .filter_map(|&m| population.get(m))
            .filter(|a| a.econ.alive)
            .map(|a| a.econ.current_resources)
            .sum();

        let id = ClanId::new(clans.len() as u32);
        sink.record(
            cycle,
            SimEvent::ClanFormed {
                clan: id,
                members: members.len(),
                density,
            },
            Severity::Info,
        );
        tracing::debug!(
            "clan {:?} formed from cluster {}: {} members, density {:.3}",
            id,
            cluster,
            members.len(),
            density
        );

        clans.push(Clan {
            id,
            members,
            density,
            strength,
            total_resources,
            decision: None,
        });
    }

    clans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AgentId;
    use crate::sim::events::NullSink;

    fn population_in_clusters(clusters: &[u32]) -> Population {
        let mut population = Population::from_seeds(
            clusters
                .iter()
                .enumerate()
                .map(|(i, &c)| (AgentId::new(i as u32), c)),
        );
        for agent in population.agents_mut() {
            agent.econ.current_resources = 20.0;
        }
        population
    }

    #[test]
    fn test_density_of_fully_connected_group() {
        let mut graph = ConnectionGraph::new(4);
        for i in 0..4 {
            for j in (i + 1)..4 {
                graph.set(i, j, 0.6);
            }
        }

        let density = weighted_density(&[0, 1, 2, 3], &graph);
        assert!((density - 0.6).abs() < 1e-9, "full coverage at 0.6 gives density 0.6");
    }

    #[test]
    fn test_density_ignores_insignificant_pairs() {
        let mut graph = ConnectionGraph::new(3);
        graph.set(0, 1, 0.05);
        graph.set(1, 2, 0.05);
        graph.set(0, 2, 0.05);

        assert_eq!(weighted_density(&[0, 1, 2], &graph), 0.0);
    }

    #[test]
    fn test_isolated_agent_has_zero_strength() {
        let population = population_in_clusters(&[0, 0, 0]);
        let graph = ConnectionGraph::new(3);
        assert_eq!(agent_strength(0, &[0, 1, 2], &population, &graph), 0.0);
    }

    #[test]
    fn test_intra_clan_ties_outweigh_external_ones() {
        let population = population_in_clusters(&[0, 0, 1, 1]);
        let mut graph = ConnectionGraph::new(4);
        // agent 0 is tied inside its clan, agent 2 only outside its own
        graph.set(0, 1, 0.8);
        graph.set(2, 0, 0.8);

        let inside = agent_strength(0, &[0, 1], &population, &graph);
        let outside = agent_strength(2, &[2, 3], &population, &graph);
        assert!(
            inside > outside,
            "clan-internal ties ({}) should beat external ones ({})",
            inside,
            outside
        );
    }

    #[test]
    fn test_identify_clans_enforces_size_and_density() {
        // cluster 0: 4 well-connected agents; cluster 1: 4 barely
        // connected; cluster 2: only 2 agents
        let population = population_in_clusters(&[0, 0, 0, 0, 1, 1, 1, 1, 2, 2]);
        let mut graph = ConnectionGraph::new(10);
        for i in 0..4 {
            for j in (i + 1)..4 {
                graph.set(i, j, 0.7);
            }
        }
        graph.set(4, 5, 0.05);
        graph.set(8, 9, 0.9);

        let config = SimulationConfig::default();
        let clans = identify_clans(&population, &graph, &config, &mut NullSink, 1);

        assert_eq!(clans.len(), 1, "only the dense 4-agent cluster qualifies");
        assert_eq!(clans[0].members, vec![0, 1, 2, 3]);
        assert!(clans[0].density >= config.density_threshold);
        assert!(clans[0].strength > 0.0);
        assert_eq!(clans[0].total_resources, 80.0);
        assert!(clans[0].decision.is_none());
    }

    #[test]
    fn test_dead_agents_never_join_clans() {
        let mut population = population_in_clusters(&[0, 0, 0, 0]);
        population.get_mut(3).unwrap().econ.alive = false;
        let mut graph = ConnectionGraph::new(4);
        for i in 0..4 {
            for j in (i + 1)..4 {
                graph.set(i, j, 0.7);
            }
        }

        let clans = identify_clans(
            &population,
            &graph,
            &SimulationConfig::default(),
            &mut NullSink,
            1,
        );

        assert_eq!(clans.len(), 1);
        assert_eq!(clans[0].members, vec![0, 1, 2]);
    }
}
