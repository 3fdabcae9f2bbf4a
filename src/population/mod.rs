//! Agents and the population arena
//!
//! Dead agents stay in the arena so matrix indices remain stable; every
//! consumer filters on `alive`.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::AgentId;

/// Bounded length of the per-agent production history buffer
const MAX_PRODUCTION_HISTORY: usize = 64;

/// Per-agent economic state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EconomicRecord {
    /// Liquid resources, spent first by consumption
    pub current_resources: f64,
    /// Savings buffer, drawn on when current resources run out
    pub accumulated_resources: f64,
    pub alive: bool,
    /// Consecutive cycles of unmet consumption
    pub starvation_counter: u32,
    /// Recent production samples, newest last
    pub production_history: Vec<f64>,
}

impl EconomicRecord {
    pub fn new(initial_resources: f64) -> Self {
        Self {
            current_resources: initial_resources,
            accumulated_resources: 0.0,
            alive: true,
            starvation_counter: 0,
            production_history: Vec::new(),
        }
    }

    /// A record that has never produced, consumed, or starved counts as
    /// missing and gets seeded by `EconomyEngine::initialize`.
    pub fn is_fresh(&self) -> bool {
        self.current_resources == 0.0
            && self.accumulated_resources == 0.0
            && self.starvation_counter == 0
            && self.production_history.is_empty()
    }

    pub fn record_production(&mut self, amount: f64) {
        self.production_history.push(amount);
        if self.production_history.len() > MAX_PRODUCTION_HISTORY {
            self.production_history.remove(0);
        }
    }

    /// Mean of the recorded production samples (0 when empty)
    pub fn recent_production(&self) -> f64 {
        if self.production_history.is_empty() {
            return 0.0;
        }
        self.production_history.iter().sum::<f64>() / self.production_history.len() as f64
    }

    pub fn total_resources(&self) -> f64 {
        self.current_resources + self.accumulated_resources
    }
}

impl Default for EconomicRecord {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// A simulated individual
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// Cluster label used as the clan-candidacy grouping key
    pub cluster: u32,
    pub econ: EconomicRecord,
}

/// Agent arena with stable indices and an explicit id -> index map
#[derive(Clone, Debug, Default)]
pub struct Population {
    agents: Vec<Agent>,
    index: AHashMap<AgentId, usize>,
}

impl Population {
    /// Build a population from `(id, cluster)` seeds with unseeded
    /// economic records.
    pub fn from_seeds(seeds: impl IntoIterator<Item = (AgentId, u32)>) -> Self {
        let mut population = Self::default();
        for (id, cluster) in seeds {
            population.push(Agent {
                id,
                cluster,
                econ: EconomicRecord::default(),
            });
        }
        population
    }

    /// Append an agent, keeping the id -> index map current.
    ///
    /// A duplicate id replaces the mapping and is warned about; the old
    /// agent stays in the arena for index stability.
    pub fn push(&mut self, agent: Agent) -> usize {
        let idx = self.agents.len();
        if self.index.insert(agent.id, idx).is_some() {
            tracing::warn!("duplicate agent id {:?}, later entry shadows earlier", agent.id);
        }
        self.agents.push(agent);
        idx
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Agent> {
        self.agents.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Agent> {
        self.agents.get_mut(idx)
    }

    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn is_alive(&self, idx: usize) -> bool {
        self.agents.get(idx).map(|a| a.econ.alive).unwrap_or(false)
    }

    pub fn iter_living(&self) -> impl Iterator<Item = (usize, &Agent)> {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.econ.alive)
    }

    pub fn living_count(&self) -> usize {
        self.agents.iter().filter(|a| a.econ.alive).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seeds_builds_index() {
        let population =
            Population::from_seeds([(AgentId(10), 0), (AgentId(20), 1), (AgentId(30), 0)]);

        assert_eq!(population.len(), 3);
        assert_eq!(population.index_of(AgentId(20)), Some(1));
        assert_eq!(population.index_of(AgentId(99)), None);
    }

    #[test]
    fn test_fresh_records_detected() {
        let mut record = EconomicRecord::default();
        assert!(record.is_fresh());

        record.record_production(4.2);
        assert!(!record.is_fresh());
    }

    #[test]
    fn test_production_history_is_bounded() {
        let mut record = EconomicRecord::new(10.0);
        for i in 0..200 {
            record.record_production(i as f64);
        }
        assert_eq!(record.production_history.len(), MAX_PRODUCTION_HISTORY);
        assert_eq!(*record.production_history.last().unwrap(), 199.0);
    }

    #[test]
    fn test_living_count_excludes_dead() {
        let mut population = Population::from_seeds([(AgentId(1), 0), (AgentId(2), 0)]);
        population.get_mut(0).unwrap().econ.alive = false;

        assert_eq!(population.living_count(), 1);
        let living: Vec<usize> = population.iter_living().map(|(i, _)| i).collect();
        assert_eq!(living, vec![1]);
    }
}
