//! Production, consumption, accumulation, and death
//!
//! Each economic cycle runs production (credited immediately), then a
//! progressive accumulation pass, then consumption with graduated
//! starvation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::graph::ConnectionGraph;
use crate::population::{EconomicRecord, Population};

/// Production efficiency floor for agents below the survival minimum
const FATIGUE_FLOOR: f64 = 0.6;

/// Aggregate result of one consumption pass
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ConsumptionReport {
    pub survived: u32,
    pub died: u32,
    pub total_consumed: f64,
}

/// Aggregate result of one full economic cycle
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct EconomyCycleReport {
    pub total_produced: f64,
    pub total_consumed: f64,
    pub survived: u32,
    pub died: u32,
    /// Mean current resources of agents still alive after consumption
    pub average_resources: f64,
}

/// The resource economy engine
pub struct EconomyEngine {
    config: SimulationConfig,
}

impl EconomyEngine {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Seed economic records for agents that do not have one yet
    ///
    /// Agents with an existing record are left untouched, so the engine
    /// can be re-initialized over a partially seeded population.
    pub fn initialize(&self, population: &mut Population) {
        let initial = self.config.initial_resources();
        for agent in population.agents_mut() {
            if agent.econ.is_fresh() {
                agent.econ = EconomicRecord::new(initial);
            }
        }
    }

    /// Production for one agent this cycle
    ///
    /// Returns 0 for dead agents. The value is recorded in the agent's
    /// production history and returned; the caller credits it to
    /// current resources.
    pub fn calculate_production(
        &self,
        population: &mut Population,
        graph: &ConnectionGraph,
        index: usize,
        rng: &mut impl Rng,
    ) -> f64 {
        let Some(agent) = population.get(index) else {
            return 0.0;
        };
        if !agent.econ.alive {
            return 0.0;
        }

        // Strong ties to living neighbors raise production; the bonus
        // is dampened as the tie count grows.
        let mut strong_sum = 0.0;
        let mut strong_count = 0u32;
        for (neighbor, weight) in graph.neighbors(index) {
            if weight >= self.config.strong_connection_threshold && population.is_alive(neighbor) {
                strong_sum += weight;
                strong_count += 1;
            }
        }
        let social = (1.0
            + self.config.connection_bonus * strong_sum / (1.0 + 0.05 * strong_count as f64))
            .min(self.config.max_multiplier);

        let current = agent.econ.current_resources;

        // Efficiency climbs linearly toward 1.0 as resources approach
        // the optimal level
        let optimal = 3.0 * self.config.base_productivity;
        let efficiency = if current >= optimal {
            1.0
        } else {
            self.config.min_efficiency + (1.0 - self.config.min_efficiency) * (current / optimal)
        };

        // Hungry agents work worse
        let fatigue = if current >= self.config.min_survival {
            1.0
        } else {
            FATIGUE_FLOOR + (1.0 - FATIGUE_FLOOR) * (current / self.config.min_survival)
        };

        let random_factor = rng.gen_range(0.7..1.3);

        let production =
            self.config.base_productivity * social * efficiency * random_factor * fatigue;

        if let Some(agent) = population.get_mut(index) {
            agent.econ.record_production(production);
        }

        production
    }

    /// Consumption pass over all living agents
    ///
    /// Demand is drawn per agent; unmet demand drains the savings
    /// buffer, and total depletion advances the starvation counter
    /// toward certain death at the threshold.
    pub fn process_consumption(
        &self,
        population: &mut Population,
        rng: &mut impl Rng,
    ) -> ConsumptionReport {
        let mut report = ConsumptionReport::default();
        let threshold = self.config.starvation_threshold;

        for agent in population.agents_mut() {
            if !agent.econ.alive {
                continue;
            }

            let demand = self.config.min_survival * rng.gen_range(0.7..1.3);
            let econ = &mut agent.econ;

            if econ.current_resources >= demand {
                econ.current_resources -= demand;
                econ.starvation_counter = econ.starvation_counter.saturating_sub(1);
                report.total_consumed += demand;
                report.survived += 1;
            } else if econ.current_resources + econ.accumulated_resources >= demand {
                // Savings cover the deficit
                let deficit = demand - econ.current_resources;
                econ.current_resources = 0.0;
                econ.accumulated_resources -= deficit;
                econ.starvation_counter = econ.starvation_counter.saturating_sub(1);
                report.total_consumed += demand;
                report.survived += 1;
            } else {
                // Total depletion: consume everything and starve
                report.total_consumed += econ.current_resources + econ.accumulated_resources;
                econ.current_resources = 0.0;
                econ.accumulated_resources = 0.0;
                econ.starvation_counter += 1;

                let death_chance =
                    (econ.starvation_counter as f64 / threshold as f64 * 0.5).min(0.9);

                if econ.starvation_counter >= threshold || rng.gen::<f64>() < death_chance {
                    econ.alive = false;
                    report.died += 1;
                    tracing::debug!(
                        "agent {:?} starved to death after {} depleted cycles",
                        agent.id,
                        econ.starvation_counter
                    );
                } else {
                    report.survived += 1;
                }
            }
        }

        report
    }

    /// Run one full economic cycle: production, accumulation,
    /// consumption
    pub fn execute_economic_cycle(
        &self,
        population: &mut Population,
        graph: &ConnectionGraph,
        rng: &mut impl Rng,
    ) -> EconomyCycleReport {
        let mut total_produced = 0.0;

        // Production is credited immediately, so agents later in the
        // arena observe earlier agents' updated state. The order
        // sensitivity is part of the model.
        for index in 0..population.len() {
            if !population.is_alive(index) {
                continue;
            }
            let produced = self.calculate_production(population, graph, index, rng);
            if let Some(agent) = population.get_mut(index) {
                agent.econ.current_resources += produced;
            }
            total_produced += produced;
        }

        self.accumulate_surplus(population);

        let consumption = self.process_consumption(population, rng);

        let living = population.living_count();
        let average_resources = if living > 0 {
            population
                .iter_living()
                .map(|(_, a)| a.econ.current_resources)
                .sum::<f64>()
                / living as f64
        } else {
            0.0
        };

        EconomyCycleReport {
            total_produced,
            total_consumed: consumption.total_consumed,
            survived: consumption.survived,
            died: consumption.died,
            average_resources,
        }
    }

    /// Move surplus above twice the survival minimum into savings
    ///
    /// The rate compounds with existing savings, bounded at 0.5.
    fn accumulate_surplus(&self, population: &mut Population) {
        let threshold = 2.0 * self.config.min_survival;

        for agent in population.agents_mut() {
            if !agent.econ.alive {
                continue;
            }
            let surplus = agent.econ.current_resources - threshold;
            if surplus <= 0.0 {
                continue;
            }

            let rate = (self.config.accumulation_rate
                * (1.0 + agent.econ.accumulated_resources / (10.0 * self.config.min_survival)))
                .min(0.5);
            let moved = surplus * rate;

            agent.econ.current_resources -= moved;
            agent.econ.accumulated_resources += moved;
        }
    }
}
