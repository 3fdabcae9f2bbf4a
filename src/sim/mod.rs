//! Cycle orchestration
//!
//! Owns the population, connection graph, economy engine, seeded RNG,
//! and clan list. Cycles alternate between social and economic on a
//! fixed interval; each economic cycle runs its phases in a fixed
//! order, so later phases always observe earlier phases' mutations.

pub mod events;
pub mod output;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::clan::{self, Clan};
use crate::conflict::{self, ConflictOutcome};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Cycle, CycleKind};
use crate::economy::{EconomicStats, EconomyEngine};
use crate::graph::ConnectionGraph;
use crate::population::Population;

use events::{EventSink, NullSink};
use output::{CycleReport, SimulationOutput};

/// Boundary for the out-of-scope social cycle logic
///
/// Implementations may strengthen or weaken connections between
/// economic cycles; the default does nothing.
pub trait SocialDynamics {
    fn run_social_cycle(
        &mut self,
        population: &mut Population,
        graph: &mut ConnectionGraph,
        rng: &mut dyn rand::RngCore,
    );
}

/// Default collaborator: social cycles change nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSocialDynamics;

impl SocialDynamics for NoSocialDynamics {
    fn run_social_cycle(
        &mut self,
        _population: &mut Population,
        _graph: &mut ConnectionGraph,
        _rng: &mut dyn rand::RngCore,
    ) {
    }
}

/// The cyclic simulation engine
pub struct Simulation<S: EventSink = NullSink> {
    config: SimulationConfig,
    population: Population,
    graph: ConnectionGraph,
    engine: EconomyEngine,
    rng: ChaCha8Rng,
    clans: Vec<Clan>,
    conflicts: Vec<ConflictOutcome>,
    cycle: Cycle,
    social: Box<dyn SocialDynamics>,
    sink: S,
}

impl Simulation<NullSink> {
    /// Build a simulation from config, `(id, cluster)` agent seeds, and
    /// an externally supplied symmetric connection matrix
    pub fn new(
        config: SimulationConfig,
        seeds: Vec<(AgentId, u32)>,
        matrix: &[Vec<f64>],
    ) -> Result<Self> {
        config.validate()?;

        let mut population = Population::from_seeds(seeds);
        let graph = ConnectionGraph::from_matrix(matrix)?;
        if graph.len() != population.len() {
            return Err(SimError::MatrixShape {
                agents: population.len(),
                rows: graph.len(),
                cols: graph.len(),
            });
        }

        let engine = EconomyEngine::new(config.clone());
        engine.initialize(&mut population);

        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        Ok(Self {
            config,
            population,
            graph,
            engine,
            rng,
            clans: Vec::new(),
            conflicts: Vec::new(),
            cycle: 0,
            social: Box::new(NoSocialDynamics),
            sink: NullSink,
        })
    }
}

impl<S: EventSink> Simulation<S> {
    /// Swap in an observing event sink
    pub fn with_sink<T: EventSink>(self, sink: T) -> Simulation<T> {
        Simulation {
            config: self.config,
            population: self.population,
            graph: self.graph,
            engine: self.engine,
            rng: self.rng,
            clans: self.clans,
            conflicts: self.conflicts,
            cycle: self.cycle,
            social: self.social,
            sink,
        }
    }

    /// Swap in a social-cycle collaborator
    pub fn with_social_dynamics(mut self, social: Box<dyn SocialDynamics>) -> Self {
        self.social = social;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn graph(&self) -> &ConnectionGraph {
        &self.graph
    }

    /// Clans from the most recent detection pass
    pub fn clans(&self) -> &[Clan] {
        &self.clans
    }

    pub fn conflicts(&self) -> &[ConflictOutcome] {
        &self.conflicts
    }

    pub fn current_cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Advance one cycle
    pub fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;

        if self.cycle % self.config.economic_interval == 0 {
            self.run_economic_cycle()
        } else {
            self.social
                .run_social_cycle(&mut self.population, &mut self.graph, &mut self.rng);
            CycleReport {
                cycle: self.cycle,
                kind: CycleKind::Social,
                economy: None,
                clans: self.clans.len(),
                conflicts: 0,
                living: self.population.living_count(),
            }
        }
    }

    fn run_economic_cycle(&mut self) -> CycleReport {
        // 1. Production, accumulation, consumption
        let economy =
            self.engine
                .execute_economic_cycle(&mut self.population, &self.graph, &mut self.rng);

        // 2. Clan detection replaces the previous pass's list
        self.clans = clan::identify_clans(
            &self.population,
            &self.graph,
            &self.config,
            &mut self.sink,
            self.cycle,
        );

        // 3. Every clan votes its rule for this pass
        for index in 0..self.clans.len() {
            let rule = clan::decide_rule(
                &self.clans[index],
                &self.population,
                &self.graph,
                &mut self.rng,
                &mut self.sink,
                self.cycle,
            );
            self.clans[index].decision = Some(rule);
        }

        // 4. Lawless clans raid before anyone shares
        let outcomes = conflict::process_conflicts(
            &self.clans,
            &mut self.population,
            &mut self.graph,
            &self.config,
            &mut self.rng,
            &mut self.sink,
            self.cycle,
        );
        let conflicts = outcomes.len();
        self.conflicts.extend(outcomes);

        // 5. Intra-clan distribution under the voted rules
        for index in 0..self.clans.len() {
            clan::distribute_resources(
                &mut self.clans[index],
                &mut self.population,
                &self.graph,
                &self.config,
                &mut self.rng,
                &mut self.sink,
                self.cycle,
            );
        }

        // 6. Inter-clan strength-weighted redistribution
        clan::distribute_between_clans(
            &mut self.population,
            &self.clans,
            &self.config,
            &mut self.sink,
            self.cycle,
        );

        CycleReport {
            cycle: self.cycle,
            kind: CycleKind::Economic,
            economy: Some(economy),
            clans: self.clans.len(),
            conflicts,
            living: self.population.living_count(),
        }
    }

    /// Run `cycles` cycles and assemble the final output
    pub fn run(&mut self, cycles: u64) -> SimulationOutput {
        let start = std::time::Instant::now();

        let mut reports = Vec::with_capacity(cycles as usize);
        for _ in 0..cycles {
            reports.push(self.run_cycle());
        }

        SimulationOutput::new(
            reports,
            EconomicStats::measure(&self.population),
            clan::clan_statistics(&self.clans, &self.population),
            self.conflicts.clone(),
            start.elapsed(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_inputs(n: usize, clusters: u32) -> (Vec<(AgentId, u32)>, Vec<Vec<f64>>) {
        let seeds: Vec<(AgentId, u32)> = (0..n)
            .map(|i| (AgentId::new(i as u32), i as u32 % clusters))
            .collect();

        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                if (i as u32 % clusters) == (j as u32 % clusters) {
                    matrix[i][j] = 0.7;
                    matrix[j][i] = 0.7;
                }
            }
        }
        (seeds, matrix)
    }

    #[test]
    fn test_cycles_alternate_on_the_interval() {
        let (seeds, matrix) = demo_inputs(12, 3);
        let mut sim = Simulation::new(SimulationConfig::default(), seeds, &matrix).unwrap();

        let output = sim.run(9);

        for report in &output.reports {
            let expected = if report.cycle % 3 == 0 {
                CycleKind::Economic
            } else {
                CycleKind::Social
            };
            assert_eq!(report.kind, expected, "cycle {} has the wrong kind", report.cycle);
            assert_eq!(report.economy.is_some(), expected == CycleKind::Economic);
        }
        assert_eq!(output.statistics.economic_cycles, 3);
    }

    #[test]
    fn test_construction_rejects_invalid_config() {
        let (seeds, matrix) = demo_inputs(6, 2);
        let config = SimulationConfig {
            min_clan_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            Simulation::new(config, seeds, &matrix),
            Err(SimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_construction_rejects_mismatched_matrix() {
        let (seeds, _) = demo_inputs(6, 2);
        let matrix = vec![vec![0.0; 4]; 4];
        assert!(matches!(
            Simulation::new(SimulationConfig::default(), seeds, &matrix),
            Err(SimError::MatrixShape { .. })
        ));
    }
}
