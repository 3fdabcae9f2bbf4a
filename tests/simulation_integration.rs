//! End-to-end orchestrator tests
//!
//! These run the full cycle loop: determinism under a fixed seed,
//! sink transparency, phase ordering, and arena stability as agents
//! die off.

use clanfall::clan::identify_clans;
use clanfall::conflict::resolve_conflict;
use clanfall::core::types::{AgentId, CycleKind};
use clanfall::core::SimulationConfig;
use clanfall::graph::ConnectionGraph;
use clanfall::population::Population;
use clanfall::sim::events::{EventLog, NullSink, SimEvent};
use clanfall::sim::Simulation;

/// Agents spread over clusters, fully connected inside each cluster
/// and sparsely connected across
fn demo_inputs(n: usize, clusters: u32) -> (Vec<(AgentId, u32)>, Vec<Vec<f64>>) {
    let seeds: Vec<(AgentId, u32)> = (0..n)
        .map(|i| (AgentId::new(i as u32), i as u32 % clusters))
        .collect();

    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let weight = if (i as u32 % clusters) == (j as u32 % clusters) {
                0.7
            } else if (i + j) % 5 == 0 {
                0.2
            } else {
                0.0
            };
            matrix[i][j] = weight;
            matrix[j][i] = weight;
        }
    }
    (seeds, matrix)
}

#[test]
fn test_same_seed_reproduces_the_run() {
    let (seeds, matrix) = demo_inputs(24, 4);
    let config = SimulationConfig::default();

    let mut first = Simulation::new(config.clone(), seeds.clone(), &matrix).unwrap();
    let mut second = Simulation::new(config, seeds, &matrix).unwrap();

    let output_a = first.run(15);
    let output_b = second.run(15);

    // Everything except wall-clock timing must match exactly
    assert_eq!(
        serde_json::to_string(&output_a.reports).unwrap(),
        serde_json::to_string(&output_b.reports).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&output_a.economy).unwrap(),
        serde_json::to_string(&output_b.economy).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&output_a.clans).unwrap(),
        serde_json::to_string(&output_b.clans).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&output_a.conflicts).unwrap(),
        serde_json::to_string(&output_b.conflicts).unwrap()
    );
}

#[test]
fn test_recording_sink_does_not_change_the_run() {
    let (seeds, matrix) = demo_inputs(24, 4);
    let config = SimulationConfig::default();

    let mut silent = Simulation::new(config.clone(), seeds.clone(), &matrix).unwrap();
    let mut observed =
        Simulation::new(config, seeds, &matrix).unwrap().with_sink(EventLog::new());

    let output_a = silent.run(15);
    let output_b = observed.run(15);

    assert_eq!(
        serde_json::to_string(&output_a.reports).unwrap(),
        serde_json::to_string(&output_b.reports).unwrap(),
        "the sink is a pure observer"
    );

    let log = observed.sink();
    assert!(
        log.events
            .iter()
            .any(|e| matches!(e.event, SimEvent::ClanFormed { .. })),
        "dense clusters should have formed clans"
    );
}

#[test]
fn test_social_cycles_leave_the_economy_alone() {
    let (seeds, matrix) = demo_inputs(12, 3);
    let mut sim = Simulation::new(SimulationConfig::default(), seeds, &matrix).unwrap();

    // Cycles 1 and 2 are social under the default interval of 3
    let first = sim.run_cycle();
    assert_eq!(first.kind, CycleKind::Social);
    assert!(first.economy.is_none());

    let initial = sim.config().initial_resources();
    for (_, agent) in sim.population().iter_living() {
        assert_eq!(
            agent.econ.current_resources, initial,
            "no production or consumption on a social cycle"
        );
    }

    sim.run_cycle();
    let third = sim.run_cycle();
    assert_eq!(third.kind, CycleKind::Economic);
    assert!(third.economy.is_some());
}

#[test]
fn test_polarization_reshapes_the_next_detection_pass() {
    // Two dense clusters with cross ties; a conflict weakens the cross
    // ties, which changes member strengths on the next detection pass
    let mut population = Population::from_seeds(
        (0..8).map(|i| (AgentId::new(i), if i < 4 { 0u32 } else { 1u32 })),
    );
    for agent in population.agents_mut() {
        agent.econ.current_resources = 30.0;
    }
    let mut graph = ConnectionGraph::new(8);
    for i in 0..4usize {
        for j in (i + 1)..4 {
            graph.set(i, j, 0.7);
        }
    }
    for i in 4..8usize {
        for j in (i + 1)..8 {
            graph.set(i, j, 0.7);
        }
    }
    graph.set(0, 4, 0.6);
    graph.set(1, 5, 0.6);

    let config = SimulationConfig::default();
    let before = identify_clans(&population, &graph, &config, &mut NullSink, 3);
    assert_eq!(before.len(), 2);

    resolve_conflict(
        &before[0],
        &before[1],
        &mut population,
        &mut graph,
        &config,
        &mut NullSink,
        3,
    );

    let after = identify_clans(&population, &graph, &config, &mut NullSink, 6);
    assert_eq!(after.len(), 2);

    // Cross ties weakened, so the density of each cluster is unchanged
    // but clan strengths moved
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.density, new.density);
        assert!(
            (old.strength - new.strength).abs() > 1e-9,
            "clan {:?} strength should reflect the polarized graph",
            old.id
        );
    }
}

#[test]
fn test_dead_agents_keep_the_arena_stable() {
    // Production far below consumption: the population starves down
    // while the arena keeps its size and index mapping
    let (seeds, matrix) = demo_inputs(10, 2);
    let config = SimulationConfig {
        base_productivity: 0.5,
        ..Default::default()
    };
    let mut sim = Simulation::new(config, seeds, &matrix).unwrap();

    let output = sim.run(30);

    assert_eq!(sim.population().len(), 10, "dead agents stay in the arena");
    assert_eq!(
        sim.population().living_count(),
        0,
        "starvation should wipe out the population"
    );
    for i in 0..10u32 {
        assert_eq!(
            sim.population().index_of(AgentId::new(i)),
            Some(i as usize),
            "index mapping survives deaths"
        );
    }

    assert_eq!(output.economy.living, 0);
    assert_eq!(output.economy.mean, 0.0, "stats fall back to the zero shape");

    let deaths: u32 = output
        .reports
        .iter()
        .filter_map(|r| r.economy.as_ref())
        .map(|e| e.died)
        .sum();
    assert_eq!(deaths, 10, "every death is accounted for in the reports");

    println!("starvation run: {}", output.summary());
}
