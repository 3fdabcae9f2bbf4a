//! Society simulation runner
//!
//! Builds a synthetic population and connection matrix, runs the
//! simulation, and prints a summary. The core never constructs its own
//! inputs, so the matrix generation lives here.

use std::path::PathBuf;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use clanfall::core::types::AgentId;
use clanfall::core::{Result, SimulationConfig};
use clanfall::sim::events::{EventLog, Severity};
use clanfall::sim::Simulation;

#[derive(Parser, Debug)]
#[command(name = "society_sim")]
#[command(about = "Run the agent society simulation")]
struct Args {
    /// TOML configuration file (defaults used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cycles to simulate
    #[arg(long, default_value_t = 60)]
    cycles: u64,

    /// Agents in the synthetic population
    #[arg(long, default_value_t = 40)]
    agents: usize,

    /// Cluster labels the agents are spread across
    #[arg(long, default_value_t = 4)]
    clusters: u32,

    /// Override the configured RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write the full JSON output to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => toml::from_str(&std::fs::read_to_string(path)?)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let clusters = args.clusters.max(1);
    let seeds: Vec<(AgentId, u32)> = (0..args.agents)
        .map(|i| (AgentId::new(i as u32), i as u32 % clusters))
        .collect();

    let mut matrix_rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1));
    let matrix = build_connection_matrix(args.agents, clusters, &mut matrix_rng);

    println!("Starting society simulation");
    println!("===========================");
    println!(
        "{} agents across {} clusters, {} cycles (seed {})",
        args.agents, clusters, args.cycles, config.seed
    );
    println!();

    let mut sim = Simulation::new(config, seeds, &matrix)?.with_sink(EventLog::new());
    let output = sim.run(args.cycles);

    println!("{}", output.summary());
    println!(
        "Mean resources {:.1}, inequality {:.2}, strata {}/{}/{} (poor/middle/rich)",
        output.economy.mean,
        output.economy.inequality,
        output.economy.strata.poor,
        output.economy.strata.middle,
        output.economy.strata.rich,
    );

    for record in &output.clans.clans {
        println!(
            "Clan {:?}: {}/{} alive, density {:.2}, strength {:.2}, {:.1} resources, rule {:?}",
            record.id,
            record.living,
            record.members,
            record.density,
            record.strength,
            record.current_resources,
            record.decision,
        );
    }

    let events = sim.sink();
    println!(
        "{} events recorded ({} warnings, {} critical)",
        events.events.len(),
        events.count_severity(Severity::Warning),
        events.count_severity(Severity::Critical),
    );

    if let Some(path) = &args.output {
        std::fs::write(path, output.to_json())?;
        println!("Full output written to {}", path.display());
    }

    Ok(())
}

/// Synthetic connection matrix: dense ties within a cluster, sparse
/// weak ties across clusters
fn build_connection_matrix(n: usize, clusters: u32, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
    let mut rows = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let same_cluster = (i as u32 % clusters) == (j as u32 % clusters);
            let weight = if same_cluster {
                rng.gen_range(0.2..0.9)
            } else if rng.gen::<f64>() < 0.1 {
                rng.gen_range(0.05..0.3)
            } else {
                0.0
            };
            rows[i][j] = weight;
            rows[j][i] = weight;
        }
    }
    rows
}
