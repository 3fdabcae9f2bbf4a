//! Descriptive statistics over living agents' resources

use serde::{Deserialize, Serialize};

use crate::population::Population;

/// Quartile-based tri-class stratification of the living population
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WealthStrata {
    /// Below the first quartile
    pub poor: u32,
    pub middle: u32,
    /// Above the third quartile
    pub rich: u32,
}

/// Snapshot of the living population's resource distribution
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomicStats {
    pub living: u32,
    pub mean: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub std_dev: f64,
    /// Coefficient of variation (std dev over mean)
    pub inequality: f64,
    pub strata: WealthStrata,
}

impl EconomicStats {
    /// Measure the living population
    ///
    /// An empty (or fully dead) population yields the all-zero shape
    /// rather than NaN.
    pub fn measure(population: &Population) -> Self {
        let mut resources: Vec<f64> = population
            .iter_living()
            .map(|(_, a)| a.econ.current_resources)
            .collect();

        if resources.is_empty() {
            return Self::default();
        }

        resources.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = resources.len() as f64;
        let mean = resources.iter().sum::<f64>() / n;
        let variance = resources.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        let inequality = if mean > 0.0 { std_dev / mean } else { 0.0 };

        let q1 = percentile(&resources, 0.25);
        let median = percentile(&resources, 0.5);
        let q3 = percentile(&resources, 0.75);

        let mut strata = WealthStrata::default();
        for &r in &resources {
            if r < q1 {
                strata.poor += 1;
            } else if r > q3 {
                strata.rich += 1;
            } else {
                strata.middle += 1;
            }
        }

        Self {
            living: resources.len() as u32,
            mean,
            median,
            q1,
            q3,
            std_dev,
            inequality,
            strata,
        }
    }
}

/// Linear-interpolated percentile of a sorted slice
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let fraction = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AgentId;

    fn population_with(resources: &[f64]) -> Population {
        let mut population = Population::from_seeds(
            resources
                .iter()
                .enumerate()
                .map(|(i, _)| (AgentId::new(i as u32), 0u32)),
        );
        for (agent, &r) in population.agents_mut().iter_mut().zip(resources) {
            agent.econ.current_resources = r;
        }
        population
    }

    #[test]
    fn test_empty_population_yields_zero_shape() {
        let stats = EconomicStats::measure(&Population::default());
        assert_eq!(stats, EconomicStats::default());
        assert_eq!(stats.living, 0);
        assert_eq!(stats.mean, 0.0);
    }

    #[test]
    fn test_dead_agents_are_excluded() {
        let mut population = population_with(&[10.0, 1000.0]);
        population.get_mut(1).unwrap().econ.alive = false;

        let stats = EconomicStats::measure(&population);
        assert_eq!(stats.living, 1);
        assert_eq!(stats.mean, 10.0);
    }

    #[test]
    fn test_known_distribution() {
        let stats = EconomicStats::measure(&population_with(&[10.0, 20.0, 30.0, 40.0, 50.0]));

        assert_eq!(stats.living, 5);
        assert_eq!(stats.mean, 30.0);
        assert_eq!(stats.median, 30.0);
        assert_eq!(stats.q1, 20.0);
        assert_eq!(stats.q3, 40.0);
        assert!((stats.std_dev - 200.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(stats.strata.poor, 1);
        assert_eq!(stats.strata.middle, 3);
        assert_eq!(stats.strata.rich, 1);
    }

    #[test]
    fn test_uniform_population_has_no_inequality() {
        let stats = EconomicStats::measure(&population_with(&[25.0; 10]));
        assert_eq!(stats.inequality, 0.0);
        assert_eq!(stats.strata.poor, 0);
        assert_eq!(stats.strata.rich, 0);
    }
}
