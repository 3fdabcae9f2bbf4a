//! Symmetric weighted connection graph over agent indices
//!
//! The matrix is the shared social substrate: clan detection and the
//! economy read it, conflict polarization writes it. Both mutators
//! write `[i][j]` and `[j][i]` together, so symmetry is structural
//! rather than a discipline callers have to remember.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Dense symmetric weight matrix, entries in [0, 1]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionGraph {
    n: usize,
    weights: Vec<f64>,
}

impl ConnectionGraph {
    /// Graph over `n` agents with no connections
    pub fn new(n: usize) -> Self {
        Self {
            n,
            weights: vec![0.0; n * n],
        }
    }

    /// Validate and adopt an externally supplied matrix
    pub fn from_matrix(rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        for row in rows {
            if row.len() != n {
                return Err(SimError::MatrixShape {
                    agents: n,
                    rows: n,
                    cols: row.len(),
                });
            }
        }

        for i in 0..n {
            for j in 0..n {
                let w = rows[i][j];
                if i != j && !(0.0..=1.0).contains(&w) {
                    return Err(SimError::WeightOutOfRange { i, j, weight: w });
                }
                if (w - rows[j][i]).abs() > SYMMETRY_TOLERANCE {
                    return Err(SimError::AsymmetricMatrix { i, j });
                }
            }
        }

        let mut graph = Self::new(n);
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    graph.weights[i * n + j] = rows[i][j];
                }
            }
        }
        Ok(graph)
    }

    /// Number of agents the graph covers
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Weight between two agents (0 for self-loops and out-of-range)
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        if i == j || i >= self.n || j >= self.n {
            return 0.0;
        }
        self.weights[i * self.n + j]
    }

    /// Set the weight for both directions, clamped to [0, 1]
    ///
    /// Self-loops are ignored.
    pub fn set(&mut self, i: usize, j: usize, weight: f64) {
        if i == j || i >= self.n || j >= self.n {
            return;
        }
        let w = weight.clamp(0.0, 1.0);
        self.weights[i * self.n + j] = w;
        self.weights[j * self.n + i] = w;
    }

    /// Multiply the weight for both directions by `factor`
    pub fn scale(&mut self, i: usize, j: usize, factor: f64) {
        let current = self.weight(i, j);
        if current > 0.0 {
            self.set(i, j, current * factor);
        }
    }

    /// Connected neighbors of `i` (weight > 0), excluding `i` itself
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..self.n)
            .filter(move |&j| j != i)
            .map(move |j| (j, self.weight(i, j)))
            .filter(|&(_, w)| w > 0.0)
    }

    /// Sum of weights from `i` to the given agents
    pub fn weight_sum(&self, i: usize, others: &[usize]) -> f64 {
        others.iter().map(|&j| self.weight(i, j)).sum()
    }

    /// True when every pair is stored symmetrically (test helper)
    pub fn is_symmetric(&self) -> bool {
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                if (self.weight(i, j) - self.weight(j, i)).abs() > SYMMETRY_TOLERANCE {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_writes_both_directions() {
        let mut graph = ConnectionGraph::new(4);
        graph.set(0, 2, 0.7);

        assert_eq!(graph.weight(0, 2), 0.7);
        assert_eq!(graph.weight(2, 0), 0.7);
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_set_clamps_to_unit_interval() {
        let mut graph = ConnectionGraph::new(2);
        graph.set(0, 1, 1.8);
        assert_eq!(graph.weight(0, 1), 1.0);

        graph.set(0, 1, -0.5);
        assert_eq!(graph.weight(0, 1), 0.0);
    }

    #[test]
    fn test_self_loops_are_ignored() {
        let mut graph = ConnectionGraph::new(3);
        graph.set(1, 1, 0.9);
        assert_eq!(graph.weight(1, 1), 0.0);
    }

    #[test]
    fn test_scale_weakens_symmetrically() {
        let mut graph = ConnectionGraph::new(3);
        graph.set(0, 1, 0.8);
        graph.scale(0, 1, 0.5);

        assert!((graph.weight(0, 1) - 0.4).abs() < 1e-12);
        assert!((graph.weight(1, 0) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_neighbors_skip_zero_weights() {
        let mut graph = ConnectionGraph::new(4);
        graph.set(0, 1, 0.3);
        graph.set(0, 3, 0.6);

        let neighbors: Vec<(usize, f64)> = graph.neighbors(0).collect();
        assert_eq!(neighbors, vec![(1, 0.3), (3, 0.6)]);
    }

    #[test]
    fn test_from_matrix_rejects_asymmetry() {
        let rows = vec![
            vec![0.0, 0.5, 0.0],
            vec![0.4, 0.0, 0.0],
            vec![0.0, 0.0, 0.0],
        ];
        assert!(matches!(
            ConnectionGraph::from_matrix(&rows),
            Err(SimError::AsymmetricMatrix { .. })
        ));
    }

    #[test]
    fn test_from_matrix_rejects_ragged_rows() {
        let rows = vec![vec![0.0, 0.5], vec![0.5]];
        assert!(matches!(
            ConnectionGraph::from_matrix(&rows),
            Err(SimError::MatrixShape { .. })
        ));
    }

    #[test]
    fn test_from_matrix_rejects_out_of_range() {
        let rows = vec![vec![0.0, 1.5], vec![1.5, 0.0]];
        assert!(matches!(
            ConnectionGraph::from_matrix(&rows),
            Err(SimError::WeightOutOfRange { .. })
        ));
    }

    #[test]
    fn test_from_matrix_ignores_diagonal() {
        let rows = vec![vec![9.0, 0.2], vec![0.2, 9.0]];
        let graph = ConnectionGraph::from_matrix(&rows).expect("diagonal is not meaningful");
        assert_eq!(graph.weight(0, 0), 0.0);
        assert_eq!(graph.weight(0, 1), 0.2);
    }
}
