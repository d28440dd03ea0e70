//! All-pairs shortest paths over an [`AdjacencyGraph`].
//!
//! Distances come from the Floyd-Warshall relaxation
//!
//! ```text
//! dist[i][j] = min(dist[i][j], dist[i][k] + dist[k][j])    for k = 0..V
//! ```
//!
//! run alongside a next-hop table for path reconstruction. The outer `k`
//! loop is sequential; within one `k`, rows are independent and relaxed in
//! parallel. Row `k` itself cannot change during iteration `k`, so it is
//! copied once and read by every worker.
//!
//! Cost is O(V³) time and O(V²) memory: build once, cache, and never call
//! this from inside a simulation step.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::adjacency::AdjacencyGraph;

/// Next-hop sentinel for unreachable pairs
pub const NO_PATH: u32 = u32::MAX;

/// Dense shortest-path distances plus next hops, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceTable {
    size: usize,
    distances: Vec<f64>,
    next_hops: Vec<u32>,
}

impl DistanceTable {
    /// Runs Floyd-Warshall over `graph`.
    ///
    /// Unreachable pairs keep distance `f64::INFINITY` and next hop
    /// [`NO_PATH`]. The finished table is symmetrized by taking the smaller of
    /// `d[i][j]` and `d[j][i]`, which only removes rounding differences
    /// between the two summation orders. Next hops keep the forward
    /// relaxation, so a reconstructed path sums to the stored distance up to
    /// that same rounding.
    ///
    /// # Examples
    ///
    /// ```
    /// use geodesic::adjacency::AdjacencyGraph;
    /// use geodesic::distance::DistanceTable;
    ///
    /// // 0 —1— 1 —1— 2, plus a long direct edge 0 —5— 2
    /// let graph = AdjacencyGraph::from_edges(3, &[(0, 1, 1.0), (1, 2, 1.0), (0, 2, 5.0)]).unwrap();
    /// let table = DistanceTable::compute(&graph);
    ///
    /// assert_eq!(table.distance(0, 2), 2.0);
    /// assert_eq!(table.path(0, 2), Some(vec![0, 1, 2]));
    /// ```
    pub fn compute(graph: &AdjacencyGraph) -> Self {
        let n = graph.vertex_count();
        let mut distances = vec![f64::INFINITY; n * n];
        let mut next_hops = vec![NO_PATH; n * n];

        for i in 0..n {
            distances[i * n + i] = 0.0;
            next_hops[i * n + i] = i as u32;
            for edge in graph.neighbors(i) {
                let j = edge.target as usize;
                if edge.weight < distances[i * n + j] {
                    distances[i * n + j] = edge.weight;
                    next_hops[i * n + j] = edge.target;
                }
            }
        }

        for k in 0..n {
            let via: Vec<f64> = distances[k * n..(k + 1) * n].to_vec();
            distances
                .par_chunks_mut(n)
                .zip(next_hops.par_chunks_mut(n))
                .for_each(|(row, hops)| {
                    let to_k = row[k];
                    if !to_k.is_finite() {
                        return;
                    }
                    let hop_k = hops[k];
                    for ((d, hop), from_k) in row.iter_mut().zip(hops.iter_mut()).zip(&via) {
                        let candidate = to_k + from_k;
                        if candidate < *d {
                            *d = candidate;
                            *hop = hop_k;
                        }
                    }
                });
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let shortest = distances[i * n + j].min(distances[j * n + i]);
                distances[i * n + j] = shortest;
                distances[j * n + i] = shortest;
            }
        }

        Self {
            size: n,
            distances,
            next_hops,
        }
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Shortest-path distance, `f64::INFINITY` when unreachable
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances[from * self.size + to]
    }

    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.distance(from, to).is_finite()
    }

    /// All distances from `from`
    pub fn row(&self, from: usize) -> &[f64] {
        &self.distances[from * self.size..(from + 1) * self.size]
    }

    /// First vertex after `from` on a shortest path to `to`
    pub fn next_hop(&self, from: usize, to: usize) -> Option<usize> {
        match self.next_hops[from * self.size + to] {
            NO_PATH => None,
            hop => Some(hop as usize),
        }
    }

    /// Reconstructs a shortest path, endpoints included.
    pub fn path(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        let mut path = vec![from];
        let mut current = from;
        while current != to {
            current = self.next_hop(current, to)?;
            path.push(current);
            if path.len() > self.size {
                return None;
            }
        }
        Some(path)
    }

    /// Number of ordered pairs with no connecting path
    pub fn unreachable_pairs(&self) -> usize {
        self.distances.iter().filter(|d| !d.is_finite()).count()
    }
}
