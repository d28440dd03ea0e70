//! Weighted, undirected adjacency between mesh vertices.

use serde::{Deserialize, Serialize};

use crate::error::GeodesicError;
use crate::grid::MeshGrid;

/// An outgoing edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub target: u32,
    pub weight: f64,
}

/// Adjacency lists with every edge stored in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyGraph {
    neighbors: Vec<Vec<Edge>>,
}

impl AdjacencyGraph {
    /// Connects each grid cell to its eight wrapped neighbors, weighted by
    /// the Euclidean distance between the embedded points.
    ///
    /// # Examples
    ///
    /// ```
    /// use geodesic::adjacency::AdjacencyGraph;
    /// use geodesic::grid::MeshGrid;
    /// use manifold::Torus;
    ///
    /// let grid = MeshGrid::sample(&Torus::new(1.0, 3.0).unwrap(), 4, 4).unwrap();
    /// let graph = AdjacencyGraph::from_grid(&grid);
    /// assert!(graph.is_adjacent(grid.vertex(0, 0), grid.vertex(3, 3)));
    /// ```
    pub fn from_grid(grid: &MeshGrid) -> Self {
        let neighbors = (0..grid.len())
            .map(|v| {
                let here = grid.point(v);
                let mut edges: Vec<Edge> = grid
                    .neighbors(v)
                    .iter()
                    .map(|&n| Edge {
                        target: n as u32,
                        weight: (grid.point(n) - here).norm(),
                    })
                    .collect();
                edges.sort_by_key(|e| e.target);
                edges
            })
            .collect();
        Self { neighbors }
    }

    /// Builds a graph from undirected `(a, b, weight)` triples.
    ///
    /// Parallel edges keep the smallest weight. Self-loops, out-of-range
    /// endpoints and negative or non-finite weights are rejected.
    pub fn from_edges(
        vertex_count: usize,
        edges: &[(usize, usize, f64)],
    ) -> Result<Self, GeodesicError> {
        let mut graph = Self {
            neighbors: vec![Vec::new(); vertex_count],
        };
        for &(a, b, weight) in edges {
            if a >= vertex_count || b >= vertex_count {
                return Err(GeodesicError::InvalidGrid(format!(
                    "edge ({a}, {b}) out of range for {vertex_count} vertices"
                )));
            }
            if a == b {
                return Err(GeodesicError::InvalidGrid(format!("self-loop at vertex {a}")));
            }
            if !(weight >= 0.0 && weight.is_finite()) {
                return Err(GeodesicError::InvalidGrid(format!(
                    "edge ({a}, {b}) has invalid weight {weight}"
                )));
            }
            graph.insert(a, b, weight);
            graph.insert(b, a, weight);
        }
        graph
            .neighbors
            .iter_mut()
            .for_each(|edges| edges.sort_by_key(|e| e.target));
        Ok(graph)
    }

    fn insert(&mut self, from: usize, to: usize, weight: f64) {
        let edges = &mut self.neighbors[from];
        match edges.iter_mut().find(|e| e.target as usize == to) {
            Some(existing) => existing.weight = existing.weight.min(weight),
            None => edges.push(Edge {
                target: to as u32,
                weight,
            }),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn neighbors(&self, vertex: usize) -> &[Edge] {
        &self.neighbors[vertex]
    }

    /// Weight of the edge `a → b`, if present
    pub fn weight(&self, a: usize, b: usize) -> Option<f64> {
        self.neighbors[a]
            .iter()
            .find(|e| e.target as usize == b)
            .map(|e| e.weight)
    }

    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.weight(a, b).is_some()
    }

    /// Every edge `a → b` has a reverse edge `b → a` with the same weight.
    pub fn is_symmetric(&self) -> bool {
        self.neighbors.iter().enumerate().all(|(a, edges)| {
            edges
                .iter()
                .all(|e| self.weight(e.target as usize, a) == Some(e.weight))
        })
    }
}
