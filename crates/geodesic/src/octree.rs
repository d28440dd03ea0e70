//! Arena-based octree for nearest-point queries over mesh samples.
//!
//! Nodes are stored contiguously in a `Vec` and reference each other by
//! index. Points are copied into leaf order once at build time, so each leaf
//! owns a contiguous run of entries and every point lives in exactly one leaf.
//!
//! # Example
//!
//! ```rust
//! use geodesic::octree::Octree;
//! use nalgebra::Point3;
//!
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 5.0, 1.0),
//! ];
//!
//! let tree = Octree::build(&points, 1).unwrap();
//! assert_eq!(tree.nearest(&Point3::new(0.9, 0.2, 0.0)), Some(1));
//! ```

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::GeodesicError;

/// Maximum subdivision depth; coincident points end up together in a leaf
const MAX_DEPTH: usize = 32;

/// Anything with a fixed position in 3-space.
pub trait Located {
    fn location(&self) -> Point3<f64>;
}

impl Located for Point3<f64> {
    fn location(&self) -> Point3<f64> {
        *self
    }
}

/// An axis-aligned box. Octree boxes are cubes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Smallest cube, centered on the points' extent, that contains them all.
    pub fn cube_around<P: Located>(points: &[P]) -> Self {
        if points.is_empty() {
            return Self {
                min: Point3::origin(),
                max: Point3::origin(),
            };
        }

        let (min, max) = points.iter().fold(
            (
                Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
                Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(lo, hi), p| {
                let q = p.location();
                (
                    Point3::new(lo.x.min(q.x), lo.y.min(q.y), lo.z.min(q.z)),
                    Point3::new(hi.x.max(q.x), hi.y.max(q.y), hi.z.max(q.z)),
                )
            },
        );

        let center = nalgebra::center(&min, &max);
        let half = (max - min).max() / 2.0;
        let half = if half > 0.0 { half } else { 0.5 };
        Self {
            min: center - Vector3::repeat(half),
            max: center + Vector3::repeat(half),
        }
    }

    fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Octant (0-7) of `point`: bit 0 is +x, bit 1 is +y, bit 2 is +z.
    fn octant(&self, point: &Point3<f64>) -> usize {
        let center = self.center();
        let x_bit = (point.x > center.x) as usize;
        let y_bit = (point.y > center.y) as usize;
        let z_bit = (point.z > center.z) as usize;
        x_bit | (y_bit << 1) | (z_bit << 2)
    }

    /// Sub-box for the specified octant (0-7)
    fn subdivide(&self, octant: usize) -> Self {
        let center = self.center();
        let pick = |bit: usize, lo: f64, mid: f64, hi: f64| {
            if octant & bit != 0 { (mid, hi) } else { (lo, mid) }
        };
        let (x0, x1) = pick(1, self.min.x, center.x, self.max.x);
        let (y0, y1) = pick(2, self.min.y, center.y, self.max.y);
        let (z0, z1) = pick(4, self.min.z, center.z, self.max.z);
        Self {
            min: Point3::new(x0, y0, z0),
            max: Point3::new(x1, y1, z1),
        }
    }

    /// Squared distance from `point` to the closest point of the box
    pub fn distance_squared(&self, point: &Point3<f64>) -> f64 {
        let dx = point.x - point.x.clamp(self.min.x, self.max.x);
        let dy = point.y - point.y.clamp(self.min.y, self.max.y);
        let dz = point.z - point.z.clamp(self.min.z, self.max.z);
        dx * dx + dy * dy + dz * dz
    }
}

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel value representing an empty octant
    pub const EMPTY: NodeId = NodeId(u32::MAX);

    fn new(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize, "NodeId overflow");
        NodeId(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

/// A point copied into leaf order, remembering its original index.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub index: u32,
    pub position: Point3<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Bucket of up to `bucket_size` points (more only at maximum depth)
    Leaf {
        bounds: BoundingBox,
        start: u32,
        count: u32,
    },

    /// Eight child octants, `NodeId::EMPTY` where no points fall
    Internal {
        bounds: BoundingBox,
        children: [NodeId; 8],
    },
}

impl Node {
    fn bounds(&self) -> &BoundingBox {
        match self {
            Node::Leaf { bounds, .. } | Node::Internal { bounds, .. } => bounds,
        }
    }
}

/// Bucketed octree over a fixed point set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Octree {
    nodes: Vec<Node>,
    entries: Vec<Entry>,
    root: NodeId,
    bucket_size: usize,
}

impl Octree {
    /// Builds an octree whose leaves hold at most `bucket_size` points.
    ///
    /// Fails when `bucket_size` is zero.
    pub fn build<P: Located>(points: &[P], bucket_size: usize) -> Result<Self, GeodesicError> {
        if bucket_size == 0 {
            return Err(GeodesicError::InvalidGrid(
                "octree bucket size must be positive".to_string(),
            ));
        }

        let bounds = BoundingBox::cube_around(points);
        let indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len() / bucket_size * 2 + 1);
        let mut entries = Vec::with_capacity(points.len());

        let root = if points.is_empty() {
            NodeId::EMPTY
        } else {
            Self::build_recursive(
                points,
                &indices,
                bounds,
                0,
                bucket_size,
                &mut nodes,
                &mut entries,
            )
        };

        Ok(Self {
            nodes,
            entries,
            root,
            bucket_size,
        })
    }

    fn build_recursive<P: Located>(
        points: &[P],
        indices: &[usize],
        bounds: BoundingBox,
        depth: usize,
        bucket_size: usize,
        nodes: &mut Vec<Node>,
        entries: &mut Vec<Entry>,
    ) -> NodeId {
        if indices.is_empty() {
            return NodeId::EMPTY;
        }

        if indices.len() <= bucket_size || depth >= MAX_DEPTH {
            let start = entries.len() as u32;
            entries.extend(indices.iter().map(|&i| Entry {
                index: i as u32,
                position: points[i].location(),
            }));
            let id = NodeId::new(nodes.len());
            nodes.push(Node::Leaf {
                bounds,
                start,
                count: indices.len() as u32,
            });
            return id;
        }

        let mut octants: [Vec<usize>; 8] = Default::default();
        for &i in indices {
            octants[bounds.octant(&points[i].location())].push(i);
        }

        let children: [NodeId; 8] = std::array::from_fn(|o| {
            Self::build_recursive(
                points,
                &octants[o],
                bounds.subdivide(o),
                depth + 1,
                bucket_size,
                nodes,
                entries,
            )
        });

        let id = NodeId::new(nodes.len());
        nodes.push(Node::Internal { bounds, children });
        id
    }

    /// Returns the index of the point closest to `query`.
    ///
    /// Ties are broken toward the lower index, so the result always agrees
    /// with [`nearest_by_scan`]. Returns `None` for an empty tree.
    pub fn nearest(&self, query: &Point3<f64>) -> Option<usize> {
        let mut best: Option<(f64, u32)> = None;
        self.nearest_recursive(self.root, query, &mut best);
        best.map(|(_, index)| index as usize)
    }

    fn nearest_recursive(&self, node_id: NodeId, query: &Point3<f64>, best: &mut Option<(f64, u32)>) {
        if node_id.is_empty() {
            return;
        }

        let node = &self.nodes[node_id.index()];
        if let Some((best_d, _)) = best {
            if node.bounds().distance_squared(query) > *best_d {
                return;
            }
        }

        match node {
            Node::Leaf { start, count, .. } => {
                let run = &self.entries[*start as usize..(*start + *count) as usize];
                for entry in run {
                    let d = (entry.position - query).norm_squared();
                    let better = match best {
                        None => true,
                        Some((best_d, best_i)) => d < *best_d || (d == *best_d && entry.index < *best_i),
                    };
                    if better {
                        *best = Some((d, entry.index));
                    }
                }
            }

            Node::Internal { children, .. } => {
                // Visit the closest octants first to tighten the bound early
                let mut order: Vec<(f64, NodeId)> = children
                    .iter()
                    .filter(|c| !c.is_empty())
                    .map(|&c| (self.nodes[c.index()].bounds().distance_squared(query), c))
                    .collect();
                order.sort_by(|a, b| a.0.total_cmp(&b.0));
                for (_, child) in order {
                    self.nearest_recursive(child, query, best);
                }
            }
        }
    }

    /// Iterates over the entries of every leaf, one slice per leaf
    pub fn leaves(&self) -> impl Iterator<Item = &[Entry]> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            Node::Leaf { start, count, .. } => {
                Some(&self.entries[*start as usize..(*start + *count) as usize])
            }
            Node::Internal { .. } => None,
        })
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of nodes in the tree (for diagnostics)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    pub fn root(&self) -> NodeId {
        self.root
    }
}

/// Exhaustive nearest-point search, lowest index on ties.
pub fn nearest_by_scan<P: Located>(points: &[P], query: &Point3<f64>) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| ((p.location() - query).norm_squared(), i))
        .fold(None, |best: Option<(f64, usize)>, (d, i)| match best {
            Some((best_d, _)) if best_d <= d => best,
            _ => Some((d, i)),
        })
        .map(|(_, i)| i)
}
