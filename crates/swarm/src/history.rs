use std::collections::VecDeque;

use nalgebra::Point3;

/// Rolling window of an agent's most recent positions, oldest first.
///
/// # Examples
///
/// ```
/// use nalgebra::Point3;
/// use swarm::history::TrajectoryHistory;
///
/// let mut trail = TrajectoryHistory::new(2);
/// trail.push(Point3::new(0.0, 0.0, 0.0));
/// trail.push(Point3::new(1.0, 0.0, 0.0));
/// trail.push(Point3::new(2.0, 0.0, 0.0));
///
/// assert_eq!(trail.len(), 2);
/// assert_eq!(trail.oldest(), Some(&Point3::new(1.0, 0.0, 0.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryHistory {
    depth: usize,
    positions: VecDeque<Point3<f64>>,
}

impl TrajectoryHistory {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            positions: VecDeque::with_capacity(depth),
        }
    }

    /// Appends a position, evicting the oldest once `depth` is reached.
    pub fn push(&mut self, position: Point3<f64>) {
        if self.depth == 0 {
            return;
        }
        if self.positions.len() == self.depth {
            self.positions.pop_front();
        }
        self.positions.push_back(position);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn oldest(&self) -> Option<&Point3<f64>> {
        self.positions.front()
    }

    pub fn latest(&self) -> Option<&Point3<f64>> {
        self.positions.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.positions.iter()
    }
}
