//! Trajectory recording.
//!
//! Each optimizer owns one [`Path`], clears it when a run starts and
//! appends the initial point and every accepted iterate. The algorithms
//! never read it back.

use crate::types::{DVector, Scalar};

/// Points visited by the last run, in order.
#[derive(Debug, Clone, Default)]
pub struct Path<T: Scalar> {
    points: Vec<DVector<T>>,
}

impl<T: Scalar> Path<T> {
    /// Creates an empty path.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Removes every recorded point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Appends a point.
    pub fn push(&mut self, x: &DVector<T>) {
        self.points.push(x.clone());
    }

    /// Recorded points.
    pub fn points(&self) -> &[DVector<T>] {
        &self.points
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Last recorded point.
    pub fn last(&self) -> Option<&DVector<T>> {
        self.points.last()
    }
}
