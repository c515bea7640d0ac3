//! Parity games: every vertex carries a priority.
//!
//! Priorities use the max-parity convention: a play is won by the player
//! matching the parity of the highest priority seen infinitely often.

use std::collections::BTreeMap;

use super::{Graph, Validate, VertexId};
use crate::error::GraphError;

/// Vertex priority
pub type Priority = u32;

/// Parity game graph: priority on vertices, nothing on edges
pub type ParityGraph = Graph<Priority, ()>;

impl Validate for ParityGraph {
    fn validate(&self) -> Result<(), GraphError> {
        self.check_structure(false)
    }
}

impl ParityGraph {
    pub fn priority(&self, v: VertexId) -> Priority {
        *self.attr(v)
    }

    /// Validate and additionally require every priority to be at most `max`.
    pub fn validate_priorities_at_most(&self, max: Priority) -> Result<(), GraphError> {
        self.validate()?;
        match self.ids().find(|&v| self.priority(v) > max) {
            Some(v) => Err(GraphError::InvalidPriority {
                name: self.name(v).to_string(),
                priority: self.priority(v),
                max,
            }),
            None => Ok(()),
        }
    }

    pub fn vertices_with_priority(&self, priority: Priority) -> Vec<VertexId> {
        self.ids().filter(|&v| self.priority(v) == priority).collect()
    }

    /// Highest priority, 0 for an empty graph
    pub fn max_priority(&self) -> Priority {
        self.ids().map(|v| self.priority(v)).max().unwrap_or(0)
    }

    /// Lowest priority, 0 for an empty graph
    pub fn min_priority(&self) -> Priority {
        self.ids().map(|v| self.priority(v)).min().unwrap_or(0)
    }

    /// Number of vertices per priority, ascending
    pub fn priority_distribution(&self) -> BTreeMap<Priority, usize> {
        let mut dist = BTreeMap::new();
        for v in self.ids() {
            *dist.entry(self.priority(v)).or_insert(0) += 1;
        }
        dist
    }

    /// Distinct priorities, ascending
    pub fn unique_priorities(&self) -> Vec<Priority> {
        self.priority_distribution().into_keys().collect()
    }

    /// Vertices grouped by priority, ascending
    pub fn vertices_by_priority(&self) -> BTreeMap<Priority, Vec<VertexId>> {
        let mut groups: BTreeMap<Priority, Vec<VertexId>> = BTreeMap::new();
        for v in self.ids() {
            groups.entry(self.priority(v)).or_default().push(v);
        }
        groups
    }

    /// Vertex ids sorted by priority; ties keep id order.
    pub fn sorted_by_priority(&self, descending: bool) -> Vec<VertexId> {
        let mut order: Vec<VertexId> = self.ids().collect();
        if descending {
            order.sort_by(|&a, &b| self.priority(b).cmp(&self.priority(a)).then(a.cmp(&b)));
        } else {
            order.sort_by_key(|&v| self.priority(v));
        }
        order
    }

    /// Map every priority onto the smallest range that keeps relative order and
    /// parity. Consecutive priorities of equal parity collapse into one value.
    pub fn compress_priorities(&self) -> ParityGraph {
        let mapping = compression_map(&self.unique_priorities());
        self.map_vertices(|_, p| mapping[p])
    }
}

/// Compute the compressed value for each priority of an ascending list.
///
/// A new value is opened only when the parity changes. Even values start at 0
/// when the smallest priority is even and at 2 otherwise; odd values start at 1.
pub fn compression_map(ascending: &[Priority]) -> BTreeMap<Priority, Priority> {
    let mut map = BTreeMap::new();
    let mut current: Option<Priority> = None;
    for &p in ascending {
        let next = match current {
            None => p & 1,
            Some(c) if c & 1 == p & 1 => c,
            Some(c) => c + 1,
        };
        map.insert(p, next);
        current = Some(next);
    }
    map
}
