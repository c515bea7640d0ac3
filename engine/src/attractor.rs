//! Attractor computation: the backward fixpoint shared by the qualitative solvers.
//!
//! `Attr_p(T)` is the smallest set containing `T` such that a vertex of `p`
//! joins when it has some edge into the set, and any other vertex joins when
//! all of its edges go into the set. The computation is a work queue seeded
//! with `T`; opponent vertices keep a live count of successors not yet
//! attracted so each edge is inspected once, giving `O(V + E)`.
//!
//! Chance vertices are treated like opponent vertices.

use std::collections::VecDeque;

use crate::graph::{Graph, Owner, Player, VertexId, VertexSet};

/// Result of one attractor computation.
#[derive(Debug, Clone)]
pub struct Attractor {
    /// Every attracted vertex, targets included
    pub region: VertexSet,
    /// One witness edge into the region for every non-target member, in the
    /// order vertices were attracted
    pub strategy: Vec<(VertexId, VertexId)>,
}

impl Attractor {
    pub fn contains(&self, v: VertexId) -> bool {
        self.region.contains(v)
    }

    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }
}

/// Attractor of `target` for `player` in the whole graph.
pub fn attractor<V, E>(graph: &Graph<V, E>, target: &[VertexId], player: Player) -> Attractor {
    attractor_within(graph, &VertexSet::full(graph.len()), target.iter().copied(), player)
}

/// Attractor of `target` for `player` in the subgame induced by `active`.
///
/// Targets outside `active` are ignored, and edges leaving `active` are not
/// counted: an opponent vertex joins once all of its successors inside the
/// subgame are attracted.
pub fn attractor_within<V, E>(
    graph: &Graph<V, E>,
    active: &VertexSet,
    target: impl IntoIterator<Item = VertexId>,
    player: Player,
) -> Attractor {
    let n = graph.len();
    let mut region = VertexSet::empty(n);
    let mut strategy = Vec::new();
    let mut queue = VecDeque::new();

    for v in target {
        if active.contains(v) && region.insert(v) {
            queue.push_back(v);
        }
    }

    // Lazily initialised: usize::MAX means "not counted yet"
    let mut remaining = vec![usize::MAX; n];

    while let Some(cur) = queue.pop_front() {
        for &from in graph.predecessors(cur) {
            if !active.contains(from) || region.contains(from) {
                continue;
            }
            let joins = if graph.owner(from) == Owner::Player(player) {
                true
            } else {
                if remaining[from] == usize::MAX {
                    remaining[from] = graph.successors(from).filter(|&s| active.contains(s)).count();
                }
                remaining[from] -= 1;
                remaining[from] == 0
            };
            if joins {
                region.insert(from);
                strategy.push((from, cur));
                queue.push_back(from);
            }
        }
    }

    Attractor { region, strategy }
}
