//! Game graph definitions
//!
//! A game graph is an arena: vertices live in a flat vector indexed by
//! [`VertexId`], and each vertex keeps its outgoing edges and its predecessor
//! list. Game-specific numbers are carried by the type parameters: `V` for
//! per-vertex attributes (priority, weight) and `E` for per-edge attributes
//! (weight, discount, probability).
//!
//! Graphs are built once and then treated as immutable input by the solvers.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::GraphError;

pub mod discounted;
pub mod meanpayoff;
pub mod parity;
pub mod stochastic;

pub use discounted::{DiscountedEdge, DiscountedGraph};
pub use meanpayoff::MeanPayoffGraph;
pub use parity::{ParityGraph, Priority};
pub use stochastic::{StochasticEdge, StochasticGraph};

/// Vertex ID type (index into flat array storage)
pub type VertexId = usize;

/// One of the two players of a zero-sum game.
///
/// In parity games player `Zero` wins plays whose highest recurring priority is
/// even; in payoff games `Zero` is the maximiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Player {
    Zero,
    One,
}

impl Player {
    /// Get the opponent of this player
    pub fn opponent(self) -> Player {
        match self {
            Player::Zero => Player::One,
            Player::One => Player::Zero,
        }
    }

    /// 0 or 1, for indexing per-player arrays
    pub fn index(self) -> usize {
        match self {
            Player::Zero => 0,
            Player::One => 1,
        }
    }

    /// The player favoured by a priority: even priorities favour `Zero`.
    pub fn from_parity(priority: Priority) -> Player {
        if priority & 1 == 0 {
            Player::Zero
        } else {
            Player::One
        }
    }

    pub fn from_index(index: usize) -> Player {
        if index == 0 {
            Player::Zero
        } else {
            Player::One
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Who moves at a vertex.
///
/// `Chance` vertices only appear in stochastic games; every other game kind
/// rejects them during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Owner {
    Player(Player),
    Chance,
}

impl Owner {
    /// The owning player, or `None` for a chance vertex
    pub fn player(self) -> Option<Player> {
        match self {
            Owner::Player(p) => Some(p),
            Owner::Chance => None,
        }
    }

    /// Integer encoding used by the file formats: 0, 1, or -1 for chance.
    pub fn code(self) -> i8 {
        match self {
            Owner::Player(p) => p.index() as i8,
            Owner::Chance => -1,
        }
    }

    /// Decode the file-format integer. Returns `None` for anything but -1, 0, 1.
    pub fn from_code(code: i64) -> Option<Owner> {
        match code {
            0 => Some(Owner::Player(Player::Zero)),
            1 => Some(Owner::Player(Player::One)),
            -1 => Some(Owner::Chance),
            _ => None,
        }
    }
}

impl From<Player> for Owner {
    fn from(player: Player) -> Self {
        Owner::Player(player)
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A vertex with its game-specific attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex<V> {
    pub name: String,
    pub owner: Owner,
    pub attr: V,
}

/// An outgoing edge. Labels are diagnostic only.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<E> {
    pub target: VertexId,
    pub label: String,
    pub attr: E,
}

/// Arena-backed directed game graph.
#[derive(Debug, Clone)]
pub struct Graph<V, E> {
    vertices: Vec<Vertex<V>>,
    out_edges: Vec<Vec<Edge<E>>>,
    in_edges: Vec<Vec<VertexId>>,
    names: HashMap<String, VertexId>,
    edge_count: usize,
}

impl<V, E> Graph<V, E> {
    /// Create a new empty graph
    pub fn new() -> Self {
        Graph {
            vertices: Vec::new(),
            out_edges: Vec::new(),
            in_edges: Vec::new(),
            names: HashMap::new(),
            edge_count: 0,
        }
    }

    /// Add a vertex. Names must be unique; ids are assigned in insertion order.
    pub fn add_vertex(
        &mut self,
        name: impl Into<String>,
        owner: impl Into<Owner>,
        attr: V,
    ) -> Result<VertexId, GraphError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(GraphError::DuplicateVertex(name));
        }
        let id = self.vertices.len();
        self.names.insert(name.clone(), id);
        self.vertices.push(Vertex {
            name,
            owner: owner.into(),
            attr,
        });
        self.out_edges.push(Vec::new());
        self.in_edges.push(Vec::new());
        Ok(id)
    }

    /// Add an edge. At most one edge may connect an ordered pair of vertices.
    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        label: impl Into<String>,
        attr: E,
    ) -> Result<(), GraphError> {
        if source >= self.len() {
            return Err(GraphError::UnknownVertex(source));
        }
        if target >= self.len() {
            return Err(GraphError::UnknownVertex(target));
        }
        if self.has_edge(source, target) {
            return Err(GraphError::DuplicateEdge {
                from: source,
                to: target,
            });
        }
        self.out_edges[source].push(Edge {
            target,
            label: label.into(),
            attr,
        });
        self.in_edges[target].push(source);
        self.edge_count += 1;
        Ok(())
    }

    /// Get the number of vertices
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the graph has no vertices
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Get a vertex by ID
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex<V>> {
        self.vertices.get(id)
    }

    /// All vertices in id order
    pub fn vertices(&self) -> &[Vertex<V>] {
        &self.vertices
    }

    /// Iterate over vertex ids
    pub fn ids(&self) -> std::ops::Range<VertexId> {
        0..self.vertices.len()
    }

    /// Look a vertex up by name
    pub fn find(&self, name: &str) -> Option<VertexId> {
        self.names.get(name).copied()
    }

    pub fn name(&self, id: VertexId) -> &str {
        &self.vertices[id].name
    }

    pub fn owner(&self, id: VertexId) -> Owner {
        self.vertices[id].owner
    }

    pub fn attr(&self, id: VertexId) -> &V {
        &self.vertices[id].attr
    }

    /// Outgoing edges of a vertex
    pub fn edges(&self, id: VertexId) -> &[Edge<E>] {
        &self.out_edges[id]
    }

    /// Successor ids of a vertex, in edge insertion order
    pub fn successors(&self, id: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.out_edges[id].iter().map(|e| e.target)
    }

    /// Predecessor ids of a vertex (one entry per incoming edge)
    pub fn predecessors(&self, id: VertexId) -> &[VertexId] {
        &self.in_edges[id]
    }

    pub fn out_degree(&self, id: VertexId) -> usize {
        self.out_edges[id].len()
    }

    pub fn has_edge(&self, source: VertexId, target: VertexId) -> bool {
        self.edge_between(source, target).is_some()
    }

    /// The edge from `source` to `target`, if any
    pub fn edge_between(&self, source: VertexId, target: VertexId) -> Option<&Edge<E>> {
        self.out_edges
            .get(source)?
            .iter()
            .find(|e| e.target == target)
    }

    /// Vertices owned by `owner`, in id order
    pub fn vertices_of(&self, owner: Owner) -> Vec<VertexId> {
        self.ids().filter(|&v| self.owner(v) == owner).collect()
    }

    /// Number of vertices per owner, ordered chance, player 0, player 1
    pub fn owner_distribution(&self) -> Vec<(Owner, usize)> {
        let mut counts = [0usize; 3];
        for v in &self.vertices {
            counts[(v.owner.code() + 1) as usize] += 1;
        }
        [Owner::Chance, Owner::Player(Player::Zero), Owner::Player(Player::One)]
            .into_iter()
            .zip(counts)
            .filter(|&(_, n)| n > 0)
            .collect()
    }

    /// Rebuild the graph with every vertex attribute mapped through `f`.
    pub fn map_vertices<W>(&self, mut f: impl FnMut(VertexId, &V) -> W) -> Graph<W, E>
    where
        E: Clone,
    {
        Graph {
            vertices: self
                .vertices
                .iter()
                .enumerate()
                .map(|(id, v)| Vertex {
                    name: v.name.clone(),
                    owner: v.owner,
                    attr: f(id, &v.attr),
                })
                .collect(),
            out_edges: self.out_edges.clone(),
            in_edges: self.in_edges.clone(),
            names: self.names.clone(),
            edge_count: self.edge_count,
        }
    }

    /// Shared structural check: every vertex has a successor and is owned by a
    /// player (unless `allow_chance`).
    pub(crate) fn check_structure(&self, allow_chance: bool) -> Result<(), GraphError> {
        for (id, v) in self.vertices.iter().enumerate() {
            if !allow_chance && v.owner == Owner::Chance {
                return Err(GraphError::InvalidOwner {
                    name: v.name.clone(),
                    owner: v.owner.to_string(),
                });
            }
            if self.out_edges[id].is_empty() {
                return Err(GraphError::DeadEnd {
                    name: v.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<V, E> Default for Graph<V, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation is implemented once per game kind and called by every solver on
/// entry.
pub trait Validate {
    fn validate(&self) -> Result<(), GraphError>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Dense membership flags over vertex ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexSet {
    bits: Vec<bool>,
    len: usize,
}

impl VertexSet {
    pub fn empty(n: usize) -> Self {
        VertexSet {
            bits: vec![false; n],
            len: 0,
        }
    }

    pub fn full(n: usize) -> Self {
        VertexSet {
            bits: vec![true; n],
            len: n,
        }
    }

    pub fn from_ids(n: usize, ids: impl IntoIterator<Item = VertexId>) -> Self {
        let mut set = Self::empty(n);
        for v in ids {
            set.insert(v);
        }
        set
    }

    /// Returns true if the vertex was newly inserted
    pub fn insert(&mut self, v: VertexId) -> bool {
        if self.bits[v] {
            return false;
        }
        self.bits[v] = true;
        self.len += 1;
        true
    }

    pub fn remove(&mut self, v: VertexId) -> bool {
        if !self.bits[v] {
            return false;
        }
        self.bits[v] = false;
        self.len -= 1;
        true
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.bits.get(v).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capacity: the number of vertex ids covered
    pub fn universe(&self) -> usize {
        self.bits.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(v, _)| v)
    }

    pub fn to_vec(&self) -> Vec<VertexId> {
        self.iter().collect()
    }

    /// Remove every member of `other`
    pub fn subtract(&mut self, other: &VertexSet) {
        for v in other.iter() {
            self.remove(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph<(), ()> {
        let mut g = Graph::new();
        let a = g.add_vertex("a", Player::Zero, ()).unwrap();
        let b = g.add_vertex("b", Player::One, ()).unwrap();
        let c = g.add_vertex("c", Owner::Chance, ()).unwrap();
        g.add_edge(a, b, "ab", ()).unwrap();
        g.add_edge(b, c, "bc", ()).unwrap();
        g.add_edge(c, a, "ca", ()).unwrap();
        g.add_edge(a, a, "aa", ()).unwrap();
        g
    }

    #[test]
    fn test_player_opponent_and_parity() {
        assert_eq!(Player::Zero.opponent(), Player::One);
        assert_eq!(Player::One.opponent(), Player::Zero);
        assert_eq!(Player::from_parity(4), Player::Zero);
        assert_eq!(Player::from_parity(7), Player::One);
    }

    #[test]
    fn test_owner_codes() {
        assert_eq!(Owner::from_code(-1), Some(Owner::Chance));
        assert_eq!(Owner::from_code(1), Some(Owner::Player(Player::One)));
        assert_eq!(Owner::from_code(2), None);
        assert_eq!(Owner::Chance.code(), -1);
    }

    #[test]
    fn test_adjacency_and_predecessors() {
        let g = triangle();
        assert_eq!(g.len(), 3);
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.successors(0).collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(g.predecessors(0), &[2, 0]);
        assert_eq!(g.find("c"), Some(2));
        assert_eq!(g.edge_between(1, 2).map(|e| e.label.as_str()), Some("bc"));
        assert!(!g.has_edge(2, 1));
    }

    #[test]
    fn test_duplicate_vertex_and_edge_rejected() {
        let mut g = triangle();
        assert_eq!(
            g.add_vertex("a", Player::Zero, ()),
            Err(GraphError::DuplicateVertex("a".into()))
        );
        assert_eq!(
            g.add_edge(0, 1, "again", ()),
            Err(GraphError::DuplicateEdge { from: 0, to: 1 })
        );
        assert_eq!(g.add_edge(0, 9, "x", ()), Err(GraphError::UnknownVertex(9)));
    }

    #[test]
    fn test_owner_distribution() {
        let g = triangle();
        assert_eq!(
            g.owner_distribution(),
            vec![
                (Owner::Chance, 1),
                (Owner::Player(Player::Zero), 1),
                (Owner::Player(Player::One), 1)
            ]
        );
        assert_eq!(g.vertices_of(Owner::Chance), vec![2]);
    }

    #[test]
    fn test_structure_check() {
        let g = triangle();
        assert!(g.check_structure(true).is_ok());
        assert!(matches!(
            g.check_structure(false),
            Err(GraphError::InvalidOwner { .. })
        ));

        let mut h: Graph<(), ()> = Graph::new();
        h.add_vertex("lonely", Player::Zero, ()).unwrap();
        assert_eq!(
            h.check_structure(false),
            Err(GraphError::DeadEnd {
                name: "lonely".into()
            })
        );
    }

    #[test]
    fn test_vertex_set() {
        let mut s = VertexSet::empty(5);
        assert!(s.insert(3));
        assert!(!s.insert(3));
        s.insert(1);
        assert_eq!(s.to_vec(), vec![1, 3]);
        let other = VertexSet::from_ids(5, [3, 4]);
        s.subtract(&other);
        assert_eq!(s.to_vec(), vec![1]);
        assert_eq!(s.len(), 1);
        assert!(!s.contains(17));
    }
}
