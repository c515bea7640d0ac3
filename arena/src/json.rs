//! JSON game files.
//!
//! One document per game, the same shape for every kind:
//!
//! ```text
//! { "vertices": [ { "name": "v0", "player": 0, "priority": 3 } ],
//!   "edges":    [ { "source": "v0", "target": "v1", "label": "e" } ] }
//! ```
//!
//! Vertices carry `priority` (parity) or `weight` (mean-payoff). Edges carry
//! `weight` and `discount` (discounted) plus `probability` (stochastic, where
//! every edge attribute is optional). `player` is -1 for chance vertices.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use ggg_engine::{
    DiscountedEdge, DiscountedGraph, Graph, MeanPayoffGraph, Owner, ParityGraph, Priority,
    StochasticEdge, StochasticGraph,
};

use crate::error::FormatError;

#[derive(Debug, Serialize, Deserialize)]
struct GameDocument<V, E> {
    vertices: Vec<VertexRecord<V>>,
    edges: Vec<EdgeRecord<E>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VertexRecord<V> {
    name: String,
    player: i64,
    #[serde(flatten)]
    attrs: V,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord<E> {
    source: String,
    target: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    label: String,
    #[serde(flatten)]
    attrs: E,
}

#[derive(Debug, Serialize, Deserialize)]
struct Bare {}

#[derive(Debug, Serialize, Deserialize)]
struct PriorityAttr {
    priority: Priority,
}

#[derive(Debug, Serialize, Deserialize)]
struct WeightAttr {
    weight: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct DiscountedAttr {
    weight: f64,
    discount: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct StochasticAttr {
    #[serde(default)]
    weight: f64,
    #[serde(default)]
    discount: f64,
    #[serde(default = "certain")]
    probability: f64,
}

fn certain() -> f64 {
    1.0
}

fn to_document<V, E, VA, EA>(
    graph: &Graph<V, E>,
    vertex: impl Fn(&V) -> VA,
    edge: impl Fn(&E) -> EA,
) -> GameDocument<VA, EA> {
    let vertices = graph
        .vertices()
        .iter()
        .map(|v| VertexRecord {
            name: v.name.clone(),
            player: i64::from(v.owner.code()),
            attrs: vertex(&v.attr),
        })
        .collect();
    let mut edges = Vec::with_capacity(graph.edge_count());
    for source in graph.ids() {
        for e in graph.edges(source) {
            edges.push(EdgeRecord {
                source: graph.name(source).to_string(),
                target: graph.name(e.target).to_string(),
                label: e.label.clone(),
                attrs: edge(&e.attr),
            });
        }
    }
    GameDocument { vertices, edges }
}

fn from_document<V, E, VA, EA>(
    doc: GameDocument<VA, EA>,
    vertex: impl Fn(VA) -> V,
    edge: impl Fn(EA) -> E,
) -> Result<Graph<V, E>, FormatError> {
    let mut graph = Graph::new();
    for record in doc.vertices {
        let owner = Owner::from_code(record.player).ok_or_else(|| FormatError::Attribute {
            element: format!("vertex '{}'", record.name),
            name: "player".to_string(),
            value: record.player.to_string(),
        })?;
        graph.add_vertex(record.name, owner, vertex(record.attrs))?;
    }
    for record in doc.edges {
        let source = graph
            .find(&record.source)
            .ok_or(FormatError::UnknownVertex(record.source))?;
        let target = graph
            .find(&record.target)
            .ok_or(FormatError::UnknownVertex(record.target))?;
        graph.add_edge(source, target, record.label, edge(record.attrs))?;
    }
    Ok(graph)
}

fn write_document<V: Serialize, E: Serialize, W: Write>(
    doc: &GameDocument<V, E>,
    mut writer: W,
) -> Result<(), FormatError> {
    serde_json::to_writer_pretty(&mut writer, doc)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_parity<R: Read>(reader: R) -> Result<ParityGraph, FormatError> {
    let doc: GameDocument<PriorityAttr, Bare> = serde_json::from_reader(reader)?;
    from_document(doc, |a| a.priority, |_| ())
}

pub fn write_parity<W: Write>(graph: &ParityGraph, writer: W) -> Result<(), FormatError> {
    let doc = to_document(graph, |&priority| PriorityAttr { priority }, |_| Bare {});
    write_document(&doc, writer)
}

pub fn read_mean_payoff<R: Read>(reader: R) -> Result<MeanPayoffGraph, FormatError> {
    let doc: GameDocument<WeightAttr, Bare> = serde_json::from_reader(reader)?;
    from_document(doc, |a| a.weight, |_| ())
}

pub fn write_mean_payoff<W: Write>(graph: &MeanPayoffGraph, writer: W) -> Result<(), FormatError> {
    let doc = to_document(graph, |&weight| WeightAttr { weight }, |_| Bare {});
    write_document(&doc, writer)
}

pub fn read_discounted<R: Read>(reader: R) -> Result<DiscountedGraph, FormatError> {
    let doc: GameDocument<Bare, DiscountedAttr> = serde_json::from_reader(reader)?;
    from_document(doc, |_| (), |a| DiscountedEdge::new(a.weight, a.discount))
}

pub fn write_discounted<W: Write>(graph: &DiscountedGraph, writer: W) -> Result<(), FormatError> {
    let doc = to_document(
        graph,
        |_| Bare {},
        |e| DiscountedAttr {
            weight: e.weight,
            discount: e.discount,
        },
    );
    write_document(&doc, writer)
}

pub fn read_stochastic<R: Read>(reader: R) -> Result<StochasticGraph, FormatError> {
    let doc: GameDocument<Bare, StochasticAttr> = serde_json::from_reader(reader)?;
    from_document(
        doc,
        |_| (),
        |a| StochasticEdge {
            weight: a.weight,
            discount: a.discount,
            probability: a.probability,
        },
    )
}

pub fn write_stochastic<W: Write>(graph: &StochasticGraph, writer: W) -> Result<(), FormatError> {
    let doc = to_document(
        graph,
        |_| Bare {},
        |e| StochasticAttr {
            weight: e.weight,
            discount: e.discount,
            probability: e.probability,
        },
    );
    write_document(&doc, writer)
}
