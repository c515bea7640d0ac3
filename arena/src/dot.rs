//! DOT game files, restricted to the subset the generators emit:
//!
//! ```text
//! digraph ParityGame {
//!     // comment
//!     v0 [name="v0", player=0, priority=3];
//!     v0 -> v1 [label="edge_0_1"];
//! }
//! ```
//!
//! One statement per line. Vertices need a `player` attribute (-1 for
//! chance) and the kind's vertex attribute; `name` defaults to the DOT id.
//! Edges may appear before the vertices they mention. `node`, `edge` and
//! `graph` defaults and bare `key=value` statements are skipped.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::str::FromStr;

use ggg_engine::{
    DiscountedEdge, DiscountedGraph, Graph, MeanPayoffGraph, Owner, ParityGraph, StochasticEdge,
    StochasticGraph,
};

use crate::error::FormatError;

/// Attribute list of one statement
#[derive(Debug, Default)]
struct Attributes {
    line: usize,
    pairs: Vec<(String, String)>,
}

impl Attributes {
    fn element(&self) -> String {
        format!("line {}", self.line)
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, FormatError> {
        match self.get(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| FormatError::Attribute {
                    element: self.element(),
                    name: name.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    fn require<T: FromStr>(&self, name: &str) -> Result<T, FormatError> {
        self.parse(name)?
            .ok_or_else(|| FormatError::MissingAttribute {
                element: self.element(),
                name: name.to_string(),
            })
    }

    fn owner(&self) -> Result<Owner, FormatError> {
        let code: i64 = self.require("player")?;
        Owner::from_code(code).ok_or_else(|| FormatError::Attribute {
            element: self.element(),
            name: "player".to_string(),
            value: code.to_string(),
        })
    }
}

#[derive(Debug)]
enum Statement {
    Vertex {
        id: String,
        attrs: Attributes,
    },
    Edge {
        source: String,
        target: String,
        attrs: Attributes,
    },
}

fn syntax(line: usize, message: impl Into<String>) -> FormatError {
    FormatError::Dot {
        line,
        message: message.into(),
    }
}

/// Split `text` on `sep` wherever it is not inside a quoted string.
fn split_unquoted(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = quoted;
        } else if c == '"' {
            quoted = !quoted;
        } else if c == sep && !quoted {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}

fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    let mut previous_slash = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' && quoted {
            escaped = true;
        } else if c == '"' {
            quoted = !quoted;
        } else if c == '/' && !quoted {
            if previous_slash {
                return &line[..i - 1];
            }
            previous_slash = true;
            continue;
        }
        previous_slash = false;
    }
    line
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) else {
        return raw.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn parse_attributes(line: usize, list: &str) -> Result<Attributes, FormatError> {
    let mut attrs = Attributes {
        line,
        pairs: Vec::new(),
    };
    for item in split_unquoted(list, ',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (key, value) = item
            .split_once('=')
            .ok_or_else(|| syntax(line, format!("expected key=value, found '{item}'")))?;
        attrs.pairs.push((key.trim().to_string(), unquote(value)));
    }
    Ok(attrs)
}

fn parse_id(line: usize, raw: &str) -> Result<String, FormatError> {
    let id = unquote(raw);
    if id.is_empty() {
        return Err(syntax(line, "empty vertex id"));
    }
    Ok(id)
}

/// Parse one statement, or `None` for statements that carry no game data.
fn parse_statement(line: usize, text: &str) -> Result<Option<Statement>, FormatError> {
    let text = text.trim_end_matches(';').trim();
    let (head, attrs) = match text.find('[') {
        Some(open) => {
            let list = text[open + 1..]
                .trim_end()
                .strip_suffix(']')
                .ok_or_else(|| syntax(line, "unterminated attribute list"))?;
            (text[..open].trim(), parse_attributes(line, list)?)
        }
        None => (
            text,
            Attributes {
                line,
                pairs: Vec::new(),
            },
        ),
    };

    if matches!(head, "node" | "edge" | "graph") || (head.contains('=') && !head.contains("->")) {
        return Ok(None);
    }
    if let Some((source, target)) = head.split_once("->") {
        return Ok(Some(Statement::Edge {
            source: parse_id(line, source)?,
            target: parse_id(line, target)?,
            attrs,
        }));
    }
    Ok(Some(Statement::Vertex {
        id: parse_id(line, head)?,
        attrs,
    }))
}

fn parse_document<R: BufRead>(reader: R) -> Result<Vec<Statement>, FormatError> {
    let mut statements = Vec::new();
    let mut opened = false;
    let mut closed = false;
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        let text = strip_comment(&line).trim();
        if text.is_empty() {
            continue;
        }
        if closed {
            return Err(syntax(line_no, "content after the closing brace"));
        }
        if !opened {
            if !(text.starts_with("digraph") && text.ends_with('{')) {
                return Err(syntax(line_no, "expected 'digraph <name> {'"));
            }
            opened = true;
            continue;
        }
        if text == "}" {
            closed = true;
            continue;
        }
        if let Some(statement) = parse_statement(line_no, text)? {
            statements.push(statement);
        }
    }
    if !opened {
        return Err(syntax(0, "missing 'digraph' header"));
    }
    if !closed {
        return Err(syntax(0, "missing closing brace"));
    }
    Ok(statements)
}

/// Build a graph: vertices first, in declaration order, then edges.
/// `edge` also receives the owner of the source vertex.
fn build<V, E>(
    statements: Vec<Statement>,
    vertex: impl Fn(&Attributes) -> Result<V, FormatError>,
    edge: impl Fn(Owner, &Attributes) -> Result<E, FormatError>,
) -> Result<Graph<V, E>, FormatError> {
    let mut graph = Graph::new();
    let mut ids = HashMap::new();
    let mut edges = Vec::new();
    for statement in statements {
        match statement {
            Statement::Vertex { id, attrs } => {
                if ids.contains_key(&id) {
                    return Err(syntax(attrs.line, format!("vertex '{id}' declared twice")));
                }
                let name = attrs.get("name").unwrap_or(id.as_str()).to_string();
                let v = graph.add_vertex(name, attrs.owner()?, vertex(&attrs)?)?;
                ids.insert(id, v);
            }
            Statement::Edge {
                source,
                target,
                attrs,
            } => edges.push((source, target, attrs)),
        }
    }
    for (source, target, attrs) in edges {
        let s = *ids.get(&source).ok_or(FormatError::UnknownVertex(source))?;
        let t = *ids.get(&target).ok_or(FormatError::UnknownVertex(target))?;
        let label = attrs.get("label").unwrap_or_default().to_string();
        let payload = edge(graph.owner(s), &attrs)?;
        graph.add_edge(s, t, label, payload)?;
    }
    Ok(graph)
}

fn write_graph<V, E, W: Write>(
    graph: &Graph<V, E>,
    title: &str,
    mut out: W,
    vertex: impl Fn(&V) -> Vec<String>,
    edge: impl Fn(Owner, &E) -> Vec<String>,
) -> Result<(), FormatError> {
    writeln!(out, "digraph {title} {{")?;
    for v in graph.ids() {
        let mut attrs = vec![
            format!("name={}", quote(graph.name(v))),
            format!("player={}", graph.owner(v).code()),
        ];
        attrs.extend(vertex(graph.attr(v)));
        writeln!(out, "    v{v} [{}];", attrs.join(", "))?;
    }
    for v in graph.ids() {
        for e in graph.edges(v) {
            let mut attrs = Vec::new();
            if !e.label.is_empty() {
                attrs.push(format!("label={}", quote(&e.label)));
            }
            attrs.extend(edge(graph.owner(v), &e.attr));
            if attrs.is_empty() {
                writeln!(out, "    v{v} -> v{};", e.target)?;
            } else {
                writeln!(out, "    v{v} -> v{} [{}];", e.target, attrs.join(", "))?;
            }
        }
    }
    writeln!(out, "}}")?;
    out.flush()?;
    Ok(())
}

pub fn read_parity<R: BufRead>(reader: R) -> Result<ParityGraph, FormatError> {
    build(parse_document(reader)?, |a| a.require("priority"), |_, _| Ok(()))
}

pub fn write_parity<W: Write>(graph: &ParityGraph, writer: W) -> Result<(), FormatError> {
    write_graph(
        graph,
        "ParityGame",
        writer,
        |p| vec![format!("priority={p}")],
        |_, _| Vec::new(),
    )
}

pub fn read_mean_payoff<R: BufRead>(reader: R) -> Result<MeanPayoffGraph, FormatError> {
    build(parse_document(reader)?, |a| a.require("weight"), |_, _| Ok(()))
}

pub fn write_mean_payoff<W: Write>(graph: &MeanPayoffGraph, writer: W) -> Result<(), FormatError> {
    write_graph(
        graph,
        "MeanPayoffGame",
        writer,
        |w| vec![format!("weight={w}")],
        |_, _| Vec::new(),
    )
}

pub fn read_discounted<R: BufRead>(reader: R) -> Result<DiscountedGraph, FormatError> {
    build(
        parse_document(reader)?,
        |_| Ok(()),
        |_, a| Ok(DiscountedEdge::new(a.require("weight")?, a.require("discount")?)),
    )
}

pub fn write_discounted<W: Write>(graph: &DiscountedGraph, writer: W) -> Result<(), FormatError> {
    write_graph(
        graph,
        "DiscountedGame",
        writer,
        |_| Vec::new(),
        |_, e| vec![format!("weight={}", e.weight), format!("discount={}", e.discount)],
    )
}

/// Chance edges need `probability`; player edges need `weight` and
/// `discount`. Whatever else is present is kept.
pub fn read_stochastic<R: BufRead>(reader: R) -> Result<StochasticGraph, FormatError> {
    build(
        parse_document(reader)?,
        |_| Ok(()),
        |owner, a| match owner {
            Owner::Chance => Ok(StochasticEdge {
                weight: a.parse("weight")?.unwrap_or(0.0),
                discount: a.parse("discount")?.unwrap_or(0.0),
                probability: a.require("probability")?,
            }),
            Owner::Player(_) => Ok(StochasticEdge {
                weight: a.require("weight")?,
                discount: a.require("discount")?,
                probability: a.parse("probability")?.unwrap_or(1.0),
            }),
        },
    )
}

pub fn write_stochastic<W: Write>(graph: &StochasticGraph, writer: W) -> Result<(), FormatError> {
    write_graph(
        graph,
        "StochasticGame",
        writer,
        |_| Vec::new(),
        |owner, e| match owner {
            Owner::Chance => vec![format!("probability={}", e.probability)],
            Owner::Player(_) => {
                vec![format!("weight={}", e.weight), format!("discount={}", e.discount)]
            }
        },
    )
}
