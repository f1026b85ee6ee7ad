//! Directed, typed relationship multigraph over study variables.
//!
//! The graph supports multiple simultaneous relation kinds between the same
//! ordered pair of variables, keyed uniquely by (source, target, kind). It is
//! append-only: nodes and edges are added during design construction and
//! never removed, so a graph handed to the verifier or inference engine can
//! be treated as immutable.

mod edge;

pub use edge::{Edge, EdgeKey, EdgeKind, Relation};

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};

use crate::error::{Result, TrellisError};
use crate::variable::Variable;

fn edges_as_seq<S: Serializer>(
    edges: &IndexMap<EdgeKey, Edge>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(edges.values())
}

/// A directed multigraph of typed relations between variables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelationGraph {
    nodes: IndexMap<String, Variable>,
    #[serde(serialize_with = "edges_as_seq")]
    edges: IndexMap<EdgeKey, Edge>,
}

impl RelationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable as a node. Idempotent: re-adding an existing variable
    /// leaves the node set unchanged.
    pub fn add_variable(&mut self, variable: &Variable) {
        self.nodes
            .entry(variable.name().to_string())
            .or_insert_with(|| variable.clone());
    }

    /// True if the variable is registered as a node.
    pub fn has_variable(&self, variable: &Variable) -> bool {
        self.nodes.contains_key(variable.name())
    }

    /// Look up a node by name.
    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.nodes.get(name)
    }

    /// Add a typed edge. Endpoints and any variables referenced by the
    /// payload are registered as nodes first, so the endpoint invariant
    /// always holds. Fails if the exact (source, target, kind) key exists.
    pub fn add_edge(&mut self, source: &Variable, target: &Variable, relation: Relation) -> Result<()> {
        let key = EdgeKey {
            source: source.name().to_string(),
            target: target.name().to_string(),
            kind: relation.kind(),
        };
        if self.edges.contains_key(&key) {
            return Err(TrellisError::DuplicateEdge {
                from: key.source,
                to: key.target,
                kind: key.kind,
            });
        }

        self.add_variable(source);
        self.add_variable(target);
        for referenced in relation.referenced_variables() {
            self.add_variable(&referenced);
        }

        self.edges.insert(
            key,
            Edge {
                source: source.clone(),
                target: target.clone(),
                relation,
            },
        );
        Ok(())
    }

    /// True if an edge with the given key exists.
    pub fn has_edge(&self, source: &Variable, target: &Variable, kind: EdgeKind) -> bool {
        self.get_edge(source, target, kind).is_some()
    }

    /// Look up an edge by key.
    pub fn get_edge(&self, source: &Variable, target: &Variable, kind: EdgeKind) -> Option<&Edge> {
        self.edges.get(&EdgeKey {
            source: source.name().to_string(),
            target: target.name().to_string(),
            kind,
        })
    }

    /// Snapshot of all nodes. Order-insensitive for callers; iteration
    /// happens to follow insertion order.
    pub fn nodes(&self) -> Vec<Variable> {
        self.nodes.values().cloned().collect()
    }

    /// Snapshot of all edges in insertion order.
    pub fn edges(&self) -> Vec<&Edge> {
        self.edges.values().collect()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges whose source is `variable`, in insertion order.
    pub fn edges_from<'a>(&'a self, variable: &'a Variable) -> impl Iterator<Item = &'a Edge> {
        self.edges
            .values()
            .filter(move |e| e.source == *variable)
    }

    /// Edges whose target is `variable`, in insertion order.
    pub fn edges_into<'a>(&'a self, variable: &'a Variable) -> impl Iterator<Item = &'a Edge> {
        self.edges
            .values()
            .filter(move |e| e.target == *variable)
    }

    /// Edges of a given kind, in insertion order.
    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.kind() == kind)
    }

    /// True if `target` is reachable from `source` by following unknown,
    /// cause, or associate edges (the conceptual skeleton of the graph).
    pub fn reaches(&self, source: &Variable, target: &Variable) -> bool {
        if source == target {
            return true;
        }
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        seen.insert(source.name());
        queue.push_back(source.name());

        while let Some(current) = queue.pop_front() {
            for edge in self.edges.values() {
                if edge.source.name() != current {
                    continue;
                }
                match edge.kind() {
                    EdgeKind::Unknown | EdgeKind::Cause | EdgeKind::Associate => {}
                    _ => continue,
                }
                let next = edge.target.name();
                if next == target.name() {
                    return true;
                }
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }
}
