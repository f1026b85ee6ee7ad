//! Typed edges of the relationship graph.

use std::fmt;

use serde::Serialize;

use crate::variable::{Moderation, Nest, RepeatedMeasure, Treatment, Variable};

/// Tag identifying the relation kind of an edge.
///
/// Together with the source and target names, the kind forms the edge's
/// unique key: the graph holds at most one edge per (source, target, kind)
/// triple, but any number of differently-kinded edges between the same pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Placeholder pending classification as cause or associate.
    Unknown,
    /// Asserted causal relationship.
    Cause,
    /// Asserted associative relationship.
    Associate,
    /// Treatment assignment to a unit.
    Treat,
    /// Unit nested under a group.
    Nest,
    /// Repeated measurement of a response by a unit.
    Repeat,
    /// Moderation of one variable's effect by others.
    Moderate,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeKind::Unknown => "unknown",
            EdgeKind::Cause => "cause",
            EdgeKind::Associate => "associate",
            EdgeKind::Treat => "treat",
            EdgeKind::Nest => "nest",
            EdgeKind::Repeat => "repeat",
            EdgeKind::Moderate => "moderate",
        };
        f.write_str(s)
    }
}

/// Structured payload carried by an edge, closed over the relation kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Unknown,
    Cause,
    Associate,
    Treat(Treatment),
    Nest(Nest),
    Repeat(RepeatedMeasure),
    Moderate(Moderation),
}

impl Relation {
    /// The kind tag for this payload.
    pub fn kind(&self) -> EdgeKind {
        match self {
            Relation::Unknown => EdgeKind::Unknown,
            Relation::Cause => EdgeKind::Cause,
            Relation::Associate => EdgeKind::Associate,
            Relation::Treat(_) => EdgeKind::Treat,
            Relation::Nest(_) => EdgeKind::Nest,
            Relation::Repeat(_) => EdgeKind::Repeat,
            Relation::Moderate(_) => EdgeKind::Moderate,
        }
    }

    /// Variables referenced by the payload beyond the edge endpoints.
    pub(crate) fn referenced_variables(&self) -> Vec<Variable> {
        match self {
            Relation::Treat(t) => vec![t.unit.clone(), t.treatment.clone()],
            Relation::Nest(n) => vec![n.unit.clone(), n.group.clone()],
            Relation::Repeat(r) => vec![r.unit.clone(), r.response.clone()],
            Relation::Moderate(m) => {
                let mut vars = vec![m.moderated.clone(), m.on.clone()];
                vars.extend(m.moderators.iter().cloned());
                vars
            }
            Relation::Unknown | Relation::Cause | Relation::Associate => Vec::new(),
        }
    }
}

/// Unique key of an edge within the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EdgeKey {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

/// A directed, typed edge between two variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    /// Source variable.
    pub source: Variable,
    /// Target variable.
    pub target: Variable,
    /// Structured relation payload.
    pub relation: Relation,
}

impl Edge {
    /// The edge's unique key.
    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            source: self.source.name().to_string(),
            target: self.target.name().to_string(),
            kind: self.relation.kind(),
        }
    }

    /// The edge's kind tag.
    pub fn kind(&self) -> EdgeKind {
        self.relation.kind()
    }

    /// The treatment payload, if this is a treat edge.
    pub fn as_treatment(&self) -> Option<&Treatment> {
        match &self.relation {
            Relation::Treat(t) => Some(t),
            _ => None,
        }
    }

    /// The nesting payload, if this is a nest edge.
    pub fn as_nest(&self) -> Option<&Nest> {
        match &self.relation {
            Relation::Nest(n) => Some(n),
            _ => None,
        }
    }

    /// The repeated-measures payload, if this is a repeat edge.
    pub fn as_repeat(&self) -> Option<&RepeatedMeasure> {
        match &self.relation {
            Relation::Repeat(r) => Some(r),
            _ => None,
        }
    }

    /// The moderation payload, if this is a moderate edge.
    pub fn as_moderation(&self) -> Option<&Moderation> {
        match &self.relation {
            Relation::Moderate(m) => Some(m),
            _ => None,
        }
    }
}
