//! Typed domain variables and the fluent relation builders.
//!
//! A [`Variable`] is a shared identity: cloning a variable shares the same
//! underlying measurement metadata rather than minting a new identity, so a
//! variable appearing in a design, a conceptual model, and several relation
//! payloads is always the same node. Identity, equality, and hashing are by
//! name, which must be unique within a design.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Measurement kind of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Unordered categories, with an optional declared cardinality.
    Nominal { cardinality: Option<usize> },
    /// Ordered categories with an explicit level sequence.
    Ordinal { levels: Vec<String> },
    /// Continuous or count measurements.
    Numeric,
    /// An observational unit (participant, group, plot), optionally with a
    /// declared number of repetitions.
    Unit { repetitions: Option<usize> },
    /// An experiment setup variable (e.g., time, session) with ordered levels.
    SetUp { levels: Vec<String> },
}

#[derive(Debug)]
struct VariableInner {
    name: String,
    kind: VariableKind,
}

/// A study variable with a unique name and a measurement kind.
///
/// Variables are immutable after creation and cheap to clone; every clone
/// refers to the same identity.
#[derive(Debug, Clone)]
pub struct Variable {
    inner: Arc<VariableInner>,
}

impl Variable {
    fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            inner: Arc::new(VariableInner {
                name: name.into(),
                kind,
            }),
        }
    }

    /// Create a nominal (unordered categorical) variable.
    pub fn nominal(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Nominal { cardinality: None })
    }

    /// Create a nominal variable with a declared number of categories.
    pub fn nominal_with_cardinality(name: impl Into<String>, cardinality: usize) -> Self {
        Self::new(
            name,
            VariableKind::Nominal {
                cardinality: Some(cardinality),
            },
        )
    }

    /// Create an ordinal variable with an ordered level sequence.
    pub fn ordinal(name: impl Into<String>, levels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(
            name,
            VariableKind::Ordinal {
                levels: levels.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Create a numeric variable.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Numeric)
    }

    /// Create an observational unit variable.
    pub fn unit(name: impl Into<String>) -> Self {
        Self::new(name, VariableKind::Unit { repetitions: None })
    }

    /// Create a unit variable with a declared repetition cardinality.
    pub fn unit_with_repetitions(name: impl Into<String>, repetitions: usize) -> Self {
        Self::new(
            name,
            VariableKind::Unit {
                repetitions: Some(repetitions),
            },
        )
    }

    /// Create a setup variable (ordered experiment structure, e.g. time).
    pub fn setup(name: impl Into<String>, levels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(
            name,
            VariableKind::SetUp {
                levels: levels.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// The variable's unique name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The variable's measurement kind.
    pub fn kind(&self) -> &VariableKind {
        &self.inner.kind
    }

    /// Declared cardinality: category count for Nominal, level count for
    /// Ordinal/SetUp, repetition count for Unit. None for Numeric.
    pub fn cardinality(&self) -> Option<usize> {
        match &self.inner.kind {
            VariableKind::Nominal { cardinality } => *cardinality,
            VariableKind::Ordinal { levels } | VariableKind::SetUp { levels } => Some(levels.len()),
            VariableKind::Unit { repetitions } => *repetitions,
            VariableKind::Numeric => None,
        }
    }

    /// True for numeric measurements.
    pub fn is_numeric(&self) -> bool {
        matches!(self.inner.kind, VariableKind::Numeric)
    }

    /// True for a nominal variable with exactly two categories.
    pub fn is_binary(&self) -> bool {
        matches!(
            self.inner.kind,
            VariableKind::Nominal {
                cardinality: Some(2)
            }
        )
    }

    /// Declare that this variable is a treatment assigned to `unit`.
    pub fn treat(&self, unit: &Variable, num_levels: usize) -> Treatment {
        Treatment {
            unit: unit.clone(),
            treatment: self.clone(),
            num_levels,
        }
    }

    /// Declare that `moderators` moderate this variable's effect on `on`.
    pub fn moderate(&self, moderators: &[Variable], on: &Variable) -> Moderation {
        Moderation {
            moderated: self.clone(),
            moderators: moderators.to_vec(),
            on: on.clone(),
        }
    }

    /// Declare that this unit is nested under `group`.
    pub fn nested_under(&self, group: &Variable) -> Nest {
        Nest {
            unit: self.clone(),
            group: group.clone(),
        }
    }

    /// Declare that this unit contributes `number_of_measures` repeated
    /// measurements of `response`.
    pub fn repeat(&self, response: &Variable, number_of_measures: usize) -> RepeatedMeasure {
        RepeatedMeasure {
            unit: self.clone(),
            response: response.clone(),
            number_of_measures,
        }
    }

    /// Assert a causal belief: this variable causes `effect`.
    pub fn cause(&self, effect: &Variable) -> Cause {
        Cause {
            cause: self.clone(),
            effect: effect.clone(),
        }
    }

    /// Assert an associative belief between this variable and `other`.
    pub fn associate(&self, other: &Variable) -> Associate {
        Associate {
            lhs: self.clone(),
            rhs: other.clone(),
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

impl Eq for Variable {}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}

impl Serialize for Variable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            name: &'a str,
            kind: &'a VariableKind,
        }
        Repr {
            name: self.name(),
            kind: self.kind(),
        }
        .serialize(serializer)
    }
}

/// A treatment assignment: `treatment` is administered to `unit`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Treatment {
    /// The observational unit receiving the treatment.
    pub unit: Variable,
    /// The treatment variable.
    pub treatment: Variable,
    /// Number of treatment levels each unit is exposed to.
    pub num_levels: usize,
}

/// A nesting declaration: `unit` is nested under `group`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Nest {
    pub unit: Variable,
    pub group: Variable,
}

/// A repeated-measures declaration: `unit` contributes
/// `number_of_measures` observations of `response`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepeatedMeasure {
    pub unit: Variable,
    pub response: Variable,
    pub number_of_measures: usize,
}

/// A moderation declaration: `moderators` moderate the effect of
/// `moderated` on `on`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Moderation {
    pub moderated: Variable,
    pub moderators: Vec<Variable>,
    pub on: Variable,
}

/// An asserted causal belief.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Cause {
    pub cause: Variable,
    pub effect: Variable,
}

/// An asserted associative belief (unordered).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Associate {
    pub lhs: Variable,
    pub rhs: Variable,
}
