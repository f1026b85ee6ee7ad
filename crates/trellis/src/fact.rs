//! Candidate model-component facts.
//!
//! A [`Fact`] is the equality-comparable token exchanged between the
//! inference engine, the constraint synthesizer, and the disambiguation
//! loop: one fact per candidate main effect, interaction term, random
//! effect, distribution family, or link function.

use serde::{Deserialize, Serialize};

use crate::inference::{Family, Link};

/// One candidate statistical model component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "fact")]
pub enum Fact {
    /// A direct independent-variable term.
    MainEffect { iv: String },
    /// A joint term over two or more variables, with a sorted component list.
    InteractionEffect { components: Vec<String> },
    /// A per-group intercept for a grouping variable.
    RandomIntercept { group: String },
    /// A per-group slope for an independent variable within a grouping
    /// variable. The `iv` may name an interaction term (components joined
    /// with '*').
    RandomSlope { iv: String, group: String },
    /// Correlation between the random intercept and slope of one grouping
    /// variable.
    CorrelatedInterceptSlope { group: String },
    /// A distribution family for the dependent variable.
    FamilyChoice { family: Family },
    /// A link function, valid only for its family.
    LinkChoice { family: Family, link: Link },
}

impl Fact {
    /// Build a main-effect fact for an independent variable name.
    pub fn main_effect(iv: impl Into<String>) -> Self {
        Fact::MainEffect { iv: iv.into() }
    }

    /// Build an interaction fact; components are sorted and deduplicated so
    /// repeated declarations of the same variable set compare equal.
    pub fn interaction(components: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut components: Vec<String> = components.into_iter().map(Into::into).collect();
        components.sort();
        components.dedup();
        Fact::InteractionEffect { components }
    }

    /// Build a random-intercept fact for a grouping variable name.
    pub fn random_intercept(group: impl Into<String>) -> Self {
        Fact::RandomIntercept {
            group: group.into(),
        }
    }

    /// Build a random-slope fact.
    pub fn random_slope(iv: impl Into<String>, group: impl Into<String>) -> Self {
        Fact::RandomSlope {
            iv: iv.into(),
            group: group.into(),
        }
    }

    /// Human-readable label for the disambiguation UI.
    pub fn label(&self) -> String {
        match self {
            Fact::MainEffect { iv } => format!("Main effect of '{iv}'"),
            Fact::InteractionEffect { components } => {
                format!("Interaction {}", components.join(" \u{00d7} "))
            }
            Fact::RandomIntercept { group } => format!("Random intercept for '{group}'"),
            Fact::RandomSlope { iv, group } => {
                format!("Random slope of '{iv}' within '{group}'")
            }
            Fact::CorrelatedInterceptSlope { group } => {
                format!("Correlated random intercept and slope for '{group}'")
            }
            Fact::FamilyChoice { family } => format!("{} family", family.name()),
            Fact::LinkChoice { family, link } => {
                format!("{} link for the {} family", link.name(), family.name())
            }
        }
    }

    /// Stable opaque token used to match the fact against constraints.
    pub fn token(&self) -> String {
        match self {
            Fact::MainEffect { iv } => format!("main:{iv}"),
            Fact::InteractionEffect { components } => {
                format!("interaction:{}", components.join("*"))
            }
            Fact::RandomIntercept { group } => format!("intercept:{group}"),
            Fact::RandomSlope { iv, group } => format!("slope:{iv}@{group}"),
            Fact::CorrelatedInterceptSlope { group } => format!("correlated:{group}"),
            Fact::FamilyChoice { family } => format!("family:{}", family.name()),
            Fact::LinkChoice { family, link } => {
                format!("link:{}/{}", family.name(), link.name())
            }
        }
    }

    /// For effect facts, the variable names the term is made of.
    pub fn components(&self) -> Vec<String> {
        match self {
            Fact::MainEffect { iv } => vec![iv.clone()],
            Fact::InteractionEffect { components } => components.clone(),
            Fact::RandomSlope { iv, .. } => {
                iv.split('*').map(str::to_string).collect()
            }
            Fact::RandomIntercept { group } | Fact::CorrelatedInterceptSlope { group } => {
                vec![group.clone()]
            }
            Fact::FamilyChoice { .. } | Fact::LinkChoice { .. } => Vec::new(),
        }
    }
}
