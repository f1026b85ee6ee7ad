//! Distribution family and link function inference.
//!
//! Family candidates are a deterministic lookup keyed by the dependent
//! variable's measurement kind; link candidates are keyed by the chosen
//! family. No data is consulted and nothing is fitted.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::design::Design;
use crate::variable::VariableKind;

/// Probability distribution family for the dependent variable's conditional
/// distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    Gaussian,
    InverseGaussian,
    Gamma,
    Tweedie,
    Poisson,
    Binomial,
    Multinomial,
    NegativeBinomial,
}

impl Family {
    /// Canonical family name.
    pub fn name(&self) -> &'static str {
        match self {
            Family::Gaussian => "Gaussian",
            Family::InverseGaussian => "InverseGaussian",
            Family::Gamma => "Gamma",
            Family::Tweedie => "Tweedie",
            Family::Poisson => "Poisson",
            Family::Binomial => "Binomial",
            Family::Multinomial => "Multinomial",
            Family::NegativeBinomial => "NegativeBinomial",
        }
    }
}

/// Link function relating the linear predictor to the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Link {
    Identity,
    Log,
    Inverse,
    InverseSquared,
    Power,
    Sqrt,
    Logit,
    Probit,
    CLogLog,
}

impl Link {
    /// Canonical link name.
    pub fn name(&self) -> &'static str {
        match self {
            Link::Identity => "Identity",
            Link::Log => "Log",
            Link::Inverse => "Inverse",
            Link::InverseSquared => "InverseSquared",
            Link::Power => "Power",
            Link::Sqrt => "Sqrt",
            Link::Logit => "Logit",
            Link::Probit => "Probit",
            Link::CLogLog => "CLogLog",
        }
    }
}

// Statistically valid links per family; first entry is the canonical link.
static FAMILY_LINKS: Lazy<IndexMap<Family, Vec<Link>>> = Lazy::new(|| {
    IndexMap::from([
        (
            Family::Gaussian,
            vec![Link::Identity, Link::Log, Link::Inverse],
        ),
        (
            Family::InverseGaussian,
            vec![Link::InverseSquared, Link::Identity, Link::Log],
        ),
        (
            Family::Gamma,
            vec![Link::Inverse, Link::Identity, Link::Log],
        ),
        (Family::Tweedie, vec![Link::Log, Link::Power]),
        (
            Family::Poisson,
            vec![Link::Log, Link::Identity, Link::Sqrt],
        ),
        (
            Family::Binomial,
            vec![Link::Logit, Link::Probit, Link::CLogLog],
        ),
        (Family::Multinomial, vec![Link::Logit, Link::Probit]),
        (
            Family::NegativeBinomial,
            vec![Link::Log, Link::Identity],
        ),
    ])
});

/// All links statistically valid for `family`.
pub fn valid_links(family: Family) -> &'static [Link] {
    FAMILY_LINKS
        .get(&family)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Family candidates for the design's dependent variable.
pub fn infer_family_functions(design: &Design) -> Vec<Family> {
    match design.dv().kind() {
        VariableKind::Numeric => vec![
            Family::Gaussian,
            Family::InverseGaussian,
            Family::Gamma,
            Family::Tweedie,
            Family::Poisson,
        ],
        // Ordered categories are treated as count-like/continuous
        // approximations.
        VariableKind::Ordinal { .. } | VariableKind::SetUp { .. } => {
            vec![Family::Gaussian, Family::Gamma, Family::Poisson]
        }
        VariableKind::Nominal { cardinality } => {
            if *cardinality == Some(2) {
                vec![Family::Binomial]
            } else {
                vec![Family::Multinomial, Family::NegativeBinomial]
            }
        }
        // A unit makes no sense as a response variable.
        VariableKind::Unit { .. } => Vec::new(),
    }
}

/// Link candidates for a previously chosen family.
pub fn infer_link_functions(_design: &Design, family: Family) -> Vec<Link> {
    valid_links(family).to_vec()
}
