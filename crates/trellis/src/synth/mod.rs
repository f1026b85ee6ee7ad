//! Constraint synthesizer: rules, knowledge base, and candidate generation.

mod candidates;
mod rules;
mod synthesizer;

pub use candidates::{Candidate, FamilyCandidates};
pub use rules::{Conflict, RuleSet};
pub use synthesizer::Synthesizer;
