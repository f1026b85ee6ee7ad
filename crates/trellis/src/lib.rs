//! Trellis: study-design graphs and constraint-based statistical model inference.
//!
//! Trellis turns an informal study design (variables, how they were measured,
//! and believed causal/associative relationships) into a validated,
//! disambiguated statistical model specification. A design is materialized
//! into a typed relationship graph, cross-checked against a conceptual model
//! of domain beliefs, and refined through a human-in-the-loop loop that
//! proposes candidate model components and locks them in under domain rules.
//!
//! # Core Principles
//!
//! - **Declared, not fitted**: candidates come from the design's structure;
//!   nothing is estimated from data.
//! - **Sound verification**: a positive verification guarantees every design
//!   relationship is backed by an asserted domain belief.
//! - **Monotonic refinement**: accepted facts are never retracted; conflicts
//!   are resolved before commit, not by backtracking.
//!
//! # Example
//!
//! ```
//! use trellis::{Design, DisambiguationSession, Fact, Variable};
//!
//! let correct = Variable::nominal_with_cardinality("correct", 2);
//! let expl = Variable::nominal("explanation type");
//! let participant = Variable::unit("participant");
//!
//! let design = Design::new(
//!     correct.clone(),
//!     [expl.treat(&participant, 1).into()],
//!     [participant.repeat(&correct, 50).into()],
//! )
//! .unwrap();
//!
//! let mut session = DisambiguationSession::new(design).unwrap();
//! session.submit(vec![Fact::main_effect("explanation type")]).unwrap();
//! ```

pub mod conceptual;
pub mod design;
pub mod error;
pub mod fact;
pub mod graph;
pub mod inference;
pub mod model;
pub mod session;
pub mod synth;
pub mod variable;

pub use conceptual::{verify, ConceptualModel};
pub use design::{Design, Grouping, IvTerm};
pub use error::{Result, TrellisError};
pub use fact::Fact;
pub use graph::{Edge, EdgeKey, EdgeKind, Relation, RelationGraph};
pub use inference::{
    infer_family_functions, infer_interaction_effects, infer_link_functions, infer_main_effects,
    infer_random_effects, Family, Link,
};
pub use model::{ModelSpec, RandomEffectSpec};
pub use session::{DecisionRecord, DisambiguationSession, Stage, StageCandidates, SubmitOutcome};
pub use synth::{Candidate, FamilyCandidates, RuleSet, Synthesizer};
pub use variable::{
    Associate, Cause, Moderation, Nest, RepeatedMeasure, Treatment, Variable, VariableKind,
};
