//! Human-in-the-loop disambiguation as an explicit request/response protocol.
//!
//! The session owns no suspension primitive: it surfaces the candidate facts
//! for the current stage, the caller (GUI or CLI) collects a decision and
//! submits it, and the session serializes the check-then-commit pair so no
//! interleaved commit can invalidate a check. Conflicts surface the unsat
//! core for the caller to resolve by keeping exactly one fact.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::design::Design;
use crate::error::{Result, TrellisError};
use crate::fact::Fact;
use crate::model::ModelSpec;
use crate::synth::{Candidate, FamilyCandidates, RuleSet, Synthesizer};

/// Stage of the disambiguation loop. Stages are visited in order; each
/// commits one class of model component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    MainEffects,
    InteractionEffects,
    RandomEffects,
    FamilyLink,
    Complete,
}

impl Stage {
    /// Human-readable stage label.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::MainEffects => "Main Effects",
            Stage::InteractionEffects => "Interaction Effects",
            Stage::RandomEffects => "Random Effects",
            Stage::FamilyLink => "Family and Link",
            Stage::Complete => "Complete",
        }
    }

    fn rule_set(&self) -> Option<RuleSet> {
        match self {
            Stage::MainEffects | Stage::InteractionEffects | Stage::RandomEffects => {
                Some(RuleSet::Effects)
            }
            Stage::FamilyLink => Some(RuleSet::FamilyLink),
            Stage::Complete => None,
        }
    }

    fn next(&self) -> Stage {
        match self {
            Stage::MainEffects => Stage::InteractionEffects,
            Stage::InteractionEffects => Stage::RandomEffects,
            Stage::RandomEffects => Stage::FamilyLink,
            Stage::FamilyLink | Stage::Complete => Stage::Complete,
        }
    }
}

/// The candidates pending a decision at the current stage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "candidates")]
pub enum StageCandidates {
    MainEffects(IndexMap<String, Candidate>),
    InteractionEffects(IndexMap<String, Vec<Candidate>>),
    RandomEffects(IndexMap<String, Vec<Candidate>>),
    FamilyLink(FamilyCandidates),
    Complete,
}

/// Outcome of submitting a decision.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The facts were committed; the session advanced to `next_stage`.
    Committed { next_stage: Stage },
    /// The proposal was unsatisfiable; `core` is a minimal conflicting
    /// subset to resolve via [`DisambiguationSession::resolve_conflict`].
    Conflict { core: Vec<Fact> },
}

/// One recorded decision.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    /// Stage the decision was made at.
    pub stage: Stage,
    /// Tokens of the committed facts.
    pub facts: Vec<String>,
    /// When the decision was committed.
    pub decided_at: DateTime<Utc>,
}

/// Drives the staged refinement loop over one design's synthesizer.
#[derive(Debug)]
pub struct DisambiguationSession {
    synthesizer: Synthesizer,
    stage: Stage,
    pending_conflict: Option<Vec<Fact>>,
    log: Vec<DecisionRecord>,
}

impl DisambiguationSession {
    /// Start a session for a design. Runs the conceptual validation passes
    /// first; a malformed design never reaches the loop.
    pub fn new(design: Design) -> Result<Self> {
        design.run_conceptual_checks()?;
        Ok(Self {
            synthesizer: Synthesizer::new(design),
            stage: Stage::MainEffects,
            pending_conflict: None,
            log: Vec::new(),
        })
    }

    /// The current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// True once all stages are decided.
    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Complete
    }

    /// The underlying synthesizer.
    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    /// The conflicting facts awaiting resolution, if any.
    pub fn pending_conflict(&self) -> Option<&[Fact]> {
        self.pending_conflict.as_deref()
    }

    /// Every decision committed so far, in order.
    pub fn decision_log(&self) -> &[DecisionRecord] {
        &self.log
    }

    /// Candidate facts pending a decision at the current stage.
    pub fn candidates(&self) -> Result<StageCandidates> {
        Ok(match self.stage {
            Stage::MainEffects => {
                StageCandidates::MainEffects(self.synthesizer.generate_main_effects()?)
            }
            Stage::InteractionEffects => {
                StageCandidates::InteractionEffects(self.synthesizer.generate_interaction_effects()?)
            }
            Stage::RandomEffects => {
                StageCandidates::RandomEffects(self.synthesizer.generate_random_effects()?)
            }
            Stage::FamilyLink => {
                StageCandidates::FamilyLink(self.synthesizer.generate_family_distributions())
            }
            Stage::Complete => StageCandidates::Complete,
        })
    }

    /// Submit the caller's selection for the current stage.
    ///
    /// Check and commit run as one step. A satisfiable selection is
    /// committed and the session advances; an unsatisfiable one leaves the
    /// knowledge base untouched and surfaces the unsat core. An empty
    /// selection skips the stage.
    pub fn submit(&mut self, facts: Vec<Fact>) -> Result<SubmitOutcome> {
        let Some(rule_set) = self.stage.rule_set() else {
            return Err(TrellisError::InvalidDesign(
                "the disambiguation session is already complete".to_string(),
            ));
        };

        if !self.synthesizer.check_constraints(&facts, rule_set) {
            let core = self.synthesizer.unsat_core(&facts, rule_set);
            self.pending_conflict = Some(core.clone());
            return Ok(SubmitOutcome::Conflict { core });
        }

        self.synthesizer.update_with_facts(&facts, rule_set)?;
        self.record(facts);
        self.pending_conflict = None;
        self.stage = self.stage.next();
        Ok(SubmitOutcome::Committed {
            next_stage: self.stage,
        })
    }

    /// Resolve a pending conflict by keeping exactly one fact from the core;
    /// the rest of the proposal is discarded (not from history, since
    /// nothing was committed).
    pub fn resolve_conflict(&mut self, keep: Fact) -> Result<()> {
        let Some(core) = self.pending_conflict.take() else {
            return Err(TrellisError::InvalidDesign(
                "no conflict is pending resolution".to_string(),
            ));
        };
        if !core.contains(&keep) {
            self.pending_conflict = Some(core);
            return Err(TrellisError::InvalidDesign(format!(
                "fact `{}` is not part of the pending conflict",
                keep.token()
            )));
        }

        let rule_set = self
            .stage
            .rule_set()
            .expect("a pending conflict implies an active stage");
        // The kept fact can still clash with the committed facts on its own;
        // keep the conflict pending so the caller can pick again.
        if let Err(err) = self
            .synthesizer
            .update_with_facts(std::slice::from_ref(&keep), rule_set)
        {
            self.pending_conflict = Some(core);
            return Err(err);
        }
        self.record(vec![keep]);
        self.stage = self.stage.next();
        Ok(())
    }

    /// Hand over the final structured mapping.
    pub fn into_model_spec(self) -> ModelSpec {
        self.synthesizer.to_model_spec()
    }

    fn record(&mut self, facts: Vec<Fact>) {
        self.log.push(DecisionRecord {
            stage: self.stage,
            facts: facts.iter().map(Fact::token).collect(),
            decided_at: Utc::now(),
        });
    }
}
