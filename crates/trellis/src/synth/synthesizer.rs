//! The constraint synthesizer and its append-only knowledge base.

use indexmap::IndexSet;

use crate::design::Design;
use crate::error::{Result, TrellisError};
use crate::fact::Fact;

use super::rules::{evaluate, RuleSet};

/// Adjudicates proposed fact sets against domain rules and maintains the
/// monotonically growing set of accepted facts for one design.
///
/// The knowledge base is scoped to a single design instance and driven by
/// one sequential caller: the disambiguation loop checks a proposal with
/// [`check_constraints`](Synthesizer::check_constraints) and commits it with
/// [`update_with_facts`](Synthesizer::update_with_facts). Committed facts are
/// never retracted.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    design: Design,
    committed: IndexSet<Fact>,
}

impl Synthesizer {
    /// Create a synthesizer scoped to one design, with an empty knowledge
    /// base.
    pub fn new(design: Design) -> Self {
        Self {
            design,
            committed: IndexSet::new(),
        }
    }

    /// The design this synthesizer is scoped to.
    pub fn design(&self) -> &Design {
        &self.design
    }

    /// The accepted facts, in commit order.
    pub fn committed_facts(&self) -> &IndexSet<Fact> {
        &self.committed
    }

    /// Would adding `facts` to the accepted set remain jointly satisfiable
    /// under `rule_set`? Never alters committed state.
    pub fn check_constraints(&self, facts: &[Fact], rule_set: RuleSet) -> bool {
        evaluate(&self.committed, facts, rule_set).is_empty()
    }

    /// Commit `facts` into the accepted set permanently.
    ///
    /// Fails with [`TrellisError::InconsistentFacts`] if the facts are not
    /// jointly satisfiable with the prior accepted set; on failure the
    /// knowledge base is left exactly as it was.
    pub fn update_with_facts(&mut self, facts: &[Fact], rule_set: RuleSet) -> Result<()> {
        let conflicts = evaluate(&self.committed, facts, rule_set);
        if let Some(first) = conflicts.first() {
            return Err(TrellisError::InconsistentFacts {
                reason: first.description.clone(),
                conflict: first.facts.iter().map(Fact::token).collect(),
            });
        }
        self.committed.extend(facts.iter().cloned());
        Ok(())
    }

    /// A minimal conflicting subset of `facts` under `rule_set`, for an
    /// external actor to resolve by keeping exactly one. Empty when the
    /// proposal is satisfiable. The proposal and the knowledge base are left
    /// untouched.
    pub fn unsat_core(&self, facts: &[Fact], rule_set: RuleSet) -> Vec<Fact> {
        evaluate(&self.committed, facts, rule_set)
            .into_iter()
            .map(|c| c.facts)
            .filter(|facts| !facts.is_empty())
            .min_by_key(Vec::len)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::IvTerm;
    use crate::inference::Family;
    use crate::variable::Variable;

    fn simple_design() -> Design {
        let acc = Variable::numeric("accuracy");
        let a = Variable::nominal("a");
        let b = Variable::nominal("b");
        Design::new(acc, [IvTerm::from(a), IvTerm::from(b)], []).unwrap()
    }

    #[test]
    fn test_check_does_not_mutate() {
        let synth = Synthesizer::new(simple_design());
        assert!(synth.check_constraints(&[Fact::main_effect("a")], RuleSet::Effects));
        assert!(synth.committed_facts().is_empty());
    }

    #[test]
    fn test_committed_facts_are_background_for_later_checks() {
        let mut synth = Synthesizer::new(simple_design());
        synth
            .update_with_facts(&[Fact::main_effect("a")], RuleSet::Effects)
            .unwrap();
        // The slope's paired main effect is already committed background.
        assert!(
            synth.check_constraints(&[Fact::random_slope("a", "participant")], RuleSet::Effects)
        );
    }

    #[test]
    fn test_failed_update_leaves_state_unchanged() {
        let mut synth = Synthesizer::new(simple_design());
        synth
            .update_with_facts(
                &[Fact::FamilyChoice {
                    family: Family::Gaussian,
                }],
                RuleSet::FamilyLink,
            )
            .unwrap();
        let before = synth.committed_facts().clone();
        let err = synth
            .update_with_facts(
                &[Fact::FamilyChoice {
                    family: Family::Poisson,
                }],
                RuleSet::FamilyLink,
            )
            .unwrap_err();
        assert!(matches!(err, TrellisError::InconsistentFacts { .. }));
        assert_eq!(*synth.committed_facts(), before);
    }

    #[test]
    fn test_unsat_core_names_the_proposed_conflict() {
        let mut synth = Synthesizer::new(simple_design());
        synth
            .update_with_facts(
                &[Fact::FamilyChoice {
                    family: Family::Gaussian,
                }],
                RuleSet::FamilyLink,
            )
            .unwrap();
        let proposal = vec![Fact::FamilyChoice {
            family: Family::Poisson,
        }];
        assert_eq!(synth.unsat_core(&proposal, RuleSet::FamilyLink), proposal);
        assert!(synth
            .unsat_core(&[Fact::main_effect("a")], RuleSet::Effects)
            .is_empty());
    }
}
