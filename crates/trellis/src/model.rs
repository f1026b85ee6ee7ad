//! Final model specification handed to the code-generation collaborator.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;
use crate::fact::Fact;
use crate::synth::Synthesizer;

/// Random-effect structure for one grouping variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RandomEffectSpec {
    /// The grouping variable.
    pub group: String,
    /// Whether a random intercept was accepted.
    pub intercept: bool,
    /// Accepted random slopes (independent-variable or interaction names).
    pub slopes: Vec<String>,
    /// Whether the intercept and slope are modeled as correlated.
    pub correlated: bool,
}

/// The structured mapping of all accepted model components.
///
/// This is the hand-off shape for the code-generation collaborator; the
/// synthesizer's rules guarantee it is internally consistent (every slope has
/// its fixed term, at most one family and link are present, the link is valid
/// for the family).
#[derive(Debug, Clone, Serialize)]
pub struct ModelSpec {
    /// Name of the dependent variable.
    pub dependent_variable: String,
    /// Accepted main-effect variable names, in commit order.
    pub main_effects: Vec<String>,
    /// Accepted interaction terms as component-name groups.
    pub interaction_effects: Vec<Vec<String>>,
    /// Accepted random-effect groupings.
    pub random_effects: Vec<RandomEffectSpec>,
    /// Chosen distribution family, if committed.
    pub family: Option<String>,
    /// Chosen link function, if committed.
    pub link: Option<String>,
}

impl ModelSpec {
    /// Assemble the specification from a synthesizer's committed facts.
    pub fn from_synthesizer(synthesizer: &Synthesizer) -> Self {
        let mut main_effects = Vec::new();
        let mut interaction_effects = Vec::new();
        let mut random: IndexMap<String, RandomEffectSpec> = IndexMap::new();
        let mut family = None;
        let mut link = None;

        for fact in synthesizer.committed_facts() {
            match fact {
                Fact::MainEffect { iv } => main_effects.push(iv.clone()),
                Fact::InteractionEffect { components } => {
                    interaction_effects.push(components.clone())
                }
                Fact::RandomIntercept { group } => {
                    random
                        .entry(group.clone())
                        .or_insert_with(|| RandomEffectSpec {
                            group: group.clone(),
                            ..Default::default()
                        })
                        .intercept = true;
                }
                Fact::RandomSlope { iv, group } => {
                    random
                        .entry(group.clone())
                        .or_insert_with(|| RandomEffectSpec {
                            group: group.clone(),
                            ..Default::default()
                        })
                        .slopes
                        .push(iv.clone());
                }
                Fact::CorrelatedInterceptSlope { group } => {
                    random
                        .entry(group.clone())
                        .or_insert_with(|| RandomEffectSpec {
                            group: group.clone(),
                            ..Default::default()
                        })
                        .correlated = true;
                }
                Fact::FamilyChoice { family: f } => family = Some(f.name().to_string()),
                Fact::LinkChoice { link: l, .. } => link = Some(l.name().to_string()),
            }
        }

        Self {
            dependent_variable: synthesizer.design().dv().name().to_string(),
            main_effects,
            interaction_effects,
            random_effects: random.into_values().collect(),
            family,
            link,
        }
    }

    /// Serialize the specification as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Synthesizer {
    /// The structured mapping of committed facts for code generation.
    pub fn to_model_spec(&self) -> ModelSpec {
        ModelSpec::from_synthesizer(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::{Design, Grouping, IvTerm};
    use crate::inference::{Family, Link};
    use crate::synth::RuleSet;
    use crate::variable::Variable;

    #[test]
    fn test_spec_collects_committed_facts() {
        let correct = Variable::nominal_with_cardinality("correct", 2);
        let expl = Variable::nominal("explanation type");
        let participant = Variable::unit("participant");
        let design = Design::new(
            correct.clone(),
            [IvTerm::from(expl.treat(&participant, 2))],
            [Grouping::from(participant.repeat(&correct, 50))],
        )
        .unwrap();

        let mut synth = Synthesizer::new(design);
        synth
            .update_with_facts(
                &[
                    Fact::main_effect("explanation type"),
                    Fact::random_intercept("participant"),
                ],
                RuleSet::Effects,
            )
            .unwrap();
        synth
            .update_with_facts(
                &[
                    Fact::FamilyChoice {
                        family: Family::Binomial,
                    },
                    Fact::LinkChoice {
                        family: Family::Binomial,
                        link: Link::Logit,
                    },
                ],
                RuleSet::FamilyLink,
            )
            .unwrap();

        let spec = synth.to_model_spec();
        assert_eq!(spec.dependent_variable, "correct");
        assert_eq!(spec.main_effects, vec!["explanation type"]);
        assert!(spec.interaction_effects.is_empty());
        assert_eq!(spec.random_effects.len(), 1);
        assert_eq!(spec.random_effects[0].group, "participant");
        assert!(spec.random_effects[0].intercept);
        assert!(!spec.random_effects[0].correlated);
        assert_eq!(spec.family.as_deref(), Some("Binomial"));
        assert_eq!(spec.link.as_deref(), Some("Logit"));

        let json = spec.to_json().unwrap();
        assert!(json.contains("\"dependent_variable\": \"correct\""));
    }
}
