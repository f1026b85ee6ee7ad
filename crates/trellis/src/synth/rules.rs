//! Domain rules adjudicating proposed fact sets.
//!
//! Rules are explicit values evaluated over the union of committed and
//! proposed facts; there is no ambient solver context. Each violated rule
//! reports the proposed facts involved so the caller can surface a minimal
//! conflicting subset.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::fact::Fact;
use crate::inference::valid_links;

/// Named rule set under which facts are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    /// Main, interaction, and random effect rules.
    Effects,
    /// Distribution family and link function rules.
    FamilyLink,
}

/// One violated rule, with the proposed facts participating in it.
#[derive(Debug, Clone)]
pub struct Conflict {
    /// Human-readable statement of the violated rule.
    pub description: String,
    /// The proposed facts involved; a minimal set to choose among.
    pub facts: Vec<Fact>,
}

/// Evaluate `proposed` against `committed` under `rule_set`, returning every
/// violated rule. An empty result means the union is jointly satisfiable.
pub fn evaluate(committed: &IndexSet<Fact>, proposed: &[Fact], rule_set: RuleSet) -> Vec<Conflict> {
    let mut all: IndexSet<Fact> = committed.clone();
    all.extend(proposed.iter().cloned());
    let in_proposal = |fact: &Fact| proposed.contains(fact);

    let mut conflicts = Vec::new();
    match rule_set {
        RuleSet::Effects => effects_rules(&all, &in_proposal, &mut conflicts),
        RuleSet::FamilyLink => family_link_rules(&all, &in_proposal, &mut conflicts),
    }
    conflicts
}

fn effects_rules(
    all: &IndexSet<Fact>,
    in_proposal: &dyn Fn(&Fact) -> bool,
    conflicts: &mut Vec<Conflict>,
) {
    for fact in all {
        match fact {
            // A random slope requires its paired fixed term.
            Fact::RandomSlope { iv, .. } => {
                let components = fact.components();
                let paired: Fact = if components.len() == 1 {
                    Fact::main_effect(iv.clone())
                } else {
                    Fact::interaction(components)
                };
                if !all.contains(&paired) {
                    conflicts.push(Conflict {
                        description: format!(
                            "the random slope of '{iv}' requires '{iv}' as a fixed term",
                        ),
                        facts: core_of(fact, in_proposal),
                    });
                }
            }
            // Correlated intercept and slope require both candidates.
            Fact::CorrelatedInterceptSlope { group } => {
                let has_intercept = all.contains(&Fact::random_intercept(group.clone()));
                let has_slope = all.iter().any(
                    |f| matches!(f, Fact::RandomSlope { group: g, .. } if g == group),
                );
                if !has_intercept || !has_slope {
                    conflicts.push(Conflict {
                        description: format!(
                            "correlated random effects for '{group}' require both a \
                             random intercept and a random slope for '{group}'",
                        ),
                        facts: core_of(fact, in_proposal),
                    });
                }
            }
            // Hierarchy principle: an interaction requires every component's
            // main effect.
            Fact::InteractionEffect { components } => {
                for component in components {
                    if !all.contains(&Fact::main_effect(component.clone())) {
                        conflicts.push(Conflict {
                            description: format!(
                                "the interaction {} requires the main effect of '{component}'",
                                components.join("*"),
                            ),
                            facts: core_of(fact, in_proposal),
                        });
                    }
                }
            }
            _ => {}
        }
    }
}

fn family_link_rules(
    all: &IndexSet<Fact>,
    in_proposal: &dyn Fn(&Fact) -> bool,
    conflicts: &mut Vec<Conflict>,
) {
    let families: Vec<&Fact> = all
        .iter()
        .filter(|f| matches!(f, Fact::FamilyChoice { .. }))
        .collect();
    if families.len() > 1 {
        conflicts.push(Conflict {
            description: "at most one distribution family may be active".to_string(),
            facts: cores_of(&families, in_proposal),
        });
    }

    let links: Vec<&Fact> = all
        .iter()
        .filter(|f| matches!(f, Fact::LinkChoice { .. }))
        .collect();
    if links.len() > 1 {
        conflicts.push(Conflict {
            description: "at most one link function may be active".to_string(),
            facts: cores_of(&links, in_proposal),
        });
    }

    for fact in all {
        if let Fact::LinkChoice { family, link } = fact {
            if !all.contains(&Fact::FamilyChoice { family: *family }) {
                conflicts.push(Conflict {
                    description: format!(
                        "the {} link requires the {} family to be active",
                        link.name(),
                        family.name(),
                    ),
                    facts: core_of(fact, in_proposal),
                });
            }
            if !valid_links(*family).contains(link) {
                conflicts.push(Conflict {
                    description: format!(
                        "the {} link is not valid for the {} family",
                        link.name(),
                        family.name(),
                    ),
                    facts: core_of(fact, in_proposal),
                });
            }
        }
    }
}

// The committed set was satisfiable before the proposal, so every violation
// involves at least one proposed fact; restrict cores to those.
fn core_of(fact: &Fact, in_proposal: &dyn Fn(&Fact) -> bool) -> Vec<Fact> {
    if in_proposal(fact) {
        vec![fact.clone()]
    } else {
        Vec::new()
    }
}

fn cores_of(facts: &[&Fact], in_proposal: &dyn Fn(&Fact) -> bool) -> Vec<Fact> {
    facts
        .iter()
        .filter(|f| in_proposal(f))
        .map(|f| (*f).clone())
        .collect()
}
