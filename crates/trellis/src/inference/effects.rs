//! Candidate main, interaction, and random effect inference.
//!
//! Each pass is pure: it reads the relationship graph and design, mutates
//! neither, and returns a set of candidate [`Fact`]s in a deterministic
//! order.

use indexmap::IndexSet;

use crate::design::Design;
use crate::error::{Result, TrellisError};
use crate::fact::Fact;
use crate::graph::{EdgeKind, RelationGraph};
use crate::variable::Variable;

fn require_known(graph: &RelationGraph, variable: &Variable) -> Result<()> {
    if graph.has_variable(variable) {
        Ok(())
    } else {
        Err(TrellisError::UnknownVariable(variable.name().to_string()))
    }
}

/// One main-effect candidate per declared independent variable.
pub fn infer_main_effects(graph: &RelationGraph, design: &Design) -> Result<IndexSet<Fact>> {
    let mut facts = IndexSet::new();
    for iv in design.ivs() {
        require_known(graph, &iv)?;
        facts.insert(Fact::main_effect(iv.name()));
    }
    Ok(facts)
}

/// Candidate interaction terms derived from moderation edges.
///
/// For each moderation whose target is the dependent variable (directly or
/// transitively), every subset of the moderator set combined with the
/// moderated variable yields one interaction candidate of arity >= 2.
/// Canonical component ordering deduplicates repeated declarations over the
/// same variable set.
pub fn infer_interaction_effects(
    graph: &RelationGraph,
    design: &Design,
    main_effects: &IndexSet<Fact>,
) -> Result<IndexSet<Fact>> {
    let dv = design.dv();
    let mut facts = IndexSet::new();

    for edge in graph.edges_of_kind(EdgeKind::Moderate) {
        let Some(moderation) = edge.as_moderation() else {
            continue;
        };
        require_known(graph, &moderation.moderated)?;
        require_known(graph, &moderation.on)?;
        for m in &moderation.moderators {
            require_known(graph, m)?;
        }

        // Only moderations that bear on the dependent variable produce
        // model terms.
        if moderation.on != *dv && !graph.reaches(&moderation.on, dv) {
            continue;
        }
        // The moderated variable must itself be a main-effect candidate.
        if !main_effects.contains(&Fact::main_effect(moderation.moderated.name())) {
            continue;
        }

        let moderators: Vec<&Variable> = moderation
            .moderators
            .iter()
            .filter(|m| **m != moderation.moderated)
            .collect();
        // Every non-empty subset of the moderators, joined with the
        // moderated variable.
        for mask in 1u32..(1 << moderators.len()) {
            let mut components: Vec<String> = vec![moderation.moderated.name().to_string()];
            for (i, m) in moderators.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    components.push(m.name().to_string());
                }
            }
            facts.insert(Fact::interaction(components));
        }
    }

    Ok(facts)
}

/// Candidate random intercepts, slopes, and intercept-slope correlations
/// derived from nesting and repeated-measure structure.
pub fn infer_random_effects(
    graph: &RelationGraph,
    _design: &Design,
    main_effects: &IndexSet<Fact>,
    interaction_effects: &IndexSet<Fact>,
) -> Result<IndexSet<Fact>> {
    let mut facts = IndexSet::new();

    // Grouping variables that carry repeated measurement, with their counts.
    let mut repeat_groups: Vec<(String, usize)> = Vec::new();

    for edge in graph.edges_of_kind(EdgeKind::Repeat) {
        let Some(repeat) = edge.as_repeat() else {
            continue;
        };
        require_known(graph, &repeat.unit)?;
        require_known(graph, &repeat.response)?;
        facts.insert(Fact::random_intercept(repeat.unit.name()));
        repeat_groups.push((repeat.unit.name().to_string(), repeat.number_of_measures));
    }

    for edge in graph.edges_of_kind(EdgeKind::Nest) {
        let Some(nest) = edge.as_nest() else {
            continue;
        };
        require_known(graph, &nest.unit)?;
        require_known(graph, &nest.group)?;
        facts.insert(Fact::random_intercept(nest.group.name()));
    }

    // Within-group variation: an IV treated on a repeatedly measured unit,
    // with at least two treatment levels, varies within that unit and gets a
    // slope candidate.
    let mut slopes: Vec<Fact> = Vec::new();
    for edge in graph.edges_of_kind(EdgeKind::Treat) {
        let Some(treatment) = edge.as_treatment() else {
            continue;
        };
        require_known(graph, &treatment.unit)?;
        require_known(graph, &treatment.treatment)?;
        if treatment.num_levels < 2 {
            continue;
        }
        let within = repeat_groups
            .iter()
            .any(|(unit, n)| unit == treatment.unit.name() && *n >= 2);
        if !within {
            continue;
        }
        if main_effects.contains(&Fact::main_effect(treatment.treatment.name())) {
            slopes.push(Fact::random_slope(
                treatment.treatment.name(),
                treatment.unit.name(),
            ));
        }
    }

    // Interaction terms whose components all vary within the same unit get
    // an interaction slope candidate.
    for interaction in interaction_effects {
        let Fact::InteractionEffect { components } = interaction else {
            continue;
        };
        for (unit, n) in &repeat_groups {
            if *n < 2 {
                continue;
            }
            let all_within = components.iter().all(|c| {
                graph.edges_of_kind(EdgeKind::Treat).any(|e| {
                    e.as_treatment().is_some_and(|t| {
                        t.treatment.name() == c && t.unit.name() == unit && t.num_levels >= 2
                    })
                })
            });
            if all_within {
                slopes.push(Fact::random_slope(components.join("*"), unit.clone()));
            }
        }
    }

    for slope in slopes {
        facts.insert(slope.clone());
        // A group with both an intercept and a slope candidate also gets a
        // correlated-intercept-slope candidate.
        if let Fact::RandomSlope { group, .. } = &slope {
            if facts.contains(&Fact::random_intercept(group.clone())) {
                facts.insert(Fact::CorrelatedInterceptSlope {
                    group: group.clone(),
                });
            }
        }
    }

    Ok(facts)
}
