//! Candidate generation for the disambiguation loop.
//!
//! Each generator wraps an inference pass and annotates every candidate with
//! whether it is currently consistent with the already-committed facts, so
//! the external actor can grey out choices the knowledge base rules out.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;
use crate::fact::Fact;
use crate::inference::{
    infer_family_functions, infer_interaction_effects, infer_link_functions, infer_main_effects,
    infer_random_effects,
};

use super::rules::RuleSet;
use super::synthesizer::Synthesizer;

/// A candidate fact with presentation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    /// The candidate fact itself.
    pub fact: Fact,
    /// Human-readable label.
    pub label: String,
    /// Opaque constraint token.
    pub token: String,
    /// Whether the candidate is currently consistent with committed facts.
    pub consistent: bool,
}

impl Candidate {
    fn new(fact: Fact, consistent: bool) -> Self {
        Self {
            label: fact.label(),
            token: fact.token(),
            fact,
            consistent,
        }
    }
}

/// Family candidates paired with the link candidates valid for each family.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyCandidates {
    /// One candidate per admissible distribution family.
    pub families: Vec<Candidate>,
    /// Link candidates per family name, in family order.
    pub links_by_family: IndexMap<String, Vec<Candidate>>,
}

impl Synthesizer {
    /// Main-effect candidates, keyed by independent-variable name.
    pub fn generate_main_effects(&self) -> Result<IndexMap<String, Candidate>> {
        let design = self.design();
        let facts = infer_main_effects(design.graph(), design)?;
        Ok(facts
            .into_iter()
            .map(|fact| {
                let consistent = self.check_constraints(std::slice::from_ref(&fact), RuleSet::Effects);
                let name = match &fact {
                    Fact::MainEffect { iv } => iv.clone(),
                    _ => fact.token(),
                };
                (name, Candidate::new(fact, consistent))
            })
            .collect())
    }

    /// Interaction-effect candidates, partitioned by arity for presentation
    /// ("two-way" terms first, then "n-way").
    pub fn generate_interaction_effects(&self) -> Result<IndexMap<String, Vec<Candidate>>> {
        let design = self.design();
        let main_effects = infer_main_effects(design.graph(), design)?;
        let facts = infer_interaction_effects(design.graph(), design, &main_effects)?;

        let mut grouped: IndexMap<String, Vec<Candidate>> = IndexMap::new();
        grouped.insert("two-way".to_string(), Vec::new());
        for fact in facts {
            let arity = fact.components().len();
            let bucket = if arity == 2 { "two-way" } else { "n-way" };
            let consistent = self.check_constraints(std::slice::from_ref(&fact), RuleSet::Effects);
            grouped
                .entry(bucket.to_string())
                .or_default()
                .push(Candidate::new(fact, consistent));
        }
        Ok(grouped)
    }

    /// Random-effect candidates, grouped by grouping variable.
    pub fn generate_random_effects(&self) -> Result<IndexMap<String, Vec<Candidate>>> {
        let design = self.design();
        let main_effects = infer_main_effects(design.graph(), design)?;
        let interactions = infer_interaction_effects(design.graph(), design, &main_effects)?;
        let facts = infer_random_effects(design.graph(), design, &main_effects, &interactions)?;

        let mut grouped: IndexMap<String, Vec<Candidate>> = IndexMap::new();
        for fact in facts {
            let group = match &fact {
                Fact::RandomIntercept { group }
                | Fact::RandomSlope { group, .. }
                | Fact::CorrelatedInterceptSlope { group } => group.clone(),
                _ => continue,
            };
            let consistent = self.check_constraints(std::slice::from_ref(&fact), RuleSet::Effects);
            grouped
                .entry(group)
                .or_default()
                .push(Candidate::new(fact, consistent));
        }
        Ok(grouped)
    }

    /// Distribution family candidates with their valid link functions.
    pub fn generate_family_distributions(&self) -> FamilyCandidates {
        let design = self.design();
        let mut families = Vec::new();
        let mut links_by_family = IndexMap::new();

        for family in infer_family_functions(design) {
            let family_fact = Fact::FamilyChoice { family };
            let consistent =
                self.check_constraints(std::slice::from_ref(&family_fact), RuleSet::FamilyLink);
            families.push(Candidate::new(family_fact, consistent));

            let links: Vec<Candidate> = infer_link_functions(design, family)
                .into_iter()
                .map(|link| {
                    let fact = Fact::LinkChoice { family, link };
                    let consistent =
                        self.check_constraints(std::slice::from_ref(&fact), RuleSet::FamilyLink);
                    Candidate::new(fact, consistent)
                })
                .collect();
            links_by_family.insert(family.name().to_string(), links);
        }

        FamilyCandidates {
            families,
            links_by_family,
        }
    }
}
