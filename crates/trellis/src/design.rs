//! Study design construction and conceptual validation passes.

use indexmap::IndexSet;
use serde::Serialize;

use crate::conceptual::ConceptualModel;
use crate::error::{Result, TrellisError};
use crate::graph::{EdgeKind, Relation, RelationGraph};
use crate::variable::{Moderation, Nest, RepeatedMeasure, Treatment, Variable};

/// An independent-variable specification: a bare variable, or a variable
/// wrapped with a treatment or moderation annotation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IvTerm {
    Plain(Variable),
    Treated(Treatment),
    Moderated(Moderation),
}

impl IvTerm {
    /// The declared independent variable itself.
    pub fn variable(&self) -> &Variable {
        match self {
            IvTerm::Plain(v) => v,
            IvTerm::Treated(t) => &t.treatment,
            IvTerm::Moderated(m) => &m.moderated,
        }
    }

    /// Variables referenced by the annotation beyond the IV itself.
    fn annotation_variables(&self) -> Vec<Variable> {
        match self {
            IvTerm::Plain(_) => Vec::new(),
            IvTerm::Treated(t) => vec![t.unit.clone()],
            IvTerm::Moderated(m) => {
                let mut vars = m.moderators.clone();
                vars.push(m.on.clone());
                vars
            }
        }
    }
}

impl From<Variable> for IvTerm {
    fn from(v: Variable) -> Self {
        IvTerm::Plain(v)
    }
}

impl From<Treatment> for IvTerm {
    fn from(t: Treatment) -> Self {
        IvTerm::Treated(t)
    }
}

impl From<Moderation> for IvTerm {
    fn from(m: Moderation) -> Self {
        IvTerm::Moderated(m)
    }
}

/// A grouping relation: nesting or repeated measurement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    Nested(Nest),
    Repeated(RepeatedMeasure),
}

impl Grouping {
    fn variables(&self) -> Vec<Variable> {
        match self {
            Grouping::Nested(n) => vec![n.unit.clone(), n.group.clone()],
            Grouping::Repeated(r) => vec![r.unit.clone(), r.response.clone()],
        }
    }
}

impl From<Nest> for Grouping {
    fn from(n: Nest) -> Self {
        Grouping::Nested(n)
    }
}

impl From<RepeatedMeasure> for Grouping {
    fn from(r: RepeatedMeasure) -> Self {
        Grouping::Repeated(r)
    }
}

/// A study design: a dependent variable, independent-variable specifications,
/// and optional grouping relations, materialized into a relationship graph.
///
/// Construction populates the graph once; afterwards the design is read-only.
#[derive(Debug, Clone, Serialize)]
pub struct Design {
    dv: Variable,
    iv_terms: Vec<IvTerm>,
    groupings: Vec<Grouping>,
    graph: RelationGraph,
    classified: bool,
}

impl Design {
    /// Build a design from a dependent variable, independent-variable
    /// specifications, and grouping relations.
    ///
    /// Every IV gets an `unknown` placeholder edge toward the DV, pending
    /// classification as cause or associate. Treatment, moderation, nesting,
    /// and repeated-measure annotations add their corresponding typed edges.
    pub fn new(
        dv: Variable,
        ivs: impl IntoIterator<Item = IvTerm>,
        groupings: impl IntoIterator<Item = Grouping>,
    ) -> Result<Self> {
        let iv_terms: Vec<IvTerm> = ivs.into_iter().collect();
        let groupings: Vec<Grouping> = groupings.into_iter().collect();

        for term in &iv_terms {
            if *term.variable() == dv {
                return Err(TrellisError::InvalidDesign(format!(
                    "the dependent variable '{}' also appears as an independent variable",
                    dv.name()
                )));
            }
        }

        let mut graph = RelationGraph::new();
        graph.add_variable(&dv);

        // Names known to the design so far: dv, IVs, and every variable an
        // IV annotation references.
        let mut known: IndexSet<String> = IndexSet::new();
        known.insert(dv.name().to_string());

        for term in &iv_terms {
            let iv = term.variable();
            known.insert(iv.name().to_string());
            for v in term.annotation_variables() {
                known.insert(v.name().to_string());
            }

            graph.add_edge(iv, &dv, Relation::Unknown)?;
            match term {
                IvTerm::Plain(_) => {}
                IvTerm::Treated(t) => {
                    graph.add_edge(&t.treatment, &t.unit, Relation::Treat(t.clone()))?;
                }
                IvTerm::Moderated(m) => {
                    graph.add_edge(&m.moderated, &m.on, Relation::Moderate(m.clone()))?;
                }
            }
        }

        for grouping in &groupings {
            let vars = grouping.variables();
            // A grouping may introduce a fresh unit (e.g. a participant
            // nested under an already-declared group), but it must anchor to
            // at least one variable the design already knows.
            if !vars.iter().any(|v| known.contains(v.name())) {
                return Err(TrellisError::InvalidDesign(format!(
                    "grouping over {} references no variable declared in the design",
                    vars.iter()
                        .map(|v| format!("'{}'", v.name()))
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }
            for v in &vars {
                known.insert(v.name().to_string());
            }
            match grouping {
                Grouping::Nested(n) => {
                    graph.add_edge(&n.unit, &n.group, Relation::Nest(n.clone()))?;
                }
                Grouping::Repeated(r) => {
                    graph.add_edge(&r.unit, &r.response, Relation::Repeat(r.clone()))?;
                }
            }
        }

        Ok(Self {
            dv,
            iv_terms,
            groupings,
            graph,
            classified: false,
        })
    }

    /// The dependent variable.
    pub fn dv(&self) -> &Variable {
        &self.dv
    }

    /// The declared independent variables, in declaration order.
    pub fn ivs(&self) -> Vec<Variable> {
        self.iv_terms.iter().map(|t| t.variable().clone()).collect()
    }

    /// The independent-variable specifications as declared.
    pub fn iv_terms(&self) -> &[IvTerm] {
        &self.iv_terms
    }

    /// The declared grouping relations.
    pub fn groupings(&self) -> &[Grouping] {
        &self.groupings
    }

    /// The relationship graph built from this design.
    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    /// Check that every IV has a conceptual relationship with the DV.
    ///
    /// Before classification the `unknown` placeholder counts as a pending
    /// relationship. Once [`Design::classify_relationships`] has run, an IV
    /// left with only its placeholder has no conceptual backing and the
    /// check fails.
    pub fn check_iv_dv_relations(&self) -> Result<()> {
        for term in &self.iv_terms {
            let iv = term.variable();
            let related = self.graph.has_edge(iv, &self.dv, EdgeKind::Cause)
                || self.graph.has_edge(iv, &self.dv, EdgeKind::Associate)
                || (!self.classified && self.graph.has_edge(iv, &self.dv, EdgeKind::Unknown));
            if !related {
                return Err(TrellisError::MissingRelation {
                    iv: iv.name().to_string(),
                    dv: self.dv.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Check that the DV does not cause any IV.
    pub fn check_no_reverse_causation(&self) -> Result<()> {
        for term in &self.iv_terms {
            let iv = term.variable();
            if self.graph.has_edge(&self.dv, iv, EdgeKind::Cause) {
                return Err(TrellisError::ReverseCausation {
                    dv: self.dv.name().to_string(),
                    iv: iv.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Run both conceptual validation passes, as done before inference.
    pub fn run_conceptual_checks(&self) -> Result<()> {
        self.check_iv_dv_relations()?;
        self.check_no_reverse_causation()
    }

    /// Resolve `unknown` IV→DV placeholders against a conceptual model,
    /// adding the classified `cause`/`associate` edge alongside each
    /// placeholder the model backs. The graph only grows, but afterwards a
    /// bare placeholder no longer satisfies [`Design::check_iv_dv_relations`].
    pub fn classify_relationships(&mut self, model: &ConceptualModel) -> Result<()> {
        for term in self.iv_terms.clone() {
            let iv = term.variable();
            if model.graph().has_edge(iv, &self.dv, EdgeKind::Cause)
                && !self.graph.has_edge(iv, &self.dv, EdgeKind::Cause)
            {
                self.graph.add_edge(iv, &self.dv, Relation::Cause)?;
            }
            if model.graph().has_edge(iv, &self.dv, EdgeKind::Associate)
                && !self.graph.has_edge(iv, &self.dv, EdgeKind::Associate)
            {
                self.graph.add_edge(iv, &self.dv, Relation::Associate)?;
            }
            // Reverse-direction beliefs are carried over too, so the
            // acyclicity check can catch them.
            if model.graph().has_edge(&self.dv, iv, EdgeKind::Cause)
                && !self.graph.has_edge(&self.dv, iv, EdgeKind::Cause)
            {
                self.graph.add_edge(&self.dv, iv, Relation::Cause)?;
            }
        }
        self.classified = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dv_among_ivs_is_rejected() {
        let acc = Variable::numeric("accuracy");
        let err = Design::new(acc.clone(), [IvTerm::from(acc)], []).unwrap_err();
        assert!(matches!(err, TrellisError::InvalidDesign(_)));
    }

    #[test]
    fn test_disconnected_grouping_is_rejected() {
        let acc = Variable::numeric("accuracy");
        let expl = Variable::nominal("explanation type");
        let stranger = Variable::unit("stranger");
        let other = Variable::nominal("other");
        let err = Design::new(
            acc,
            [IvTerm::from(expl)],
            [Grouping::from(stranger.repeat(&other, 3))],
        )
        .unwrap_err();
        assert!(matches!(err, TrellisError::InvalidDesign(_)));
    }

    #[test]
    fn test_fresh_unit_nested_under_known_group_is_accepted() {
        let acc = Variable::numeric("accuracy");
        let group = Variable::unit("group");
        let participant = Variable::unit("participant");
        let design = Design::new(
            acc,
            [IvTerm::from(group.clone())],
            [Grouping::from(participant.nested_under(&group))],
        )
        .unwrap();
        assert!(design.graph().has_variable(&participant));
    }

    #[test]
    fn test_unknown_placeholder_satisfies_relation_check() {
        let acc = Variable::numeric("accuracy");
        let expl = Variable::nominal("explanation type");
        let design = Design::new(acc, [IvTerm::from(expl)], []).unwrap();
        design.check_iv_dv_relations().unwrap();
        design.check_no_reverse_causation().unwrap();
    }

    #[test]
    fn test_unbacked_iv_fails_relation_check_after_classification() {
        let acc = Variable::numeric("accuracy");
        let expl = Variable::nominal("explanation type");
        let age = Variable::numeric("age");
        let mut design = Design::new(
            acc.clone(),
            [IvTerm::from(expl.clone()), IvTerm::from(age.clone())],
            [],
        )
        .unwrap();

        // Only one of the two IVs gets conceptual backing.
        let cm = ConceptualModel::new([expl.cause(&acc)], []);
        design.classify_relationships(&cm).unwrap();

        let err = design.check_iv_dv_relations().unwrap_err();
        match err {
            TrellisError::MissingRelation { iv, dv } => {
                assert_eq!(iv, "age");
                assert_eq!(dv, "accuracy");
            }
            other => panic!("expected MissingRelation, got {other}"),
        }
    }

    #[test]
    fn test_classification_adds_cause_edge() {
        let acc = Variable::numeric("accuracy");
        let expl = Variable::nominal("explanation type");
        let mut design =
            Design::new(acc.clone(), [IvTerm::from(expl.clone())], []).unwrap();
        let cm = ConceptualModel::new([expl.cause(&acc)], []);
        design.classify_relationships(&cm).unwrap();
        assert!(design.graph().has_edge(&expl, &acc, EdgeKind::Cause));
        // The placeholder stays; the graph is append-only.
        assert!(design.graph().has_edge(&expl, &acc, EdgeKind::Unknown));
    }
}
