//! Conceptual models of asserted domain beliefs, and the design verifier.

use serde::Serialize;

use crate::design::Design;
use crate::graph::{EdgeKind, Relation, RelationGraph};
use crate::variable::{Associate, Cause};

/// A lightweight parallel graph of asserted causal and associative domain
/// beliefs, independent of measurement structure. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct ConceptualModel {
    causal: Vec<Cause>,
    associative: Vec<Associate>,
    graph: RelationGraph,
}

impl ConceptualModel {
    /// Materialize asserted beliefs into a relationship graph: one `cause`
    /// edge per ordered causal pair, and an `associate` edge in each
    /// direction per unordered associative pair.
    pub fn new(
        causal: impl IntoIterator<Item = Cause>,
        associative: impl IntoIterator<Item = Associate>,
    ) -> Self {
        let causal: Vec<Cause> = causal.into_iter().collect();
        let associative: Vec<Associate> = associative.into_iter().collect();

        let mut graph = RelationGraph::new();
        for c in &causal {
            // Repeated assertions of the same belief are harmless.
            if !graph.has_edge(&c.cause, &c.effect, EdgeKind::Cause) {
                let _ = graph.add_edge(&c.cause, &c.effect, Relation::Cause);
            }
        }
        for a in &associative {
            if !graph.has_edge(&a.lhs, &a.rhs, EdgeKind::Associate) {
                let _ = graph.add_edge(&a.lhs, &a.rhs, Relation::Associate);
            }
            if !graph.has_edge(&a.rhs, &a.lhs, EdgeKind::Associate) {
                let _ = graph.add_edge(&a.rhs, &a.lhs, Relation::Associate);
            }
        }

        Self {
            causal,
            associative,
            graph,
        }
    }

    /// The asserted causal relationships.
    pub fn causal_relationships(&self) -> &[Cause] {
        &self.causal
    }

    /// The asserted associative relationships.
    pub fn associative_relationships(&self) -> &[Associate] {
        &self.associative
    }

    /// The materialized belief graph.
    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }
}

/// Check a design for conceptual soundness against a conceptual model.
///
/// For every independent-variable/dependent-variable pair in the design's
/// graph, the conceptual model must assert a `cause` or `associate` relation
/// between the same pair; any missing correspondence returns `false`
/// immediately.
///
/// The check is sound but not complete: a `true` result guarantees every
/// design relationship is backed by an asserted belief, while `false` only
/// means the correspondence could not be positively established (for
/// example, when justification would be indirect, or when the model's
/// variables only partially overlap the design's). Callers must not read
/// `false` as proof of inconsistency.
pub fn verify(design: &Design, model: &ConceptualModel) -> bool {
    let dv = design.dv();
    for iv in design.ivs() {
        let backed = model.graph().has_edge(&iv, dv, EdgeKind::Cause)
            || model.graph().has_edge(&iv, dv, EdgeKind::Associate);
        if !backed {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::IvTerm;
    use crate::variable::Variable;

    #[test]
    fn test_associative_pairs_are_bidirectional() {
        let age = Variable::numeric("age");
        let affect = Variable::numeric("positive affect");
        let cm = ConceptualModel::new([], [age.associate(&affect)]);
        assert!(cm.graph().has_edge(&age, &affect, EdgeKind::Associate));
        assert!(cm.graph().has_edge(&affect, &age, EdgeKind::Associate));
    }

    #[test]
    fn test_repeated_assertion_is_harmless() {
        let a = Variable::numeric("a");
        let b = Variable::numeric("b");
        let cm = ConceptualModel::new([a.cause(&b), a.cause(&b)], []);
        assert_eq!(cm.graph().edge_count(), 1);
    }

    #[test]
    fn test_verify_fails_on_unbacked_iv() {
        let affect = Variable::numeric("positive affect");
        let es = Variable::numeric("emotional suppression");
        let age = Variable::numeric("age");
        let design = Design::new(
            affect.clone(),
            [IvTerm::from(es.clone()), IvTerm::from(age)],
            [],
        )
        .unwrap();
        // Only one of the two IVs is backed by a belief.
        let cm = ConceptualModel::new([es.cause(&affect)], []);
        assert!(!verify(&design, &cm));
    }
}
