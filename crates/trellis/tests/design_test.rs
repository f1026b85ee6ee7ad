//! Integration tests for design construction, graph structure, and
//! verification against conceptual models.

use trellis::{
    verify, ConceptualModel, Design, EdgeKind, Grouping, IvTerm, TrellisError, Variable,
};

// =============================================================================
// Graph Construction Tests
// =============================================================================

#[test]
fn test_single_treated_iv_with_repeated_measures() {
    let correct = Variable::nominal_with_cardinality("correct", 2);
    let expl = Variable::nominal("expl type");
    let participant = Variable::unit("participant");

    let design = Design::new(
        correct.clone(),
        [IvTerm::from(expl.treat(&participant, 1))],
        [Grouping::from(participant.repeat(&correct, 50))],
    )
    .expect("design construction failed");

    let graph = design.graph();
    for v in [&correct, &expl, &participant] {
        assert!(graph.has_variable(v));
    }

    // Placeholder pending classification.
    assert!(graph.has_edge(&expl, &correct, EdgeKind::Unknown));

    // Treatment payload identities match the call's arguments exactly.
    let edge = graph
        .get_edge(&expl, &participant, EdgeKind::Treat)
        .expect("missing treat edge");
    let treatment = edge.as_treatment().expect("expected a treatment payload");
    assert_eq!(treatment.unit, participant);
    assert_eq!(treatment.treatment, expl);
    assert_eq!(treatment.num_levels, 1);

    // Repeated-measures payload carries the exact count.
    let edge = graph
        .get_edge(&participant, &correct, EdgeKind::Repeat)
        .expect("missing repeat edge");
    let repeat = edge.as_repeat().expect("expected a repeat payload");
    assert_eq!(repeat.unit, participant);
    assert_eq!(repeat.response, correct);
    assert_eq!(repeat.number_of_measures, 50);

    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.node_count(), 3);
}

#[test]
fn test_four_treated_ivs_on_shared_unit() {
    let chronotype = Variable::nominal("group chronotype");
    let composition = Variable::nominal("group composition");
    let tod = Variable::nominal("time of day");
    let qtype = Variable::nominal("question type");
    let acc = Variable::numeric("accuracy");
    let group = Variable::unit("group");

    let design = Design::new(
        acc.clone(),
        [
            IvTerm::from(chronotype.treat(&group, 1)),
            IvTerm::from(composition.treat(&group, 1)),
            IvTerm::from(tod.treat(&group, 1)),
            IvTerm::from(qtype.treat(&group, 2)),
        ],
        [],
    )
    .expect("design construction failed");

    let graph = design.graph();
    for iv in [&chronotype, &composition, &tod, &qtype] {
        assert!(graph.has_edge(iv, &acc, EdgeKind::Unknown));
        let edge = graph
            .get_edge(iv, &group, EdgeKind::Treat)
            .expect("missing treat edge");
        let treatment = edge.as_treatment().unwrap();
        assert_eq!(treatment.unit, group);
        assert_eq!(&treatment.treatment, iv);
    }
    assert_eq!(
        graph
            .get_edge(&qtype, &group, EdgeKind::Treat)
            .unwrap()
            .as_treatment()
            .unwrap()
            .num_levels,
        2
    );

    // 4 unknown placeholders + 4 treatments.
    assert_eq!(graph.edge_count(), 8);
    assert_eq!(graph.node_count(), 6);
}

#[test]
fn test_nesting_and_repetition_share_one_graph() {
    let acc = Variable::numeric("accuracy");
    let qtype = Variable::nominal("question type");
    let group = Variable::unit("group");
    let participant = Variable::unit("participant");

    let design = Design::new(
        acc.clone(),
        [
            IvTerm::from(group.clone()),
            IvTerm::from(qtype.treat(&group, 2)),
        ],
        [
            Grouping::from(participant.nested_under(&group)),
            Grouping::from(group.repeat(&acc, 2)),
        ],
    )
    .expect("design construction failed");

    let graph = design.graph();
    let nest = graph
        .get_edge(&participant, &group, EdgeKind::Nest)
        .expect("missing nest edge")
        .as_nest()
        .unwrap();
    assert_eq!(nest.unit, participant);
    assert_eq!(nest.group, group);

    let repeat = graph
        .get_edge(&group, &acc, EdgeKind::Repeat)
        .expect("missing repeat edge")
        .as_repeat()
        .unwrap();
    assert_eq!(repeat.number_of_measures, 2);

    // 2 unknown + 1 treat + 1 nest + 1 repeat.
    assert_eq!(graph.edge_count(), 5);
    // accuracy, question type, group, participant.
    assert_eq!(graph.node_count(), 4);
}

#[test]
fn test_node_count_matches_distinct_variables() {
    let acc = Variable::numeric("accuracy");
    let a = Variable::nominal("a");
    let b = Variable::nominal("b");
    let unit = Variable::unit("unit");

    // `a` appears twice (bare and treated): still one node.
    let design = Design::new(
        acc,
        [
            IvTerm::from(a.clone()),
            IvTerm::from(b.treat(&unit, 2)),
        ],
        [Grouping::from(unit.nested_under(&a))],
    )
    .unwrap();
    assert_eq!(design.graph().node_count(), 4);
}

// =============================================================================
// Design Validation Tests
// =============================================================================

#[test]
fn test_dv_among_ivs_is_invalid() {
    let acc = Variable::numeric("accuracy");
    let expl = Variable::nominal("expl type");
    let err = Design::new(
        acc.clone(),
        [IvTerm::from(expl), IvTerm::from(acc)],
        [],
    )
    .unwrap_err();
    assert!(matches!(err, TrellisError::InvalidDesign(_)));
}

#[test]
fn test_grouping_must_anchor_to_the_design() {
    let acc = Variable::numeric("accuracy");
    let expl = Variable::nominal("expl type");
    let plot = Variable::unit("plot");
    let yield_ = Variable::numeric("yield");
    let err = Design::new(
        acc,
        [IvTerm::from(expl)],
        [Grouping::from(plot.repeat(&yield_, 4))],
    )
    .unwrap_err();
    assert!(matches!(err, TrellisError::InvalidDesign(_)));
}

#[test]
fn test_conceptual_checks_pass_with_placeholders() {
    let acc = Variable::numeric("accuracy");
    let expl = Variable::nominal("expl type");
    let design = Design::new(acc, [IvTerm::from(expl)], []).unwrap();
    design.run_conceptual_checks().expect("checks should pass");
}

#[test]
fn test_reverse_causation_is_rejected() {
    let acc = Variable::numeric("accuracy");
    let expl = Variable::nominal("expl type");
    let mut design = Design::new(acc.clone(), [IvTerm::from(expl.clone())], []).unwrap();

    // The conceptual model asserts that the DV causes the IV; classification
    // carries that belief into the design graph, where the acyclicity check
    // catches it.
    let cm = ConceptualModel::new([acc.cause(&expl)], []);
    design.classify_relationships(&cm).unwrap();
    let err = design.check_no_reverse_causation().unwrap_err();
    assert!(matches!(err, TrellisError::ReverseCausation { .. }));
}

// =============================================================================
// Verifier Tests
// =============================================================================

#[test]
fn test_verify_true_when_beliefs_mirror_design() {
    let pos_aff = Variable::numeric("positive affect");
    let es = Variable::numeric("emotional suppression");
    let cr = Variable::numeric("cognitive reappraisal");
    let gender = Variable::nominal("gender");
    let age = Variable::numeric("age");
    let time = Variable::numeric("hours since 7am");

    let design = Design::new(
        pos_aff.clone(),
        [
            IvTerm::from(es.clone()),
            IvTerm::from(cr.clone()),
            IvTerm::from(age.clone()),
            IvTerm::from(gender.clone()),
            IvTerm::from(time.clone()),
        ],
        [],
    )
    .unwrap();

    let cm = ConceptualModel::new(
        [es.cause(&pos_aff), cr.cause(&pos_aff)],
        [
            age.associate(&pos_aff),
            gender.associate(&pos_aff),
            time.associate(&pos_aff),
        ],
    );

    assert!(verify(&design, &cm));
}

#[test]
fn test_verify_true_for_treated_design() {
    let correct = Variable::nominal_with_cardinality("correct", 2);
    let expl = Variable::nominal("expl type");
    let participant = Variable::unit("participant");

    let design = Design::new(
        correct.clone(),
        [IvTerm::from(expl.treat(&participant, 1))],
        [Grouping::from(participant.repeat(&correct, 50))],
    )
    .unwrap();

    let cm = ConceptualModel::new([expl.cause(&correct)], []);
    assert!(verify(&design, &cm));
}

#[test]
fn test_verify_false_when_an_iv_is_unbacked() {
    let acc = Variable::numeric("accuracy");
    let chronotype = Variable::nominal("group chronotype");
    let composition = Variable::nominal("group composition");
    let group = Variable::unit("group");

    let design = Design::new(
        acc.clone(),
        [
            IvTerm::from(chronotype.treat(&group, 1)),
            IvTerm::from(composition.treat(&group, 1)),
        ],
        [],
    )
    .unwrap();

    // Only chronotype is backed by an asserted belief.
    let cm = ConceptualModel::new([chronotype.cause(&acc)], []);
    assert!(!verify(&design, &cm));
}

// Soundness: whenever verify returns true, every iv->dv pair has a matching
// belief edge in the conceptual model's graph.
#[test]
fn test_verify_soundness() {
    let acc = Variable::numeric("accuracy");
    let a = Variable::nominal("a");
    let b = Variable::nominal("b");

    let design = Design::new(
        acc.clone(),
        [IvTerm::from(a.clone()), IvTerm::from(b.clone())],
        [],
    )
    .unwrap();
    let cm = ConceptualModel::new([a.cause(&acc)], [b.associate(&acc)]);

    if verify(&design, &cm) {
        for iv in design.ivs() {
            assert!(
                cm.graph().has_edge(&iv, design.dv(), EdgeKind::Cause)
                    || cm.graph().has_edge(&iv, design.dv(), EdgeKind::Associate)
            );
        }
    }
}
