//! Strategy-specific literal-value properties that don't generalize
//! across representations: elastic chunking and superposition depth,
//! sparse-polynomial containment, and EXACT's ⊥/⊤ absorption,
//! unbind-mode relationship, and session isolation.

use hdc_algebra::{
    exact_session, ExactConfig, MetricAffineElasticStrategy, SparsePolyStrategy, Strategy, UnbindMode,
    Vector,
};

fn elastic_chunk_count(v: &Vector) -> usize {
    match v {
        Vector::MetricAffineElastic(e) => match e {
            hdc_algebra::ElasticVector::Bundle { chunks, .. } => chunks.len(),
            hdc_algebra::ElasticVector::Atomic { .. } => 1,
        },
        other => panic!("expected elastic vector, got {}", other.strategy_id()),
    }
}

/// Bundling exactly `chunk_capacity` atomics should fit in one chunk;
/// one more should spill into a second.
#[test]
fn elastic_bundle_chunks_at_capacity_boundary() {
    let s = MetricAffineElasticStrategy {
        chunk_capacity: 4,
    };
    let atomics: Vec<Vector> = (0..4).map(|i| s.create_random(64, Some(i)).unwrap()).collect();
    let exactly_full = s.bundle(&atomics, None).unwrap();
    assert_eq!(elastic_chunk_count(&exactly_full), 1);

    let mut one_more = atomics.clone();
    one_more.push(s.create_random(64, Some(999)).unwrap());
    let spills_over = s.bundle(&one_more, None).unwrap();
    assert_eq!(elastic_chunk_count(&spills_over), 2);
}

/// Bundling two already-bundled groups concatenates their chunk lists
/// rather than re-averaging across the boundary, preserving each group's
/// internal superposition depth.
#[test]
fn elastic_bundle_of_bundles_concatenates_chunks() {
    let s = MetricAffineElasticStrategy::default();
    let first: Vec<Vector> = (0..5).map(|i| s.create_random(32, Some(i)).unwrap()).collect();
    let second: Vec<Vector> = (100..103).map(|i| s.create_random(32, Some(i)).unwrap()).collect();
    let bundle_a = s.bundle(&first, None).unwrap();
    let bundle_b = s.bundle(&second, None).unwrap();

    let combined = s.bundle(&[bundle_a.clone(), bundle_b.clone()], None).unwrap();
    assert_eq!(
        elastic_chunk_count(&combined),
        elastic_chunk_count(&bundle_a) + elastic_chunk_count(&bundle_b)
    );
}

/// Binding a bundle to a key preserves the bundle's chunk count: each
/// chunk is bound independently rather than collapsed.
#[test]
fn elastic_bind_preserves_superposition_depth() {
    let s = MetricAffineElasticStrategy {
        chunk_capacity: 4,
    };
    let atomics: Vec<Vector> = (0..10).map(|i| s.create_random(64, Some(i)).unwrap()).collect();
    let bundled = s.bundle(&atomics, None).unwrap();
    let chunk_count_before = elastic_chunk_count(&bundled);

    let key = s.create_random(64, Some(42)).unwrap();
    let bound = s.bind(&bundled, &key).unwrap();
    assert_eq!(elastic_chunk_count(&bound), chunk_count_before);
}

/// SP containment: a subset polynomial should score a containment near
/// 1.0 against the polynomial that contains it.
#[test]
fn sparse_poly_containment_under_engineered_subset() {
    let s = SparsePolyStrategy::default();
    let whole = s.create_from_name("whole", 64, "t").unwrap();
    let part = match &whole {
        Vector::SparsePoly(v) => Vector::SparsePoly(hdc_algebra::SparsePolyVector {
            k: v.k,
            exponents: v.exponents.iter().take(v.exponents.len() / 2).cloned().collect(),
        }),
        _ => panic!("expected sparse-poly vector"),
    };
    let score = s.containment(&part, &whole).unwrap();
    assert!(score > 0.9, "containment {score} should be near 1.0");
}

/// EXACT ⊥ (BOTTOM_IMPOSSIBLE) absorbs any polynomial under bind,
/// regardless of which side it appears on.
#[test]
fn exact_bottom_absorbs_from_either_side() {
    let session = exact_session(ExactConfig::default());
    let a = session.create_from_name("a", 1000, "t").unwrap();
    let bottom = session.create_from_name("BOTTOM_IMPOSSIBLE", 1000, "t").unwrap();

    let left = session.bind(&bottom, &a).unwrap();
    let right = session.bind(&a, &bottom).unwrap();
    assert!(session.equals(&left, &bottom));
    assert!(session.equals(&right, &bottom));
}

/// EXACT ⊤ (TOP_INEFFABLE) is the bind identity unless ⊥ is present, and
/// a polynomial's monomial-bit-count ceiling collapses it to ⊤.
#[test]
fn exact_top_is_bind_identity() {
    let session = exact_session(ExactConfig::default());
    let a = session.create_from_name("a", 1000, "t").unwrap();
    let top = session.create_from_name("TOP_INEFFABLE", 1000, "t").unwrap();

    let bound = session.bind(&a, &top).unwrap();
    assert!(session.equals(&bound, &a));
}

/// Mode A (existential quotient) and mode B (right residual) coincide
/// when unbinding a single atom out of a two-atom composite.
#[test]
fn exact_unbind_modes_coincide_for_single_atom() {
    let session_a = exact_session(ExactConfig {
        unbind_mode: UnbindMode::A,
        ..ExactConfig::default()
    });
    let a = session_a.create_from_name("a", 1000, "t").unwrap();
    let b = session_a.create_from_name("b", 1000, "t").unwrap();
    let composite = session_a.bind(&a, &b).unwrap();

    let session_b = exact_session(ExactConfig {
        unbind_mode: UnbindMode::B,
        ..ExactConfig::default()
    });
    let a2 = session_b.create_from_name("a", 1000, "t").unwrap();
    let b2 = session_b.create_from_name("b", 1000, "t").unwrap();
    let composite2 = session_b.bind(&a2, &b2).unwrap();

    let recovered_a = session_a.unbind(&composite, &b).unwrap();
    let recovered_b = session_b.unbind(&composite2, &b2).unwrap();
    assert!(session_a.equals(&recovered_a, &a));
    assert!(session_b.equals(&recovered_b, &a2));
}

/// Two independently constructed EXACT sessions never share atom
/// dictionaries: the same name in each session is not required to map to
/// the same monomial index.
#[test]
fn exact_sessions_do_not_share_dictionaries() {
    let session_one = exact_session(ExactConfig::default());
    let session_two = exact_session(ExactConfig::default());

    let _ = session_one.create_from_name("shared-name", 1000, "t").unwrap();
    let _ = session_two.create_from_name("other-name", 1000, "t").unwrap();

    let one_again = session_one.create_from_name("shared-name", 1000, "t").unwrap();
    let one_first = session_one.create_from_name("shared-name", 1000, "t").unwrap();
    assert!(session_one.equals(&one_again, &one_first));
}

/// The process-global EXACT facade refuses every algebra call; only a
/// session constructed via `exact_session` can actually compute.
#[test]
fn exact_facade_refuses_every_algebra_operation() {
    use hdc_algebra::ExactStrategy;

    let facade = ExactStrategy::facade();
    assert!(facade.create_zero(1000).is_err());
    assert!(facade.create_random(1000, Some(1)).is_err());
    assert!(facade.create_from_name("x", 1000, "t").is_err());
}
