//! Sparse-polynomial strategy, "SP": each vector is a set of up to `k`
//! 64-bit exponents; bind is Cartesian XOR followed by Min-Hash
//! sparsification; similarity is Jaccard.

use crate::error::{HdcError, Result};
use crate::hash::{djb2, splitmix64_mix, SplitMix64};
use crate::strategy::{
    check_same_strategy, HolographicThresholds, ReasoningThresholds, Strategy, StrategyMeta,
    Vector, VectorBlob,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

const STRATEGY_ID: &str = "sparse-polynomial";
const DEFAULT_K: u32 = 4;
const DEFAULT_CARTESIAN_CAP: usize = 50_000;

/// A set of up to `k` unique, sorted 64-bit exponents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparsePolyVector {
    pub k: u32,
    pub exponents: Vec<u64>,
}

/// Stateless beyond the construction-time Cartesian-product ceiling, a
/// hard pair-count cap that bounds worst-case bind cost deterministically.
/// The ceiling is a fixed resource bound, not per-session state, so
/// instances may still be shared process-wide.
#[derive(Clone, Copy, Debug)]
pub struct SparsePolyStrategy {
    pub cartesian_cap: usize,
}

impl Default for SparsePolyStrategy {
    fn default() -> Self {
        SparsePolyStrategy {
            cartesian_cap: DEFAULT_CARTESIAN_CAP,
        }
    }
}

fn as_sparse_poly<'a>(v: &'a Vector) -> Result<&'a SparsePolyVector> {
    match v {
        Vector::SparsePoly(s) => Ok(s),
        other => Err(HdcError::StrategyMismatch {
            expected: STRATEGY_ID,
            found: other.strategy_id().to_string(),
        }),
    }
}

fn validate_geometry(geometry: u64) -> Result<u32> {
    if geometry == 0 || geometry > u32::MAX as u64 {
        return Err(HdcError::InvalidGeometry {
            strategy_id: STRATEGY_ID,
            geometry,
            reason: "exponent budget k must be positive",
        });
    }
    Ok(geometry as u32)
}

/// Min-Hash sparsification: mix each candidate via a SplitMix64-style
/// mixer, keep the `target` exponents with the smallest hashes, ties
/// broken by value. Deterministic given the input set.
pub fn sparsify_to(input: &[u64], target: usize) -> Vec<u64> {
    let mut uniq = input.to_vec();
    uniq.sort_unstable();
    uniq.dedup();
    if uniq.len() <= target {
        return uniq;
    }
    let mut scored: Vec<(u64, u64)> = uniq.iter().map(|&v| (splitmix64_mix(v), v)).collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
    scored.truncate(target);
    let mut result: Vec<u64> = scored.into_iter().map(|(_, v)| v).collect();
    result.sort_unstable();
    result
}

/// Cartesian XOR of two exponent sets, capped at `cap` pairs in
/// iteration order: a deterministic cap, not an error.
fn cartesian_xor_capped(a: &[u64], b: &[u64], cap: usize) -> Vec<u64> {
    let mut out = Vec::with_capacity(cap.min(a.len().saturating_mul(b.len())));
    'outer: for &x in a {
        for &y in b {
            if out.len() >= cap {
                break 'outer;
            }
            out.push(x ^ y);
        }
    }
    out
}

fn jaccard(a: &[u64], b: &[u64]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let (mut i, mut j) = (0usize, 0usize);
    let mut intersection = 0u64;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                intersection += 1;
                i += 1;
                j += 1;
            }
        }
    }
    let union = a.len() as u64 + b.len() as u64 - intersection;
    if union == 0 {
        1.0
    } else {
        intersection as f64 / union as f64
    }
}

fn union_sorted(a: &[u64], b: &[u64]) -> Vec<u64> {
    let mut out: Vec<u64> = a.iter().chain(b.iter()).copied().collect();
    out.sort_unstable();
    out.dedup();
    out
}

impl SparsePolyStrategy {
    /// Full (unsparsified) Cartesian XOR, still subject to the pair-count
    /// ceiling, for intermediate computations that must not lose
    /// information to Min-Hash.
    pub fn bind_full(&self, a: &Vector, b: &Vector) -> Result<Vector> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        let sa = as_sparse_poly(a)?;
        let sb = as_sparse_poly(b)?;
        let mut raw = cartesian_xor_capped(&sa.exponents, &sb.exponents, self.cartesian_cap);
        raw.sort_unstable();
        raw.dedup();
        Ok(Vector::SparsePoly(SparsePolyVector {
            k: sa.k,
            exponents: raw,
        }))
    }

    /// Lower any SP vector's cardinality to `target` via Min-Hash,
    /// regardless of its current `k`.
    pub fn sparsify_to(&self, v: &Vector, target: usize) -> Result<Vector> {
        let s = as_sparse_poly(v)?;
        Ok(Vector::SparsePoly(SparsePolyVector {
            k: s.k,
            exponents: sparsify_to(&s.exponents, target),
        }))
    }

    /// Containment: fraction of `a` covered by `b`, `|A∩B|/|A|`. Used by
    /// clients to score a candidate answer against a noisy unbind
    /// residue; not part of the universal strategy contract.
    pub fn containment(&self, a: &Vector, b: &Vector) -> Result<f64> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        let sa = as_sparse_poly(a)?;
        let sb = as_sparse_poly(b)?;
        if sa.exponents.is_empty() {
            return Ok(0.0);
        }
        let (mut i, mut j) = (0usize, 0usize);
        let mut intersection = 0u64;
        while i < sa.exponents.len() && j < sb.exponents.len() {
            match sa.exponents[i].cmp(&sb.exponents[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    intersection += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        Ok(intersection as f64 / sa.exponents.len() as f64)
    }
}

impl Strategy for SparsePolyStrategy {
    fn meta(&self) -> &StrategyMeta {
        const META: StrategyMeta = StrategyMeta {
            id: STRATEGY_ID,
            display_name: "Sparse Polynomial",
            default_geometry: DEFAULT_K as u64,
            recommended_bundle_capacity: 16,
            max_bundle_capacity: 1024,
            bind_complexity: "O(|A|*|B|) capped, plus O(n log n) Min-Hash sparsification",
            sparse_optimized: true,
            description: "Sets of 64-bit exponents with Cartesian-XOR bind and Min-Hash sparsification.",
            // 1/(2k-1) for the default k=4.
            orthogonal_baseline: 1.0 / 7.0,
            reasoning_thresholds: ReasoningThresholds {
                strong_match: 0.5,
                plausible_match: 0.25,
                reject_below: 0.15,
            },
            holographic_thresholds: HolographicThresholds {
                superposition_floor: 0.2,
                noise_ceiling: 1.0 / 7.0,
            },
        };
        &META
    }

    fn bytes_per_vector(&self, geometry: u64) -> u64 {
        geometry * 8
    }

    fn create_zero(&self, geometry: u64) -> Result<Vector> {
        let k = validate_geometry(geometry)?;
        Ok(Vector::SparsePoly(SparsePolyVector {
            k,
            exponents: Vec::new(),
        }))
    }

    fn create_random(&self, geometry: u64, seed: Option<u64>) -> Result<Vector> {
        let k = validate_geometry(geometry)?;
        let mut rng = match seed {
            Some(s) => SplitMix64::new(s),
            None => SplitMix64::from_entropy(),
        };
        let mut set = std::collections::BTreeSet::new();
        while set.len() < k as usize {
            set.insert(rng.next_u64());
        }
        Ok(Vector::SparsePoly(SparsePolyVector {
            k,
            exponents: set.into_iter().collect(),
        }))
    }

    /// Seeded by `djb2(name)` alone: unlike the other strategies'
    /// `createFromName`, SP's seed derivation does not fold in
    /// `theoryId`.
    fn create_from_name(&self, name: &str, geometry: u64, _theory_id: &str) -> Result<Vector> {
        let k = validate_geometry(geometry)?;
        let seed = djb2(name);
        let mut rng = SplitMix64::new(seed);
        let mut set = std::collections::BTreeSet::new();
        while set.len() < k as usize {
            set.insert(rng.next_u64());
        }
        Ok(Vector::SparsePoly(SparsePolyVector {
            k,
            exponents: set.into_iter().collect(),
        }))
    }

    fn bind(&self, a: &Vector, b: &Vector) -> Result<Vector> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        let sa = as_sparse_poly(a)?;
        let sb = as_sparse_poly(b)?;
        let raw = cartesian_xor_capped(&sa.exponents, &sb.exponents, self.cartesian_cap);
        Ok(Vector::SparsePoly(SparsePolyVector {
            k: sa.k,
            exponents: sparsify_to(&raw, sa.k as usize),
        }))
    }

    fn bundle(&self, vectors: &[Vector], _tie_breaker: Option<&Vector>) -> Result<Vector> {
        if vectors.is_empty() {
            return Err(HdcError::EmptyInput { operation: "bundle" });
        }
        let all: Vec<&SparsePolyVector> =
            vectors.iter().map(as_sparse_poly).collect::<Result<_>>()?;
        let k = all[0].k;
        let mut union = Vec::new();
        for v in &all {
            union = union_sorted(&union, &v.exponents);
        }
        Ok(Vector::SparsePoly(SparsePolyVector {
            k,
            exponents: sparsify_to(&union, k as usize),
        }))
    }

    fn unbind(&self, composite: &Vector, component: &Vector) -> Result<Vector> {
        // XOR is self-inverse; unbind is the same Cartesian-XOR-then-sparsify.
        self.bind(composite, component)
    }

    fn similarity(&self, a: &Vector, b: &Vector) -> Result<f64> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        let sa = as_sparse_poly(a)?;
        let sb = as_sparse_poly(b)?;
        Ok(jaccard(&sa.exponents, &sb.exponents))
    }

    fn equals(&self, a: &Vector, b: &Vector) -> bool {
        matches!((a, b), (Vector::SparsePoly(x), Vector::SparsePoly(y)) if x == y)
    }

    fn serialize(&self, v: &Vector) -> Result<VectorBlob> {
        let s = as_sparse_poly(v)?;
        let exps: Vec<String> = s.exponents.iter().map(|e| e.to_string()).collect();
        Ok(VectorBlob {
            strategy_id: STRATEGY_ID.to_string(),
            version: 1,
            geometry: s.k as u64,
            data: json!({ "exponents": exps, "maxSize": s.k }),
        })
    }

    fn deserialize(&self, payload: &VectorBlob) -> Result<Vector> {
        if payload.strategy_id != STRATEGY_ID {
            return Err(HdcError::StrategyMismatch {
                expected: STRATEGY_ID,
                found: payload.strategy_id.clone(),
            });
        }
        let k = validate_geometry(payload.geometry)?;
        let obj = payload
            .data
            .as_object()
            .ok_or_else(|| HdcError::MalformedPayload {
                strategy_id: STRATEGY_ID,
                reason: "expected object payload".to_string(),
            })?;
        let exps: Vec<String> = obj
            .get("exponents")
            .cloned()
            .ok_or_else(|| HdcError::MalformedPayload {
                strategy_id: STRATEGY_ID,
                reason: "missing exponents".to_string(),
            })
            .and_then(|v| {
                serde_json::from_value(v).map_err(|e| HdcError::MalformedPayload {
                    strategy_id: STRATEGY_ID,
                    reason: e.to_string(),
                })
            })?;
        let mut exponents = Vec::with_capacity(exps.len());
        for e in exps {
            let parsed: u64 = e.parse().map_err(|_| HdcError::MalformedPayload {
                strategy_id: STRATEGY_ID,
                reason: format!("non-numeric exponent `{e}`"),
            })?;
            exponents.push(parsed);
        }
        exponents.sort_unstable();
        exponents.dedup();
        Ok(Vector::SparsePoly(SparsePolyVector { k, exponents }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism_from_name() {
        let s = SparsePolyStrategy::default();
        let a = s.create_from_name("role", 4, "default").unwrap();
        let b = s.create_from_name("role", 4, "default").unwrap();
        assert!(s.equals(&a, &b));
    }

    #[test]
    fn self_inverse_under_double_bind() {
        let s = SparsePolyStrategy::default();
        let a = s.create_from_name("role", 4, "default").unwrap();
        let b = s.create_from_name("filler", 4, "default").unwrap();
        let c = s.bind(&a, &b).unwrap();
        let recovered = s.bind(&c, &b).unwrap();
        assert_eq!(s.similarity(&recovered, &a).unwrap(), 1.0);
    }

    #[test]
    fn bundle_then_union_and_cap() {
        let s = SparsePolyStrategy::default();
        let a = s.create_from_name("a", 4, "t").unwrap();
        let b = s.create_from_name("b", 4, "t").unwrap();
        let bundled = s.bundle(&[a, b], None).unwrap();
        if let Vector::SparsePoly(v) = bundled {
            assert!(v.exponents.len() <= 4);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn empty_vs_empty_similarity_is_one() {
        let s = SparsePolyStrategy::default();
        let a = s.create_zero(4).unwrap();
        let b = s.create_zero(4).unwrap();
        assert_eq!(s.similarity(&a, &b).unwrap(), 1.0);
    }

    #[test]
    fn containment_under_k4_engineered_subset() {
        let s = SparsePolyStrategy::default();
        let a = Vector::SparsePoly(SparsePolyVector {
            k: 4,
            exponents: vec![1, 2, 3, 4],
        });
        let b = Vector::SparsePoly(SparsePolyVector {
            k: 4,
            exponents: vec![1, 2, 3, 4, 5, 6],
        });
        let containment = s.containment(&a, &b).unwrap();
        assert!(containment >= 1.0 - 1e-9);
    }

    #[test]
    fn random_pair_near_baseline() {
        let s = SparsePolyStrategy::default();
        let a = s.create_random(4, Some(1)).unwrap();
        let b = s.create_random(4, Some(2)).unwrap();
        let sim = s.similarity(&a, &b).unwrap();
        assert!(sim < 0.3, "sim={sim}");
    }

    #[test]
    fn round_trip_serialization() {
        let s = SparsePolyStrategy::default();
        let v = s.create_from_name("x", 4, "t").unwrap();
        let blob = s.serialize(&v).unwrap();
        let back = s.deserialize(&blob).unwrap();
        assert!(s.equals(&v, &back));
    }
}
