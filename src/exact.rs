//! Exact strategy, "EXACT": polynomials of distinct arbitrary-width
//! BigInt monomials over a per-session atom dictionary, with OR-product
//! bind, two unbind modes, and ceiling-driven normalization toward the
//! reserved `⊥`/`⊤` atoms.

use crate::error::{HdcError, Result};
use crate::hash::SplitMix64;
use crate::strategy::{
    check_same_strategy, HolographicThresholds, ReasoningThresholds, Strategy, StrategyMeta,
    Vector, VectorBlob,
};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

const STRATEGY_ID: &str = "exact";
const BOTTOM_NAME: &str = "BOTTOM_IMPOSSIBLE";
const TOP_NAME: &str = "TOP_INEFFABLE";
const BOTTOM_INDEX: usize = 0;
const TOP_INDEX: usize = 1;

const DEFAULT_MONOM_BIT_LIMIT: u64 = 1000;
const DEFAULT_POLY_TERM_LIMIT: usize = 200_000;

/// A sorted, deduplicated list of distinct monomials. `geometry` is the
/// bit-index budget in effect when this vector was produced; purely
/// informational, since normalization is governed by the owning
/// session's live config, not by a value baked into the vector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExactVector {
    pub geometry: u64,
    #[serde(with = "monomial_vec")]
    pub monomials: Vec<BigUint>,
}

impl PartialEq for ExactVector {
    fn eq(&self, other: &Self) -> bool {
        self.monomials == other.monomials
    }
}

mod monomial_vec {
    use num_bigint::BigUint;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &[BigUint], s: S) -> Result<S::Ok, S::Error> {
        let strings: Vec<String> = v.iter().map(|m| m.to_str_radix(10)).collect();
        strings.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<BigUint>, D::Error> {
        let strings = Vec::<String>::deserialize(d)?;
        strings
            .into_iter()
            .map(|s| {
                BigUint::parse_bytes(s.as_bytes(), 10)
                    .ok_or_else(|| serde::de::Error::custom(format!("not a decimal BigInt: {s}")))
            })
            .collect()
    }
}

/// Selects which of the two unbind semantics a session uses. Configured
/// once at session construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnbindMode {
    /// Existential quotient: `{ t AND NOT q : t ∈ composite, q ∈ component, q ⊆ t }`.
    #[default]
    A,
    /// Right residual: per-`q` mode-A residue, intersected across `q ∈ component`.
    B,
}

/// Per-session tunables governing polynomial normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExactConfig {
    pub monom_bit_limit: u64,
    pub poly_term_limit: usize,
    pub unbind_mode: UnbindMode,
}

impl Default for ExactConfig {
    fn default() -> Self {
        ExactConfig {
            monom_bit_limit: DEFAULT_MONOM_BIT_LIMIT,
            poly_term_limit: DEFAULT_POLY_TERM_LIMIT,
            unbind_mode: UnbindMode::A,
        }
    }
}

/// Name to appearance-index dictionary, preloaded with the two reserved
/// atoms.
#[derive(Clone, Debug, Default)]
struct AtomDictionary {
    names: Vec<String>,
    index_of: HashMap<String, usize>,
}

impl AtomDictionary {
    fn new() -> Self {
        let mut d = AtomDictionary::default();
        d.get_or_insert(BOTTOM_NAME);
        d.get_or_insert(TOP_NAME);
        d
    }

    fn get_or_insert(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index_of.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.index_of.insert(name.to_string(), idx);
        idx
    }

    fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }
}

struct ExactSession {
    dictionary: AtomDictionary,
    config: ExactConfig,
}

/// The EXACT strategy. `facade()` builds the process-global,
/// session-less instance that the registry hands out by default and
/// that refuses every algebra call; `new_session` builds a real,
/// per-instance dictionary isolated from every other session.
pub struct ExactStrategy {
    session: Option<Mutex<ExactSession>>,
}

impl Default for ExactStrategy {
    fn default() -> Self {
        ExactStrategy::facade()
    }
}

impl ExactStrategy {
    pub fn facade() -> Self {
        ExactStrategy { session: None }
    }

    pub fn new_session(config: ExactConfig) -> Self {
        ExactStrategy {
            session: Some(Mutex::new(ExactSession {
                dictionary: AtomDictionary::new(),
                config,
            })),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, ExactSession>> {
        self.session
            .as_ref()
            .ok_or(HdcError::SessionRequired)
            .map(|m| m.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    /// Extract the surviving atomic names behind an unbind residue.
    pub fn decode_unbound_candidates(
        &self,
        polynomial: &Vector,
        known: &[String],
        domain: Option<&[String]>,
        max_candidates: usize,
    ) -> Result<Vec<(String, f64)>> {
        let session = self.session()?;
        let ev = as_exact(polynomial)?;
        let known_set: std::collections::HashSet<&str> = known.iter().map(String::as_str).collect();
        let domain_set: Option<std::collections::HashSet<&str>> =
            domain.map(|d| d.iter().map(String::as_str).collect());

        let mut witnesses: HashMap<String, u64> = HashMap::new();
        for monomial in &ev.monomials {
            for idx in 0..session.dictionary.names.len() {
                if idx == BOTTOM_INDEX || idx == TOP_INDEX {
                    continue;
                }
                if !monomial.bit(idx as u64) {
                    continue;
                }
                let Some(name) = session.dictionary.name_of(idx) else {
                    continue;
                };
                if known_set.contains(name) {
                    continue;
                }
                if let Some(domain_set) = &domain_set {
                    if !domain_set.contains(name) {
                        continue;
                    }
                }
                *witnesses.entry(name.to_string()).or_insert(0) += 1;
            }
        }

        let total: u64 = witnesses.values().sum();
        let mut ranked: Vec<(String, f64, u64)> = witnesses
            .into_iter()
            .map(|(name, count)| {
                let score = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                };
                (name, score, count)
            })
            .collect();
        ranked.sort_by(|(name_a, score_a, count_a), (name_b, score_b, count_b)| {
            count_b
                .cmp(count_a)
                .then_with(|| score_b.partial_cmp(score_a).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| name_a.cmp(name_b))
        });
        ranked.truncate(max_candidates);
        Ok(ranked.into_iter().map(|(name, score, _)| (name, score)).collect())
    }
}

fn as_exact(v: &Vector) -> Result<&ExactVector> {
    match v {
        Vector::Exact(e) => Ok(e),
        other => Err(HdcError::StrategyMismatch {
            expected: STRATEGY_ID,
            found: other.strategy_id().to_string(),
        }),
    }
}

fn monomial_for_index(index: usize) -> BigUint {
    BigUint::from(1u32) << index
}

fn popcount(n: &BigUint) -> u64 {
    n.to_u32_digits().iter().map(|d| d.count_ones() as u64).sum()
}

fn normalize_monomial(m: &BigUint, limit_bits: u64) -> BigUint {
    if m.bit(BOTTOM_INDEX as u64) {
        return monomial_for_index(BOTTOM_INDEX);
    }
    if m.bit(TOP_INDEX as u64) {
        return monomial_for_index(TOP_INDEX);
    }
    if popcount(m) > limit_bits {
        return monomial_for_index(TOP_INDEX);
    }
    m.clone()
}

/// Monomial-level mapping, dedup, then the polynomial-level term-count
/// ceiling: `⊥` absorbs first, then `⊤`.
fn normalize_polynomial(monomials: Vec<BigUint>, limit_bits: u64, limit_terms: usize) -> Vec<BigUint> {
    let mut mapped: Vec<BigUint> = monomials.iter().map(|m| normalize_monomial(m, limit_bits)).collect();
    mapped.sort();
    mapped.dedup();
    if mapped.len() > limit_terms {
        return vec![monomial_for_index(TOP_INDEX)];
    }
    mapped
}

fn bind_raw(a: &[BigUint], b: &[BigUint]) -> Vec<BigUint> {
    let mut out = Vec::with_capacity(a.len() * b.len());
    for x in a {
        for y in b {
            out.push(x | y);
        }
    }
    out
}

fn unbind_mode_a(composite: &[BigUint], component: &[BigUint]) -> Vec<BigUint> {
    let mut out = Vec::new();
    for t in composite {
        for q in component {
            let overlap = t & q;
            if &overlap == q {
                out.push(t ^ &overlap);
            }
        }
    }
    out
}

fn unbind_mode_b(composite: &[BigUint], component: &[BigUint]) -> Vec<BigUint> {
    if component.is_empty() {
        return Vec::new();
    }
    let mut sets: Vec<BTreeSet<BigUint>> = Vec::with_capacity(component.len());
    for q in component {
        let residue = unbind_mode_a(composite, std::slice::from_ref(q));
        sets.push(residue.into_iter().collect());
    }
    let mut iter = sets.into_iter();
    let mut acc = iter.next().unwrap_or_default();
    for s in iter {
        acc = acc.intersection(&s).cloned().collect();
        if acc.is_empty() {
            break;
        }
    }
    acc.into_iter().collect()
}

fn monomial_jaccard(a: &BigUint, b: &BigUint) -> f64 {
    let or_pop = popcount(&(a | b));
    if or_pop == 0 {
        return 1.0;
    }
    let and_pop = popcount(&(a & b));
    and_pop as f64 / or_pop as f64
}

fn polynomial_similarity(a: &[BigUint], b: &[BigUint]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let len = a.len().max(b.len());
    let zero = BigUint::from(0u32);
    let mut total = 0.0;
    for i in 0..len {
        let ma = a.get(i).unwrap_or(&zero);
        let mb = b.get(i).unwrap_or(&zero);
        total += monomial_jaccard(ma, mb);
    }
    total / len as f64
}

impl Strategy for ExactStrategy {
    fn meta(&self) -> &StrategyMeta {
        const META: StrategyMeta = StrategyMeta {
            id: STRATEGY_ID,
            display_name: "Exact (BigInt monomials)",
            default_geometry: DEFAULT_MONOM_BIT_LIMIT,
            recommended_bundle_capacity: 64,
            max_bundle_capacity: DEFAULT_POLY_TERM_LIMIT,
            bind_complexity: "O(|P|*|Q|) monomial products plus normalization",
            sparse_optimized: true,
            description: "Sorted BigInt monomial polynomials with OR-product bind and two unbind modes.",
            // EXACT has no prescribed random-pair baseline in the source
            // spec (createRandom's distribution isn't canonical); 0.0 is
            // a placeholder, not a calibrated expectation.
            orthogonal_baseline: 0.0,
            reasoning_thresholds: ReasoningThresholds {
                strong_match: 0.9,
                plausible_match: 0.5,
                reject_below: 0.1,
            },
            holographic_thresholds: HolographicThresholds {
                superposition_floor: 0.5,
                noise_ceiling: 0.1,
            },
        };
        &META
    }

    fn bytes_per_vector(&self, geometry: u64) -> u64 {
        // Approximate: a single monomial at the bit-index budget. Actual
        // size depends on runtime term count and monomial width.
        geometry.div_ceil(8)
    }

    fn create_zero(&self, geometry: u64) -> Result<Vector> {
        self.session()?;
        Ok(Vector::Exact(ExactVector {
            geometry,
            monomials: Vec::new(),
        }))
    }

    fn create_random(&self, geometry: u64, seed: Option<u64>) -> Result<Vector> {
        let session = self.session()?;
        let usable = session.dictionary.names.len().saturating_sub(2);
        if usable == 0 {
            return Ok(Vector::Exact(ExactVector {
                geometry,
                monomials: Vec::new(),
            }));
        }
        let mut rng = match seed {
            Some(s) => SplitMix64::new(s),
            None => SplitMix64::from_entropy(),
        };
        let pick_count = 1 + (rng.next_u32() as usize % usable.min(5));
        let mut chosen = BTreeSet::new();
        while chosen.len() < pick_count {
            let idx = 2 + (rng.next_u32() as usize % usable);
            chosen.insert(idx);
        }
        let mut monomial = BigUint::from(0u32);
        for idx in chosen {
            monomial = &monomial | &monomial_for_index(idx);
        }
        let monomials = normalize_polynomial(vec![monomial], session.config.monom_bit_limit, session.config.poly_term_limit);
        Ok(Vector::Exact(ExactVector { geometry, monomials }))
    }

    fn create_from_name(&self, name: &str, geometry: u64, _theory_id: &str) -> Result<Vector> {
        // The dictionary key is `name` alone; EXACT has no theory-scoping
        // concept (unlike dense-binary/metric-affine).
        let mut session = self.session()?;
        let idx = session.dictionary.get_or_insert(name);
        Ok(Vector::Exact(ExactVector {
            geometry,
            monomials: vec![monomial_for_index(idx)],
        }))
    }

    fn bind(&self, a: &Vector, b: &Vector) -> Result<Vector> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        let session = self.session()?;
        let ea = as_exact(a)?;
        let eb = as_exact(b)?;
        let raw = bind_raw(&ea.monomials, &eb.monomials);
        let monomials = normalize_polynomial(raw, session.config.monom_bit_limit, session.config.poly_term_limit);
        Ok(Vector::Exact(ExactVector {
            geometry: ea.geometry,
            monomials,
        }))
    }

    fn bundle(&self, vectors: &[Vector], _tie_breaker: Option<&Vector>) -> Result<Vector> {
        if vectors.is_empty() {
            return Err(HdcError::EmptyInput { operation: "bundle" });
        }
        let session = self.session()?;
        let all: Vec<&ExactVector> = vectors.iter().map(as_exact).collect::<Result<_>>()?;
        let mut union: BTreeSet<BigUint> = BTreeSet::new();
        for v in &all {
            for m in &v.monomials {
                union.insert(m.clone());
            }
        }
        let monomials = normalize_polynomial(
            union.into_iter().collect(),
            session.config.monom_bit_limit,
            session.config.poly_term_limit,
        );
        Ok(Vector::Exact(ExactVector {
            geometry: all[0].geometry,
            monomials,
        }))
    }

    fn unbind(&self, composite: &Vector, component: &Vector) -> Result<Vector> {
        check_same_strategy(STRATEGY_ID, composite, component)?;
        let session = self.session()?;
        let ec = as_exact(composite)?;
        let eq = as_exact(component)?;
        let raw = match session.config.unbind_mode {
            UnbindMode::A => unbind_mode_a(&ec.monomials, &eq.monomials),
            UnbindMode::B => unbind_mode_b(&ec.monomials, &eq.monomials),
        };
        let monomials = normalize_polynomial(raw, session.config.monom_bit_limit, session.config.poly_term_limit);
        Ok(Vector::Exact(ExactVector {
            geometry: ec.geometry,
            monomials,
        }))
    }

    fn similarity(&self, a: &Vector, b: &Vector) -> Result<f64> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        self.session()?;
        let ea = as_exact(a)?;
        let eb = as_exact(b)?;
        Ok(polynomial_similarity(&ea.monomials, &eb.monomials))
    }

    fn equals(&self, a: &Vector, b: &Vector) -> bool {
        matches!((a, b), (Vector::Exact(x), Vector::Exact(y)) if x == y)
    }

    fn serialize(&self, v: &Vector) -> Result<VectorBlob> {
        let e = as_exact(v)?;
        let strings: Vec<String> = e.monomials.iter().map(|m| m.to_str_radix(10)).collect();
        Ok(VectorBlob {
            strategy_id: STRATEGY_ID.to_string(),
            version: 1,
            geometry: e.geometry,
            data: json!(strings),
        })
    }

    fn deserialize(&self, payload: &VectorBlob) -> Result<Vector> {
        if payload.strategy_id != STRATEGY_ID {
            return Err(HdcError::StrategyMismatch {
                expected: STRATEGY_ID,
                found: payload.strategy_id.clone(),
            });
        }
        let strings: Vec<String> =
            serde_json::from_value(payload.data.clone()).map_err(|e| HdcError::MalformedPayload {
                strategy_id: STRATEGY_ID,
                reason: e.to_string(),
            })?;
        let mut monomials = Vec::with_capacity(strings.len());
        for s in strings {
            let m = BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| HdcError::MalformedPayload {
                strategy_id: STRATEGY_ID,
                reason: format!("not a decimal BigInt: {s}"),
            })?;
            monomials.push(m);
        }
        monomials.sort();
        monomials.dedup();
        Ok(Vector::Exact(ExactVector {
            geometry: payload.geometry,
            monomials,
        }))
    }
}
