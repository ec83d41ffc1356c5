//! The strategy contract and the shared types that ride along it:
//! vectors, metadata, knowledge-base entries, session counters.
//!
//! Every concrete representation (dense-binary, metric-affine flat and
//! elastic, sparse-polynomial, exact) implements [`Strategy`] for its own
//! vector shape, wrapped in the [`Vector`] sum type so that clients
//! (registry, codec, top-K search) can hold strategies behind `dyn
//! Strategy` without knowing which representation backs a given vector.

use crate::dense_binary::DenseBinaryVector;
use crate::error::{HdcError, Result};
use crate::exact::ExactVector;
use crate::metric_affine::MetricAffineVector;
use crate::metric_affine_elastic::ElasticVector;
use crate::sparse_poly::SparsePolyVector;
use serde::{Deserialize, Serialize};

/// An opaque, strategy-tagged vector. Every producer is one of the five
/// concrete representations; consumers must not assume which one without
/// checking `strategy_id()` (mixing strategies is a [`HdcError::StrategyMismatch`]).
#[derive(Clone, Debug, PartialEq)]
pub enum Vector {
    DenseBinary(DenseBinaryVector),
    MetricAffine(MetricAffineVector),
    MetricAffineElastic(ElasticVector),
    SparsePoly(SparsePolyVector),
    Exact(ExactVector),
}

impl Vector {
    pub fn strategy_id(&self) -> &'static str {
        match self {
            Vector::DenseBinary(_) => "dense-binary",
            Vector::MetricAffine(_) => "metric-affine",
            Vector::MetricAffineElastic(_) => "metric-affine-elastic",
            Vector::SparsePoly(_) => "sparse-polynomial",
            Vector::Exact(_) => "exact",
        }
    }

    /// Strategy-specific geometry of this vector (bit-width, byte count,
    /// exponent budget `k`, or reserved bit-index ceiling for EXACT).
    pub fn geometry(&self) -> u64 {
        match self {
            Vector::DenseBinary(v) => v.geometry as u64,
            Vector::MetricAffine(v) => v.geometry as u64,
            Vector::MetricAffineElastic(v) => v.geometry as u64,
            Vector::SparsePoly(v) => v.k as u64,
            Vector::Exact(v) => v.geometry,
        }
    }
}

/// Self-describing per-vector serialization blob.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VectorBlob {
    pub strategy_id: String,
    pub version: u32,
    pub geometry: u64,
    pub data: serde_json::Value,
}

/// One entry of a knowledge-base batch: a vector plus optional name and
/// opaque metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct KbEntry {
    pub vector: Vector,
    pub name: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Self-describing knowledge-base serialization blob.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KbBlob {
    pub strategy_id: String,
    pub version: u32,
    pub geometry: u64,
    pub count: usize,
    pub facts: Vec<KbFact>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KbFact {
    pub data: serde_json::Value,
    pub name: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Reasoning-layer calibration constants a strategy carries but does not
/// itself interpret. Downstream reasoning engines read these instead of
/// hard-coding thresholds per strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReasoningThresholds {
    /// Similarity above which a candidate is treated as a strong match.
    pub strong_match: f64,
    /// Similarity above which a candidate is merely plausible.
    pub plausible_match: f64,
    /// Similarity below which a candidate is rejected outright.
    pub reject_below: f64,
}

/// Calibration constants for holographic superposition queries (bundle
/// membership tests), carried alongside `ReasoningThresholds` for the
/// same reason.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HolographicThresholds {
    /// Minimum similarity expected between a bundle and a true member.
    pub superposition_floor: f64,
    /// Maximum similarity expected between a bundle and an unrelated probe.
    pub noise_ceiling: f64,
}

/// Read-only strategy metadata.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrategyMeta {
    pub id: &'static str,
    pub display_name: &'static str,
    pub default_geometry: u64,
    pub recommended_bundle_capacity: usize,
    pub max_bundle_capacity: usize,
    pub bind_complexity: &'static str,
    pub sparse_optimized: bool,
    pub description: &'static str,
    /// Expected similarity of two independently random vectors under this
    /// strategy (dense-binary ~0.5, metric-affine ~0.67, SP ~1/(2k−1)).
    pub orthogonal_baseline: f64,
    pub reasoning_thresholds: ReasoningThresholds,
    pub holographic_thresholds: HolographicThresholds,
}

/// Optional per-session counters threaded through `topKSimilar` and other
/// counter-emitting internals.
#[derive(Clone, Debug, Default)]
pub struct SessionStats {
    pub similarity_calls: u64,
    pub bind_calls: u64,
    pub bundle_calls: u64,
    pub unbind_calls: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_similarity(&mut self) {
        self.similarity_calls += 1;
    }

    #[inline]
    pub fn record_bind(&mut self) {
        self.bind_calls += 1;
    }

    #[inline]
    pub fn record_bundle(&mut self) {
        self.bundle_calls += 1;
    }

    #[inline]
    pub fn record_unbind(&mut self) {
        self.unbind_calls += 1;
    }
}

/// The polymorphic operation set every representation must provide.
///
/// Default-provided methods (`bind_all`, `distance`, `is_orthogonal`,
/// `top_k_similar`) are expressed purely in terms of the required ones so
/// each strategy module implements only its irreducible algebra.
pub trait Strategy: Send + Sync {
    fn meta(&self) -> &StrategyMeta;

    fn bytes_per_vector(&self, geometry: u64) -> u64;

    fn create_zero(&self, geometry: u64) -> Result<Vector>;
    fn create_random(&self, geometry: u64, seed: Option<u64>) -> Result<Vector>;
    fn create_from_name(&self, name: &str, geometry: u64, theory_id: &str) -> Result<Vector>;

    fn bind(&self, a: &Vector, b: &Vector) -> Result<Vector>;
    fn bundle(&self, vectors: &[Vector], tie_breaker: Option<&Vector>) -> Result<Vector>;
    fn unbind(&self, composite: &Vector, component: &Vector) -> Result<Vector>;
    fn similarity(&self, a: &Vector, b: &Vector) -> Result<f64>;

    fn equals(&self, a: &Vector, b: &Vector) -> bool;
    fn serialize(&self, v: &Vector) -> Result<VectorBlob>;
    fn deserialize(&self, payload: &VectorBlob) -> Result<Vector>;

    /// Fold `bind` across a non-empty slice of vectors, left to right.
    fn bind_all(&self, vectors: &[Vector]) -> Result<Vector> {
        let mut iter = vectors.iter();
        let first = iter
            .next()
            .ok_or(HdcError::EmptyInput { operation: "bindAll" })?;
        let mut acc = first.clone();
        for v in iter {
            acc = self.bind(&acc, v)?;
        }
        Ok(acc)
    }

    fn distance(&self, a: &Vector, b: &Vector) -> Result<f64> {
        Ok(1.0 - self.similarity(a, b)?)
    }

    /// "Approximately orthogonal" relative to this strategy's random-pair
    /// baseline: the `|sim - 0.67| < 0.05` rule for metric-affine,
    /// generalized to every strategy via `meta().orthogonal_baseline`.
    fn is_orthogonal(&self, a: &Vector, b: &Vector, threshold: Option<f64>) -> Result<bool> {
        let sim = self.similarity(a, b)?;
        let tol = threshold.unwrap_or(0.05);
        Ok((sim - self.meta().orthogonal_baseline).abs() < tol)
    }

    fn serialize_kb(&self, entries: &[KbEntry]) -> Result<KbBlob> {
        let id = self.meta().id;
        let mut geometry = 0u64;
        let mut facts = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.vector.strategy_id() != id {
                return Err(HdcError::StrategyMismatch {
                    expected: id,
                    found: entry.vector.strategy_id().to_string(),
                });
            }
            geometry = entry.vector.geometry();
            let blob = self.serialize(&entry.vector)?;
            facts.push(KbFact {
                data: blob.data,
                name: entry.name.clone(),
                metadata: entry.metadata.clone(),
            });
        }
        Ok(KbBlob {
            strategy_id: id.to_string(),
            version: 1,
            geometry,
            count: facts.len(),
            facts,
        })
    }

    fn deserialize_kb(&self, blob: &KbBlob) -> Result<Vec<KbEntry>> {
        let id = self.meta().id;
        if blob.strategy_id != id {
            return Err(HdcError::StrategyMismatch {
                expected: id,
                found: blob.strategy_id.clone(),
            });
        }
        blob.facts
            .iter()
            .map(|fact| {
                let vector_blob = VectorBlob {
                    strategy_id: blob.strategy_id.clone(),
                    version: blob.version,
                    geometry: blob.geometry,
                    data: fact.data.clone(),
                };
                Ok(KbEntry {
                    vector: self.deserialize(&vector_blob)?,
                    name: fact.name.clone(),
                    metadata: fact.metadata.clone(),
                })
            })
            .collect()
    }

    /// Top-K nearest-neighbor scan, implemented once here atop
    /// `similarity` so every strategy gets it for free.
    fn top_k_similar(
        &self,
        query: &Vector,
        vocabulary: &[(String, Vector)],
        k: usize,
        stats: Option<&mut SessionStats>,
    ) -> Result<Vec<(String, f64)>> {
        crate::topk::top_k_similar(self, query, vocabulary, k, stats)
    }
}

fn require_same_strategy(expected: &'static str, a: &Vector, b: &Vector) -> Result<()> {
    if a.strategy_id() != expected {
        return Err(HdcError::StrategyMismatch {
            expected,
            found: a.strategy_id().to_string(),
        });
    }
    if b.strategy_id() != expected {
        return Err(HdcError::StrategyMismatch {
            expected,
            found: b.strategy_id().to_string(),
        });
    }
    Ok(())
}

pub(crate) use require_same_strategy as check_same_strategy;
