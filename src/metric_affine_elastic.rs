//! Metric-affine strategy, elastic (chunked) variant.
//!
//! Preserves superposition depth explicitly via an ordered list of mean
//! chunks instead of collapsing a bundle into a single arithmetic mean
//! (the flat variant's weakness this variant exists to fix).

use crate::error::{HdcError, Result};
use crate::hash::{theory_scoped_seed, SplitMix64};
use crate::metric_affine::round_clamp_byte;
use crate::strategy::{
    check_same_strategy, HolographicThresholds, ReasoningThresholds, Strategy, StrategyMeta,
    Vector, VectorBlob,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

const STRATEGY_ID: &str = "metric-affine-elastic";
const DEFAULT_GEOMETRY: u32 = 32;
const DEFAULT_CHUNK_CAPACITY: u32 = 32;

/// `(k, sum[G], mean[G])`: a single mean chunk within a bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeanChunk {
    pub k: u32,
    pub sum: Vec<u32>,
    pub mean: Vec<u8>,
}

impl MeanChunk {
    fn from_single(bytes: &[u8]) -> Self {
        MeanChunk {
            k: 1,
            sum: bytes.iter().map(|&b| b as u32).collect(),
            mean: bytes.to_vec(),
        }
    }

    fn append(&mut self, bytes: &[u8]) {
        self.k += 1;
        for i in 0..bytes.len() {
            self.sum[i] += bytes[i] as u32;
            self.mean[i] = round_clamp_byte(self.sum[i] as f64 / self.k as f64);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ElasticVector {
    Atomic {
        geometry: u32,
        chunk_capacity: u32,
        bytes: Vec<u8>,
    },
    Bundle {
        geometry: u32,
        chunk_capacity: u32,
        chunks: Vec<MeanChunk>,
    },
}

impl ElasticVector {
    pub fn geometry(&self) -> u32 {
        match self {
            ElasticVector::Atomic { geometry, .. } => *geometry,
            ElasticVector::Bundle { geometry, .. } => *geometry,
        }
    }

    pub fn chunk_capacity(&self) -> u32 {
        match self {
            ElasticVector::Atomic { chunk_capacity, .. } => *chunk_capacity,
            ElasticVector::Bundle { chunk_capacity, .. } => *chunk_capacity,
        }
    }

    /// The summary byte vector: the atomic bytes themselves, or
    /// `round(sum(chunk.sum) / sum(chunk.k))` per byte for a bundle.
    pub fn summary(&self) -> Vec<u8> {
        match self {
            ElasticVector::Atomic { bytes, .. } => bytes.clone(),
            ElasticVector::Bundle { geometry, chunks, .. } => {
                let g = *geometry as usize;
                let mut total_k: u64 = 0;
                let mut total_sum = vec![0u64; g];
                for chunk in chunks {
                    total_k += chunk.k as u64;
                    for i in 0..g {
                        total_sum[i] += chunk.sum[i] as u64;
                    }
                }
                if total_k == 0 {
                    return vec![0u8; g];
                }
                total_sum
                    .iter()
                    .map(|&s| round_clamp_byte(s as f64 / total_k as f64))
                    .collect()
            }
        }
    }
}

/// Chunk capacity is a construction-time config (default 32); the
/// strategy itself carries no other per-session state.
#[derive(Clone, Copy, Debug)]
pub struct MetricAffineElasticStrategy {
    pub chunk_capacity: u32,
}

impl Default for MetricAffineElasticStrategy {
    fn default() -> Self {
        MetricAffineElasticStrategy {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
        }
    }
}

fn as_elastic<'a>(v: &'a Vector) -> Result<&'a ElasticVector> {
    match v {
        Vector::MetricAffineElastic(e) => Ok(e),
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
            reason: "geometry must be positive",
        });
    }
    Ok(geometry as u32)
}

fn l1_similarity(a: &[u8], b: &[u8]) -> f64 {
    let l1: u64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as i32 - *y as i32).unsigned_abs() as u64)
        .sum();
    let max_l1 = a.len() as u64 * 255;
    if max_l1 == 0 {
        return 1.0;
    }
    1.0 - l1 as f64 / max_l1 as f64
}

fn xor_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

impl Strategy for MetricAffineElasticStrategy {
    fn meta(&self) -> &StrategyMeta {
        const META: StrategyMeta = StrategyMeta {
            id: STRATEGY_ID,
            display_name: "Metric Affine (elastic)",
            default_geometry: DEFAULT_GEOMETRY as u64,
            recommended_bundle_capacity: 32,
            max_bundle_capacity: 4096,
            bind_complexity: "O(G) per chunk, O(chunks_a * chunks_b) for bundle-bundle bind",
            sparse_optimized: false,
            description:
                "Chunked byte-channel hypervectors preserving superposition depth across bundles.",
            orthogonal_baseline: 0.67,
            reasoning_thresholds: ReasoningThresholds {
                strong_match: 0.85,
                plausible_match: 0.72,
                reject_below: 0.67,
            },
            holographic_thresholds: HolographicThresholds {
                superposition_floor: 0.75,
                noise_ceiling: 0.67,
            },
        };
        &META
    }

    fn bytes_per_vector(&self, geometry: u64) -> u64 {
        geometry
    }

    fn create_zero(&self, geometry: u64) -> Result<Vector> {
        let g = validate_geometry(geometry)?;
        Ok(Vector::MetricAffineElastic(ElasticVector::Atomic {
            geometry: g,
            chunk_capacity: self.chunk_capacity,
            bytes: vec![0u8; g as usize],
        }))
    }

    fn create_random(&self, geometry: u64, seed: Option<u64>) -> Result<Vector> {
        let g = validate_geometry(geometry)?;
        let mut rng = match seed {
            Some(s) => SplitMix64::new(s),
            None => SplitMix64::from_entropy(),
        };
        let bytes = (0..g).map(|_| (rng.next_u32() & 0xFF) as u8).collect();
        Ok(Vector::MetricAffineElastic(ElasticVector::Atomic {
            geometry: g,
            chunk_capacity: self.chunk_capacity,
            bytes,
        }))
    }

    fn create_from_name(&self, name: &str, geometry: u64, theory_id: &str) -> Result<Vector> {
        let g = validate_geometry(geometry)?;
        let seed = theory_scoped_seed(theory_id, name);
        let mut rng = SplitMix64::new(seed);
        let mut bytes: Vec<u8> = (0..g).map(|_| (rng.next_u32() & 0xFF) as u8).collect();
        let name_bytes = name.as_bytes();
        let n = name_bytes.len().min(g as usize);
        for i in 0..n {
            bytes[i] ^= name_bytes[i];
        }
        Ok(Vector::MetricAffineElastic(ElasticVector::Atomic {
            geometry: g,
            chunk_capacity: self.chunk_capacity,
            bytes,
        }))
    }

    fn bind(&self, a: &Vector, b: &Vector) -> Result<Vector> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        let ea = as_elastic(a)?;
        let eb = as_elastic(b)?;
        if ea.geometry() != eb.geometry() {
            return Err(HdcError::GeometryMismatch {
                strategy_id: STRATEGY_ID,
                a: ea.geometry() as u64,
                b: eb.geometry() as u64,
            });
        }
        let geometry = ea.geometry();
        let chunk_capacity = ea.chunk_capacity();

        let result = match (ea, eb) {
            (
                ElasticVector::Atomic { bytes: ba, .. },
                ElasticVector::Atomic { bytes: bb, .. },
            ) => ElasticVector::Atomic {
                geometry,
                chunk_capacity,
                bytes: xor_bytes(ba, bb),
            },
            (ElasticVector::Bundle { chunks, .. }, ElasticVector::Atomic { bytes: key, .. })
            | (ElasticVector::Atomic { bytes: key, .. }, ElasticVector::Bundle { chunks, .. }) => {
                let new_chunks = chunks
                    .iter()
                    .map(|c| {
                        let mean = xor_bytes(&c.mean, key);
                        let sum = mean.iter().map(|&m| m as u32 * c.k).collect();
                        MeanChunk { k: c.k, sum, mean }
                    })
                    .collect();
                ElasticVector::Bundle {
                    geometry,
                    chunk_capacity,
                    chunks: new_chunks,
                }
            }
            (
                ElasticVector::Bundle { chunks: ca, .. },
                ElasticVector::Bundle { chunks: cb, .. },
            ) => {
                let mut chunks = Vec::with_capacity(ca.len() * cb.len());
                for a_chunk in ca {
                    for b_chunk in cb {
                        let mean = xor_bytes(&a_chunk.mean, &b_chunk.mean);
                        chunks.push(MeanChunk::from_single(&mean));
                    }
                }
                ElasticVector::Bundle {
                    geometry,
                    chunk_capacity,
                    chunks,
                }
            }
        };
        Ok(Vector::MetricAffineElastic(result))
    }

    fn bundle(&self, vectors: &[Vector], _tie_breaker: Option<&Vector>) -> Result<Vector> {
        if vectors.is_empty() {
            return Err(HdcError::EmptyInput { operation: "bundle" });
        }
        let elastics: Vec<&ElasticVector> = vectors.iter().map(as_elastic).collect::<Result<_>>()?;
        let geometry = elastics[0].geometry();
        let chunk_capacity = elastics[0].chunk_capacity();
        for e in &elastics {
            if e.geometry() != geometry {
                return Err(HdcError::GeometryMismatch {
                    strategy_id: STRATEGY_ID,
                    a: geometry as u64,
                    b: e.geometry() as u64,
                });
            }
        }

        let mut chunks: Vec<MeanChunk> = Vec::new();
        let mut last_open = false;
        for e in &elastics {
            match e {
                ElasticVector::Atomic { bytes, .. } => {
                    if last_open {
                        let last = chunks.last_mut().expect("last_open implies a chunk exists");
                        last.append(bytes);
                        last_open = last.k < chunk_capacity;
                    } else {
                        chunks.push(MeanChunk::from_single(bytes));
                        last_open = 1 < chunk_capacity;
                    }
                }
                ElasticVector::Bundle { chunks: incoming, .. } => {
                    chunks.extend(incoming.iter().cloned());
                    last_open = false;
                }
            }
        }

        Ok(Vector::MetricAffineElastic(ElasticVector::Bundle {
            geometry,
            chunk_capacity,
            chunks,
        }))
    }

    fn unbind(&self, composite: &Vector, component: &Vector) -> Result<Vector> {
        self.bind(composite, component)
    }

    fn similarity(&self, a: &Vector, b: &Vector) -> Result<f64> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        let ea = as_elastic(a)?;
        let eb = as_elastic(b)?;
        if ea.geometry() != eb.geometry() {
            return Err(HdcError::GeometryMismatch {
                strategy_id: STRATEGY_ID,
                a: ea.geometry() as u64,
                b: eb.geometry() as u64,
            });
        }
        let sim = match (ea, eb) {
            (ElasticVector::Atomic { bytes: ba, .. }, ElasticVector::Atomic { bytes: bb, .. }) => {
                l1_similarity(ba, bb)
            }
            (ElasticVector::Bundle { chunks, .. }, ElasticVector::Atomic { bytes, .. })
            | (ElasticVector::Atomic { bytes, .. }, ElasticVector::Bundle { chunks, .. }) => chunks
                .iter()
                .map(|c| l1_similarity(&c.mean, bytes))
                .fold(f64::MIN, f64::max),
            (ElasticVector::Bundle { chunks: ca, .. }, ElasticVector::Bundle { chunks: cb, .. }) => {
                let mut best = f64::MIN;
                'outer: for a_chunk in ca {
                    for b_chunk in cb {
                        let s = l1_similarity(&a_chunk.mean, &b_chunk.mean);
                        if s > best {
                            best = s;
                        }
                        if best >= 1.0 {
                            break 'outer;
                        }
                    }
                }
                best
            }
        };
        // Both operands non-empty by construction (bundle() never emits an
        // empty chunk list), but guard defensively against a degenerate
        // Bundle{chunks: []} built directly.
        if sim == f64::MIN {
            Ok(1.0)
        } else {
            Ok(sim)
        }
    }

    fn equals(&self, a: &Vector, b: &Vector) -> bool {
        matches!(
            (a, b),
            (Vector::MetricAffineElastic(x), Vector::MetricAffineElastic(y)) if x == y
        )
    }

    fn serialize(&self, v: &Vector) -> Result<VectorBlob> {
        let e = as_elastic(v)?;
        let data = json!({
            "data": e.summary(),
            "chunkCapacity": e.chunk_capacity(),
            "chunks": match e {
                ElasticVector::Atomic { .. } => serde_json::Value::Null,
                ElasticVector::Bundle { chunks, .. } => json!(chunks),
            },
        });
        Ok(VectorBlob {
            strategy_id: STRATEGY_ID.to_string(),
            version: 1,
            geometry: e.geometry() as u64,
            data,
        })
    }

    fn deserialize(&self, payload: &VectorBlob) -> Result<Vector> {
        if payload.strategy_id != STRATEGY_ID {
            return Err(HdcError::StrategyMismatch {
                expected: STRATEGY_ID,
                found: payload.strategy_id.clone(),
            });
        }
        let geometry = validate_geometry(payload.geometry)?;
        let obj = payload.data.as_object().ok_or_else(|| HdcError::MalformedPayload {
            strategy_id: STRATEGY_ID,
            reason: "expected object payload".to_string(),
        })?;
        let chunk_capacity = obj
            .get("chunkCapacity")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| HdcError::MalformedPayload {
                strategy_id: STRATEGY_ID,
                reason: "missing chunkCapacity".to_string(),
            })? as u32;
        let chunks_value = obj.get("chunks").cloned().unwrap_or(serde_json::Value::Null);

        if chunks_value.is_null() {
            let bytes: Vec<u8> = obj
                .get("data")
                .cloned()
                .ok_or_else(|| HdcError::MalformedPayload {
                    strategy_id: STRATEGY_ID,
                    reason: "missing data".to_string(),
                })
                .and_then(|v| {
                    serde_json::from_value(v).map_err(|e| HdcError::MalformedPayload {
                        strategy_id: STRATEGY_ID,
                        reason: e.to_string(),
                    })
                })?;
            Ok(Vector::MetricAffineElastic(ElasticVector::Atomic {
                geometry,
                chunk_capacity,
                bytes,
            }))
        } else {
            let chunks: Vec<MeanChunk> =
                serde_json::from_value(chunks_value).map_err(|e| HdcError::MalformedPayload {
                    strategy_id: STRATEGY_ID,
                    reason: e.to_string(),
                })?;
            Ok(Vector::MetricAffineElastic(ElasticVector::Bundle {
                geometry,
                chunk_capacity,
                chunks,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_produces_expected_chunk_count_and_total_k() {
        let s = MetricAffineElasticStrategy {
            chunk_capacity: 4,
        };
        let atomics: Vec<Vector> = (0..10)
            .map(|i| s.create_random(16, Some(i)).unwrap())
            .collect();
        let bundled = s.bundle(&atomics, None).unwrap();
        if let Vector::MetricAffineElastic(ElasticVector::Bundle { chunks, .. }) = bundled {
            assert_eq!(chunks.len(), 3); // ceil(10/4)
            let total_k: u32 = chunks.iter().map(|c| c.k).sum();
            assert_eq!(total_k, 10);
        } else {
            panic!("expected bundle shape");
        }
    }

    #[test]
    fn bind_preserves_superposition_depth() {
        let elastic = MetricAffineElasticStrategy {
            chunk_capacity: 32,
        };
        let flat = crate::metric_affine::MetricAffineStrategy;

        let atomics: Vec<Vector> = (0..6)
            .map(|i| elastic.create_random(64, Some(100 + i)).unwrap())
            .collect();
        let key = elastic.create_random(64, Some(999)).unwrap();

        let elastic_bundle = elastic.bundle(&atomics, None).unwrap();
        let elastic_bound = elastic.bind(&elastic_bundle, &key).unwrap();

        // Build the flat-strategy equivalent bundle from the same bytes.
        let flat_atomics: Vec<Vector> = atomics
            .iter()
            .map(|v| {
                if let Vector::MetricAffineElastic(ElasticVector::Atomic { geometry, bytes, .. }) =
                    v
                {
                    Vector::MetricAffine(crate::metric_affine::MetricAffineVector {
                        geometry: *geometry,
                        bytes: bytes.clone(),
                    })
                } else {
                    unreachable!()
                }
            })
            .collect();
        let flat_key = if let Vector::MetricAffineElastic(ElasticVector::Atomic { geometry, bytes, .. }) = &key {
            Vector::MetricAffine(crate::metric_affine::MetricAffineVector {
                geometry: *geometry,
                bytes: bytes.clone(),
            })
        } else {
            unreachable!()
        };
        let flat_bundle = flat.bundle(&flat_atomics, None).unwrap();
        let flat_bound = flat.bind(&flat_bundle, &flat_key).unwrap();

        for (i, atomic) in atomics.iter().enumerate() {
            let atomic_bound = elastic.bind(atomic, &key).unwrap();
            let elastic_sim = elastic.similarity(&elastic_bound, &atomic_bound).unwrap();

            let flat_atomic_bound = flat.bind(&flat_atomics[i], &flat_key).unwrap();
            let flat_sim = flat.similarity(&flat_bound, &flat_atomic_bound).unwrap();

            assert!(
                elastic_sim > flat_sim,
                "chunk {i}: elastic={elastic_sim} flat={flat_sim}"
            );
        }
    }

    #[test]
    fn bundle_of_bundles_concatenates_without_nesting() {
        let s = MetricAffineElasticStrategy { chunk_capacity: 2 };
        let a1 = s.create_random(8, Some(1)).unwrap();
        let a2 = s.create_random(8, Some(2)).unwrap();
        let a3 = s.create_random(8, Some(3)).unwrap();
        let b1 = s.bundle(&[a1, a2], None).unwrap();
        let b2 = s.bundle(&[a3.clone()], None).unwrap();
        let combined = s.bundle(&[b1, b2], None).unwrap();
        if let Vector::MetricAffineElastic(ElasticVector::Bundle { chunks, .. }) = combined {
            assert_eq!(chunks.len(), 2);
        } else {
            panic!("expected bundle shape");
        }
    }

    #[test]
    fn round_trip_serialization_atomic_and_bundle() {
        let s = MetricAffineElasticStrategy::default();
        let atomic = s.create_from_name("x", 16, "t").unwrap();
        let blob = s.serialize(&atomic).unwrap();
        assert!(s.equals(&atomic, &s.deserialize(&blob).unwrap()));

        let atomics: Vec<Vector> = (0..3).map(|i| s.create_random(16, Some(i)).unwrap()).collect();
        let bundle = s.bundle(&atomics, None).unwrap();
        let blob = s.serialize(&bundle).unwrap();
        assert!(s.equals(&bundle, &s.deserialize(&blob).unwrap()));
    }
}
