//! Dense-binary strategy: bit-packed vectors over a fixed geometry, XOR
//! bind, majority-vote bundle, Hamming similarity.

use crate::error::{HdcError, Result};
use crate::hash::{theory_scoped_seed, SplitMix64};
use crate::strategy::{
    check_same_strategy, HolographicThresholds, ReasoningThresholds, Strategy, StrategyMeta,
    Vector, VectorBlob,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

const STRATEGY_ID: &str = "dense-binary";

/// `ceil(G/32)` little-endian 32-bit words, bit `i` at word `i/32`,
/// offset `i mod 32`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseBinaryVector {
    pub geometry: u32,
    pub words: Vec<u32>,
}

impl DenseBinaryVector {
    fn word_count(geometry: u32) -> usize {
        (geometry as usize).div_ceil(32)
    }
}

/// Stateless: dense-binary carries no per-session state, so a single
/// instance may be shared process-wide.
#[derive(Default, Clone, Copy)]
pub struct DenseBinaryStrategy;

fn as_dense<'a>(v: &'a Vector) -> Result<&'a DenseBinaryVector> {
    match v {
        Vector::DenseBinary(d) => Ok(d),
        other => Err(HdcError::StrategyMismatch {
            expected: STRATEGY_ID,
            found: other.strategy_id().to_string(),
        }),
    }
}

fn validate_geometry(geometry: u64) -> Result<u32> {
    if geometry == 0 || geometry % 32 != 0 || geometry > u32::MAX as u64 {
        return Err(HdcError::InvalidGeometry {
            strategy_id: STRATEGY_ID,
            geometry,
            reason: "geometry must be a positive multiple of 32",
        });
    }
    Ok(geometry as u32)
}

/// Pack `name`'s ASCII bytes into eight 32-bit words, cycling if shorter
/// than 32 bytes.
fn ascii_stamp(name: &str) -> [u32; 8] {
    let bytes = name.as_bytes();
    let mut buf = [0u8; 32];
    if !bytes.is_empty() {
        for (i, slot) in buf.iter_mut().enumerate() {
            *slot = bytes[i % bytes.len()];
        }
    }
    let mut words = [0u32; 8];
    for (w, word) in words.iter_mut().enumerate() {
        *word = u32::from_le_bytes([
            buf[4 * w],
            buf[4 * w + 1],
            buf[4 * w + 2],
            buf[4 * w + 3],
        ]);
    }
    words
}

impl Strategy for DenseBinaryStrategy {
    fn meta(&self) -> &StrategyMeta {
        const META: StrategyMeta = StrategyMeta {
            id: STRATEGY_ID,
            display_name: "Dense Binary",
            default_geometry: 8192,
            recommended_bundle_capacity: 64,
            max_bundle_capacity: 4096,
            bind_complexity: "O(G/32)",
            sparse_optimized: false,
            description: "Bit-packed binary hypervectors with XOR bind and majority bundle.",
            orthogonal_baseline: 0.5,
            reasoning_thresholds: ReasoningThresholds {
                strong_match: 0.8,
                plausible_match: 0.65,
                reject_below: 0.55,
            },
            holographic_thresholds: HolographicThresholds {
                superposition_floor: 0.7,
                noise_ceiling: 0.55,
            },
        };
        &META
    }

    fn bytes_per_vector(&self, geometry: u64) -> u64 {
        DenseBinaryVector::word_count(geometry as u32) as u64 * 4
    }

    fn create_zero(&self, geometry: u64) -> Result<Vector> {
        let g = validate_geometry(geometry)?;
        Ok(Vector::DenseBinary(DenseBinaryVector {
            geometry: g,
            words: vec![0u32; DenseBinaryVector::word_count(g)],
        }))
    }

    fn create_random(&self, geometry: u64, seed: Option<u64>) -> Result<Vector> {
        let g = validate_geometry(geometry)?;
        let n = DenseBinaryVector::word_count(g);
        let mut rng = match seed {
            Some(s) => SplitMix64::new(s),
            None => SplitMix64::from_entropy(),
        };
        Ok(Vector::DenseBinary(DenseBinaryVector {
            geometry: g,
            words: rng.next_u32_words(n),
        }))
    }

    fn create_from_name(&self, name: &str, geometry: u64, theory_id: &str) -> Result<Vector> {
        let g = validate_geometry(geometry)?;
        let n = DenseBinaryVector::word_count(g);
        let seed = theory_scoped_seed(theory_id, name);
        let mut rng = SplitMix64::new(seed);
        let stamp = ascii_stamp(name);

        let mut words = vec![0u32; n];
        let mut idx = 0usize;
        while idx < n {
            let variation = rng.next_u32_words(8);
            for (j, var) in variation.iter().enumerate() {
                if idx + j >= n {
                    break;
                }
                words[idx + j] = stamp[j] ^ var;
            }
            idx += 8;
        }

        Ok(Vector::DenseBinary(DenseBinaryVector { geometry: g, words }))
    }

    fn bind(&self, a: &Vector, b: &Vector) -> Result<Vector> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        let da = as_dense(a)?;
        let db = as_dense(b)?;
        if da.geometry != db.geometry {
            return Err(HdcError::GeometryMismatch {
                strategy_id: STRATEGY_ID,
                a: da.geometry as u64,
                b: db.geometry as u64,
            });
        }
        let words = da
            .words
            .iter()
            .zip(db.words.iter())
            .map(|(x, y)| x ^ y)
            .collect();
        Ok(Vector::DenseBinary(DenseBinaryVector {
            geometry: da.geometry,
            words,
        }))
    }

    fn bundle(&self, vectors: &[Vector], tie_breaker: Option<&Vector>) -> Result<Vector> {
        if vectors.is_empty() {
            return Err(HdcError::EmptyInput { operation: "bundle" });
        }
        let dense: Vec<&DenseBinaryVector> =
            vectors.iter().map(as_dense).collect::<Result<_>>()?;
        let geometry = dense[0].geometry;
        for d in &dense {
            if d.geometry != geometry {
                return Err(HdcError::GeometryMismatch {
                    strategy_id: STRATEGY_ID,
                    a: geometry as u64,
                    b: d.geometry as u64,
                });
            }
        }
        let tie_words: Option<&[u32]> = match tie_breaker {
            Some(tb) => {
                let t = as_dense(tb)?;
                if t.geometry != geometry {
                    return Err(HdcError::GeometryMismatch {
                        strategy_id: STRATEGY_ID,
                        a: geometry as u64,
                        b: t.geometry as u64,
                    });
                }
                Some(t.words.as_slice())
            }
            None => None,
        };

        let n_words = dense[0].words.len();
        let n = dense.len() as u32;
        let mut out = vec![0u32; n_words];
        for word_idx in 0..n_words {
            for bit in 0..32u32 {
                let mask = 1u32 << bit;
                let count: u32 = dense
                    .iter()
                    .filter(|d| d.words[word_idx] & mask != 0)
                    .count() as u32;
                let set = match (count * 2).cmp(&n) {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Less => false,
                    std::cmp::Ordering::Equal => {
                        tie_words.map(|w| w[word_idx] & mask != 0).unwrap_or(false)
                    }
                };
                if set {
                    out[word_idx] |= mask;
                }
            }
        }
        Ok(Vector::DenseBinary(DenseBinaryVector {
            geometry,
            words: out,
        }))
    }

    fn unbind(&self, composite: &Vector, component: &Vector) -> Result<Vector> {
        // XOR is its own inverse.
        self.bind(composite, component)
    }

    fn similarity(&self, a: &Vector, b: &Vector) -> Result<f64> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        let da = as_dense(a)?;
        let db = as_dense(b)?;
        if da.geometry != db.geometry {
            return Err(HdcError::GeometryMismatch {
                strategy_id: STRATEGY_ID,
                a: da.geometry as u64,
                b: db.geometry as u64,
            });
        }
        let hamming: u32 = da
            .words
            .iter()
            .zip(db.words.iter())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum();
        Ok(1.0 - hamming as f64 / da.geometry as f64)
    }

    fn equals(&self, a: &Vector, b: &Vector) -> bool {
        matches!((a, b), (Vector::DenseBinary(x), Vector::DenseBinary(y)) if x == y)
    }

    fn serialize(&self, v: &Vector) -> Result<VectorBlob> {
        let d = as_dense(v)?;
        Ok(VectorBlob {
            strategy_id: STRATEGY_ID.to_string(),
            version: 1,
            geometry: d.geometry as u64,
            data: json!(d.words),
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
        let words: Vec<u32> = serde_json::from_value(payload.data.clone()).map_err(|e| {
            HdcError::MalformedPayload {
                strategy_id: STRATEGY_ID,
                reason: e.to_string(),
            }
        })?;
        if words.len() != DenseBinaryVector::word_count(geometry) {
            return Err(HdcError::MalformedPayload {
                strategy_id: STRATEGY_ID,
                reason: format!(
                    "expected {} words for geometry {geometry}, found {}",
                    DenseBinaryVector::word_count(geometry),
                    words.len()
                ),
            });
        }
        Ok(Vector::DenseBinary(DenseBinaryVector { geometry, words }))
    }
}
