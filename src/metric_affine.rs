//! Metric-affine strategy, flat variant: byte-channel vectors over
//! `[0,255]^G`, XOR bind, arithmetic-mean bundle, normalized L1
//! similarity.

use crate::error::{HdcError, Result};
use crate::hash::{theory_scoped_seed, SplitMix64};
use crate::strategy::{
    check_same_strategy, HolographicThresholds, ReasoningThresholds, Strategy, StrategyMeta,
    Vector, VectorBlob,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

const STRATEGY_ID: &str = "metric-affine";
const DEFAULT_GEOMETRY: u32 = 32;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricAffineVector {
    pub geometry: u32,
    pub bytes: Vec<u8>,
}

/// Stateless: no per-session state, shareable process-wide.
#[derive(Default, Clone, Copy)]
pub struct MetricAffineStrategy;

pub(crate) fn as_metric_affine<'a>(v: &'a Vector) -> Result<&'a MetricAffineVector> {
    match v {
        Vector::MetricAffine(m) => Ok(m),
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

/// Clamp a running mean (as f64) into `[0, 255]`, rounding half away from
/// zero: `clamp(round(sum(inputs) / n), 0, 255)`.
pub(crate) fn round_clamp_byte(mean: f64) -> u8 {
    mean.round().clamp(0.0, 255.0) as u8
}

impl Strategy for MetricAffineStrategy {
    fn meta(&self) -> &StrategyMeta {
        const META: StrategyMeta = StrategyMeta {
            id: STRATEGY_ID,
            display_name: "Metric Affine (flat)",
            default_geometry: DEFAULT_GEOMETRY as u64,
            recommended_bundle_capacity: 32,
            max_bundle_capacity: 512,
            bind_complexity: "O(G)",
            sparse_optimized: false,
            description: "Byte-channel hypervectors with XOR bind and arithmetic-mean bundle.",
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
        Ok(Vector::MetricAffine(MetricAffineVector {
            geometry: g,
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
        Ok(Vector::MetricAffine(MetricAffineVector {
            geometry: g,
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
        Ok(Vector::MetricAffine(MetricAffineVector {
            geometry: g,
            bytes,
        }))
    }

    fn bind(&self, a: &Vector, b: &Vector) -> Result<Vector> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        let ma = as_metric_affine(a)?;
        let mb = as_metric_affine(b)?;
        if ma.geometry != mb.geometry {
            return Err(HdcError::GeometryMismatch {
                strategy_id: STRATEGY_ID,
                a: ma.geometry as u64,
                b: mb.geometry as u64,
            });
        }
        let bytes = ma
            .bytes
            .iter()
            .zip(mb.bytes.iter())
            .map(|(x, y)| x ^ y)
            .collect();
        Ok(Vector::MetricAffine(MetricAffineVector {
            geometry: ma.geometry,
            bytes,
        }))
    }

    fn bundle(&self, vectors: &[Vector], _tie_breaker: Option<&Vector>) -> Result<Vector> {
        if vectors.is_empty() {
            return Err(HdcError::EmptyInput { operation: "bundle" });
        }
        let all: Vec<&MetricAffineVector> =
            vectors.iter().map(as_metric_affine).collect::<Result<_>>()?;
        let geometry = all[0].geometry;
        for v in &all {
            if v.geometry != geometry {
                return Err(HdcError::GeometryMismatch {
                    strategy_id: STRATEGY_ID,
                    a: geometry as u64,
                    b: v.geometry as u64,
                });
            }
        }
        let n = all.len() as f64;
        let bytes = (0..geometry as usize)
            .map(|i| {
                let sum: u32 = all.iter().map(|v| v.bytes[i] as u32).sum();
                round_clamp_byte(sum as f64 / n)
            })
            .collect();
        Ok(Vector::MetricAffine(MetricAffineVector { geometry, bytes }))
    }

    fn unbind(&self, composite: &Vector, component: &Vector) -> Result<Vector> {
        self.bind(composite, component)
    }

    fn similarity(&self, a: &Vector, b: &Vector) -> Result<f64> {
        check_same_strategy(STRATEGY_ID, a, b)?;
        let ma = as_metric_affine(a)?;
        let mb = as_metric_affine(b)?;
        if ma.geometry != mb.geometry {
            return Err(HdcError::GeometryMismatch {
                strategy_id: STRATEGY_ID,
                a: ma.geometry as u64,
                b: mb.geometry as u64,
            });
        }
        let l1: u64 = ma
            .bytes
            .iter()
            .zip(mb.bytes.iter())
            .map(|(x, y)| (*x as i32 - *y as i32).unsigned_abs() as u64)
            .sum();
        let max_l1 = ma.geometry as u64 * 255;
        Ok(1.0 - l1 as f64 / max_l1 as f64)
    }

    fn equals(&self, a: &Vector, b: &Vector) -> bool {
        matches!((a, b), (Vector::MetricAffine(x), Vector::MetricAffine(y)) if x == y)
    }

    fn serialize(&self, v: &Vector) -> Result<VectorBlob> {
        let m = as_metric_affine(v)?;
        Ok(VectorBlob {
            strategy_id: STRATEGY_ID.to_string(),
            version: 1,
            geometry: m.geometry as u64,
            data: json!(m.bytes),
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
        let bytes: Vec<u8> = serde_json::from_value(payload.data.clone()).map_err(|e| {
            HdcError::MalformedPayload {
                strategy_id: STRATEGY_ID,
                reason: e.to_string(),
            }
        })?;
        if bytes.len() != geometry as usize {
            return Err(HdcError::MalformedPayload {
                strategy_id: STRATEGY_ID,
                reason: format!("expected {geometry} bytes, found {}", bytes.len()),
            });
        }
        Ok(Vector::MetricAffine(MetricAffineVector { geometry, bytes }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism_from_name() {
        let s = MetricAffineStrategy;
        let a = s.create_from_name("cat", 32, "animals").unwrap();
        let b = s.create_from_name("cat", 32, "animals").unwrap();
        assert!(s.equals(&a, &b));
    }

    #[test]
    fn bind_self_inverse() {
        let s = MetricAffineStrategy;
        let a = s.create_random(32, Some(1)).unwrap();
        let b = s.create_random(32, Some(2)).unwrap();
        let bound = s.bind(&a, &b).unwrap();
        let recovered = s.unbind(&bound, &b).unwrap();
        assert!(s.equals(&a, &recovered));
    }

    #[test]
    fn clamp_bundle_255_and_0() {
        let s = MetricAffineStrategy;
        let mut hi = s.create_zero(4).unwrap();
        let mut lo = s.create_zero(4).unwrap();
        if let Vector::MetricAffine(v) = &mut hi {
            v.bytes = vec![255, 255, 255, 255];
        }
        if let Vector::MetricAffine(v) = &mut lo {
            v.bytes = vec![0, 0, 0, 0];
        }
        let bundled = s.bundle(&[hi, lo], None).unwrap();
        if let Vector::MetricAffine(v) = bundled {
            assert_eq!(v.bytes, vec![128, 128, 128, 128]);
        } else {
            panic!("wrong variant");
        }
    }

    #[test]
    fn random_pair_near_baseline() {
        let s = MetricAffineStrategy;
        let a = s.create_random(256, Some(1)).unwrap();
        let b = s.create_random(256, Some(2)).unwrap();
        let sim = s.similarity(&a, &b).unwrap();
        assert!((sim - 0.667).abs() < 0.05, "sim={sim}");
    }

    #[test]
    fn approximately_orthogonal_default_threshold() {
        let s = MetricAffineStrategy;
        let a = s.create_random(512, Some(10)).unwrap();
        let b = s.create_random(512, Some(20)).unwrap();
        assert!(s.is_orthogonal(&a, &b, None).unwrap());
    }

    #[test]
    fn round_trip_serialization() {
        let s = MetricAffineStrategy;
        let v = s.create_from_name("x", 32, "t").unwrap();
        let blob = s.serialize(&v).unwrap();
        let back = s.deserialize(&blob).unwrap();
        assert!(s.equals(&v, &back));
    }
}
