//! Strategy registry: name to strategy resolution plus a session
//! factory for stateful strategies (currently only EXACT).

use crate::dense_binary::DenseBinaryStrategy;
use crate::error::{HdcError, Result};
use crate::exact::{ExactConfig, ExactStrategy};
use crate::metric_affine::MetricAffineStrategy;
use crate::metric_affine_elastic::MetricAffineElasticStrategy;
use crate::sparse_poly::SparsePolyStrategy;
use crate::strategy::Strategy;

pub const DENSE_BINARY: &str = "dense-binary";
pub const METRIC_AFFINE: &str = "metric-affine";
pub const METRIC_AFFINE_ELASTIC: &str = "metric-affine-elastic";
pub const SPARSE_POLYNOMIAL: &str = "sparse-polynomial";
pub const EXACT: &str = "exact";
/// Legacy alias retained from the source system, resolves to the same
/// sparse-polynomial strategy.
pub const FRACTAL_SEMANTIC: &str = "fractal-semantic";

const KNOWN_NAMES: &[&str] = &[
    DENSE_BINARY,
    METRIC_AFFINE,
    METRIC_AFFINE_ELASTIC,
    SPARSE_POLYNOMIAL,
    EXACT,
    FRACTAL_SEMANTIC,
];

/// Resolve a strategy by name. EXACT resolves to the process-global
/// facade, which refuses every algebra call: callers that need real
/// EXACT algebra must go through [`exact_session`] instead.
pub fn resolve(name: &str) -> Result<Box<dyn Strategy>> {
    match name {
        DENSE_BINARY => Ok(Box::new(DenseBinaryStrategy::default())),
        METRIC_AFFINE => Ok(Box::new(MetricAffineStrategy)),
        METRIC_AFFINE_ELASTIC => Ok(Box::new(MetricAffineElasticStrategy::default())),
        SPARSE_POLYNOMIAL => Ok(Box::new(SparsePolyStrategy::default())),
        FRACTAL_SEMANTIC => {
            #[cfg(feature = "logging")]
            tracing::debug!(alias = FRACTAL_SEMANTIC, target = SPARSE_POLYNOMIAL, "resolved legacy strategy alias");
            Ok(Box::new(SparsePolyStrategy::default()))
        }
        EXACT => Ok(Box::new(ExactStrategy::facade())),
        other => Err(HdcError::UnknownStrategy {
            name: other.to_string(),
            available: KNOWN_NAMES.to_vec(),
        }),
    }
}

/// The default strategy when none is specified.
pub fn default_strategy() -> Box<dyn Strategy> {
    Box::new(DenseBinaryStrategy::default())
}

/// Construct a fresh, per-session EXACT strategy with its own atom
/// dictionary.
pub fn exact_session(config: ExactConfig) -> ExactStrategy {
    ExactStrategy::new_session(config)
}
