//! Generic top-K similarity search over a vocabulary.
//!
//! One implementation shared by every strategy via
//! [`crate::strategy::Strategy::top_k_similar`]'s default body, so adding
//! a new strategy never means re-deriving this scan.

use crate::error::Result;
use crate::strategy::{SessionStats, Strategy, Vector};

/// Scan `vocabulary`, compute `strategy.similarity(query, v)` for each
/// entry, and return the top `k` by descending similarity with ties
/// broken by name (ascending).
pub fn top_k_similar<S: Strategy + ?Sized>(
    strategy: &S,
    query: &Vector,
    vocabulary: &[(String, Vector)],
    k: usize,
    mut stats: Option<&mut SessionStats>,
) -> Result<Vec<(String, f64)>> {
    let mut scored: Vec<(String, f64)> = Vec::with_capacity(vocabulary.len());
    for (name, candidate) in vocabulary {
        let sim = strategy.similarity(query, candidate)?;
        if let Some(s) = stats.as_deref_mut() {
            s.record_similarity();
        }
        scored.push((name.clone(), sim));
    }

    scored.sort_by(|(name_a, sim_a), (name_b, sim_b)| {
        sim_b
            .partial_cmp(sim_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| name_a.cmp(name_b))
    });
    scored.truncate(k);
    Ok(scored)
}
