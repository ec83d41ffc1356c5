//! HDC Algebra Core
//!
//! Copyright (c) 2026 HDC Algebra Core Contributors
//! Licensed under MIT License
//!
//! Hyperdimensional computing algebra core: bind/bundle/unbind/similarity
//! over five vector representations behind one polymorphic strategy
//! contract.
//!
//! # Overview
//!
//! Five representations share [`strategy::Strategy`] for
//! `bind`/`bundle`/`unbind`/`similarity`, so a reasoning engine built
//! against the trait works unchanged across all of them:
//!
//! - **Dense-binary**: bit-packed vectors, XOR bind, majority bundle.
//! - **Metric-affine (flat)**: byte-channel vectors, XOR bind,
//!   arithmetic-mean bundle.
//! - **Metric-affine (elastic)**: the flat representation's bundle,
//!   chunked to preserve superposition depth instead of collapsing it.
//! - **Sparse-polynomial**: sets of 64-bit exponents, Cartesian-XOR bind
//!   with Min-Hash sparsification, Jaccard similarity.
//! - **Exact**: sorted BigInt monomial polynomials over a per-session
//!   atom dictionary, OR-product bind, two unbind modes.
//!
//! [`registry`] resolves a strategy by name; [`topk`] layers a generic
//! nearest-neighbor scan on top of `similarity` for every strategy at
//! once.
//!
//! # Quick start
//!
//! ```
//! use hdc_algebra::{DenseBinaryStrategy, Strategy};
//!
//! let s = DenseBinaryStrategy;
//! let cat = s.create_from_name("cat", 2048, "animals").unwrap();
//! let dog = s.create_from_name("dog", 2048, "animals").unwrap();
//! let bundle = s.bundle(&[cat.clone(), dog], None).unwrap();
//! assert!(s.similarity(&bundle, &cat).unwrap() > 0.6);
//! ```
//!
//! This crate is synchronous, allocation-only, and has no I/O: callers
//! own persistence, concurrency, and wall-clock deadlines. The
//! self-describing serialization blobs ([`strategy::VectorBlob`],
//! [`strategy::KbBlob`]) are the only wire format it defines.
//!
//! # Modules
//!
//! - [`hash`]: DJB2 hashing and the SplitMix64 PRNG every strategy's
//!   determinism bottoms out in.
//! - [`strategy`]: the trait contract plus shared vector/metadata types.
//! - [`dense_binary`], [`metric_affine`], [`metric_affine_elastic`],
//!   [`sparse_poly`], [`exact`]: the five concrete representations.
//! - [`registry`]: name → strategy resolution and the EXACT session
//!   factory.
//! - [`topk`]: generic nearest-neighbor search atop `similarity`.

pub mod dense_binary;
pub mod error;
pub mod exact;
pub mod hash;
pub mod metric_affine;
pub mod metric_affine_elastic;
pub mod registry;
pub mod sparse_poly;
pub mod strategy;
pub mod topk;

pub use dense_binary::{DenseBinaryStrategy, DenseBinaryVector};
pub use error::{HdcError, Result};
pub use exact::{ExactConfig, ExactStrategy, ExactVector, UnbindMode};
pub use metric_affine::{MetricAffineStrategy, MetricAffineVector};
pub use metric_affine_elastic::{ElasticVector, MeanChunk, MetricAffineElasticStrategy};
pub use registry::{default_strategy, exact_session, resolve};
pub use sparse_poly::{SparsePolyStrategy, SparsePolyVector};
pub use strategy::{
    HolographicThresholds, KbBlob, KbEntry, KbFact, ReasoningThresholds, SessionStats, Strategy,
    StrategyMeta, Vector, VectorBlob,
};
