//! Error kinds for the strategy contract.

use thiserror::Error;

/// Errors signalled by strategy operations.
///
/// Resource ceilings in EXACT (monomial density, polynomial term count)
/// and SP's Cartesian-product cap are *not* represented here: those
/// collapse to a defined value (`⊤`, or a sparsified set) rather than
/// failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HdcError {
    /// Factory called with an invalid geometry for the strategy (e.g. a
    /// dense-binary width not a multiple of 32, or a non-positive value).
    #[error("invalid geometry {geometry} for strategy `{strategy_id}`: {reason}")]
    InvalidGeometry {
        strategy_id: &'static str,
        geometry: u64,
        reason: &'static str,
    },

    /// A binary operation was attempted between vectors of different
    /// geometry under the same strategy.
    #[error("geometry mismatch in strategy `{strategy_id}`: {a} vs {b}")]
    GeometryMismatch {
        strategy_id: &'static str,
        a: u64,
        b: u64,
    },

    /// A binary operation, or deserialization, mixed vectors (or a
    /// payload) belonging to different strategies.
    #[error("strategy mismatch: expected `{expected}`, found `{found}`")]
    StrategyMismatch {
        expected: &'static str,
        found: String,
    },

    /// `bindAll`/`bundle` called with no vectors.
    #[error("empty input to `{operation}`")]
    EmptyInput { operation: &'static str },

    /// Malformed argument that isn't covered by a more specific kind
    /// (negative index, non-UTF8 name, truncated payload, etc).
    #[error("invalid argument to `{operation}`: {reason}")]
    InvalidArgument {
        operation: &'static str,
        reason: String,
    },

    /// EXACT algebra invoked on a strategy handle with no session state.
    #[error(
        "strategy `exact` requires a session-local instance; call registry::exact_session() instead of using the shared handle"
    )]
    SessionRequired,

    /// An unknown strategy name was looked up in the registry.
    #[error("unknown strategy `{name}`; available: {available:?}")]
    UnknownStrategy { name: String, available: Vec<&'static str> },

    /// A serialized payload could not be parsed into the expected shape.
    #[error("malformed payload for strategy `{strategy_id}`: {reason}")]
    MalformedPayload {
        strategy_id: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, HdcError>;
