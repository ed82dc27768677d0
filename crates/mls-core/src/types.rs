//! Core types for the detection library
//!
//! The detection core runs entirely in the real domain: complex channel
//! matrices and symbol vectors are expanded into a real-valued system of
//! twice the dimension before they reach any algorithm in this crate.
//! Everything downstream of that expansion is expressed in the `Real`
//! scalar type defined here, so both search strategies evaluate the same
//! path-metric primitive in the same precision and their outputs stay
//! comparable.

/// Scalar type used throughout the detection core.
///
/// `f64` by default; enable the `f32` feature to run the whole core in
/// single precision.
#[cfg(not(feature = "f32"))]
pub type Real = f64;

/// Scalar type used throughout the detection core.
#[cfg(feature = "f32")]
pub type Real = f32;

/// Constellation index for one real dimension.
pub type SymbolIndex = u16;

/// Result type for detector operations.
pub type DetResult<T> = Result<T, DetectorError>;

/// Errors that can occur when constructing or invoking a detector.
///
/// All of these are contract violations caught up front. Numerical
/// degeneracy (a near-singular channel) is deliberately *not* an error:
/// measuring the resulting accuracy loss is the point of the simulator,
/// so a rank-deficient channel degrades metrics instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectorError {
    #[error("receive antenna count {rx} is less than transmit antenna count {tx}")]
    RxLessThanTx { rx: usize, tx: usize },

    #[error("antenna counts must be non-zero")]
    ZeroAntennas,

    #[error("unsupported constellation size {0}: must be a non-zero power of two")]
    UnsupportedModulation(usize),

    #[error("list width K must be at least 1, got {0}")]
    InvalidListWidth(usize),

    #[error("{what}: expected length {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}
