//! Local parameterization traits for optimization on manifolds.
use thiserror::Error;

use crate::error::LieError;
use crate::real::Real;

/// Errors raised by [`Param::plus`].
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    /// The input global parameter block `x` is too small.
    #[error("global parameter block has wrong size: expected {expected}, got {got}")]
    WrongGlobalSize {
        /// Required number of scalars.
        expected: usize,
        /// Provided number of scalars.
        got: usize,
    },

    /// The input local update `delta` is too small.
    #[error("local update has wrong size: expected {expected}, got {got}")]
    WrongLocalSize {
        /// Required number of scalars.
        expected: usize,
        /// Provided number of scalars.
        got: usize,
    },

    /// The output buffer `out` is too small.
    #[error("output buffer has wrong size: expected {expected}, got {got}")]
    WrongOutSize {
        /// Required number of scalars.
        expected: usize,
        /// Provided number of scalars.
        got: usize,
    },

    /// The global parameter block does not encode a valid group element.
    #[error(transparent)]
    InvalidParameters(#[from] LieError),
}

/// A parameter block with a right retraction `x ⊞ δ = x ∘ exp(δ)`.
pub trait Param<T: Real> {
    /// Size of the global parameter block (as stored in the variable).
    const GLOBAL_SIZE: usize;

    /// Size of the local update (tangent space dimension).
    const LOCAL_SIZE: usize;

    /// Apply a local update `delta` to a global parameter block `x`: `out = x ∘ exp(delta)`.
    fn plus(x: &[T], delta: &[T], out: &mut [T]) -> Result<(), ParamError>;
}

/// Check the buffer lengths passed to [`Param::plus`].
pub(crate) fn check_sizes<T: Real, P: Param<T>>(
    x: &[T],
    delta: &[T],
    out: &[T],
) -> Result<(), ParamError> {
    if x.len() < P::GLOBAL_SIZE {
        return Err(ParamError::WrongGlobalSize {
            expected: P::GLOBAL_SIZE,
            got: x.len(),
        });
    }
    if delta.len() < P::LOCAL_SIZE {
        return Err(ParamError::WrongLocalSize {
            expected: P::LOCAL_SIZE,
            got: delta.len(),
        });
    }
    if out.len() < P::GLOBAL_SIZE {
        return Err(ParamError::WrongOutSize {
            expected: P::GLOBAL_SIZE,
            got: out.len(),
        });
    }
    Ok(())
}
