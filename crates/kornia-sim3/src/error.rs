/// Errors raised when building group elements from invalid input.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LieError {
    /// The quaternion has (near) zero norm, so it encodes neither a rotation nor a scale.
    #[error("Quaternion norm {norm} is below the small-angle threshold")]
    ZeroQuaternion {
        /// Norm of the rejected quaternion.
        norm: f64,
    },

    /// The requested scale is not strictly positive.
    #[error("Scale must be positive, got {scale}")]
    NonPositiveScale {
        /// The rejected scale.
        scale: f64,
    },

    /// The matrix is not a positive multiple of a rotation.
    #[error("Matrix is not scaled-orthogonal (residual {residual})")]
    NotScaledOrthogonal {
        /// Largest deviation of `MᵀM / s²` from the identity.
        residual: f64,
    },

    /// The matrix determinant is not positive.
    #[error("Matrix determinant must be positive, got {determinant}")]
    NonPositiveDeterminant {
        /// Determinant of the rejected matrix.
        determinant: f64,
    },

    /// The last row of a homogeneous matrix is not `(0, 0, 0, 1)`.
    #[error("Homogeneous matrix last row must be (0, 0, 0, 1), got {row:?}")]
    NotHomogeneous {
        /// The rejected last row.
        row: [f64; 4],
    },

    /// The generator index is outside the tangent dimension.
    #[error("Generator index {index} out of range 0..{dim}")]
    GeneratorIndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Tangent space dimension.
        dim: usize,
    },

    /// A borrowed parameter buffer is too short.
    #[error("Buffer too small: expected at least {expected} scalars, got {got}")]
    BufferTooSmall {
        /// Required number of scalars.
        expected: usize,
        /// Length of the provided buffer.
        got: usize,
    },
}
