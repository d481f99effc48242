//! Scalar precision abstraction.
//!
//! Every group in this crate is generic over a [`Real`] scalar. A `Real` ties the
//! floating point type to the glam vector, matrix and quaternion types of the same
//! precision and carries the numeric thresholds the algorithms branch on:
//!
//! | scalar | `Vec3` | `Mat3` | `Mat4` | `Quat` | `SMALL_EPSILON` |
//! |--------|--------|--------|--------|--------|-----------------|
//! | `f32`  | [`glam::Vec3`]  | [`glam::Mat3`]  | [`glam::Mat4`]  | [`glam::Quat`]  | `1e-5`  |
//! | `f64`  | [`glam::DVec3`] | [`glam::DMat3`] | [`glam::DMat4`] | [`glam::DQuat`] | `1e-10` |
//!
//! The small capability traits below ([`Vector3`], [`Matrix3`], [`Matrix4`],
//! [`Quaternion`]) expose the subset of the glam API the algorithms need, so a single
//! generic implementation serves both precisions.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Index, Mul, Neg, Sub, SubAssign};

use num_traits::{Float, FloatConst};
use rand::Rng;

/// Column vector in R³.
pub trait Vector3<T>:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<T, Output = Self>
    + Div<T, Output = Self>
    + AddAssign
    + SubAssign
    + Index<usize, Output = T>
{
    /// All zeros.
    const ZERO: Self;

    /// Create a vector from its components.
    fn new(x: T, y: T, z: T) -> Self;

    /// Create a vector from `[x, y, z]`.
    fn from_array(arr: [T; 3]) -> Self;

    /// Components as `[x, y, z]`.
    fn to_array(&self) -> [T; 3];

    /// Dot product.
    fn dot(self, rhs: Self) -> T;

    /// Cross product.
    fn cross(self, rhs: Self) -> Self;

    /// Euclidean norm.
    fn length(self) -> T;

    /// Squared Euclidean norm.
    fn length_squared(self) -> T;
}

/// 3x3 column-major matrix.
pub trait Matrix3<T: Copy, V: Vector3<T>>:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<Output = Self>
    + Mul<V, Output = V>
    + Mul<T, Output = Self>
{
    /// Identity matrix.
    const IDENTITY: Self;

    /// All zeros.
    const ZERO: Self;

    /// Create a matrix from its three columns.
    fn from_cols(x_axis: V, y_axis: V, z_axis: V) -> Self;

    /// Create a matrix from a column-major array.
    fn from_cols_array(arr: &[T; 9]) -> Self;

    /// Column-major array of the entries.
    fn to_cols_array(&self) -> [T; 9];

    /// Column `index` (0, 1 or 2).
    fn col(&self, index: usize) -> V;

    /// Transposed matrix.
    fn transpose(&self) -> Self;

    /// Determinant.
    fn determinant(&self) -> T;

    /// Entry at `row`, `col`.
    #[inline]
    fn at(&self, row: usize, col: usize) -> T {
        self.col(col)[row]
    }

    /// Create a matrix from row-major nested arrays.
    #[inline]
    fn from_rows(rows: &[[T; 3]; 3]) -> Self {
        Self::from_cols_array(&[
            rows[0][0], rows[1][0], rows[2][0], //
            rows[0][1], rows[1][1], rows[2][1], //
            rows[0][2], rows[1][2], rows[2][2],
        ])
    }
}

/// 4x4 column-major matrix.
pub trait Matrix4<T: Copy>:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Mul<T, Output = Self>
{
    /// Identity matrix.
    const IDENTITY: Self;

    /// All zeros.
    const ZERO: Self;

    /// Create a matrix from a column-major array.
    fn from_cols_array(arr: &[T; 16]) -> Self;

    /// Column-major array of the entries.
    fn to_cols_array(&self) -> [T; 16];

    /// Entry at `row`, `col`.
    #[inline]
    fn at(&self, row: usize, col: usize) -> T {
        self.to_cols_array()[col * 4 + row]
    }

    /// Create a matrix from row-major nested arrays.
    #[inline]
    fn from_rows(rows: &[[T; 4]; 4]) -> Self {
        let mut cols = [rows[0][0]; 16];
        for (c, chunk) in cols.chunks_exact_mut(4).enumerate() {
            for (r, entry) in chunk.iter_mut().enumerate() {
                *entry = rows[r][c];
            }
        }
        Self::from_cols_array(&cols)
    }
}

/// Quaternion `x·i + y·j + z·k + w`, not necessarily of unit norm.
pub trait Quaternion<T: Float, V: Vector3<T>, M: Matrix3<T, V>>:
    Copy + Debug + PartialEq + Add<Output = Self> + Neg<Output = Self> + Mul<T, Output = Self>
{
    /// Identity rotation `(0, 0, 0, 1)`.
    const IDENTITY: Self;

    /// Create a quaternion from its components.
    fn from_xyzw(x: T, y: T, z: T, w: T) -> Self;

    /// Create a quaternion from `[x, y, z, w]`.
    fn from_array(arr: [T; 4]) -> Self;

    /// Components as `[x, y, z, w]`.
    fn to_array(&self) -> [T; 4];

    /// Conjugate `(-x, -y, -z, w)`.
    fn conjugate(self) -> Self;

    /// Four-dimensional dot product.
    fn dot(self, rhs: Self) -> T;

    /// Norm of the quaternion.
    fn length(self) -> T;

    /// Squared norm of the quaternion.
    fn length_squared(self) -> T;

    /// Unit quaternion of a rotation matrix.
    fn from_rotation_matrix(mat: &M) -> Self;

    /// Rotation matrix of a unit quaternion.
    fn to_rotation_matrix(self) -> M;

    /// Hamilton product `self · rhs`, valid for quaternions of any norm.
    #[inline]
    fn hamilton(self, rhs: Self) -> Self {
        let [x0, y0, z0, w0] = self.to_array();
        let [x1, y1, z1, w1] = rhs.to_array();
        Self::from_xyzw(
            w0 * x1 + x0 * w1 + y0 * z1 - z0 * y1,
            w0 * y1 - x0 * z1 + y0 * w1 + z0 * x1,
            w0 * z1 + x0 * y1 - y0 * x1 + z0 * w1,
            w0 * w1 - x0 * x1 - y0 * y1 - z0 * z1,
        )
    }

    /// Vector part `(x, y, z)`.
    #[inline]
    fn vec(&self) -> V {
        let [x, y, z, _] = self.to_array();
        V::new(x, y, z)
    }

    /// Scalar part `w`.
    #[inline]
    fn w(&self) -> T {
        self.to_array()[3]
    }
}

/// Floating point precision used by the Lie groups of this crate.
///
/// Implemented for `f32` and `f64`.
pub trait Real:
    Float
    + FloatConst
    + Default
    + Debug
    + Send
    + Sync
    + 'static
    + approx::AbsDiffEq<Epsilon = Self>
    + approx::RelativeEq<Epsilon = Self>
{
    /// Vector in R³ of this precision.
    type Vec3: Vector3<Self>;
    /// 3x3 matrix of this precision.
    type Mat3: Matrix3<Self, Self::Vec3>;
    /// 4x4 matrix of this precision.
    type Mat4: Matrix4<Self>;
    /// Quaternion of this precision.
    type Quat: Quaternion<Self, Self::Vec3, Self::Mat3>;

    /// Zero.
    const ZERO: Self;
    /// One.
    const ONE: Self;

    /// Threshold below which angles, log-scales and their squares switch to the
    /// Taylor-limit branches.
    const SMALL_EPSILON: Self;

    /// Largest accepted deviation of `MᵀM / s²` from the identity for a matrix `M`
    /// claimed to be `s` times a rotation.
    const SCALED_ORTHOGONAL_TOLERANCE: Self;

    /// Convert an `f64` literal to this precision.
    fn from_f64(value: f64) -> Self;

    /// Widen to `f64`.
    fn as_f64(self) -> f64;

    /// Uniform sample in `[0, 1)`.
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

macro_rules! impl_real {
    (
        $scalar:ty,
        $vec3:ty,
        $mat3:ty,
        $mat4:ty,
        $quat:ty,
        small_epsilon = $small:expr,
        orthogonal_tolerance = $ortho:expr
    ) => {
        impl Vector3<$scalar> for $vec3 {
            const ZERO: Self = <$vec3>::ZERO;

            #[inline]
            fn new(x: $scalar, y: $scalar, z: $scalar) -> Self {
                <$vec3>::new(x, y, z)
            }

            #[inline]
            fn from_array(arr: [$scalar; 3]) -> Self {
                <$vec3>::from_array(arr)
            }

            #[inline]
            fn to_array(&self) -> [$scalar; 3] {
                <$vec3>::to_array(self)
            }

            #[inline]
            fn dot(self, rhs: Self) -> $scalar {
                <$vec3>::dot(self, rhs)
            }

            #[inline]
            fn cross(self, rhs: Self) -> Self {
                <$vec3>::cross(self, rhs)
            }

            #[inline]
            fn length(self) -> $scalar {
                <$vec3>::length(self)
            }

            #[inline]
            fn length_squared(self) -> $scalar {
                <$vec3>::length_squared(self)
            }
        }

        impl Matrix3<$scalar, $vec3> for $mat3 {
            const IDENTITY: Self = <$mat3>::IDENTITY;
            const ZERO: Self = <$mat3>::ZERO;

            #[inline]
            fn from_cols(x_axis: $vec3, y_axis: $vec3, z_axis: $vec3) -> Self {
                <$mat3>::from_cols(x_axis, y_axis, z_axis)
            }

            #[inline]
            fn from_cols_array(arr: &[$scalar; 9]) -> Self {
                <$mat3>::from_cols_array(arr)
            }

            #[inline]
            fn to_cols_array(&self) -> [$scalar; 9] {
                <$mat3>::to_cols_array(self)
            }

            #[inline]
            fn col(&self, index: usize) -> $vec3 {
                <$mat3>::col(self, index)
            }

            #[inline]
            fn transpose(&self) -> Self {
                <$mat3>::transpose(self)
            }

            #[inline]
            fn determinant(&self) -> $scalar {
                <$mat3>::determinant(self)
            }
        }

        impl Matrix4<$scalar> for $mat4 {
            const IDENTITY: Self = <$mat4>::IDENTITY;
            const ZERO: Self = <$mat4>::ZERO;

            #[inline]
            fn from_cols_array(arr: &[$scalar; 16]) -> Self {
                <$mat4>::from_cols_array(arr)
            }

            #[inline]
            fn to_cols_array(&self) -> [$scalar; 16] {
                <$mat4>::to_cols_array(self)
            }
        }

        impl Quaternion<$scalar, $vec3, $mat3> for $quat {
            const IDENTITY: Self = <$quat>::IDENTITY;

            #[inline]
            fn from_xyzw(x: $scalar, y: $scalar, z: $scalar, w: $scalar) -> Self {
                <$quat>::from_xyzw(x, y, z, w)
            }

            #[inline]
            fn from_array(arr: [$scalar; 4]) -> Self {
                <$quat>::from_array(arr)
            }

            #[inline]
            fn to_array(&self) -> [$scalar; 4] {
                <$quat>::to_array(self)
            }

            #[inline]
            fn conjugate(self) -> Self {
                <$quat>::conjugate(self)
            }

            #[inline]
            fn dot(self, rhs: Self) -> $scalar {
                <$quat>::dot(self, rhs)
            }

            #[inline]
            fn length(self) -> $scalar {
                <$quat>::length(self)
            }

            #[inline]
            fn length_squared(self) -> $scalar {
                <$quat>::length_squared(self)
            }

            #[inline]
            fn from_rotation_matrix(mat: &$mat3) -> Self {
                <$quat>::from_mat3(mat)
            }

            #[inline]
            fn to_rotation_matrix(self) -> $mat3 {
                <$mat3>::from_quat(self)
            }
        }

        impl Real for $scalar {
            type Vec3 = $vec3;
            type Mat3 = $mat3;
            type Mat4 = $mat4;
            type Quat = $quat;

            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const SMALL_EPSILON: Self = $small;
            const SCALED_ORTHOGONAL_TOLERANCE: Self = $ortho;

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $scalar
            }

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
                rng.random::<$scalar>()
            }
        }
    };
}

impl_real!(
    f32,
    glam::Vec3,
    glam::Mat3,
    glam::Mat4,
    glam::Quat,
    small_epsilon = 1.0e-5,
    orthogonal_tolerance = 1.0e-4
);

impl_real!(
    f64,
    glam::DVec3,
    glam::DMat3,
    glam::DMat4,
    glam::DQuat,
    small_epsilon = 1.0e-10,
    orthogonal_tolerance = 1.0e-8
);
