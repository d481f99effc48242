//! # RxSO(3): rotation and uniform scale
//!
//! [`RxSO3`] represents `s·R` with `s > 0` and `R ∈ SO(3)` as a single non-zero
//! quaternion `q`: the scale is `‖q‖` and the rotation is `q / ‖q‖`. Composition is the
//! quaternion product, whose norm is the product of the scales.
//!
//! The tangent space is R⁴, ordered `(ω, σ)` with `ω` the rotation vector and
//! `σ = ln s` the log-scale.

use std::ops::{Mul, MulAssign};

use rand::Rng;

use crate::error::LieError;
use crate::lie::so3::SO3;
use crate::param::{check_sizes, Param, ParamError};
use crate::real::{Matrix3, Quaternion, Real, Vector3};

/// Tangent vector of RxSO(3), ordered `[ωx, ωy, ωz, σ]`.
pub type RxSO3Tangent<T> = [T; 4];

/// A rotation combined with a positive uniform scale, stored as a non-zero quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RxSO3<T: Real> {
    q: T::Quat,
}

impl<T: Real> RxSO3<T> {
    /// Tangent space dimension.
    pub const DOF: usize = 4;

    /// Identity: no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        q: T::Quat::IDENTITY,
    };

    /// Create an element from a non-zero quaternion whose norm is the scale.
    ///
    /// # Panics
    ///
    /// If the quaternion norm is below [`Real::SMALL_EPSILON`].
    pub fn from_quaternion(quat: T::Quat) -> Self {
        match Self::try_from_quaternion(quat) {
            Ok(rxso3) => rxso3,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create an element from a non-zero quaternion whose norm is the scale.
    pub fn try_from_quaternion(quat: T::Quat) -> Result<Self, LieError> {
        let norm = quat.length();
        if norm < T::SMALL_EPSILON {
            log::debug!("rejecting rotation-scale quaternion {quat:?} with norm {norm:?}");
            return Err(LieError::ZeroQuaternion {
                norm: norm.as_f64(),
            });
        }
        Ok(Self { q: quat })
    }

    /// Wrap a quaternion without checking its norm. Used by buffer views.
    #[inline]
    pub(crate) fn from_quaternion_unchecked(quat: T::Quat) -> Self {
        Self { q: quat }
    }

    /// Create an element from a scale and a unit quaternion.
    ///
    /// # Panics
    ///
    /// If `scale` is below [`Real::SMALL_EPSILON`].
    pub fn from_scale_quaternion(scale: T, rotation: T::Quat) -> Self {
        assert_positive_scale(scale);
        Self {
            q: SO3::<T>::from_quaternion(rotation).quaternion() * scale,
        }
    }

    /// Create an element from a scale and a rotation matrix.
    ///
    /// # Panics
    ///
    /// If `scale` is below [`Real::SMALL_EPSILON`].
    pub fn from_scale_matrix(scale: T, rotation: &T::Mat3) -> Self {
        assert_positive_scale(scale);
        Self {
            q: SO3::<T>::from_matrix(rotation).quaternion() * scale,
        }
    }

    /// Create an element from a scale and a rotation.
    ///
    /// # Panics
    ///
    /// If `scale` is below [`Real::SMALL_EPSILON`].
    pub fn from_scale_rotation(scale: T, rotation: SO3<T>) -> Self {
        assert_positive_scale(scale);
        Self {
            q: rotation.quaternion() * scale,
        }
    }

    /// Create an element from a matrix `s·R`.
    ///
    /// # Panics
    ///
    /// If the matrix is not scaled-orthogonal with positive determinant.
    pub fn from_scaled_rotation_matrix(mat: &T::Mat3) -> Self {
        match Self::try_from_scaled_rotation_matrix(mat) {
            Ok(rxso3) => rxso3,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create an element from a matrix `s·R`, checking that `MᵀM = s²·I` and `det M > 0`.
    pub fn try_from_scaled_rotation_matrix(mat: &T::Mat3) -> Result<Self, LieError> {
        let det = mat.determinant();
        if det <= T::ZERO {
            log::debug!("rejecting scaled rotation with determinant {det:?}");
            return Err(LieError::NonPositiveDeterminant {
                determinant: det.as_f64(),
            });
        }

        let scale = det.cbrt();
        if scale < T::SMALL_EPSILON {
            return Err(LieError::NonPositiveScale {
                scale: scale.as_f64(),
            });
        }

        let gram = mat.transpose() * *mat * (scale * scale).recip() - T::Mat3::IDENTITY;
        let residual = gram
            .to_cols_array()
            .iter()
            .fold(T::ZERO, |acc, x| acc.max(x.abs()));
        if residual > T::SCALED_ORTHOGONAL_TOLERANCE {
            log::debug!("rejecting matrix with orthogonality residual {residual:?}");
            return Err(LieError::NotScaledOrthogonal {
                residual: residual.as_f64(),
            });
        }

        let rotation = *mat * scale.recip();
        Ok(Self {
            q: SO3::<T>::from_matrix(&rotation).quaternion() * scale,
        })
    }

    /// Create an element from `[x, y, z, w]`.
    ///
    /// # Panics
    ///
    /// If the quaternion norm is below [`Real::SMALL_EPSILON`].
    pub fn from_array(arr: [T; 4]) -> Self {
        Self::from_quaternion(T::Quat::from_array(arr))
    }

    /// Quaternion components as `[x, y, z, w]`.
    #[inline]
    pub fn to_array(&self) -> [T; 4] {
        self.q.to_array()
    }

    /// Sample a uniform rotation and a scale `exp(σ)` with `σ` uniform in `[-1, 1)`.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let rotation = SO3::<T>::from_rng(rng);
        let sigma = T::from_f64(2.0) * T::sample(rng) - T::ONE;
        Self::from_scale_rotation(sigma.exp(), rotation)
    }

    /// Sample a random element from the thread-local generator.
    pub fn from_random() -> Self {
        Self::from_rng(&mut rand::rng())
    }

    /// The stored quaternion; its norm is the scale.
    #[inline]
    pub fn quaternion(&self) -> T::Quat {
        self.q
    }

    /// Replace the stored quaternion.
    ///
    /// # Panics
    ///
    /// If the quaternion norm is below [`Real::SMALL_EPSILON`].
    pub fn set_quaternion(&mut self, quat: T::Quat) {
        *self = Self::from_quaternion(quat);
    }

    /// The scale `‖q‖`.
    #[inline]
    pub fn scale(&self) -> T {
        self.q.length()
    }

    /// Change the scale, keeping the rotation.
    ///
    /// # Panics
    ///
    /// If `scale` is below [`Real::SMALL_EPSILON`].
    pub fn set_scale(&mut self, scale: T) {
        assert_positive_scale(scale);
        self.q = self.q * (scale / self.scale());
    }

    /// The rotation part.
    #[inline]
    pub fn rotation(&self) -> SO3<T> {
        SO3::<T>::from_unit_quaternion(self.q * self.scale().recip())
    }

    /// The 3x3 rotation matrix `R`.
    #[inline]
    pub fn rotation_matrix(&self) -> T::Mat3 {
        self.rotation().matrix()
    }

    /// Replace the rotation, keeping the scale.
    pub fn set_rotation_matrix(&mut self, rotation: &T::Mat3) {
        let scale = self.scale();
        self.q = SO3::<T>::from_matrix(rotation).quaternion() * scale;
    }

    /// The matrix `s·R`.
    #[inline]
    pub fn matrix(&self) -> T::Mat3 {
        self.rotation_matrix() * self.scale()
    }

    /// Replace both rotation and scale from a matrix `s·R`.
    ///
    /// # Panics
    ///
    /// If the matrix is not scaled-orthogonal with positive determinant.
    pub fn set_scaled_rotation_matrix(&mut self, mat: &T::Mat3) {
        *self = Self::from_scaled_rotation_matrix(mat);
    }

    /// The inverse `q̄ / ‖q‖²`, with scale `1/s`.
    #[inline]
    pub fn inverse(&self) -> Self {
        Self {
            q: self.q.conjugate() * self.q.length_squared().recip(),
        }
    }

    /// Apply `s·R` to a point.
    #[inline]
    pub fn transform_point(&self, p: T::Vec3) -> T::Vec3 {
        self.matrix() * p
    }

    /// The 4x4 adjoint, row-major: `R` on the rotation block and `1` on the scale entry.
    pub fn adjoint(&self) -> [[T; 4]; 4] {
        let r = self.rotation_matrix();
        let mut adj = [[T::ZERO; 4]; 4];
        for (i, row) in adj.iter_mut().take(3).enumerate() {
            for (j, entry) in row.iter_mut().take(3).enumerate() {
                *entry = r.at(i, j);
            }
        }
        adj[3][3] = T::ONE;
        adj
    }

    /// Lie algebra matrix `[ω]× + σ·I`.
    #[inline]
    pub fn hat(a: &RxSO3Tangent<T>) -> T::Mat3 {
        SO3::<T>::hat(T::Vec3::new(a[0], a[1], a[2])) + T::Mat3::IDENTITY * a[3]
    }

    /// Inverse of [`RxSO3::hat`].
    #[inline]
    pub fn vee(omega: &T::Mat3) -> RxSO3Tangent<T> {
        let w = SO3::<T>::vee(omega);
        [w[0], w[1], w[2], omega.at(0, 0)]
    }

    /// The `i`-th Lie algebra generator.
    ///
    /// # Panics
    ///
    /// If `i >= 4`.
    pub fn generator(i: usize) -> T::Mat3 {
        match Self::try_generator(i) {
            Ok(g) => g,
            Err(e) => panic!("{e}"),
        }
    }

    /// The `i`-th Lie algebra generator, or an error if `i >= 4`.
    pub fn try_generator(i: usize) -> Result<T::Mat3, LieError> {
        if i >= Self::DOF {
            return Err(LieError::GeneratorIndexOutOfRange {
                index: i,
                dim: Self::DOF,
            });
        }
        let mut e = [T::ZERO; 4];
        e[i] = T::ONE;
        Ok(Self::hat(&e))
    }

    /// Exponential map.
    #[inline]
    pub fn exp(a: &RxSO3Tangent<T>) -> Self {
        Self::exp_and_theta(a).0
    }

    /// Exponential map that also reports the rotation angle `θ = ‖ω‖`.
    pub fn exp_and_theta(a: &RxSO3Tangent<T>) -> (Self, T) {
        let (rotation, theta) = SO3::<T>::exp_and_theta(T::Vec3::new(a[0], a[1], a[2]));
        let scale = a[3].exp();
        (
            Self {
                q: rotation.quaternion() * scale,
            },
            theta,
        )
    }

    /// Logarithm map.
    #[inline]
    pub fn log(&self) -> RxSO3Tangent<T> {
        self.log_and_theta().0
    }

    /// Logarithm map that also reports the rotation angle `θ ∈ [0, π]`.
    pub fn log_and_theta(&self) -> (RxSO3Tangent<T>, T) {
        let scale = self.scale();
        let (omega, theta) = self.rotation().log_and_theta();
        ([omega[0], omega[1], omega[2], scale.ln()], theta)
    }

    /// Change the scalar precision.
    pub fn cast<U: Real>(&self) -> RxSO3<U> {
        let [x, y, z, w] = self.q.to_array();
        RxSO3 {
            q: U::Quat::from_xyzw(
                U::from_f64(x.as_f64()),
                U::from_f64(y.as_f64()),
                U::from_f64(z.as_f64()),
                U::from_f64(w.as_f64()),
            ),
        }
    }
}

fn assert_positive_scale<T: Real>(scale: T) {
    if scale.is_nan() || scale < T::SMALL_EPSILON {
        panic!(
            "{}",
            LieError::NonPositiveScale {
                scale: scale.as_f64()
            }
        );
    }
}

impl<T: Real> Default for RxSO3<T> {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl<T: Real> Mul for RxSO3<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let q = self.q.hamilton(rhs.q);
        let scale = q.length();
        if scale < T::SMALL_EPSILON {
            log::debug!("rotation-scale product underflowed to scale {scale:?}, saturating");
            return Self {
                q: q * (T::SMALL_EPSILON / scale),
            };
        }
        Self { q }
    }
}

impl<T: Real> MulAssign for RxSO3<T> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<T: Real> Param<T> for RxSO3<T> {
    const GLOBAL_SIZE: usize = 4;
    const LOCAL_SIZE: usize = 4;

    fn plus(x: &[T], delta: &[T], out: &mut [T]) -> Result<(), ParamError> {
        check_sizes::<T, Self>(x, delta, out)?;

        let rxso3 = Self::try_from_quaternion(T::Quat::from_array([x[0], x[1], x[2], x[3]]))?;
        let tau = [delta[0], delta[1], delta[2], delta[3]];
        let rxso3_plus = rxso3 * Self::exp(&tau);
        out[..Self::GLOBAL_SIZE].copy_from_slice(&rxso3_plus.to_array());
        Ok(())
    }
}

impl<T: Real> approx::AbsDiffEq for RxSO3<T> {
    type Epsilon = T;

    fn default_epsilon() -> T {
        <T as approx::AbsDiffEq>::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: T) -> bool {
        approx::AbsDiffEq::abs_diff_eq(&self.to_array()[..], &other.to_array()[..], epsilon)
    }
}

impl<T: Real> approx::RelativeEq for RxSO3<T> {
    fn default_max_relative() -> T {
        <T as approx::RelativeEq>::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: T, max_relative: T) -> bool {
        approx::RelativeEq::relative_eq(
            &self.to_array()[..],
            &other.to_array()[..],
            epsilon,
            max_relative,
        )
    }
}
