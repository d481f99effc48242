//! # SO(3): rotations in 3D
//!
//! [`SO3`] stores a rotation as a unit quaternion `(x, y, z, w)`. The quaternions `q`
//! and `-q` describe the same rotation; [`SO3::log`] always returns the shortest-path
//! rotation vector, i.e. an angle in `[0, π]`.
//!
//! The Lie algebra so(3) is identified with R³ through [`SO3::hat`], which builds the
//! skew-symmetric matrix `[v]×` such that `[v]× p = v × p`.
//!
//! The exponential and logarithm maps switch to Taylor expansions of `cos(θ/2)`,
//! `sin(θ/2)/θ` and `2·atan(n/w)/n` when the angle drops below
//! [`Real::SMALL_EPSILON`].

use std::ops::{Mul, MulAssign};

use rand::Rng;

use crate::error::LieError;
use crate::real::{Matrix3, Quaternion, Real, Vector3};

/// A 3D rotation, stored as a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SO3<T: Real> {
    q: T::Quat,
}

impl<T: Real> SO3<T> {
    /// The identity rotation.
    pub const IDENTITY: Self = Self {
        q: T::Quat::IDENTITY,
    };

    /// Create a rotation from a quaternion. See [`SO3::from_quaternion`].
    #[inline]
    pub fn new(quat: T::Quat) -> Self {
        Self::from_quaternion(quat)
    }

    /// Create a rotation from any non-zero quaternion. The quaternion is normalized.
    ///
    /// # Panics
    ///
    /// If the quaternion norm is below [`Real::SMALL_EPSILON`].
    pub fn from_quaternion(quat: T::Quat) -> Self {
        match Self::try_from_quaternion(quat) {
            Ok(rot) => rot,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a rotation from any non-zero quaternion, normalizing it.
    pub fn try_from_quaternion(quat: T::Quat) -> Result<Self, LieError> {
        let norm = quat.length();
        if norm < T::SMALL_EPSILON {
            log::debug!("rejecting quaternion {quat:?} with norm {norm:?}");
            return Err(LieError::ZeroQuaternion {
                norm: norm.as_f64(),
            });
        }
        Ok(Self {
            q: quat * norm.recip(),
        })
    }

    /// Wrap a quaternion that is already of unit norm.
    #[inline]
    pub(crate) fn from_unit_quaternion(quat: T::Quat) -> Self {
        Self { q: quat }
    }

    /// Create a rotation from a rotation matrix.
    pub fn from_matrix(mat: &T::Mat3) -> Self {
        Self {
            q: T::Quat::from_rotation_matrix(mat),
        }
    }

    /// Create a rotation from `[x, y, z, w]`, normalizing it.
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

    /// Sample a uniformly distributed rotation (Shoemake's method).
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let r1 = T::sample(rng);
        let r2 = T::sample(rng);
        let r3 = T::sample(rng);

        let two_pi = T::PI() + T::PI();
        let one_minus_r1_sqrt = (T::ONE - r1).sqrt();
        let r1_sqrt = r1.sqrt();

        let w = one_minus_r1_sqrt * (two_pi * r2).cos();
        let x = one_minus_r1_sqrt * (two_pi * r2).sin();
        let y = r1_sqrt * (two_pi * r3).cos();
        let z = r1_sqrt * (two_pi * r3).sin();

        Self::from_quaternion(T::Quat::from_xyzw(x, y, z, w))
    }

    /// Sample a uniformly distributed rotation from the thread-local generator.
    pub fn from_random() -> Self {
        Self::from_rng(&mut rand::rng())
    }

    /// The unit quaternion.
    #[inline]
    pub fn quaternion(&self) -> T::Quat {
        self.q
    }

    /// The 3x3 rotation matrix.
    #[inline]
    pub fn matrix(&self) -> T::Mat3 {
        self.q.to_rotation_matrix()
    }

    /// The adjoint, which for SO(3) is the rotation matrix itself.
    #[inline]
    pub fn adjoint(&self) -> T::Mat3 {
        self.matrix()
    }

    /// The inverse rotation.
    #[inline]
    pub fn inverse(&self) -> Self {
        Self {
            q: self.q.conjugate(),
        }
    }

    /// Rotate a point.
    #[inline]
    pub fn transform_point(&self, p: T::Vec3) -> T::Vec3 {
        self.matrix() * p
    }

    /// Skew-symmetric matrix `[v]×` of a 3-vector.
    #[inline]
    pub fn hat(v: T::Vec3) -> T::Mat3 {
        let (a, b, c) = (v[0], v[1], v[2]);
        let zero = T::ZERO;
        T::Mat3::from_cols_array(&[zero, c, -b, -c, zero, a, b, -a, zero])
    }

    /// Inverse of [`SO3::hat`]: read the 3-vector from a skew-symmetric matrix.
    #[inline]
    pub fn vee(omega: &T::Mat3) -> T::Vec3 {
        T::Vec3::new(omega.at(2, 1), omega.at(0, 2), omega.at(1, 0))
    }

    /// Exponential map of a rotation vector.
    #[inline]
    pub fn exp(omega: T::Vec3) -> Self {
        Self::exp_and_theta(omega).0
    }

    /// Exponential map that also reports the rotation angle `θ = ‖ω‖`.
    pub fn exp_and_theta(omega: T::Vec3) -> (Self, T) {
        let theta_sq = omega.length_squared();
        let theta = theta_sq.sqrt();
        let half = T::from_f64(0.5);

        let (imag_factor, real_factor) = if theta < T::SMALL_EPSILON {
            let theta_po4 = theta_sq * theta_sq;
            (
                half - theta_sq / T::from_f64(48.0) + theta_po4 / T::from_f64(3840.0),
                T::ONE - theta_sq / T::from_f64(8.0) + theta_po4 / T::from_f64(384.0),
            )
        } else {
            let half_theta = half * theta;
            (half_theta.sin() / theta, half_theta.cos())
        };

        let xyz = omega * imag_factor;
        let q = T::Quat::from_xyzw(xyz[0], xyz[1], xyz[2], real_factor);
        (Self { q }, theta)
    }

    /// Logarithm map: shortest-path rotation vector.
    #[inline]
    pub fn log(&self) -> T::Vec3 {
        self.log_and_theta().0
    }

    /// Logarithm map that also reports the rotation angle `θ ∈ [0, π]`.
    pub fn log_and_theta(&self) -> (T::Vec3, T) {
        let vec = self.q.vec();
        let w = self.q.w();
        let squared_n = vec.length_squared();
        let n = squared_n.sqrt();

        let two_atan_nbyw_by_n = if n < T::SMALL_EPSILON {
            // 2·atan(n/w)/n ≈ 2/w - 2n²/(3w³)
            let two = T::from_f64(2.0);
            two / w - two / T::from_f64(3.0) * squared_n / (w * w * w)
        } else if w.abs() < T::SMALL_EPSILON {
            if w >= T::ZERO {
                T::PI() / n
            } else {
                -T::PI() / n
            }
        } else {
            T::from_f64(2.0) * (n / w).atan() / n
        };

        let theta = (two_atan_nbyw_by_n * n).abs();
        (vec * two_atan_nbyw_by_n, theta)
    }

    /// Change the scalar precision.
    pub fn cast<U: Real>(&self) -> SO3<U> {
        let [x, y, z, w] = self.q.to_array();
        SO3 {
            q: U::Quat::from_xyzw(
                U::from_f64(x.as_f64()),
                U::from_f64(y.as_f64()),
                U::from_f64(z.as_f64()),
                U::from_f64(w.as_f64()),
            ),
        }
    }
}

impl<T: Real> Default for SO3<T> {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl<T: Real> Mul for SO3<T> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            q: self.q.hamilton(rhs.q),
        }
    }
}

impl<T: Real> MulAssign for SO3<T> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<T: Real> approx::AbsDiffEq for SO3<T> {
    type Epsilon = T;

    fn default_epsilon() -> T {
        <T as approx::AbsDiffEq>::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: T) -> bool {
        approx::AbsDiffEq::abs_diff_eq(&self.to_array()[..], &other.to_array()[..], epsilon)
    }
}

impl<T: Real> approx::RelativeEq for SO3<T> {
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
