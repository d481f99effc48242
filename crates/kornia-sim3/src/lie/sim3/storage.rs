//! Sim(3) storage: the owning [`Sim3`] and the buffer views [`Sim3Map`] and [`Sim3MapRef`].
//!
//! All three keep the seven parameters contiguous as `[qx, qy, qz, qw, tx, ty, tz]`,
//! the rotation-scale quaternion followed by the translation, without padding.

use std::ops::{Mul, MulAssign};

use rand::Rng;

use super::base::{Sim3Base, Sim3BaseMut};
use super::kernels::calc_w;
use super::tangent::{self, Matrix7, Vector7};
use crate::error::LieError;
use crate::lie::rxso3::RxSO3;
use crate::lie::so3::SO3;
use crate::param::{check_sizes, Param, ParamError};
use crate::real::{Matrix3, Matrix4, Quaternion, Real, Vector3};

/// Number of stored parameters.
pub const NUM_PARAMS: usize = 7;

#[inline]
fn read_rxso3<T: Real>(params: &[T; NUM_PARAMS]) -> RxSO3<T> {
    RxSO3::<T>::from_quaternion_unchecked(T::Quat::from_xyzw(
        params[0], params[1], params[2], params[3],
    ))
}

#[inline]
fn read_translation<T: Real>(params: &[T; NUM_PARAMS]) -> T::Vec3 {
    T::Vec3::new(params[4], params[5], params[6])
}

#[inline]
fn write_rxso3<T: Real>(params: &mut [T; NUM_PARAMS], rxso3: &RxSO3<T>) {
    params[..4].copy_from_slice(&rxso3.to_array());
}

#[inline]
fn write_translation<T: Real>(params: &mut [T; NUM_PARAMS], translation: T::Vec3) {
    params[4..].copy_from_slice(&translation.to_array());
}

/// A 3D similarity transform `p ↦ s·R·p + t`, owning its seven parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct Sim3<T: Real> {
    params: [T; NUM_PARAMS],
}

impl<T: Real> Sim3<T> {
    /// Tangent space dimension.
    pub const DOF: usize = 7;

    /// The identity transform.
    pub const IDENTITY: Self = Self {
        params: [T::ZERO, T::ZERO, T::ZERO, T::ONE, T::ZERO, T::ZERO, T::ZERO],
    };

    /// Create an element from its rotation-scale and translation parts.
    #[inline]
    pub fn new(rxso3: RxSO3<T>, translation: T::Vec3) -> Self {
        let mut params = Self::IDENTITY.params;
        write_rxso3(&mut params, &rxso3);
        write_translation(&mut params, translation);
        Self { params }
    }

    /// Create an element from parameters `[qx, qy, qz, qw, tx, ty, tz]`.
    ///
    /// # Panics
    ///
    /// If the quaternion norm is below [`Real::SMALL_EPSILON`].
    pub fn from_params(params: [T; NUM_PARAMS]) -> Self {
        match Self::try_from_params(params) {
            Ok(sim3) => sim3,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create an element from parameters `[qx, qy, qz, qw, tx, ty, tz]`.
    pub fn try_from_params(params: [T; NUM_PARAMS]) -> Result<Self, LieError> {
        RxSO3::<T>::try_from_quaternion(read_rxso3(&params).quaternion())?;
        Ok(Self { params })
    }

    /// Create an element from a non-zero quaternion (norm = scale) and a translation.
    ///
    /// # Panics
    ///
    /// If the quaternion norm is below [`Real::SMALL_EPSILON`].
    pub fn from_quaternion_translation(quat: T::Quat, translation: T::Vec3) -> Self {
        Self::new(RxSO3::<T>::from_quaternion(quat), translation)
    }

    /// Create an element from a non-zero quaternion (norm = scale) and a translation.
    pub fn try_from_quaternion_translation(
        quat: T::Quat,
        translation: T::Vec3,
    ) -> Result<Self, LieError> {
        Ok(Self::new(RxSO3::<T>::try_from_quaternion(quat)?, translation))
    }

    /// Create an element from a scale, a rotation and a translation.
    ///
    /// # Panics
    ///
    /// If `scale` is below [`Real::SMALL_EPSILON`].
    pub fn from_scale_rotation_translation(
        scale: T,
        rotation: SO3<T>,
        translation: T::Vec3,
    ) -> Self {
        Self::new(RxSO3::from_scale_rotation(scale, rotation), translation)
    }

    /// Create an element from a homogeneous 4x4 matrix `[[s·R, t], [0, 1]]`.
    ///
    /// # Panics
    ///
    /// If the upper-left block is not scaled-orthogonal with positive determinant, or
    /// the last row is not `(0, 0, 0, 1)`.
    pub fn from_matrix(mat: &T::Mat4) -> Self {
        match Self::try_from_matrix(mat) {
            Ok(sim3) => sim3,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create an element from a homogeneous 4x4 matrix `[[s·R, t], [0, 1]]`.
    pub fn try_from_matrix(mat: &T::Mat4) -> Result<Self, LieError> {
        let last_row = [mat.at(3, 0), mat.at(3, 1), mat.at(3, 2), mat.at(3, 3)];
        let expected = [T::ZERO, T::ZERO, T::ZERO, T::ONE];
        let off = last_row
            .iter()
            .zip(expected.iter())
            .any(|(x, e)| (*x - *e).abs() > T::SCALED_ORTHOGONAL_TOLERANCE);
        if off {
            log::debug!("rejecting non-homogeneous matrix with last row {last_row:?}");
            return Err(LieError::NotHomogeneous {
                row: last_row.map(|x| x.as_f64()),
            });
        }

        let block = T::Mat3::from_rows(&[
            [mat.at(0, 0), mat.at(0, 1), mat.at(0, 2)],
            [mat.at(1, 0), mat.at(1, 1), mat.at(1, 2)],
            [mat.at(2, 0), mat.at(2, 1), mat.at(2, 2)],
        ]);
        let rxso3 = RxSO3::<T>::try_from_scaled_rotation_matrix(&block)?;
        let translation = T::Vec3::new(mat.at(0, 3), mat.at(1, 3), mat.at(2, 3));
        Ok(Self::new(rxso3, translation))
    }

    /// Sample a random element: see [`RxSO3::from_rng`], translation uniform in `[-1, 1)³`.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let rxso3 = RxSO3::<T>::from_rng(rng);
        let two = T::from_f64(2.0);
        let mut coord = || two * T::sample(rng) - T::ONE;
        let translation = T::Vec3::new(coord(), coord(), coord());
        Self::new(rxso3, translation)
    }

    /// Sample a random element from the thread-local generator.
    pub fn from_random() -> Self {
        Self::from_rng(&mut rand::rng())
    }

    /// The raw parameters `[qx, qy, qz, qw, tx, ty, tz]`.
    #[inline]
    pub fn data(&self) -> &[T; NUM_PARAMS] {
        &self.params
    }

    /// Mutable raw parameters. The quaternion must stay non-zero.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T; NUM_PARAMS] {
        &mut self.params
    }

    /// A mutable view over this element's parameters.
    #[inline]
    pub fn as_map(&mut self) -> Sim3Map<'_, T> {
        Sim3Map::new(&mut self.params)
    }

    /// Exponential map of a tangent vector `(υ, ω, σ)`.
    pub fn exp(a: &Vector7<T>) -> Self {
        let (upsilon, omega, sigma) = tangent::split::<T>(a);
        let (rxso3, theta) = RxSO3::<T>::exp_and_theta(&[omega[0], omega[1], omega[2], sigma]);

        let omega_hat = SO3::<T>::hat(omega);
        let w = calc_w(theta, sigma, rxso3.scale(), &omega_hat);
        Self::new(rxso3, w * upsilon)
    }

    /// Lie algebra matrix `[[[ω]× + σ·I, υ], [0, 0]]`.
    pub fn hat(a: &Vector7<T>) -> T::Mat4 {
        let top = RxSO3::<T>::hat(&[a[3], a[4], a[5], a[6]]);
        let zero = T::ZERO;
        T::Mat4::from_rows(&[
            [top.at(0, 0), top.at(0, 1), top.at(0, 2), a[0]],
            [top.at(1, 0), top.at(1, 1), top.at(1, 2), a[1]],
            [top.at(2, 0), top.at(2, 1), top.at(2, 2), a[2]],
            [zero, zero, zero, zero],
        ])
    }

    /// Inverse of [`Sim3::hat`].
    pub fn vee(omega: &T::Mat4) -> Vector7<T> {
        let top = T::Mat3::from_rows(&[
            [omega.at(0, 0), omega.at(0, 1), omega.at(0, 2)],
            [omega.at(1, 0), omega.at(1, 1), omega.at(1, 2)],
            [omega.at(2, 0), omega.at(2, 1), omega.at(2, 2)],
        ]);
        let [wx, wy, wz, sigma] = RxSO3::<T>::vee(&top);
        [
            omega.at(0, 3),
            omega.at(1, 3),
            omega.at(2, 3),
            wx,
            wy,
            wz,
            sigma,
        ]
    }

    /// The `i`-th Lie algebra generator: `0..3` translation, `3..6` rotation, `6` scale.
    ///
    /// # Panics
    ///
    /// If `i >= 7`.
    pub fn generator(i: usize) -> T::Mat4 {
        match Self::try_generator(i) {
            Ok(g) => g,
            Err(e) => panic!("{e}"),
        }
    }

    /// The `i`-th Lie algebra generator, or an error if `i >= 7`.
    pub fn try_generator(i: usize) -> Result<T::Mat4, LieError> {
        if i >= Self::DOF {
            return Err(LieError::GeneratorIndexOutOfRange {
                index: i,
                dim: Self::DOF,
            });
        }
        let mut e = [T::ZERO; 7];
        e[i] = T::ONE;
        Ok(Self::hat(&e))
    }

    /// Lie bracket `vee(hat(a)·hat(b) - hat(b)·hat(a))`.
    pub fn lie_bracket(a: &Vector7<T>, b: &Vector7<T>) -> Vector7<T> {
        let (upsilon_a, omega_a, sigma_a) = tangent::split::<T>(a);
        let (upsilon_b, omega_b, sigma_b) = tangent::split::<T>(b);

        let upsilon = omega_a.cross(upsilon_b) + upsilon_a.cross(omega_b) + upsilon_b * sigma_a
            - upsilon_a * sigma_b;
        let omega = omega_a.cross(omega_b);
        tangent::join::<T>(upsilon, omega, T::ZERO)
    }

    /// Jacobian of `lie_bracket(a, b)` with respect to `a`, for fixed `b`.
    pub fn d_lie_bracket_ab_by_d_a(b: &Vector7<T>) -> Matrix7<T> {
        let (upsilon_b, omega_b, sigma_b) = tangent::split::<T>(b);
        let omega_b_hat = SO3::<T>::hat(omega_b);

        let mut res = tangent::zeros::<T>();
        tangent::set_block::<T>(
            &mut res,
            0,
            0,
            &(-omega_b_hat - T::Mat3::IDENTITY * sigma_b),
        );
        tangent::set_block::<T>(&mut res, 0, 3, &(-SO3::<T>::hat(upsilon_b)));
        tangent::set_column::<T>(&mut res, 0, 6, upsilon_b);
        tangent::set_block::<T>(&mut res, 3, 3, &(-omega_b_hat));
        res
    }

    /// Right plus: `self ∘ exp(tau)`.
    #[inline]
    pub fn rplus(&self, tau: &Vector7<T>) -> Self {
        *self * Self::exp(tau)
    }

    /// Right minus: `log(self⁻¹ ∘ other)`.
    #[inline]
    pub fn rminus(&self, other: &Self) -> Vector7<T> {
        (self.inverse() * *other).log()
    }

    /// Left plus: `exp(tau) ∘ x`.
    #[inline]
    pub fn lplus(tau: &Vector7<T>, x: &Self) -> Self {
        Self::exp(tau) * *x
    }

    /// Left minus: `log(y ∘ x⁻¹)`.
    #[inline]
    pub fn lminus(y: &Self, x: &Self) -> Vector7<T> {
        (*y * x.inverse()).log()
    }
}

impl<T: Real> Default for Sim3<T> {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl<T: Real> Sim3Base<T> for Sim3<T> {
    #[inline]
    fn rxso3(&self) -> RxSO3<T> {
        read_rxso3(&self.params)
    }

    #[inline]
    fn translation(&self) -> T::Vec3 {
        read_translation(&self.params)
    }
}

impl<T: Real> Sim3BaseMut<T> for Sim3<T> {
    #[inline]
    fn set_rxso3(&mut self, rxso3: RxSO3<T>) {
        write_rxso3(&mut self.params, &rxso3);
    }

    #[inline]
    fn set_translation(&mut self, translation: T::Vec3) {
        write_translation(&mut self.params, translation);
    }
}

/// A Sim(3) element viewing a caller-owned, mutable buffer of seven scalars.
#[derive(Debug)]
pub struct Sim3Map<'a, T: Real> {
    params: &'a mut [T; NUM_PARAMS],
}

impl<'a, T: Real> Sim3Map<'a, T> {
    /// View a parameter block. The quaternion part must be non-zero.
    #[inline]
    pub fn new(params: &'a mut [T; NUM_PARAMS]) -> Self {
        Self { params }
    }

    /// View the first seven scalars of a slice.
    pub fn from_slice(slice: &'a mut [T]) -> Result<Self, LieError> {
        let got = slice.len();
        let params: &'a mut [T; NUM_PARAMS] = slice
            .get_mut(..NUM_PARAMS)
            .and_then(|s| s.try_into().ok())
            .ok_or(LieError::BufferTooSmall {
                expected: NUM_PARAMS,
                got,
            })?;
        Ok(Self { params })
    }

    /// The viewed parameters.
    #[inline]
    pub fn data(&self) -> &[T; NUM_PARAMS] {
        &*self.params
    }

    /// The viewed parameters, mutably. The quaternion must stay non-zero.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T; NUM_PARAMS] {
        &mut *self.params
    }
}

impl<T: Real> Sim3Base<T> for Sim3Map<'_, T> {
    #[inline]
    fn rxso3(&self) -> RxSO3<T> {
        read_rxso3(&*self.params)
    }

    #[inline]
    fn translation(&self) -> T::Vec3 {
        read_translation(&*self.params)
    }
}

impl<T: Real> Sim3BaseMut<T> for Sim3Map<'_, T> {
    #[inline]
    fn set_rxso3(&mut self, rxso3: RxSO3<T>) {
        write_rxso3(&mut *self.params, &rxso3);
    }

    #[inline]
    fn set_translation(&mut self, translation: T::Vec3) {
        write_translation(&mut *self.params, translation);
    }
}

/// A Sim(3) element viewing a caller-owned, read-only buffer of seven scalars.
#[derive(Debug, Clone, Copy)]
pub struct Sim3MapRef<'a, T: Real> {
    params: &'a [T; NUM_PARAMS],
}

impl<'a, T: Real> Sim3MapRef<'a, T> {
    /// View a parameter block. The quaternion part must be non-zero.
    #[inline]
    pub fn new(params: &'a [T; NUM_PARAMS]) -> Self {
        Self { params }
    }

    /// View the first seven scalars of a slice.
    pub fn from_slice(slice: &'a [T]) -> Result<Self, LieError> {
        let got = slice.len();
        let params: &'a [T; NUM_PARAMS] = slice
            .get(..NUM_PARAMS)
            .and_then(|s| s.try_into().ok())
            .ok_or(LieError::BufferTooSmall {
                expected: NUM_PARAMS,
                got,
            })?;
        Ok(Self { params })
    }

    /// The viewed parameters.
    #[inline]
    pub fn data(&self) -> &'a [T; NUM_PARAMS] {
        self.params
    }
}

impl<T: Real> Sim3Base<T> for Sim3MapRef<'_, T> {
    #[inline]
    fn rxso3(&self) -> RxSO3<T> {
        read_rxso3(self.params)
    }

    #[inline]
    fn translation(&self) -> T::Vec3 {
        read_translation(self.params)
    }
}

impl<T: Real> Mul for Sim3<T> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.compose(&rhs)
    }
}

impl<T: Real> MulAssign for Sim3<T> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        self.compose_assign(&rhs);
    }
}

impl<T: Real> MulAssign<Sim3<T>> for Sim3Map<'_, T> {
    #[inline]
    fn mul_assign(&mut self, rhs: Sim3<T>) {
        self.compose_assign(&rhs);
    }
}

impl<T: Real> Mul<Sim3<T>> for Sim3MapRef<'_, T> {
    type Output = Sim3<T>;

    #[inline]
    fn mul(self, rhs: Sim3<T>) -> Sim3<T> {
        self.compose(&rhs)
    }
}

impl<T: Real> Param<T> for Sim3<T> {
    const GLOBAL_SIZE: usize = NUM_PARAMS;
    const LOCAL_SIZE: usize = 7;

    fn plus(x: &[T], delta: &[T], out: &mut [T]) -> Result<(), ParamError> {
        check_sizes::<T, Self>(x, delta, out)?;

        let mut params = [T::ZERO; NUM_PARAMS];
        params.copy_from_slice(&x[..NUM_PARAMS]);
        let sim3 = Self::try_from_params(params)?;

        let mut tau = [T::ZERO; 7];
        tau.copy_from_slice(&delta[..7]);
        let sim3_plus = sim3.rplus(&tau);
        out[..NUM_PARAMS].copy_from_slice(sim3_plus.data());
        Ok(())
    }
}

impl<T: Real> approx::AbsDiffEq for Sim3<T> {
    type Epsilon = T;

    fn default_epsilon() -> T {
        <T as approx::AbsDiffEq>::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: T) -> bool {
        approx::AbsDiffEq::abs_diff_eq(&self.params[..], &other.params[..], epsilon)
    }
}

impl<T: Real> approx::RelativeEq for Sim3<T> {
    fn default_max_relative() -> T {
        <T as approx::RelativeEq>::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: T, max_relative: T) -> bool {
        approx::RelativeEq::relative_eq(
            &self.params[..],
            &other.params[..],
            epsilon,
            max_relative,
        )
    }
}
