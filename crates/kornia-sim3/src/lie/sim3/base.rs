//! Storage-agnostic Sim(3) algebra.
//!
//! [`Sim3Base`] only needs read access to the rotation-scale part and the translation;
//! every group operation is provided on top of those two accessors, so the owning
//! [`Sim3`] and the buffer views [`Sim3Map`](super::Sim3Map) /
//! [`Sim3MapRef`](super::Sim3MapRef) share a single implementation. [`Sim3BaseMut`]
//! adds the write accessors and the in-place operations.

use super::kernels::calc_w_inv;
use super::storage::Sim3;
use super::tangent::{self, Matrix7, Vector7};
use crate::lie::rxso3::RxSO3;
use crate::lie::so3::SO3;
use crate::real::{Matrix3, Matrix4, Quaternion, Real, Vector3};

/// Read access to a Sim(3) element and the algorithms built on it.
pub trait Sim3Base<T: Real> {
    /// The rotation-scale part.
    fn rxso3(&self) -> RxSO3<T>;

    /// The translation part.
    fn translation(&self) -> T::Vec3;

    /// The scale `s > 0`.
    #[inline]
    fn scale(&self) -> T {
        self.rxso3().scale()
    }

    /// The non-unit quaternion of the rotation-scale part, `‖q‖ = s`.
    #[inline]
    fn quaternion(&self) -> T::Quat {
        self.rxso3().quaternion()
    }

    /// The rotation part.
    #[inline]
    fn rotation(&self) -> SO3<T> {
        self.rxso3().rotation()
    }

    /// The 3x3 rotation matrix `R`.
    #[inline]
    fn rotation_matrix(&self) -> T::Mat3 {
        self.rxso3().rotation_matrix()
    }

    /// The homogeneous 4x4 matrix `[[s·R, t], [0, 1]]`.
    fn matrix(&self) -> T::Mat4 {
        let [r0, r1, r2] = self.matrix3x4();
        let (zero, one) = (T::ZERO, T::ONE);
        T::Mat4::from_rows(&[r0, r1, r2, [zero, zero, zero, one]])
    }

    /// The top three rows of [`Sim3Base::matrix`], row-major.
    fn matrix3x4(&self) -> [[T; 4]; 3] {
        let sr = self.rxso3().matrix();
        let t = self.translation();
        let mut out = [[T::ZERO; 4]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            *row = [sr.at(i, 0), sr.at(i, 1), sr.at(i, 2), t[i]];
        }
        out
    }

    /// The inverse element.
    fn inverse(&self) -> Sim3<T> {
        let inv = self.rxso3().inverse();
        let t = inv.transform_point(-self.translation());
        Sim3::new(inv, t)
    }

    /// Logarithm map to the tangent vector `(υ, ω, σ)`.
    fn log(&self) -> Vector7<T> {
        let rxso3 = self.rxso3();
        let (omega_sigma, theta) = rxso3.log_and_theta();
        let omega = T::Vec3::new(omega_sigma[0], omega_sigma[1], omega_sigma[2]);
        let sigma = omega_sigma[3];

        let omega_hat = SO3::<T>::hat(omega);
        let w_inv = calc_w_inv(theta, sigma, rxso3.scale(), &omega_hat);
        let upsilon = w_inv * self.translation();

        tangent::join::<T>(upsilon, omega, sigma)
    }

    /// The 7x7 adjoint `Adj` with `hat(Adj·x) = g·hat(x)·g⁻¹`.
    fn adjoint(&self) -> Matrix7<T> {
        let rxso3 = self.rxso3();
        let r = rxso3.rotation_matrix();
        let t = self.translation();

        let mut adj = tangent::zeros::<T>();
        tangent::set_block::<T>(&mut adj, 0, 0, &(r * rxso3.scale()));
        tangent::set_block::<T>(&mut adj, 0, 3, &(SO3::<T>::hat(t) * r));
        tangent::set_column::<T>(&mut adj, 0, 6, -t);
        tangent::set_block::<T>(&mut adj, 3, 3, &r);
        adj[6][6] = T::ONE;
        adj
    }

    /// Apply the similarity to a point: `s·R·p + t`.
    #[inline]
    fn transform_point(&self, p: T::Vec3) -> T::Vec3 {
        self.rxso3().transform_point(p) + self.translation()
    }

    /// Group composition `self ∘ other`.
    fn compose<S: Sim3Base<T> + ?Sized>(&self, other: &S) -> Sim3<T> {
        let rxso3 = self.rxso3();
        let t = self.translation() + rxso3.transform_point(other.translation());
        Sim3::new(rxso3 * other.rxso3(), t)
    }

    /// Copy the parameters into an owning element of another precision.
    fn cast<U: Real>(&self) -> Sim3<U> {
        Sim3::new(
            self.rxso3().cast::<U>(),
            U::Vec3::from_array(self.translation().to_array().map(|x| U::from_f64(x.as_f64()))),
        )
    }

    /// Copy the parameters into an owning element.
    #[inline]
    fn to_owned_sim3(&self) -> Sim3<T> {
        Sim3::new(self.rxso3(), self.translation())
    }

    /// The parameters in storage order `[qx, qy, qz, qw, tx, ty, tz]`.
    #[inline]
    fn params(&self) -> [T; 7] {
        let [qx, qy, qz, qw] = self.quaternion().to_array();
        let [tx, ty, tz] = self.translation().to_array();
        [qx, qy, qz, qw, tx, ty, tz]
    }
}

/// Write access to a Sim(3) element and the in-place operations built on it.
pub trait Sim3BaseMut<T: Real>: Sim3Base<T> {
    /// Replace the rotation-scale part.
    fn set_rxso3(&mut self, rxso3: RxSO3<T>);

    /// Replace the translation part.
    fn set_translation(&mut self, translation: T::Vec3);

    /// Replace the rotation-scale quaternion.
    ///
    /// # Panics
    ///
    /// If the quaternion norm is below [`Real::SMALL_EPSILON`].
    fn set_quaternion(&mut self, quat: T::Quat) {
        self.set_rxso3(RxSO3::<T>::from_quaternion(quat));
    }

    /// Change the scale, keeping rotation and translation.
    ///
    /// # Panics
    ///
    /// If `scale` is below [`Real::SMALL_EPSILON`].
    fn set_scale(&mut self, scale: T) {
        let mut rxso3 = self.rxso3();
        rxso3.set_scale(scale);
        self.set_rxso3(rxso3);
    }

    /// Change the rotation, keeping scale and translation.
    fn set_rotation_matrix(&mut self, rotation: &T::Mat3) {
        let mut rxso3 = self.rxso3();
        rxso3.set_rotation_matrix(rotation);
        self.set_rxso3(rxso3);
    }

    /// Replace rotation and scale from a matrix `s·R`.
    ///
    /// # Panics
    ///
    /// If the matrix is not scaled-orthogonal with positive determinant.
    fn set_scaled_rotation_matrix(&mut self, mat: &T::Mat3) {
        self.set_rxso3(RxSO3::<T>::from_scaled_rotation_matrix(mat));
    }

    /// In-place composition `self = self ∘ other`.
    fn compose_assign<S: Sim3Base<T> + ?Sized>(&mut self, other: &S) {
        let composed = self.compose(other);
        self.assign(&composed);
    }

    /// Copy the value of any other Sim(3) element.
    fn assign<S: Sim3Base<T> + ?Sized>(&mut self, other: &S) {
        self.set_rxso3(other.rxso3());
        self.set_translation(other.translation());
    }
}
