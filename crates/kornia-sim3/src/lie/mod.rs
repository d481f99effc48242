//! # Lie Groups
//!
//! | Group | Description | DOF | Topology | Internal repr |
//! |-------|-------------|-----|----------|---------------|
//! | [`SO3`] | 3D rotations | 3 | RP³ (quotient of S³) | Unit quaternion |
//! | [`RxSO3`] | 3D rotation + scale | 4 | R⁺ × SO(3) | Non-zero quaternion, `‖q‖ = s` |
//! | [`Sim3`] | 3D similarity transforms | 7 | (R⁺ × SO(3)) ⋉ R³ | RxSO3 + translation |
//!
//! ## Common API
//!
//! - `exp(v)`: Lie algebra → group
//! - `log()`: group → Lie algebra
//! - `hat(v)` / `vee(M)`: vector ↔ matrix representation of a Lie algebra element
//! - `adjoint()`: how the group acts on its own Lie algebra
//! - `inverse()`, `*`: group inverse and composition
//! - `transform_point(p)` and `g * p`: group action on points
//! - `matrix()`: matrix representation
//! - `cast::<U>()`: change of scalar precision

pub mod rxso3;
pub mod sim3;
pub mod so3;

pub use rxso3::{RxSO3, RxSO3Tangent};
pub use sim3::{Matrix7, Sim3, Sim3Base, Sim3BaseMut, Sim3Map, Sim3MapRef, Vector7};
pub use so3::SO3;

use std::ops::Mul;

macro_rules! impl_point_action {
    ($scalar:ty, $vec3:ty) => {
        impl Mul<$vec3> for SO3<$scalar> {
            type Output = $vec3;

            #[inline]
            fn mul(self, p: $vec3) -> $vec3 {
                self.transform_point(p)
            }
        }

        impl Mul<$vec3> for RxSO3<$scalar> {
            type Output = $vec3;

            #[inline]
            fn mul(self, p: $vec3) -> $vec3 {
                self.transform_point(p)
            }
        }

        impl Mul<$vec3> for Sim3<$scalar> {
            type Output = $vec3;

            #[inline]
            fn mul(self, p: $vec3) -> $vec3 {
                self.transform_point(p)
            }
        }

        impl Mul<$vec3> for Sim3MapRef<'_, $scalar> {
            type Output = $vec3;

            #[inline]
            fn mul(self, p: $vec3) -> $vec3 {
                self.transform_point(p)
            }
        }
    };
}

impl_point_action!(f32, glam::Vec3);
impl_point_action!(f64, glam::DVec3);
