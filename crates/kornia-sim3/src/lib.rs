#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Kornia Sim3
//!
//! This crate provides:
//! - [`Sim3`]: 3D similarity transforms `p ↦ s·R·p + t` with exp/log maps, adjoint,
//!   hat/vee, generators and the Lie bracket, generic over `f32` / `f64`
//! - [`Sim3Map`] / [`Sim3MapRef`]: the same algebra over caller-owned parameter blocks
//! - [`RxSO3`] (rotation and scale) and [`SO3`] (rotation), the components of Sim(3)
//! - [`Param`]: right-retraction `x ⊞ δ` on raw parameter blocks
//!
//! ```
//! use kornia_sim3::{Sim3Base, Sim3F64};
//!
//! let g = Sim3F64::exp(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, std::f64::consts::LN_2]);
//! assert!((g.scale() - 2.0).abs() < 1e-12);
//! assert!((g.log()[6] - std::f64::consts::LN_2).abs() < 1e-12);
//! ```

/// Error types.
pub mod error;

/// Lie groups SO(3), RxSO(3) and Sim(3).
pub mod lie;

pub mod param;

pub mod real;

pub use error::LieError;
pub use lie::{
    Matrix7, RxSO3, RxSO3Tangent, Sim3, Sim3Base, Sim3BaseMut, Sim3Map, Sim3MapRef, Vector7, SO3,
};
pub use param::{Param, ParamError};
pub use real::Real;

/// Single precision rotation.
pub type SO3F32 = SO3<f32>;
/// Double precision rotation.
pub type SO3F64 = SO3<f64>;
/// Single precision rotation and scale.
pub type RxSO3F32 = RxSO3<f32>;
/// Double precision rotation and scale.
pub type RxSO3F64 = RxSO3<f64>;
/// Single precision similarity transform.
pub type Sim3F32 = Sim3<f32>;
/// Double precision similarity transform.
pub type Sim3F64 = Sim3<f64>;
