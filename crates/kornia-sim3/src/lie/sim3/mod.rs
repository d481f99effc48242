//! # Sim(3): 3D similarity transforms
//!
//! A similarity transform maps `p ↦ s·R·p + t` with scale `s > 0`, rotation `R` and
//! translation `t`. Its matrix form is
//!
//! ```text
//! ┌ s·R  t ┐
//! └ 0ᵀ   1 ┘
//! ```
//!
//! Tangent vectors are ordered `(υ, ω, σ)`: translational velocity, rotation vector and
//! log-scale rate. The exponential map integrates a constant velocity under
//! simultaneous rotation and scaling, so the translation of `exp(υ, ω, σ)` is `W·υ`
//! rather than `υ`; see [`kernels`].
//!
//! The algebra lives in the [`Sim3Base`] / [`Sim3BaseMut`] traits and works for any
//! storage: the owning [`Sim3`], or the [`Sim3Map`] / [`Sim3MapRef`] views over a
//! caller-owned `[qx, qy, qz, qw, tx, ty, tz]` parameter block.

mod base;
pub mod kernels;
mod storage;
pub mod tangent;

pub use base::{Sim3Base, Sim3BaseMut};
pub use storage::{Sim3, Sim3Map, Sim3MapRef, NUM_PARAMS};
pub use tangent::{Matrix7, Vector7};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LieError;
    use crate::lie::{RxSO3, SO3};
    use approx::assert_relative_eq;
    use glam::{DMat3, DMat4, DQuat, DVec3, DVec4, Vec3};
    use rand::{rngs::StdRng, SeedableRng};

    const EPSILON: f64 = 1e-9;

    fn assert_vec7_eq(a: &Vector7<f64>, b: &Vector7<f64>, epsilon: f64) {
        for i in 0..7 {
            assert_relative_eq!(a[i], b[i], epsilon = epsilon);
        }
    }

    fn random_tangent(rng: &mut StdRng) -> Vector7<f64> {
        use rand::Rng;
        std::array::from_fn(|_| rng.random_range(-1.0..1.0))
    }

    #[test]
    fn test_exp_pure_rotation() {
        let a = [0.0, 0.0, 0.0, 0.0, 0.0, std::f64::consts::FRAC_PI_2, 0.0];
        let g = Sim3::<f64>::exp(&a);
        assert_relative_eq!(g.scale(), 1.0, epsilon = EPSILON);
        assert_relative_eq!(g.translation(), DVec3::ZERO, epsilon = EPSILON);
        let expected = DMat3::from_cols(
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(-1.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 1.0),
        );
        assert_relative_eq!(g.rotation_matrix(), expected, epsilon = EPSILON);
    }

    #[test]
    fn test_exp_pure_scale() {
        let ln2 = std::f64::consts::LN_2;
        let g = Sim3::<f64>::exp(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, ln2]);
        assert_relative_eq!(g.scale(), 2.0, epsilon = EPSILON);
        assert_relative_eq!(g.rotation_matrix(), DMat3::IDENTITY, epsilon = EPSILON);
        assert_relative_eq!(g.translation(), DVec3::new(1.0 / ln2, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(g.translation().x, 1.4427, epsilon = 1e-4);
    }

    #[test]
    fn test_identity() {
        let g = Sim3::<f64>::IDENTITY;
        assert_eq!(g * g, Sim3::IDENTITY);
        assert_eq!(g.inverse(), Sim3::IDENTITY);
        assert_eq!(g.matrix(), DMat4::IDENTITY);
        assert_eq!(g.log(), [0.0; 7]);
        assert_eq!(Sim3::<f32>::default(), Sim3::<f32>::IDENTITY);
    }

    #[test]
    fn test_exp_log_round_trip() {
        let tangents = [
            [0.1, -0.2, 0.3, 0.4, -0.5, 0.6, 0.7],
            [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0],
            [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, -0.8],
            [1.0, 2.0, 3.0, 0.3, 0.2, -0.1, 0.0],
            [-0.5, 0.2, 1.0, 1e-12, 0.0, 0.0, 0.5],
            [0.5, -0.2, 1.0, 2.0, 1.0, -0.5, -1.5],
            [0.3, 0.3, 0.3, 1e-12, 1e-12, 0.0, 1e-12],
        ];
        for a in tangents {
            let g = Sim3::<f64>::exp(&a);
            assert_vec7_eq(&g.log(), &a, EPSILON);
        }

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let g = Sim3::<f64>::from_rng(&mut rng);
            // q and -q are the same element, so compare matrices
            assert_relative_eq!(Sim3::exp(&g.log()).matrix(), g.matrix(), epsilon = EPSILON);
        }
    }

    #[test]
    fn test_hat_vee() {
        let a = [0.1, -0.2, 0.3, 0.4, -0.5, 0.6, 0.7];
        let m = Sim3::<f64>::hat(&a);
        assert_eq!(Sim3::<f64>::vee(&m), a);
        assert_eq!(Sim3::<f64>::hat(&Sim3::<f64>::vee(&m)), m);
        assert_eq!(m.row(3), DVec4::ZERO);
        assert_eq!(m.w_axis, DVec4::new(0.1, -0.2, 0.3, 0.0));
        assert_eq!(m.x_axis.x, 0.7);
    }

    #[test]
    fn test_generators() {
        let scale = Sim3::<f64>::generator(6);
        assert_eq!(scale, DMat4::from_diagonal(DVec4::new(1.0, 1.0, 1.0, 0.0)));
        let tx = Sim3::<f64>::generator(0);
        assert_eq!(tx.w_axis, DVec4::new(1.0, 0.0, 0.0, 0.0));
        let rz = Sim3::<f64>::generator(5);
        assert_eq!(rz.x_axis.y, 1.0);
        assert_eq!(rz.y_axis.x, -1.0);
        for i in 0..7 {
            let mut e = [0.0; 7];
            e[i] = 1.0;
            assert_eq!(Sim3::<f64>::vee(&Sim3::<f64>::generator(i)), e);
        }
        assert_eq!(
            Sim3::<f64>::try_generator(7),
            Err(LieError::GeneratorIndexOutOfRange { index: 7, dim: 7 })
        );
    }

    #[test]
    #[should_panic]
    fn test_generator_out_of_range_panics() {
        let _ = Sim3::<f32>::generator(7);
    }

    #[test]
    fn test_inverse() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let g = Sim3::<f64>::from_rng(&mut rng);
            assert_relative_eq!(g * g.inverse(), Sim3::IDENTITY, epsilon = EPSILON);
            assert_relative_eq!(g.inverse() * g, Sim3::IDENTITY, epsilon = EPSILON);
            assert_relative_eq!(g.inverse().matrix(), g.matrix().inverse(), epsilon = EPSILON);
        }
    }

    #[test]
    fn test_action() {
        let mut rng = StdRng::seed_from_u64(2);
        let g1 = Sim3::<f64>::from_rng(&mut rng);
        let g2 = Sim3::<f64>::from_rng(&mut rng);
        let p = DVec3::new(0.3, -1.2, 2.0);

        assert_relative_eq!((g1 * g2) * p, g1 * (g2 * p), epsilon = EPSILON);
        assert_relative_eq!(
            (g1.matrix() * p.extend(1.0)).truncate(),
            g1 * p,
            epsilon = EPSILON
        );
        assert_relative_eq!((g1 * g2).matrix(), g1.matrix() * g2.matrix(), epsilon = EPSILON);

        let rows = g1.matrix3x4();
        for (i, row) in rows.iter().enumerate() {
            let mapped = row[0] * p.x + row[1] * p.y + row[2] * p.z + row[3];
            assert_relative_eq!(mapped, (g1 * p)[i], epsilon = EPSILON);
        }
    }

    #[test]
    fn test_adjoint() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let g = Sim3::<f64>::from_rng(&mut rng);
            let x = random_tangent(&mut rng);
            let lhs = Sim3::<f64>::hat(&tangent::mul_vec(&g.adjoint(), &x));
            let rhs = g.matrix() * Sim3::<f64>::hat(&x) * g.inverse().matrix();
            assert_relative_eq!(lhs, rhs, epsilon = EPSILON);
        }
    }

    #[test]
    fn test_adjoint_is_homomorphism() {
        let mut rng = StdRng::seed_from_u64(4);
        let a = Sim3::<f64>::from_rng(&mut rng);
        let b = Sim3::<f64>::from_rng(&mut rng);
        let lhs = (a * b).adjoint();
        let rhs = tangent::mul(&a.adjoint(), &b.adjoint());
        for i in 0..7 {
            for j in 0..7 {
                assert_relative_eq!(lhs[i][j], rhs[i][j], epsilon = EPSILON);
            }
        }
    }

    #[test]
    fn test_lie_bracket() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..10 {
            let a = random_tangent(&mut rng);
            let b = random_tangent(&mut rng);

            assert_eq!(Sim3::<f64>::lie_bracket(&a, &a), [0.0; 7]);

            let ab = Sim3::<f64>::lie_bracket(&a, &b);
            let ba = Sim3::<f64>::lie_bracket(&b, &a);
            assert_vec7_eq(&ab, &ba.map(|x| -x), EPSILON);

            let (ha, hb) = (Sim3::<f64>::hat(&a), Sim3::<f64>::hat(&b));
            assert_vec7_eq(&ab, &Sim3::<f64>::vee(&(ha * hb - hb * ha)), EPSILON);
            assert_eq!(ab[6], 0.0);
        }
    }

    #[test]
    fn test_d_lie_bracket_ab_by_d_a() {
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..10 {
            let a = random_tangent(&mut rng);
            let b = random_tangent(&mut rng);
            let jac = Sim3::<f64>::d_lie_bracket_ab_by_d_a(&b);
            assert_vec7_eq(
                &tangent::mul_vec(&jac, &a),
                &Sim3::<f64>::lie_bracket(&a, &b),
                EPSILON,
            );
        }
    }

    #[test]
    fn test_from_matrix() {
        let mut rng = StdRng::seed_from_u64(7);
        let g = Sim3::<f64>::from_rng(&mut rng);
        let back = Sim3::<f64>::from_matrix(&g.matrix());
        assert_relative_eq!(back.matrix(), g.matrix(), epsilon = EPSILON);

        let mut skewed = g.matrix();
        skewed.x_axis.w = 0.5;
        assert!(matches!(
            Sim3::<f64>::try_from_matrix(&skewed),
            Err(LieError::NotHomogeneous { .. })
        ));

        let mut sheared = DMat4::IDENTITY;
        sheared.y_axis.x = 0.5;
        assert!(matches!(
            Sim3::<f64>::try_from_matrix(&sheared),
            Err(LieError::NotScaledOrthogonal { .. })
        ));

        let mirrored = DMat4::from_diagonal(DVec4::new(-1.0, 1.0, 1.0, 1.0));
        assert!(matches!(
            Sim3::<f64>::try_from_matrix(&mirrored),
            Err(LieError::NonPositiveDeterminant { .. })
        ));
    }

    #[test]
    fn test_constructors() {
        let q = DQuat::from_xyzw(0.0, 0.0, 0.0, 3.0);
        let t = DVec3::new(1.0, 2.0, 3.0);
        let g = Sim3::<f64>::from_quaternion_translation(q, t);
        assert_eq!(g.data(), &[0.0, 0.0, 0.0, 3.0, 1.0, 2.0, 3.0]);
        assert_relative_eq!(g.scale(), 3.0, epsilon = EPSILON);

        let h = Sim3::<f64>::from_scale_rotation_translation(3.0, SO3::IDENTITY, t);
        assert_relative_eq!(g, h, epsilon = EPSILON);

        assert!(matches!(
            Sim3::<f64>::try_from_quaternion_translation(DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0), t),
            Err(LieError::ZeroQuaternion { .. })
        ));
        assert!(Sim3::<f64>::try_from_params([0.0; 7]).is_err());
        assert_eq!(Sim3::<f64>::from_params(*g.data()), g);
    }

    #[test]
    fn test_setters() {
        let mut g = Sim3::<f64>::exp(&[0.1, 0.2, 0.3, 0.3, -0.2, 0.1, 0.2]);
        let t = g.translation();
        let r = g.rotation_matrix();

        g.set_scale(4.0);
        assert_relative_eq!(g.scale(), 4.0, epsilon = EPSILON);
        assert_relative_eq!(g.rotation_matrix(), r, epsilon = EPSILON);
        assert_eq!(g.translation(), t);

        let r2 = SO3::<f64>::exp(DVec3::new(1.0, 0.0, 0.0)).matrix();
        g.set_rotation_matrix(&r2);
        assert_relative_eq!(g.rotation_matrix(), r2, epsilon = EPSILON);
        assert_relative_eq!(g.scale(), 4.0, epsilon = EPSILON);

        g.set_scaled_rotation_matrix(&(r * 0.25));
        assert_relative_eq!(g.scale(), 0.25, epsilon = EPSILON);
        assert_relative_eq!(g.rotation_matrix(), r, epsilon = EPSILON);

        g.set_quaternion(DQuat::from_xyzw(0.0, 2.0, 0.0, 0.0));
        assert_relative_eq!(g.scale(), 2.0, epsilon = EPSILON);
        assert_relative_eq!(
            g.rotation().log(),
            DVec3::new(0.0, std::f64::consts::PI, 0.0),
            epsilon = EPSILON
        );
    }

    #[test]
    fn test_compose_assign_order() {
        let mut rng = StdRng::seed_from_u64(8);
        let a = Sim3::<f64>::from_rng(&mut rng);
        let b = Sim3::<f64>::from_rng(&mut rng);
        let mut c = a;
        c *= b;
        assert_eq!(c, a * b);
        assert_ne!(c, b * a);
    }

    #[test]
    fn test_map_views() {
        let mut rng = StdRng::seed_from_u64(9);
        let a = Sim3::<f64>::from_rng(&mut rng);
        let b = Sim3::<f64>::from_rng(&mut rng);

        let mut buffer = *a.data();
        {
            let view = Sim3MapRef::new(&buffer);
            assert_eq!(view.log(), a.log());
            assert_eq!(view.adjoint(), a.adjoint());
            assert_eq!(view * b, a * b);
            assert_eq!(view.to_owned_sim3(), a);
        }
        {
            let mut view = Sim3Map::new(&mut buffer);
            view *= b;
            assert_eq!(view.params(), *(a * b).data());
        }
        assert_eq!(&buffer, (a * b).data());

        let mut owned = a;
        owned.as_map().assign(&b);
        assert_eq!(owned, b);
    }

    #[test]
    fn test_map_from_slice() {
        let mut block = vec![0.0f64; 10];
        block[3] = 1.0;
        block[7] = 42.0;
        {
            let mut view = Sim3Map::from_slice(&mut block[..]).expect("long enough");
            view.set_translation(DVec3::new(1.0, 2.0, 3.0));
            view.set_scale(2.0);
        }
        assert_eq!(&block[..8], &[0.0, 0.0, 0.0, 2.0, 1.0, 2.0, 3.0, 42.0]);

        let view = Sim3MapRef::from_slice(&block[..7]).expect("exact size");
        assert_relative_eq!(view.scale(), 2.0, epsilon = EPSILON);

        assert_eq!(
            Sim3MapRef::<f64>::from_slice(&block[..5]).map(|v| v.params()),
            Err(LieError::BufferTooSmall { expected: 7, got: 5 })
        );
    }

    #[test]
    fn test_cast() {
        let g = Sim3::<f64>::exp(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]);
        let g32: Sim3<f32> = g.cast();
        let p = Vec3::new(1.0, 2.0, 3.0);
        let expected = g * DVec3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(g32 * p, expected.as_vec3(), epsilon = 1e-5);
        assert_relative_eq!(g32.cast::<f64>(), g, epsilon = 1e-6);
    }

    #[test]
    fn test_rplus_rminus() {
        let mut rng = StdRng::seed_from_u64(10);
        let g = Sim3::<f64>::from_rng(&mut rng);
        let tau = random_tangent(&mut rng);
        let h = g.rplus(&tau);
        assert_vec7_eq(&g.rminus(&h), &tau, EPSILON);

        let k = Sim3::<f64>::lplus(&tau, &g);
        assert_vec7_eq(&Sim3::<f64>::lminus(&k, &g), &tau, EPSILON);
    }

    #[test]
    fn test_rxso3_round_trip_through_sim3() {
        let r = RxSO3::<f64>::exp(&[0.2, 0.1, -0.3, 0.4]);
        let g = Sim3::new(r, DVec3::ZERO);
        let log = g.log();
        assert_vec7_eq(&log, &[0.0, 0.0, 0.0, 0.2, 0.1, -0.3, 0.4], EPSILON);
    }

    #[test]
    fn test_f32_round_trip() {
        let a = [0.1f32, -0.2, 0.3, 0.4, -0.5, 0.6, 0.7];
        let log = Sim3::<f32>::exp(&a).log();
        for i in 0..7 {
            assert_relative_eq!(log[i], a[i], epsilon = 1e-5);
        }
    }
}
