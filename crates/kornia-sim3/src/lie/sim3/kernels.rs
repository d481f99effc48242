//! Translation coefficient kernels of the Sim(3) exponential and logarithm.
//!
//! Integrating a constant tangent velocity `(υ, ω, σ)` over unit time moves the origin
//! to `W·υ` with
//!
//! ```text
//! W = ∫₀¹ exp(σt)·exp(t[ω]×) dt = A·Ω + B·Ω² + C·I,    Ω = [ω]×
//! ```
//!
//! and the logarithm recovers `υ = W⁻¹·t` with `W⁻¹ = a·Ω + b·Ω² + c·I`. The
//! coefficients have removable singularities at `θ = ‖ω‖ → 0` and `σ → 0`. Each kernel
//! picks one of four closed forms:
//!
//! | regime | `W` test | `W⁻¹` test |
//! |---|---|---|
//! | small σ, small θ | `|σ| < ε`, `|θ| < ε` | `σ² < ε`, `θ² < ε` |
//! | small σ | `|σ| < ε` | `σ² < ε` |
//! | small θ | `|θ| < ε` | `θ² < ε` |
//! | general | otherwise | otherwise |
//!
//! with `ε` = [`Real::SMALL_EPSILON`]. Near-cancelling differences are evaluated as
//! `expm1(σ)` for `s - 1` and `2·sin²(θ/2)` for `1 - cos θ`. In the small θ regime of
//! `W`, `A` and `B` switch to their power series in `σ` while `|σ| < 0.1`.

use crate::real::{Matrix3, Real};

/// Below this `|σ|` the θ → 0 limits of `A` and `B` are summed as power series; the
/// closed forms lose all digits to cancellation as `σ³ → 0`.
const SIGMA_SERIES_THRESHOLD: f64 = 0.1;

/// Terms kept in the series of [`small_rotation_moments`].
const SIGMA_SERIES_TERMS: usize = 9;

/// `(∫₀¹ e^{σt}·t dt, ∫₀¹ e^{σt}·t²/2 dt)` as power series in `σ`.
fn small_rotation_moments<T: Real>(sigma: T) -> (T, T) {
    let two = T::from_f64(2.0);
    let mut term = T::ONE;
    let (mut a, mut b) = (T::ZERO, T::ZERO);
    for k in 0..SIGMA_SERIES_TERMS {
        let k = T::from_f64(k as f64);
        a = a + term / (k + two);
        b = b + term / (two * (k + T::from_f64(3.0)));
        term = term * sigma / (k + T::ONE);
    }
    (a, b)
}

/// Coefficients `(A, B, C)` of `W = A·Ω + B·Ω² + C·I`.
pub fn calc_w_coefficients<T: Real>(theta: T, sigma: T, scale: T) -> (T, T, T) {
    let eps = T::SMALL_EPSILON;
    let one = T::ONE;
    let half = T::from_f64(0.5);
    let theta_sq = theta * theta;

    if sigma.abs() < eps {
        if theta.abs() < eps {
            (half, T::from_f64(1.0 / 6.0), one)
        } else {
            let versine = versine(theta);
            let a = versine / theta_sq;
            let b = (theta - theta.sin()) / (theta_sq * theta);
            (a, b, one)
        }
    } else {
        let m = sigma.exp_m1();
        let c = m / sigma;
        let sigma_sq = sigma * sigma;

        if theta.abs() < eps {
            let (a, b) = if sigma.abs() < T::from_f64(SIGMA_SERIES_THRESHOLD) {
                small_rotation_moments(sigma)
            } else {
                (
                    (sigma * m - (m - sigma)) / sigma_sq,
                    (scale * (half * sigma_sq - sigma + one) - one) / (sigma_sq * sigma),
                )
            };
            (a, b, c)
        } else {
            let (sin_theta, cos_theta) = theta.sin_cos();
            let versine = versine(theta);
            let scaled_sin = scale * sin_theta;
            let denom = theta_sq + sigma_sq;

            let a = (scaled_sin * sigma + (versine - m * cos_theta) * theta) / (theta * denom);
            let b = (c - ((m * cos_theta - versine) * sigma + scaled_sin * theta) / denom)
                / theta_sq;
            (a, b, c)
        }
    }
}

/// Coefficients `(a, b, c)` of `W⁻¹ = a·Ω + b·Ω² + c·I`.
pub fn calc_w_inv_coefficients<T: Real>(theta: T, sigma: T, scale: T) -> (T, T, T) {
    let eps = T::SMALL_EPSILON;
    let one = T::ONE;
    let two = T::from_f64(2.0);
    let half = T::from_f64(0.5);
    let theta_sq = theta * theta;
    let sigma_sq = sigma * sigma;

    if sigma_sq < eps {
        let c = one - half * sigma;
        let a = -half;
        let b = if theta_sq < eps {
            T::from_f64(1.0 / 12.0)
        } else {
            let half_theta = half * theta;
            let (sin_half, cos_half) = half_theta.sin_cos();
            (one - half_theta * cos_half / sin_half) / theta_sq
        };
        (a, b, c)
    } else {
        let m = sigma.exp_m1();
        let c = sigma / m;

        if theta_sq < eps {
            let m_sq = m * m;
            let a = ((m - sigma) - sigma * m) / m_sq;
            let b = scale * (sigma * m - two * (m - sigma)) / (two * m_sq * m);
            (a, b, c)
        } else {
            let (sin_theta, cos_theta) = theta.sin_cos();
            let versine = versine(theta);
            let denom = m * m + two * scale * versine;

            let a = (theta * (m * cos_theta - versine) - sigma * scale * sin_theta)
                / (theta * denom);
            let b = -scale * (theta * m * sin_theta - sigma * (scale + one) * versine)
                / (theta_sq * m * denom);
            (a, b, c)
        }
    }
}

/// `W(θ, σ, s, Ω)`: maps the tangent translation `υ` to the group translation.
///
/// `omega` is the skew matrix `[ω]×` with `‖ω‖ = theta`, and `scale = exp(sigma)`.
pub fn calc_w<T: Real>(theta: T, sigma: T, scale: T, omega: &T::Mat3) -> T::Mat3 {
    let (a, b, c) = calc_w_coefficients(theta, sigma, scale);
    combine(a, b, c, omega)
}

/// `W⁻¹(θ, σ, s, Ω)`: maps the group translation back to the tangent translation.
///
/// Evaluated in closed form, not by inverting [`calc_w`].
pub fn calc_w_inv<T: Real>(theta: T, sigma: T, scale: T, omega: &T::Mat3) -> T::Mat3 {
    let (a, b, c) = calc_w_inv_coefficients(theta, sigma, scale);
    combine(a, b, c, omega)
}

#[inline]
fn combine<T: Real>(a: T, b: T, c: T, omega: &T::Mat3) -> T::Mat3 {
    *omega * a + (*omega * *omega) * b + T::Mat3::IDENTITY * c
}

/// `1 - cos θ`
#[inline]
fn versine<T: Real>(theta: T) -> T {
    let s = (T::from_f64(0.5) * theta).sin();
    T::from_f64(2.0) * s * s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lie::so3::SO3;
    use crate::real::Vector3;
    use approx::assert_relative_eq;

    fn omega_hat<T: Real>(theta: T) -> T::Mat3 {
        let axis = T::Vec3::new(T::ONE, T::from_f64(2.0), T::from_f64(3.0));
        let axis = axis / axis.length();
        SO3::<T>::hat(axis * theta)
    }

    fn max_abs_diff<T: Real>(a: &T::Mat3, b: &T::Mat3) -> T {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .fold(T::ZERO, |acc, (x, y)| acc.max((*x - *y).abs()))
    }

    fn w_at<T: Real>(theta: T, sigma: T) -> T::Mat3 {
        calc_w(theta, sigma, sigma.exp(), &omega_hat(theta))
    }

    fn w_inv_at<T: Real>(theta: T, sigma: T) -> T::Mat3 {
        calc_w_inv(theta, sigma, sigma.exp(), &omega_hat(theta))
    }

    /// Largest jump when `theta` (or `sigma`) crosses `boundary`.
    fn jump<T: Real>(
        kernel: fn(T, T) -> T::Mat3,
        boundary: T,
        other: T,
        across_theta: bool,
    ) -> T {
        let inside = boundary * T::from_f64(1.0 - 1e-6);
        let outside = boundary * T::from_f64(1.0 + 1e-6);
        let (m_in, m_out) = if across_theta {
            (kernel(inside, other), kernel(outside, other))
        } else {
            (kernel(other, inside), kernel(other, outside))
        };
        max_abs_diff::<T>(&m_in, &m_out)
    }

    fn check_w_continuity<T: Real>() {
        let eps = T::SMALL_EPSILON;
        for sigma in [0.0, 0.5, -0.5] {
            let d = jump::<T>(w_at::<T>, eps, T::from_f64(sigma), true);
            assert!(d <= eps, "W jumps by {d:?} across theta boundary at sigma {sigma}");
        }
        for theta in [T::ZERO, eps * T::from_f64(0.5), eps * T::from_f64(0.9)]
            .into_iter()
            .chain([1.0, 2.5].map(T::from_f64))
        {
            let d = jump::<T>(w_at::<T>, eps, theta, false);
            assert!(d <= eps, "W jumps by {d:?} across sigma boundary at theta {theta:?}");
        }
    }

    fn check_w_inv_continuity<T: Real>() {
        let eps = T::SMALL_EPSILON;
        let boundary = eps.sqrt();
        for sigma in [0.0, 0.5, -0.5] {
            let d = jump::<T>(w_inv_at::<T>, boundary, T::from_f64(sigma), true);
            assert!(d <= eps, "W⁻¹ jumps by {d:?} across theta boundary at sigma {sigma}");
        }

        let d = jump::<T>(w_inv_at::<T>, boundary, T::ZERO, false);
        assert!(d <= eps, "W⁻¹ jumps by {d:?} across sigma boundary at theta 0");

        // the σ² < ε test truncates the σ expansion after the linear term, so away
        // from θ = 0 the jump is of order √ε
        for theta in [1.0, 2.5] {
            let d = jump::<T>(w_inv_at::<T>, boundary, T::from_f64(theta), false);
            assert!(
                d <= boundary,
                "W⁻¹ jumps by {d:?} across sigma boundary at theta {theta}"
            );
        }
    }

    #[test]
    fn test_w_continuity_f32() {
        check_w_continuity::<f32>();
    }

    #[test]
    fn test_w_continuity_f64() {
        check_w_continuity::<f64>();
    }

    #[test]
    fn test_w_inv_continuity_f32() {
        check_w_inv_continuity::<f32>();
    }

    #[test]
    fn test_w_inv_continuity_f64() {
        check_w_inv_continuity::<f64>();
    }

    #[test]
    fn test_w_limits() {
        let (a, b, c) = calc_w_coefficients::<f64>(0.0, 0.0, 1.0);
        assert_eq!((a, b, c), (0.5, 1.0 / 6.0, 1.0));

        let (a, b, c) = calc_w_inv_coefficients::<f64>(0.0, 0.0, 1.0);
        assert_eq!((a, b, c), (-0.5, 1.0 / 12.0, 1.0));
    }

    #[test]
    fn test_w_small_rotation_just_outside_small_sigma() {
        let sigma = 1e-10 * (1.0 + 1e-6);
        let (a, b, c) = calc_w_coefficients::<f64>(0.9e-10, sigma, sigma.exp());
        assert_relative_eq!(a, 0.5, epsilon = 1e-9);
        assert_relative_eq!(b, 1.0 / 6.0, epsilon = 1e-9);
        assert_relative_eq!(c, 1.0, epsilon = 1e-9);

        let sigma = 1e-5f32 * (1.0 + 1e-6);
        let (a, b, _) = calc_w_coefficients::<f32>(0.9e-5, sigma, sigma.exp());
        assert_relative_eq!(a, 0.5, epsilon = 1e-5);
        assert_relative_eq!(b, 1.0 / 6.0, epsilon = 1e-5);
    }

    #[test]
    fn test_w_small_rotation_series_matches_closed_form() {
        for boundary in [SIGMA_SERIES_THRESHOLD, -SIGMA_SERIES_THRESHOLD] {
            let inside = boundary * (1.0 - 1e-12);
            let outside = boundary * (1.0 + 1e-12);
            let (a_in, b_in, c_in) = calc_w_coefficients::<f64>(0.0, inside, inside.exp());
            let (a_out, b_out, c_out) = calc_w_coefficients::<f64>(0.0, outside, outside.exp());
            assert_relative_eq!(a_in, a_out, epsilon = 1e-10);
            assert_relative_eq!(b_in, b_out, epsilon = 1e-10);
            assert_relative_eq!(c_in, c_out, epsilon = 1e-10);
        }
        assert_eq!(small_rotation_moments(0.0f64), (0.5, 1.0 / 6.0));
    }

    #[test]
    fn test_w_pure_scale() {
        // ∫₀¹ exp(σt) dt = (s - 1)/σ
        let sigma = std::f64::consts::LN_2;
        let (_, _, c) = calc_w_coefficients::<f64>(0.0, sigma, 2.0);
        assert_relative_eq!(c, 1.0 / sigma, epsilon = 1e-12);
    }

    #[test]
    fn test_w_inv_is_inverse_of_w() {
        let cases = [
            (0.7, 0.3),
            (1e-12, 0.5),
            (0.5, 1e-12),
            (1e-12, 1e-12),
            (3.0, -2.0),
            (1e-4, 1e-4),
            (2.0, 1e-3),
        ];
        for (theta, sigma) in cases {
            let w = w_at::<f64>(theta, sigma);
            let w_inv = w_inv_at::<f64>(theta, sigma);
            assert_relative_eq!(w * w_inv, glam::DMat3::IDENTITY, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_w_matches_quadrature() {
        // midpoint rule on ∫₀¹ exp(σt)·exp(tΩ) dt
        let (theta, sigma) = (1.3, -0.7);
        let omega = omega_hat::<f64>(theta);
        let axis = SO3::<f64>::vee(&omega);
        let n = 2000;
        let mut acc = glam::DMat3::ZERO;
        for k in 0..n {
            let t = (k as f64 + 0.5) / n as f64;
            acc += SO3::<f64>::exp(axis * t).matrix() * ((sigma * t).exp() / n as f64);
        }
        assert_relative_eq!(w_at::<f64>(theta, sigma), acc, epsilon = 1e-6);
    }
}
