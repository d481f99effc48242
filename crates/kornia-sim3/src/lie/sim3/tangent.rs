//! Fixed-size 7-vectors and 7x7 matrices for the Sim(3) tangent space.
//!
//! Tangent vectors are ordered `[υx, υy, υz, ωx, ωy, ωz, σ]`; matrices are row-major.

use crate::real::{Matrix3, Real, Vector3};

/// Tangent vector of Sim(3): translation velocity `υ`, rotation vector `ω`, log-scale rate `σ`.
pub type Vector7<T> = [T; 7];

/// Row-major 7x7 matrix, e.g. the adjoint.
pub type Matrix7<T> = [[T; 7]; 7];

/// Split a tangent vector into `(υ, ω, σ)`.
#[inline]
pub fn split<T: Real>(a: &Vector7<T>) -> (T::Vec3, T::Vec3, T) {
    (
        T::Vec3::new(a[0], a[1], a[2]),
        T::Vec3::new(a[3], a[4], a[5]),
        a[6],
    )
}

/// Join `(υ, ω, σ)` into a tangent vector.
#[inline]
pub fn join<T: Real>(upsilon: T::Vec3, omega: T::Vec3, sigma: T) -> Vector7<T> {
    [
        upsilon[0], upsilon[1], upsilon[2], omega[0], omega[1], omega[2], sigma,
    ]
}

/// The zero matrix.
#[inline]
pub fn zeros<T: Real>() -> Matrix7<T> {
    [[T::ZERO; 7]; 7]
}

/// The identity matrix.
#[cfg(test)]
pub(crate) fn identity<T: Real>() -> Matrix7<T> {
    let mut m = zeros();
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = T::ONE;
    }
    m
}

/// Matrix-vector product.
pub fn mul_vec<T: Real>(m: &Matrix7<T>, v: &Vector7<T>) -> Vector7<T> {
    let mut out = [T::ZERO; 7];
    for (o, row) in out.iter_mut().zip(m.iter()) {
        *o = row
            .iter()
            .zip(v.iter())
            .fold(T::ZERO, |acc, (a, b)| acc + *a * *b);
    }
    out
}

/// Matrix-matrix product.
#[cfg(test)]
pub(crate) fn mul<T: Real>(a: &Matrix7<T>, b: &Matrix7<T>) -> Matrix7<T> {
    let mut out = zeros();
    for i in 0..7 {
        for j in 0..7 {
            out[i][j] = (0..7).fold(T::ZERO, |acc, k| acc + a[i][k] * b[k][j]);
        }
    }
    out
}

/// Write a 3x3 block with its top-left corner at `(row, col)`.
pub(crate) fn set_block<T: Real>(m: &mut Matrix7<T>, row: usize, col: usize, block: &T::Mat3) {
    for i in 0..3 {
        for j in 0..3 {
            m[row + i][col + j] = block.at(i, j);
        }
    }
}

/// Write a 3-vector as a column segment starting at `(row, col)`.
pub(crate) fn set_column<T: Real>(m: &mut Matrix7<T>, row: usize, col: usize, v: T::Vec3) {
    for i in 0..3 {
        m[row + i][col] = v[i];
    }
}
