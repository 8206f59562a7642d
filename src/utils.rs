/*
    mission-geometry, frame transformations and event location for mission analysis
    Copyright (C) 2024-onwards the mission-geometry developers

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::linalg::{Matrix3, Matrix6, Vector3};

/// Returns the tilde matrix from the provided Vector3.
pub fn tilde_matrix(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0,
        -v[(2, 0)],
        v[(1, 0)],
        v[(2, 0)],
        0.0,
        -v[(0, 0)],
        -v[(1, 0)],
        v[(0, 0)],
        0.0,
    )
}

/// Rotation about the first axis, angle in radians
pub fn r1(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Rotation about the second axis, angle in radians
pub fn r2(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Rotation about the third axis, angle in radians
pub fn r3(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Returns the Frobenius norm of `m^T m - I`, i.e. how far this matrix is from being orthonormal.
pub fn orthonormality_error(m: &Matrix3<f64>) -> f64 {
    (m.transpose() * m - Matrix3::identity()).norm()
}

/// Builds the 6x6 state DCM from a rotation and its time derivative.
/// The upper left and lower right blocks are `dcm`, the lower left block is `dcm_dot`.
pub fn dcm6(dcm: &Matrix3<f64>, dcm_dot: &Matrix3<f64>) -> Matrix6<f64> {
    let mut full = Matrix6::zeros();
    full.fixed_view_mut::<3, 3>(0, 0).copy_from(dcm);
    full.fixed_view_mut::<3, 3>(3, 3).copy_from(dcm);
    full.fixed_view_mut::<3, 3>(3, 0).copy_from(dcm_dot);
    full
}

/// Arc cosine which clamps its argument into [-1, 1] instead of returning NaN.
/// Floating point error routinely pushes cosines of near-aligned vectors just outside the domain.
pub fn clamped_acos(x: f64) -> f64 {
    if x > 1.0 {
        trace!("clamping acos argument {x} to 1");
        0.0
    } else if x < -1.0 {
        trace!("clamping acos argument {x} to -1");
        std::f64::consts::PI
    } else {
        x.acos()
    }
}
