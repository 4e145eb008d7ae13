//! Row-major 4×4 matrices.
//!
//! A [`Matrix4`] stores 16 `f64` values row by row. Points are column vectors
//! multiplied on the right, so the translation of an affine matrix lives at
//! indices 3, 7 and 11 (the last column of the first three rows):
//!
//! | Row | Indices        |
//! |-----|----------------|
//! | 0   | 0, 1, 2, **3** |
//! | 1   | 4, 5, 6, **7** |
//! | 2   | 8, 9, 10, **11** |
//! | 3   | 12, 13, 14, 15 |
//!
//! Composition reads left to right as `parent * child`: the right-hand
//! matrix is applied to a point first.
//!
//! # Example
//!
//! ```
//! use trellis::Matrix4;
//!
//! let world = Matrix4::translation(0.0, 0.0, -100.0) * Matrix4::rotation_y(std::f64::consts::FRAC_PI_2);
//! let view = world.fast_inverse();
//! let back_to_local = (view * world).translation_part();
//! assert!(back_to_local.magnitude() < 1e-9);
//! ```

use std::fmt;
use std::ops::{Index, IndexMut, Mul};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::quaternion::{AxisAngle, Quaternion};
use crate::vector::Vector3;

/// A row-major 4×4 matrix.
///
/// `#[repr(C)]` plus [`bytemuck::Pod`] lets a renderer upload the raw array
/// with `bytemuck::bytes_of`. Note that GPU APIs usually expect column-major
/// data; use [`Matrix4::transpose`] or the [`glam::DMat4`] conversion first.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable,
)]
pub struct Matrix4(pub [f64; 16]);

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    /// Degrees-to-radians factor.
    pub const D2R: f64 = std::f64::consts::PI / 180.0;

    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    pub const fn new(values: [f64; 16]) -> Self {
        Self(values)
    }

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn to_array(&self) -> [f64; 16] {
        self.0
    }

    /// Standard 4×4 product `a * b`. Not commutative.
    pub fn multiply(a: &Matrix4, b: &Matrix4) -> Matrix4 {
        let a = &a.0;
        let b = &b.0;
        let mut out = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = a[row * 4] * b[col]
                    + a[row * 4 + 1] * b[4 + col]
                    + a[row * 4 + 2] * b[8 + col]
                    + a[row * 4 + 3] * b[12 + col];
            }
        }
        Matrix4(out)
    }

    /// Rotation about the X axis (radians).
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self([
            1.0, 0.0, 0.0, 0.0, //
            0.0, c, -s, 0.0, //
            0.0, s, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about the Y axis (radians).
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self([
            c, 0.0, s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            -s, 0.0, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about the Z axis (radians).
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self([
            c, -s, 0.0, 0.0, //
            s, c, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rodrigues rotation about `axis`, which must already be normalized.
    pub fn rotation_axis(axis: Vector3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let Vector3 { x, y, z } = axis;
        let tx = t * x;
        let ty = t * y;
        Self([
            tx * x + c,
            tx * y - s * z,
            tx * z + s * y,
            0.0,
            tx * y + s * z,
            ty * y + c,
            ty * z - s * x,
            0.0,
            tx * z - s * y,
            ty * z + s * x,
            t * z * z + c,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    /// Composes `Rz(z) * Ry(y) * Rx(x)`: X is applied first, then Y, then Z.
    pub fn rotation_xyz(x: f64, y: f64, z: f64) -> Self {
        Self::rotation_z(z) * Self::rotation_y(y) * Self::rotation_x(x)
    }

    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        Self([
            x, 0.0, 0.0, 0.0, //
            0.0, y, 0.0, 0.0, //
            0.0, 0.0, z, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self([
            1.0, 0.0, 0.0, x, //
            0.0, 1.0, 0.0, y, //
            0.0, 0.0, 1.0, z, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// First column of the rotation block.
    pub fn right(&self) -> Vector3 {
        let m = &self.0;
        Vector3::new(m[0], m[4], m[8])
    }

    /// Negated second column. Screen-space Y grows downwards, so "up" is `-Y`.
    pub fn up(&self) -> Vector3 {
        let m = &self.0;
        Vector3::new(-m[1], -m[5], -m[9])
    }

    /// Third column of the rotation block.
    pub fn back(&self) -> Vector3 {
        let m = &self.0;
        Vector3::new(m[2], m[6], m[10])
    }

    /// Negated third column.
    pub fn forward(&self) -> Vector3 {
        let m = &self.0;
        Vector3::new(-m[2], -m[6], -m[10])
    }

    /// OpenGL-style perspective frustum.
    pub fn frustum(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        let r_l = right - left;
        let t_b = top - bottom;
        let f_n = far - near;
        let n2 = 2.0 * near;
        Self([
            n2 / r_l,
            0.0,
            (right + left) / r_l,
            0.0,
            0.0,
            n2 / t_b,
            (top + bottom) / t_b,
            0.0,
            0.0,
            0.0,
            -(far + near) / f_n,
            -2.0 * (far * near) / f_n,
            0.0,
            0.0,
            -1.0,
            0.0,
        ])
    }

    /// Symmetric perspective projection. `fov` is the vertical field of view in degrees.
    pub fn projection(fov: f64, width: f64, height: f64, near: f64, far: f64) -> Self {
        let half_height = (fov * Self::D2R / 2.0).tan() * near;
        let half_width = half_height * (width / height);
        Self::frustum(-half_width, half_width, -half_height, half_height, near, far)
    }

    /// Rotation-only basis looking from `eye` towards `target`.
    ///
    /// The third column points from the target back to the eye. No translation
    /// is written; callers place the result themselves.
    pub fn look_at(eye: Vector3, target: Vector3, up: Vector3) -> Self {
        let z_axis = (eye - target).normalize();
        let x_axis = z_axis.cross(up).normalize();
        let y_axis = z_axis.cross(x_axis);
        Self([
            x_axis.x, y_axis.x, z_axis.x, 0.0, //
            x_axis.y, y_axis.y, z_axis.y, 0.0, //
            x_axis.z, y_axis.z, z_axis.z, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn transpose(&self) -> Self {
        let m = &self.0;
        Self([
            m[0], m[4], m[8], m[12], //
            m[1], m[5], m[9], m[13], //
            m[2], m[6], m[10], m[14], //
            m[3], m[7], m[11], m[15],
        ])
    }

    /// Inverse of a rigid transform (rotation + translation only).
    ///
    /// Transposes the rotation block and rewrites the translation as `-Rᵀt`.
    /// The result is silently wrong for matrices carrying scale or shear;
    /// debug builds log a warning when the input is not rigid.
    pub fn fast_inverse(&self) -> Self {
        if cfg!(debug_assertions) && !self.is_rigid() {
            warn!(matrix = %self, "fast_inverse called on a non-rigid matrix");
        }

        let m = &self.0;
        let x = -m[3] * m[0] - m[7] * m[4] - m[11] * m[8];
        let y = -m[3] * m[1] - m[7] * m[5] - m[11] * m[9];
        let z = -m[3] * m[2] - m[7] * m[6] - m[11] * m[10];
        Self([
            m[0], m[4], m[8], x, //
            m[1], m[5], m[9], y, //
            m[2], m[6], m[10], z, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Whether the rotation block is orthonormal and the bottom row is `(0, 0, 0, 1)`.
    pub fn is_rigid(&self) -> bool {
        const EPS: f64 = 1e-3;
        let m = &self.0;
        let rows = [
            Vector3::new(m[0], m[1], m[2]),
            Vector3::new(m[4], m[5], m[6]),
            Vector3::new(m[8], m[9], m[10]),
        ];
        for (i, a) in rows.iter().enumerate() {
            for (j, b) in rows.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                if (a.dot(*b) - expected).abs() > EPS {
                    return false;
                }
            }
        }
        m[12] == 0.0 && m[13] == 0.0 && m[14] == 0.0 && m[15] == 1.0
    }

    /// Axis and angle of a pure rotation matrix, via quaternion conversion.
    pub fn to_axis_angle(&self) -> AxisAngle {
        Quaternion::from_matrix4(self).to_axis_angle()
    }

    /// The translation column as a vector.
    pub fn translation_part(&self) -> Vector3 {
        Vector3::new(self.0[3], self.0[7], self.0[11])
    }

    /// Copy of this matrix with the translation column replaced.
    pub fn with_translation(mut self, t: Vector3) -> Self {
        self.0[3] = t.x;
        self.0[7] = t.y;
        self.0[11] = t.z;
        self
    }

    /// Copy of the upper 3×3 block with no translation and an identity bottom row.
    pub fn rotation_part(&self) -> Self {
        let m = &self.0;
        Self([
            m[0], m[1], m[2], 0.0, //
            m[4], m[5], m[6], 0.0, //
            m[8], m[9], m[10], 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        Matrix4::multiply(&self, &rhs)
    }
}

impl Mul<&Matrix4> for &Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: &Matrix4) -> Matrix4 {
        Matrix4::multiply(self, rhs)
    }
}

impl Index<usize> for Matrix4 {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl IndexMut<usize> for Matrix4 {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

impl fmt::Display for Matrix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.0.chunks(4).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{:.2},\t{:.2},\t{:.2},\t{:.2}",
                row[0], row[1], row[2], row[3]
            )?;
        }
        Ok(())
    }
}

// glam stores matrices column-major, hence the transposes.
impl From<glam::DMat4> for Matrix4 {
    fn from(m: glam::DMat4) -> Self {
        Matrix4(m.transpose().to_cols_array())
    }
}

impl From<Matrix4> for glam::DMat4 {
    fn from(m: Matrix4) -> Self {
        glam::DMat4::from_cols_array(&m.0).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_matrix_close(a: &Matrix4, b: &Matrix4, eps: f64) {
        for i in 0..16 {
            assert!(
                (a[i] - b[i]).abs() < eps,
                "index {i}: {} != {}\n{a}\n--\n{b}",
                a[i],
                b[i]
            );
        }
    }

    fn samples() -> Vec<Matrix4> {
        vec![
            Matrix4::rotation_x(0.3),
            Matrix4::translation(1.0, -2.0, 3.5) * Matrix4::rotation_y(1.1),
            Matrix4::scale(2.0, 0.5, 3.0) * Matrix4::rotation_z(-0.8),
            Matrix4::projection(60.0, 800.0, 600.0, 0.1, 1000.0),
        ]
    }

    #[test]
    fn identity_is_neutral() {
        for m in samples() {
            assert_matrix_close(&(Matrix4::IDENTITY * m), &m, 1e-12);
            assert_matrix_close(&(m * Matrix4::IDENTITY), &m, 1e-12);
        }
    }

    #[test]
    fn multiply_is_associative() {
        let s = samples();
        let (a, b, c) = (s[1], s[2], s[3]);
        assert_matrix_close(&((a * b) * c), &(a * (b * c)), 1e-9);
    }

    #[test]
    fn multiply_is_not_commutative() {
        let t = Matrix4::translation(10.0, 0.0, 0.0);
        let r = Matrix4::rotation_z(FRAC_PI_2);
        assert_ne!(t * r, r * t);
        assert!(((t * r).translation_part() - Vector3::new(10.0, 0.0, 0.0)).magnitude() < 1e-12);
        assert!(((r * t).translation_part() - Vector3::new(0.0, 10.0, 0.0)).magnitude() < 1e-12);
    }

    #[test]
    fn multiply_matches_glam() {
        let s = samples();
        for a in &s {
            for b in &s {
                let theirs = glam::DMat4::from(*a) * glam::DMat4::from(*b);
                assert_matrix_close(&(a * b), &Matrix4::from(theirs), 1e-9);
            }
        }
    }

    #[test]
    fn elementary_rotations_match_glam() {
        for angle in [0.0, 0.4, -1.3, PI] {
            assert_matrix_close(
                &Matrix4::rotation_x(angle),
                &glam::DMat4::from_rotation_x(angle).into(),
                1e-12,
            );
            assert_matrix_close(
                &Matrix4::rotation_y(angle),
                &glam::DMat4::from_rotation_y(angle).into(),
                1e-12,
            );
            assert_matrix_close(
                &Matrix4::rotation_z(angle),
                &glam::DMat4::from_rotation_z(angle).into(),
                1e-12,
            );
        }
    }

    #[test]
    fn rotation_axis_matches_glam() {
        let axis = Vector3::new(1.0, 2.0, -0.5).normalize();
        let ours = Matrix4::rotation_axis(axis, 0.77);
        let theirs = glam::DMat4::from_axis_angle(axis.into(), 0.77);
        assert_matrix_close(&ours, &theirs.into(), 1e-12);
    }

    #[test]
    fn rotation_axis_on_principal_axes_matches_elementary() {
        assert_matrix_close(
            &Matrix4::rotation_axis(Vector3::Y, 0.5),
            &Matrix4::rotation_y(0.5),
            1e-12,
        );
    }

    #[test]
    fn fast_inverse_undoes_rigid_transforms() {
        let rigid = [
            Matrix4::translation(5.0, -3.0, 12.0) * Matrix4::rotation_xyz(0.2, -0.9, 1.4),
            Matrix4::rotation_axis(Vector3::new(1.0, 1.0, 1.0).normalize(), 2.0)
                .with_translation(Vector3::new(0.0, 0.0, -800.0)),
            Matrix4::IDENTITY,
        ];
        for m in rigid {
            assert_matrix_close(&(m.fast_inverse() * m), &Matrix4::IDENTITY, 1e-9);
            assert_matrix_close(&(m * m.fast_inverse()), &Matrix4::IDENTITY, 1e-9);
            let general = glam::DMat4::from(m).inverse();
            assert_matrix_close(&m.fast_inverse(), &general.into(), 1e-9);
        }
    }

    #[test]
    fn rigidity_check() {
        assert!(Matrix4::rotation_xyz(0.1, 0.2, 0.3).is_rigid());
        assert!(!Matrix4::scale(2.0, 1.0, 1.0).is_rigid());
        assert!(!Matrix4::projection(60.0, 1.0, 1.0, 1.0, 10.0).is_rigid());
    }

    #[test]
    fn basis_vectors_follow_sign_convention() {
        let m = Matrix4::IDENTITY;
        assert_eq!(m.right(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(m.up(), Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(m.back(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(m.forward(), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn projection_matches_glam_perspective() {
        let ours = Matrix4::projection(60.0, 800.0, 600.0, 0.1, 1000.0);
        let theirs =
            glam::DMat4::perspective_rh_gl(60.0_f64.to_radians(), 800.0 / 600.0, 0.1, 1000.0);
        assert_matrix_close(&ours, &theirs.into(), 1e-9);
    }

    #[test]
    fn look_at_builds_rotation_only_basis() {
        let eye = Vector3::new(100.0, -50.0, 300.0);
        let target = Vector3::new(0.0, 0.0, 0.0);
        let m = Matrix4::look_at(eye, target, Vector3::new(0.0, -1.0, 0.0));

        assert_eq!(m.translation_part(), Vector3::ZERO);
        assert!(m.is_rigid());
        assert!((m.back() - (eye - target).normalize()).magnitude() < 1e-12);

        let det = m.right().dot(m.up().cross(m.back()) * -1.0);
        assert!((det - 1.0).abs() < 1e-9);
    }

    #[test]
    fn look_at_down_negative_z_is_identity() {
        let m = Matrix4::look_at(
            Vector3::new(0.0, 0.0, 800.0),
            Vector3::ZERO,
            Vector3::new(0.0, -1.0, 0.0),
        );
        assert_matrix_close(&m, &Matrix4::IDENTITY, 1e-12);
    }

    #[test]
    fn transpose_is_an_involution() {
        for m in samples() {
            assert_eq!(m.transpose().transpose(), m);
        }
        assert_eq!(Matrix4::translation(1.0, 2.0, 3.0).transpose()[12], 1.0);
    }

    #[test]
    fn to_axis_angle_recovers_rotation() {
        let axis = Vector3::new(0.0, 1.0, 1.0).normalize();
        let aa = Matrix4::rotation_axis(axis, 1.2).to_axis_angle();
        assert!((aa.angle - 1.2).abs() < 1e-9);
        assert!((aa.axis - axis).magnitude() < 1e-9);
    }

    #[test]
    fn translation_helpers() {
        let m = Matrix4::rotation_z(0.4).with_translation(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(m.translation_part(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(m.rotation_part(), Matrix4::rotation_z(0.4));
    }

    #[test]
    fn pod_layout_is_sixteen_doubles() {
        assert_eq!(bytemuck::bytes_of(&Matrix4::IDENTITY).len(), 16 * 8);
    }

    #[test]
    fn display_prints_four_rows() {
        let s = Matrix4::IDENTITY.to_string();
        assert_eq!(s.lines().count(), 4);
        assert_eq!(s.lines().next(), Some("1.00,\t0.00,\t0.00,\t0.00"));
    }
}
