//! Unit quaternions for rotation.
//!
//! Node and camera rotations are stored as matrices; quaternions exist for
//! the moments where matrices interpolate badly. Convert with
//! [`Quaternion::from_matrix4`], blend with [`Quaternion::slerp`] and write
//! back with [`Quaternion::to_matrix4`].
//!
//! # Example
//!
//! ```
//! use trellis::{Quaternion, Vector3};
//!
//! let a = Quaternion::IDENTITY;
//! let b = Quaternion::from_axis_angle(Vector3::Y, std::f64::consts::FRAC_PI_2);
//! let halfway = Quaternion::slerp(a, b, 0.5);
//! assert!((halfway.to_axis_angle().angle - std::f64::consts::FRAC_PI_4).abs() < 1e-9);
//! ```

use std::fmt;
use std::ops::{Mul, Neg};

use serde::{Deserialize, Serialize};

use crate::matrix::Matrix4;
use crate::vector::Vector3;

/// Rotation as `(x, y, z, w)` with `w` the scalar part.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable,
)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

/// An axis and an angle in radians.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisAngle {
    pub axis: Vector3,
    pub angle: f64,
}

/// Which diagonal term a matrix-to-quaternion conversion pivots on.
///
/// Dividing by the largest available term keeps the conversion stable near
/// 180° rotations where the trace approaches -1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConversionCase {
    PositiveTrace,
    XDominant,
    YDominant,
    ZDominant,
}

impl ConversionCase {
    pub(crate) fn for_matrix(m: &Matrix4) -> Self {
        let m = &m.0;
        let trace = m[0] + m[5] + m[10];
        if trace > 0.0 {
            Self::PositiveTrace
        } else if m[0] > m[5] && m[0] > m[10] {
            Self::XDominant
        } else if m[5] > m[10] {
            Self::YDominant
        } else {
            Self::ZDominant
        }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Tolerance used by [`Quaternion::normalize`].
    pub const TOLERANCE: f64 = 1e-5;

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about `axis`. The axis is normalized first.
    pub fn from_axis_angle(axis: Vector3, angle: f64) -> Self {
        let axis = axis.normalize();
        let (s, c) = (angle / 2.0).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c).normalize()
    }

    /// Euler angles in radians, equivalent to `Rz(z) * Ry(y) * Rx(x)`.
    pub fn from_xyz(x: f64, y: f64, z: f64) -> Self {
        let (sr, cr) = (x / 2.0).sin_cos();
        let (sp, cp) = (y / 2.0).sin_cos();
        let (sy, cy) = (z / 2.0).sin_cos();
        Self::new(
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
            cr * cp * cy + sr * sp * sy,
        )
        .normalize()
    }

    /// Extracts the rotation of a pure rotation matrix.
    ///
    /// Radicands are clamped at zero so drift in a nearly orthonormal matrix
    /// never produces NaN.
    pub fn from_matrix4(m: &Matrix4) -> Self {
        let case = ConversionCase::for_matrix(m);
        let m = &m.0;
        match case {
            ConversionCase::PositiveTrace => {
                let s = (m[0] + m[5] + m[10] + 1.0).max(0.0).sqrt() * 2.0;
                Self::new(
                    (m[9] - m[6]) / s,
                    (m[2] - m[8]) / s,
                    (m[4] - m[1]) / s,
                    0.25 * s,
                )
            }
            ConversionCase::XDominant => {
                let s = (1.0 + m[0] - m[5] - m[10]).max(0.0).sqrt() * 2.0;
                Self::new(
                    0.25 * s,
                    (m[1] + m[4]) / s,
                    (m[2] + m[8]) / s,
                    (m[9] - m[6]) / s,
                )
            }
            ConversionCase::YDominant => {
                let s = (1.0 + m[5] - m[0] - m[10]).max(0.0).sqrt() * 2.0;
                Self::new(
                    (m[1] + m[4]) / s,
                    0.25 * s,
                    (m[6] + m[9]) / s,
                    (m[2] - m[8]) / s,
                )
            }
            ConversionCase::ZDominant => {
                let s = (1.0 + m[10] - m[0] - m[5]).max(0.0).sqrt() * 2.0;
                Self::new(
                    (m[2] + m[8]) / s,
                    (m[6] + m[9]) / s,
                    0.25 * s,
                    (m[4] - m[1]) / s,
                )
            }
        }
        .normalize()
    }

    /// The equivalent rotation matrix with no translation.
    pub fn to_matrix4(&self) -> Matrix4 {
        let Self { x, y, z, w } = *self;
        let (x2, y2, z2) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);
        Matrix4([
            1.0 - 2.0 * (y2 + z2),
            2.0 * (xy - wz),
            2.0 * (xz + wy),
            0.0,
            2.0 * (xy + wz),
            1.0 - 2.0 * (x2 + z2),
            2.0 * (yz - wx),
            0.0,
            2.0 * (xz - wy),
            2.0 * (yz + wx),
            1.0 - 2.0 * (x2 + y2),
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.dot(*self)
    }

    pub fn dot(&self, b: Self) -> f64 {
        self.x * b.x + self.y * b.y + self.z * b.z + self.w * b.w
    }

    /// Rescales to unit length.
    ///
    /// Skipped when the squared magnitude is within [`Self::TOLERANCE`] of
    /// zero or of one, so a degenerate quaternion is returned as is instead
    /// of being blown up.
    pub fn normalize(self) -> Self {
        let mag2 = self.magnitude_squared();
        if mag2.abs() > Self::TOLERANCE && (mag2 - 1.0).abs() > Self::TOLERANCE {
            let mag = mag2.sqrt();
            Self::new(self.x / mag, self.y / mag, self.z / mag, self.w / mag)
        } else {
            self
        }
    }

    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Hamilton product. `a * b` applies `b` first, matching matrix order.
    pub fn multiply(a: Self, b: Self) -> Self {
        Self::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }

    /// Rotates the direction `v`. The input is normalized first, so only
    /// its direction survives.
    pub fn multiply_vector(&self, v: Vector3) -> Vector3 {
        let v = v.normalize();
        let p = Self::new(v.x, v.y, v.z, 0.0);
        let r = *self * p * self.conjugate();
        Vector3::new(r.x, r.y, r.z)
    }

    /// Local +X axis.
    pub fn right(&self) -> Vector3 {
        let m = self.to_matrix4();
        Vector3::new(m[0], m[4], m[8])
    }

    /// Local +Y axis.
    pub fn up(&self) -> Vector3 {
        let m = self.to_matrix4();
        Vector3::new(m[1], m[5], m[9])
    }

    /// Local +Z axis.
    pub fn forward(&self) -> Vector3 {
        let m = self.to_matrix4();
        Vector3::new(m[2], m[6], m[10])
    }

    /// Shortest-arc spherical interpolation from `qa` (t = 0) to `qb` (t = 1).
    ///
    /// `t` is not clamped. Coincident inputs return `qa`; nearly opposite
    /// rotations fall back to a linear blend.
    pub fn slerp(qa: Self, qb: Self, t: f64) -> Self {
        let mut qb = qb;
        let mut cos_half_theta = qa.dot(qb);
        if cos_half_theta < 0.0 {
            qb = -qb;
            cos_half_theta = -cos_half_theta;
        }

        if cos_half_theta.abs() >= 1.0 {
            return qa;
        }

        let half_theta = cos_half_theta.acos();
        let sin_half_theta = (1.0 - cos_half_theta * cos_half_theta).sqrt();

        if sin_half_theta.abs() < 0.001 {
            return Self::new(
                qa.x * (1.0 - t) + qb.x * t,
                qa.y * (1.0 - t) + qb.y * t,
                qa.z * (1.0 - t) + qb.z * t,
                qa.w * (1.0 - t) + qb.w * t,
            );
        }

        let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half_theta;
        let ratio_b = (t * half_theta).sin() / sin_half_theta;
        Self::new(
            qa.x * ratio_a + qb.x * ratio_b,
            qa.y * ratio_a + qb.y * ratio_b,
            qa.z * ratio_a + qb.z * ratio_b,
            qa.w * ratio_a + qb.w * ratio_b,
        )
    }

    /// Back to axis + angle.
    ///
    /// For angles near zero the axis is ill-defined; it is then taken
    /// straight from the vector part and may be shorter than unit length.
    pub fn to_axis_angle(&self) -> AxisAngle {
        let q = if self.w > 1.0 { self.normalize() } else { *self };
        let angle = 2.0 * q.w.clamp(-1.0, 1.0).acos();
        let s = (1.0 - q.w * q.w).max(0.0).sqrt();
        let axis = if s < 0.001 {
            Vector3::new(q.x, q.y, q.z)
        } else {
            Vector3::new(q.x / s, q.y / s, q.z / s)
        };
        AxisAngle { axis, angle }
    }
}

impl Mul for Quaternion {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::multiply(self, rhs)
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2},{:.2},{:.2},{:.2}", self.x, self.y, self.z, self.w)
    }
}

impl From<AxisAngle> for Quaternion {
    fn from(aa: AxisAngle) -> Self {
        Self::from_axis_angle(aa.axis, aa.angle)
    }
}

impl From<glam::DQuat> for Quaternion {
    fn from(q: glam::DQuat) -> Self {
        Self::new(q.x, q.y, q.z, q.w)
    }
}

impl From<Quaternion> for glam::DQuat {
    fn from(q: Quaternion) -> Self {
        glam::DQuat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn same_rotation(a: Quaternion, b: Quaternion) -> bool {
        a.dot(b).abs() > 1.0 - 1e-9
    }

    fn assert_matrix_close(a: &Matrix4, b: &Matrix4) {
        for i in 0..16 {
            assert!((a[i] - b[i]).abs() < 1e-9, "index {i}:\n{a}\n--\n{b}");
        }
    }

    fn sample_rotations() -> Vec<Quaternion> {
        vec![
            Quaternion::IDENTITY,
            Quaternion::from_axis_angle(Vector3::X, 0.3),
            Quaternion::from_axis_angle(Vector3::new(1.0, -2.0, 0.5), 2.2),
            Quaternion::from_axis_angle(Vector3::Y, PI),
            Quaternion::from_axis_angle(Vector3::new(0.2, 0.1, -1.0), 3.0),
            Quaternion::from_xyz(0.7, -1.2, 2.9),
        ]
    }

    #[test]
    fn conversion_case_positive_trace() {
        let m = Matrix4::IDENTITY;
        assert_eq!(ConversionCase::for_matrix(&m), ConversionCase::PositiveTrace);
        assert_eq!(Quaternion::from_matrix4(&m), Quaternion::IDENTITY);
    }

    #[test]
    fn conversion_case_x_dominant() {
        let m = Matrix4::rotation_x(PI);
        assert_eq!(ConversionCase::for_matrix(&m), ConversionCase::XDominant);
        let q = Quaternion::from_matrix4(&m);
        assert!(same_rotation(q, Quaternion::new(1.0, 0.0, 0.0, 0.0)));

        let m = Matrix4::rotation_axis(Vector3::new(1.0, 0.1, 0.0).normalize(), 0.9 * PI);
        assert_eq!(ConversionCase::for_matrix(&m), ConversionCase::XDominant);
        let expected = Quaternion::from_axis_angle(Vector3::new(1.0, 0.1, 0.0), 0.9 * PI);
        assert!(same_rotation(Quaternion::from_matrix4(&m), expected));
    }

    #[test]
    fn conversion_case_y_dominant() {
        let m = Matrix4::rotation_y(PI);
        assert_eq!(ConversionCase::for_matrix(&m), ConversionCase::YDominant);
        let q = Quaternion::from_matrix4(&m);
        assert!(same_rotation(q, Quaternion::new(0.0, 1.0, 0.0, 0.0)));

        let m = Matrix4::rotation_axis(Vector3::new(0.1, 1.0, 0.2).normalize(), 0.9 * PI);
        assert_eq!(ConversionCase::for_matrix(&m), ConversionCase::YDominant);
        let expected = Quaternion::from_axis_angle(Vector3::new(0.1, 1.0, 0.2), 0.9 * PI);
        assert!(same_rotation(Quaternion::from_matrix4(&m), expected));
    }

    #[test]
    fn conversion_case_z_dominant() {
        let m = Matrix4::rotation_z(PI);
        assert_eq!(ConversionCase::for_matrix(&m), ConversionCase::ZDominant);
        let q = Quaternion::from_matrix4(&m);
        assert!(same_rotation(q, Quaternion::new(0.0, 0.0, 1.0, 0.0)));

        let m = Matrix4::rotation_axis(Vector3::new(-0.2, 0.1, 1.0).normalize(), 0.9 * PI);
        assert_eq!(ConversionCase::for_matrix(&m), ConversionCase::ZDominant);
        let expected = Quaternion::from_axis_angle(Vector3::new(-0.2, 0.1, 1.0), 0.9 * PI);
        assert!(same_rotation(Quaternion::from_matrix4(&m), expected));
    }

    #[test]
    fn matrix_round_trip_up_to_sign() {
        for q in sample_rotations() {
            let back = Quaternion::from_matrix4(&q.to_matrix4());
            assert!(same_rotation(q, back), "{q} vs {back}");
        }
    }

    #[test]
    fn drifted_matrix_does_not_produce_nan() {
        let mut m = Matrix4::rotation_x(PI);
        m[5] -= 1e-12;
        m[10] -= 1e-12;
        let q = Quaternion::from_matrix4(&m);
        assert!(!q.x.is_nan() && !q.w.is_nan());
    }

    #[test]
    fn to_matrix_matches_axis_rotation() {
        let axis = Vector3::new(0.3, -0.4, 0.8).normalize();
        let q = Quaternion::from_axis_angle(axis, 1.7);
        assert_matrix_close(&q.to_matrix4(), &Matrix4::rotation_axis(axis, 1.7));
    }

    #[test]
    fn to_matrix_matches_glam() {
        for q in sample_rotations() {
            let theirs = glam::DMat4::from_quat(q.into());
            assert_matrix_close(&q.to_matrix4(), &theirs.into());
        }
    }

    #[test]
    fn from_xyz_matches_composed_elementary_rotations() {
        let (x, y, z) = (0.4, -0.9, 1.3);
        let q = Quaternion::from_xyz(x, y, z);
        assert_matrix_close(&q.to_matrix4(), &Matrix4::rotation_xyz(x, y, z));
    }

    #[test]
    fn product_matches_matrix_product() {
        let a = Quaternion::from_axis_angle(Vector3::X, 0.8);
        let b = Quaternion::from_axis_angle(Vector3::new(0.0, 1.0, 1.0), -1.1);
        assert_matrix_close(&(a * b).to_matrix4(), &(a.to_matrix4() * b.to_matrix4()));
    }

    #[test]
    fn multiply_vector_rotates_direction() {
        let q = Quaternion::from_axis_angle(Vector3::Z, FRAC_PI_2);
        let v = q.multiply_vector(Vector3::new(5.0, 0.0, 0.0));
        assert!(v.distance(Vector3::Y) < 1e-12);
    }

    #[test]
    fn local_axes_are_matrix_columns() {
        let q = Quaternion::from_axis_angle(Vector3::Y, FRAC_PI_2);
        assert!(q.right().distance(Vector3::new(0.0, 0.0, -1.0)) < 1e-12);
        assert!(q.up().distance(Vector3::Y) < 1e-12);
        assert!(q.forward().distance(Vector3::X) < 1e-12);
    }

    #[test]
    fn slerp_endpoints() {
        let a = Quaternion::from_axis_angle(Vector3::X, 0.2);
        let b = Quaternion::from_axis_angle(Vector3::new(1.0, 1.0, 0.0), 1.4);
        assert!(same_rotation(Quaternion::slerp(a, b, 0.0), a));
        assert!(same_rotation(Quaternion::slerp(a, b, 1.0), b));
    }

    #[test]
    fn slerp_of_equal_inputs_is_constant() {
        for q in sample_rotations() {
            for t in [0.0, 0.25, 0.5, 1.0] {
                assert!(same_rotation(Quaternion::slerp(q, q, t), q));
            }
        }
    }

    #[test]
    fn slerp_takes_the_short_arc() {
        let a = Quaternion::IDENTITY;
        let b = -Quaternion::from_axis_angle(Vector3::Z, 0.5);
        let mid = Quaternion::slerp(a, b, 0.5);
        let expected = Quaternion::from_axis_angle(Vector3::Z, 0.25);
        assert!(same_rotation(mid, expected));
        assert!(mid.w > 0.0);
    }

    #[test]
    fn slerp_matches_glam() {
        let a = Quaternion::from_axis_angle(Vector3::new(0.3, 0.1, 0.9), 0.4);
        let b = Quaternion::from_axis_angle(Vector3::new(-1.0, 0.5, 0.2), 2.1);
        let ours = Quaternion::slerp(a, b, 0.3);
        let theirs = glam::DQuat::from(a).slerp(b.into(), 0.3);
        assert!(same_rotation(ours, theirs.into()));
    }

    #[test]
    fn slerp_of_nearly_equal_inputs_blends_linearly() {
        let a = Quaternion::new(1.0, 0.0, 0.0, 0.0);
        let b = Quaternion::new(0.9999999, 0.0004, 0.0, 0.0).normalize();
        let mid = Quaternion::slerp(a, b, 0.5);
        assert!((mid.x - (a.x + b.x) / 2.0).abs() < 1e-12);
        assert!((mid.y - (a.y + b.y) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_respects_both_gates() {
        let nearly_unit = Quaternion::new(0.0, 0.0, 0.0, 1.000001);
        assert_eq!(nearly_unit.normalize(), nearly_unit);

        let nearly_zero = Quaternion::new(0.001, 0.0, 0.0, 0.0);
        assert_eq!(nearly_zero.normalize(), nearly_zero);

        let long = Quaternion::new(0.0, 3.0, 0.0, 4.0).normalize();
        assert!((long.magnitude_squared() - 1.0).abs() < 1e-12);
        assert_eq!(long.y, 0.6);
    }

    #[test]
    fn to_axis_angle_recovers_inputs() {
        let axis = Vector3::new(2.0, -1.0, 0.5).normalize();
        let aa = Quaternion::from_axis_angle(axis, 1.25).to_axis_angle();
        assert!((aa.angle - 1.25).abs() < 1e-12);
        assert!(aa.axis.distance(axis) < 1e-12);
    }

    #[test]
    fn to_axis_angle_of_identity_uses_raw_vector_part() {
        let aa = Quaternion::IDENTITY.to_axis_angle();
        assert_eq!(aa.angle, 0.0);
        assert_eq!(aa.axis, Vector3::ZERO);
    }

    #[test]
    fn conjugate_inverts_unit_rotation() {
        let q = Quaternion::from_xyz(0.1, 0.2, 0.3);
        assert!(same_rotation(q * q.conjugate(), Quaternion::IDENTITY));
    }
}
