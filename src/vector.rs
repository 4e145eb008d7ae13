//! Three- and four-component vectors.
//!
//! [`Vector3`] is the workhorse for positions, directions and scale factors.
//! [`Vector4`] is its homogeneous counterpart, produced whenever a point is
//! pushed through a [`Matrix4`].
//!
//! Both types are plain `Copy` values. Every operation returns a new value and
//! is total over finite floats: normalizing the zero vector yields the zero
//! vector, and NaN/infinity simply propagate.
//!
//! # Example
//!
//! ```
//! use trellis::{Matrix4, Vector3};
//!
//! let offset = Matrix4::translation(0.0, 0.0, -100.0);
//! let p = Vector3::new(1.0, 2.0, 3.0).transform(&offset).to_vector3();
//! assert_eq!(p, Vector3::new(1.0, 2.0, -97.0));
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::interpolation::lerp;
use crate::matrix::Matrix4;

/// A 3-component vector of `f64`.
///
/// Uses `#[repr(C)]` and derives [`bytemuck::Pod`] so slices of vectors can be
/// handed to a GPU or FFI boundary without copying.
#[repr(C)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Overwrites all three components in place.
    pub fn set(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    /// Euclidean length.
    pub fn magnitude(self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    pub fn magnitude_squared(self) -> f64 {
        self.dot(self)
    }

    /// Returns a unit-length copy, or the vector unchanged if its magnitude is exactly zero.
    pub fn normalize(self) -> Self {
        let m = self.magnitude();
        if m != 0.0 { self / m } else { self }
    }

    pub fn dot(self, b: Self) -> f64 {
        self.x * b.x + self.y * b.y + self.z * b.z
    }

    /// Right-handed cross product, perpendicular to both inputs.
    ///
    /// ```
    /// use trellis::Vector3;
    ///
    /// assert_eq!(Vector3::cross(Vector3::X, Vector3::Y), Vector3::Z);
    /// ```
    pub fn cross(self, b: Self) -> Self {
        Self::new(
            self.y * b.z - self.z * b.y,
            self.z * b.x - self.x * b.z,
            self.x * b.y - self.y * b.x,
        )
    }

    /// Distance between two points.
    pub fn distance(self, b: Self) -> f64 {
        (self - b).magnitude()
    }

    /// Transforms this point (implicit `w = 1`) by a row-major matrix.
    ///
    /// Translation is applied. The result keeps the projective `w`
    /// component; call [`Vector4::homogenize`] if the matrix is projective.
    pub fn transform(self, m: &Matrix4) -> Vector4 {
        let m = &m.0;
        Vector4::new(
            self.x * m[0] + self.y * m[1] + self.z * m[2] + m[3],
            self.x * m[4] + self.y * m[5] + self.z * m[6] + m[7],
            self.x * m[8] + self.y * m[9] + self.z * m[10] + m[11],
            self.x * m[12] + self.y * m[13] + self.z * m[14] + m[15],
        )
    }

    /// True only when all three components are exactly zero.
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Component-wise linear interpolation. `t` is not clamped.
    pub fn lerp(self, to: Self, t: f64) -> Self {
        Self::new(
            lerp(self.x, to.x, t),
            lerp(self.y, to.y, t),
            lerp(self.z, to.z, t),
        )
    }

    /// Extends to a homogeneous vector with the given `w`.
    pub fn extend(self, w: f64) -> Vector4 {
        Vector4::new(self.x, self.y, self.z, w)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2},{:.2},{:.2}", self.x, self.y, self.z)
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for Vector3 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<(f64, f64, f64)> for Vector3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vector3> for [f64; 3] {
    fn from(v: Vector3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl From<glam::DVec3> for Vector3 {
    fn from(v: glam::DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for glam::DVec3 {
    fn from(v: Vector3) -> Self {
        glam::DVec3::new(v.x, v.y, v.z)
    }
}

/// A homogeneous 4-component vector. `w` defaults to `1`.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable,
)]
pub struct Vector4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Vector4 {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

impl Vector4 {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Divides `x`, `y` and `z` by `w` and resets `w` to one.
    ///
    /// Left untouched when `w` is already exactly one.
    pub fn homogenize(self) -> Self {
        if self.w != 1.0 {
            Self::new(self.x / self.w, self.y / self.w, self.z / self.w, 1.0)
        } else {
            self
        }
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Normalizes all four components; the zero vector is returned unchanged.
    pub fn normalize(self) -> Self {
        let m = self.magnitude();
        if m != 0.0 {
            Self::new(self.x / m, self.y / m, self.z / m, self.w / m)
        } else {
            self
        }
    }

    pub fn dot(self, b: Self) -> f64 {
        self.x * b.x + self.y * b.y + self.z * b.z + self.w * b.w
    }

    /// Cross product of the homogenized inputs, returned with `w = 1` and
    /// then normalized as a 4-vector.
    pub fn cross(self, b: Self) -> Self {
        let a = self.homogenize().to_vector3();
        let b = b.homogenize().to_vector3();
        a.cross(b).extend(1.0).normalize()
    }

    /// Full 4×4 transform including the `w` column.
    pub fn transform(self, m: &Matrix4) -> Self {
        let m = &m.0;
        Self::new(
            self.x * m[0] + self.y * m[1] + self.z * m[2] + self.w * m[3],
            self.x * m[4] + self.y * m[5] + self.z * m[6] + self.w * m[7],
            self.x * m[8] + self.y * m[9] + self.z * m[10] + self.w * m[11],
            self.x * m[12] + self.y * m[13] + self.z * m[14] + self.w * m[15],
        )
    }

    /// Drops `w` without dividing.
    pub fn to_vector3(self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<Vector3> for Vector4 {
    fn from(v: Vector3) -> Self {
        v.extend(1.0)
    }
}

impl From<glam::DVec4> for Vector4 {
    fn from(v: glam::DVec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Vector4> for glam::DVec4 {
    fn from(v: Vector4) -> Self {
        glam::DVec4::new(v.x, v.y, v.z, v.w)
    }
}
