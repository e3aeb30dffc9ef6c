//! Vector and rotation types carried by node info responses

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A point or direction in 3D space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector
    pub fn normalized(&self) -> Option<Vec3> {
        let len = self.length();
        if len <= f64::EPSILON {
            None
        } else {
            Some(Vec3::new(self.x / len, self.y / len, self.z / len))
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:.2}, {:.2}, {:.2}}}", self.x, self.y, self.z)
    }
}

/// Row-major 3x3 rotation matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3 {
    pub rows: [[f64; 3]; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Rotation of `angle` radians about `axis` (Rodrigues).
    ///
    /// Returns `None` when the axis has zero length.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Option<Mat3> {
        let Vec3 { x, y, z } = axis.normalized()?;
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        Some(Mat3 {
            rows: [
                [t * x * x + c, t * x * y - s * z, t * x * z + s * y],
                [t * x * y + s * z, t * y * y + c, t * y * z - s * x],
                [t * x * z - s * y, t * y * z + s * x, t * z * z + c],
            ],
        })
    }

    pub fn row(&self, i: usize) -> Vec3 {
        let r = self.rows[i];
        Vec3::new(r[0], r[1], r[2])
    }

    pub fn transform(&self, v: Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3::new(
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        )
    }

    /// True when every entry is within `eps` of `other`
    pub fn approx_eq(&self, other: &Mat3, eps: f64) -> bool {
        self.rows
            .iter()
            .flatten()
            .zip(other.rows.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rows[i][k] * rhs.rows[k][j]).sum();
            }
        }
        Mat3 { rows }
    }
}

impl fmt::Display for Mat3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X: {}\nY: {}\nZ: {}",
            self.row(0),
            self.row(1),
            self.row(2)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_vec3_display() {
        let v = Vec3::new(1.0, -2.5, 1.0 / 3.0);
        assert_eq!(v.to_string(), "{1.00, -2.50, 0.33}");
    }

    #[test]
    fn test_zero_axis_has_no_rotation() {
        assert!(Mat3::from_axis_angle(Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_quarter_turn_about_z() {
        let m = Mat3::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), FRAC_PI_2).unwrap();
        let v = m.transform(Vec3::new(1.0, 0.0, 0.0));
        assert!((v.x).abs() < 1e-9);
        assert!((v.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_four_quarter_turns_is_identity() {
        let q = Mat3::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), FRAC_PI_2).unwrap();
        let full = q * q * q * q;
        assert!(full.approx_eq(&Mat3::IDENTITY, 1e-9));
    }

    #[test]
    fn test_mat3_display() {
        let text = Mat3::IDENTITY.to_string();
        assert_eq!(
            text,
            "X: {1.00, 0.00, 0.00}\nY: {0.00, 1.00, 0.00}\nZ: {0.00, 0.00, 1.00}"
        );
    }
}
