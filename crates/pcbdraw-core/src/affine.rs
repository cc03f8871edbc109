use std::ops::Mul;

use serde::{Deserialize, Serialize};

/// 2D affine transform laid out like SVG's `matrix(a b c d e f)`:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
///
/// `outer * inner` applies `inner` first, matching the left-to-right reading of an SVG
/// `transform` list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    #[must_use]
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    #[must_use]
    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    #[must_use]
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `deg` degrees around the origin. On a y-down canvas positive angles turn
    /// clockwise, same as SVG `rotate()`.
    #[must_use]
    pub fn rotate(deg: f64) -> Self {
        let (s, c) = deg.to_radians().sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    /// Rotation by `deg` around `center`.
    #[must_use]
    pub fn rotate_about(deg: f64, center: [f64; 2]) -> Self {
        Self::translate(center[0], center[1])
            * Self::rotate(deg)
            * Self::translate(-center[0], -center[1])
    }

    #[must_use]
    pub fn skew_x(deg: f64) -> Self {
        Self::new(1.0, 0.0, deg.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    #[must_use]
    pub fn skew_y(deg: f64) -> Self {
        Self::new(1.0, deg.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// Mirror across the vertical line `x = axis_x`.
    #[must_use]
    pub fn mirror_x(axis_x: f64) -> Self {
        Self::new(-1.0, 0.0, 0.0, 1.0, 2.0 * axis_x, 0.0)
    }

    #[must_use]
    pub fn apply(&self, p: [f64; 2]) -> [f64; 2] {
        [
            self.a * p[0] + self.c * p[1] + self.e,
            self.b * p[0] + self.d * p[1] + self.f,
        ]
    }

    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// True when the transform flips orientation (an odd number of mirrors).
    #[must_use]
    pub fn is_mirroring(&self) -> bool {
        self.determinant() < 0.0
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::IDENTITY, 1e-12)
    }

    #[must_use]
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.as_array()
            .iter()
            .zip(other.as_array().iter())
            .all(|(l, r)| (l - r).abs() <= eps)
    }

    #[must_use]
    pub fn as_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

impl Mul for Affine {
    type Output = Affine;

    fn mul(self, o: Affine) -> Affine {
        Affine {
            a: self.a * o.a + self.c * o.b,
            b: self.b * o.a + self.d * o.b,
            c: self.a * o.c + self.c * o.d,
            d: self.b * o.c + self.d * o.d,
            e: self.a * o.e + self.c * o.f + self.e,
            f: self.b * o.e + self.d * o.f + self.f,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rotate_is_clockwise_on_y_down_canvas() {
        let p = Affine::rotate(90.0).apply([1.0, 0.0]);
        assert_abs_diff_eq!(p[0], 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn product_applies_right_operand_first() {
        let tf = Affine::translate(10.0, 0.0) * Affine::scale(2.0, 2.0);
        let p = tf.apply([1.0, 1.0]);
        assert_abs_diff_eq!(p[0], 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn rotate_about_keeps_center_fixed() {
        let p = Affine::rotate_about(37.0, [3.0, -4.0]).apply([3.0, -4.0]);
        assert_abs_diff_eq!(p[0], 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p[1], -4.0, epsilon = 1e-9);
    }

    #[test]
    fn mirror_x_reflects_around_axis() {
        let tf = Affine::mirror_x(7.0);
        let p = tf.apply([10.0, 5.0]);
        assert_abs_diff_eq!(p[0], 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p[1], 5.0, epsilon = 1e-9);
        assert!(tf.is_mirroring());
    }
}
