// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::mt::Point2D;

/// A parametric ellipse in (row, col) image coordinates
///
/// `a` is the radius along the row axis when `theta` is zero and `b` is the
/// radius along the column axis. Rotations are in radians and only defined
/// modulo π.
///
/// # Examples
///
/// ```
/// use ovum_core::cv::ellipse::Ellipse;
/// use ovum_core::mt::Point2D;
///
/// let ellipse = Ellipse::new(Point2D::new(50.0, 50.0), 20.0, 40.0, 0.0).canonicalize();
///
/// assert_eq!(ellipse.a, 40.0);
/// assert_eq!(ellipse.b, 20.0);
/// assert_eq!(ellipse.theta, std::f64::consts::FRAC_PI_2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Point2D,
    pub a: f64,
    pub b: f64,
    pub theta: f64,
}

impl Ellipse {
    pub fn new(center: Point2D, a: f64, b: f64, theta: f64) -> Ellipse {
        Ellipse {
            center,
            a,
            b,
            theta,
        }
    }

    /// Swap axes so that `a >= b`, rotating by π/2 when a swap occurs
    pub fn canonicalize(self) -> Ellipse {
        if self.b > self.a {
            Ellipse {
                center: self.center,
                a: self.b,
                b: self.a,
                theta: self.theta + FRAC_PI_2,
            }
        } else {
            self
        }
    }

    /// Check that the center, radii and rotation are finite and radii positive
    pub fn is_valid(&self) -> bool {
        self.center.is_finite()
            && self.a.is_finite()
            && self.b.is_finite()
            && self.theta.is_finite()
            && self.a > 0.0
            && self.b > 0.0
    }

    /// Check if a point lies strictly inside the ellipse
    ///
    /// # Arguments
    ///
    /// * `row` - Row coordinate of the point
    /// * `col` - Column coordinate of the point
    #[inline]
    pub fn contains(&self, row: f64, col: f64) -> bool {
        if !(self.a > 0.0 && self.b > 0.0) {
            return false;
        }

        let (sin, cos) = self.theta.sin_cos();
        let dr = row - self.center.row;
        let dc = col - self.center.col;

        let u = (dr * cos + dc * sin) / self.a;
        let v = (dr * sin - dc * cos) / self.b;

        u * u + v * v < 1.0
    }
}
