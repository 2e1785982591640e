// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use crate::cv::ellipse::Ellipse;
use crate::im::BinaryMask;
use crate::mt::Point2D;

// Tolerance for pixel centers on the rectangle boundary
const BOUNDARY_EPS: f64 = 1e-9;

/// Rasterize a filled ellipse into a new mask
///
/// A pixel is foreground when its center lies strictly inside the ellipse.
///
/// # Arguments
///
/// * `ellipse` - Ellipse in (row, col) coordinates
/// * `width` - Canvas width
/// * `height` - Canvas height
///
/// # Examples
///
/// ```
/// use ovum_core::cv::draw::rasterize_ellipse;
/// use ovum_core::cv::ellipse::Ellipse;
/// use ovum_core::mt::Point2D;
///
/// let ellipse = Ellipse::new(Point2D::new(5.0, 5.0), 2.0, 1.0, 0.0);
/// let mask = rasterize_ellipse(&ellipse, 11, 11);
///
/// // Rows 4..=6 along the center column; the tips at distance 2 are excluded
/// assert_eq!(mask.count(), 3);
/// ```
pub fn rasterize_ellipse(ellipse: &Ellipse, width: u32, height: u32) -> BinaryMask {
    BinaryMask::from_fn(width, height, |row, col| {
        ellipse.contains(row as f64, col as f64)
    })
}

/// Rasterize the oriented rectangle spanned by three egg landmarks
///
/// The long axis of the rectangle runs from `anterior` to `posterior` and its
/// half-width is the perpendicular distance of `lateral` from that axis. A
/// pixel is foreground when its center lies inside or on the boundary.
///
/// # Arguments
///
/// * `anterior` - Anterior landmark
/// * `posterior` - Posterior landmark
/// * `lateral` - Lateral landmark
/// * `width` - Canvas width
/// * `height` - Canvas height
///
/// # Examples
///
/// ```
/// use ovum_core::cv::draw::rasterize_egg_rectangle;
/// use ovum_core::mt::Point2D;
///
/// let mask = rasterize_egg_rectangle(
///     Point2D::new(2.0, 5.0),
///     Point2D::new(8.0, 5.0),
///     Point2D::new(5.0, 3.0),
///     11,
///     11,
/// );
///
/// // Rows 2..=8 and columns 3..=7
/// assert_eq!(mask.count(), 35);
/// ```
pub fn rasterize_egg_rectangle(
    anterior: Point2D,
    posterior: Point2D,
    lateral: Point2D,
    width: u32,
    height: u32,
) -> BinaryMask {
    let axis = posterior - anterior;
    let length = axis.norm();

    if length == 0.0 || !length.is_finite() {
        return BinaryMask::zeros(width, height);
    }

    let half_width = axis.cross(lateral - anterior).abs() / length;

    BinaryMask::from_fn(width, height, |row, col| {
        let offset = Point2D::new(row as f64, col as f64) - anterior;
        let s = axis.dot(offset) / length;
        let t = axis.cross(offset) / length;

        s >= -BOUNDARY_EPS && s <= length + BOUNDARY_EPS && t.abs() <= half_width + BOUNDARY_EPS
    })
}
