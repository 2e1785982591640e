// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use crate::im::BinaryMask;

/// Zeroth, first and second order moments of a binary region
///
/// Central moments use `x` for the column axis and `y` for the row axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionMoments {
    pub m00: f64,
    pub centroid: [f64; 2], // (row, col)
    pub u20: f64,
    pub u02: f64,
    pub u11: f64,
}

#[inline]
fn moments_raw(mask: &BinaryMask) -> [f64; 6] {
    let width = mask.width() as usize;

    let mut m00 = 0.0;
    let mut m10 = 0.0;
    let mut m01 = 0.0;
    let mut m11 = 0.0;
    let mut m20 = 0.0;
    let mut m02 = 0.0;

    for (i, &pixel) in mask.iter().enumerate() {
        if pixel {
            let x = (i % width) as f64;
            let y = (i / width) as f64;

            m00 += 1.0;
            m10 += x;
            m01 += y;
            m11 += x * y;
            m20 += x * x;
            m02 += y * y;
        }
    }

    [m00, m10, m01, m11, m20, m02]
}

/// Compute the centroid and second order central moments of a mask
///
/// Returns `None` when the mask has no foreground pixels.
///
/// # Examples
///
/// ```
/// use ovum_core::cv::moments::region_moments;
/// use ovum_core::im::BinaryMask;
///
/// let mask = BinaryMask::from_fn(5, 5, |row, col| row == 2 && col >= 1 && col <= 3);
/// let moments = region_moments(&mask).unwrap();
///
/// assert_eq!(moments.m00, 3.0);
/// assert_eq!(moments.centroid, [2.0, 2.0]);
/// assert_eq!(moments.orientation(), 0.0);
/// ```
pub fn region_moments(mask: &BinaryMask) -> Option<RegionMoments> {
    let [m00, m10, m01, m11, m20, m02] = moments_raw(mask);

    if m00 == 0.0 {
        return None;
    }

    let x = m10 / m00;
    let y = m01 / m00;

    Some(RegionMoments {
        m00,
        centroid: [y, x],
        u20: m20 - x * m10,
        u02: m02 - y * m01,
        u11: m11 - x * m01,
    })
}

impl RegionMoments {
    /// Angle of the principal axis in radians within (-π/2, π/2]
    ///
    /// The angle is measured from the column axis towards increasing rows.
    /// Isotropic regions (including single pixels) have an orientation of 0.
    pub fn orientation(&self) -> f64 {
        // Signed zero would flip atan2 to -π
        let u11 = if self.u11 == 0.0 { 0.0 } else { self.u11 };
        0.5 * (2.0 * u11).atan2(self.u20 - self.u02)
    }
}
