// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use nalgebra::{Matrix2, Vector2};

use crate::error::OvumError;
use crate::im::{BinaryMask, OvumBuffer};

/// A rotation about a source point mapped onto the center of a new canvas
///
/// Transforms are stored in inverse form: every output pixel (row, col) is
/// mapped back to the source location it samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidTransform {
    inverse: Matrix2<f64>,
    source_center: Vector2<f64>,
    output_center: Vector2<f64>,
    width: u32,
    height: u32,
}

impl RigidTransform {
    /// Transform that turns the direction at `angle` onto the column axis
    ///
    /// The output canvas is enlarged so that the rotated source extent fits,
    /// and its center samples `center`.
    ///
    /// # Arguments
    ///
    /// * `center` - Source (row, col) point mapped to the output center
    /// * `angle` - Angle of the source direction, measured from the column axis towards increasing rows
    /// * `width` - Source width
    /// * `height` - Source height
    ///
    /// # Examples
    ///
    /// ```
    /// use ovum_core::cv::transform::RigidTransform;
    ///
    /// let transform = RigidTransform::derotate([5.0, 5.0], std::f64::consts::FRAC_PI_2, 11, 3);
    /// assert_eq!(transform.output_size(), (3, 11));
    /// ```
    pub fn derotate(center: [f64; 2], angle: f64, width: u32, height: u32) -> RigidTransform {
        let (sin, cos) = angle.sin_cos();

        let w = width as f64;
        let h = height as f64;
        let out_height = (h * cos.abs() + w * sin.abs() + 0.5).floor() as u32;
        let out_width = (w * cos.abs() + h * sin.abs() + 0.5).floor() as u32;

        RigidTransform {
            inverse: Matrix2::new(cos, sin, -sin, cos),
            source_center: Vector2::new(center[0], center[1]),
            output_center: Vector2::new(
                (out_height as f64 - 1.0) / 2.0,
                (out_width as f64 - 1.0) / 2.0,
            ),
            width: out_width,
            height: out_height,
        }
    }

    /// Output canvas (width, height)
    pub fn output_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Source (row, col) location sampled by an output pixel
    #[inline]
    pub fn source_point(&self, row: u32, col: u32) -> Vector2<f64> {
        let q = Vector2::new(row as f64, col as f64);
        self.inverse * (q - self.output_center) + self.source_center
    }
}

/// A warped raster together with a flag per pixel marking valid samples
///
/// Pixels whose sample fell outside the source hold `T::default()` and are
/// flagged false in `valid`.
#[derive(Debug, Clone, PartialEq)]
pub struct Warped<T> {
    pub raster: OvumBuffer<T>,
    pub valid: BinaryMask,
}

impl<T: Copy> Warped<T> {
    /// Replace invalid pixels with `pixel` and drop the validity flags
    pub fn fill_invalid(self, pixel: &[T]) -> Result<OvumBuffer<T>, OvumError> {
        let mut raster = self.raster;
        raster.retain_where(self.valid.as_raw(), pixel)?;
        Ok(raster)
    }
}

/// Resample a raster with nearest-neighbour inverse mapping
///
/// # Arguments
///
/// * `source` - Raster to warp (any number of channels)
/// * `transform` - Output canvas and inverse mapping
///
/// # Examples
///
/// ```
/// use ovum_core::cv::transform::{RigidTransform, warp_nearest};
/// use ovum_core::im::OvumBuffer;
///
/// let source = OvumBuffer::from_fn(3, 3, |row, col| (row * 3 + col) as u8);
/// let transform = RigidTransform::derotate([1.0, 1.0], 0.0, 3, 3);
/// let warped = warp_nearest(&source, &transform);
///
/// assert_eq!(warped.raster, source);
/// assert!(warped.valid.iter().all(|&v| v));
/// ```
pub fn warp_nearest<T: Copy + Default>(
    source: &OvumBuffer<T>,
    transform: &RigidTransform,
) -> Warped<T> {
    let (width, height) = transform.output_size();
    let channels = source.channels() as usize;

    let src_height = source.height() as f64;
    let src_width = source.width() as f64;

    let fill = vec![T::default(); channels];
    let mut buffer = Vec::with_capacity((width as usize) * (height as usize) * channels);
    let mut valid = Vec::with_capacity((width as usize) * (height as usize));

    for row in 0..height {
        for col in 0..width {
            let p = transform.source_point(row, col);
            let r = p[0].round();
            let c = p[1].round();

            if r >= 0.0 && r < src_height && c >= 0.0 && c < src_width {
                buffer.extend_from_slice(source.pixel(r as u32, c as u32));
                valid.push(true);
            } else {
                buffer.extend_from_slice(&fill);
                valid.push(false);
            }
        }
    }

    Warped {
        raster: OvumBuffer::from_parts(width, height, channels as u32, buffer),
        valid: OvumBuffer::from_parts(width, height, 1, valid),
    }
}

#[cfg(test)]
mod test {

    use super::*;

    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_output_size_quarter_turn() {
        let transform = RigidTransform::derotate([0.0, 0.0], FRAC_PI_2, 20, 6);
        assert_eq!(transform.output_size(), (6, 20));

        let transform = RigidTransform::derotate([0.0, 0.0], FRAC_PI_4, 10, 10);
        assert_eq!(transform.output_size(), (14, 14));
    }

    #[test]
    fn test_quarter_turn_vertical_to_horizontal() {
        // A vertical bar of 5 pixels in column 1
        let source = OvumBuffer::from_fn(3, 5, |_, col| col == 1);
        let transform = RigidTransform::derotate([2.0, 1.0], FRAC_PI_2, 3, 5);
        let warped = warp_nearest(&source, &transform);

        assert_eq!(transform.output_size(), (5, 3));
        assert!(warped.valid.iter().all(|&v| v));

        let expected = OvumBuffer::from_fn(5, 3, |row, _| row == 1);
        assert_eq!(warped.raster, expected);
    }

    #[test]
    fn test_shift_marks_invalid() {
        let source = OvumBuffer::from_pixel(4, 4, &[7u8, 8]).unwrap();
        let transform = RigidTransform::derotate([0.0, 0.0], 0.0, 4, 4);
        let warped = warp_nearest(&source, &transform);

        // Output center (1.5, 1.5) samples the source corner
        assert_eq!(warped.valid.pixel(0, 0), &[false]);
        assert_eq!(warped.valid.pixel(3, 3), &[true]);
        assert_eq!(warped.raster.pixel(0, 0), &[0, 0]);
        assert_eq!(warped.raster.pixel(3, 3), &[7, 8]);

        let filled = warped.fill_invalid(&[1, 2]).unwrap();
        assert_eq!(filled.pixel(0, 0), &[1, 2]);
        assert_eq!(filled.pixel(3, 3), &[7, 8]);
    }
}
