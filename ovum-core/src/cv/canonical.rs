// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use num::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::constant;
use crate::cv::background::{mask_background, resolve_background};
use crate::cv::moments::region_moments;
use crate::cv::transform::{RigidTransform, warp_nearest};
use crate::error::OvumError;
use crate::im::{BinaryMask, OvumBuffer};

/// Settings for extracting a canonical object crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropOptions {
    /// Pixels added around the object bounding box
    pub padding: u32,
    /// Replace image pixels outside the object with the background color
    pub use_mask: bool,
    /// One value for all channels or one value per channel; inferred when absent
    pub bg_color: Option<Vec<f64>>,
}

impl Default for CropOptions {
    fn default() -> Self {
        CropOptions {
            padding: constant::CROP_PADDING,
            use_mask: true,
            bg_color: None,
        }
    }
}

/// A re-centered and de-rotated object
///
/// `bbox` is `[min_row, min_col, max_row, max_col]` of the padded crop in the
/// warped canvas, with exclusive maxima.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectCrop<I> {
    pub image: I,
    pub mask: BinaryMask,
    pub bbox: [u32; 4],
    pub centroid: [f64; 2],
    pub orientation: f64,
}

impl<I> ObjectCrop<I> {
    /// Convert the image held by the crop
    pub fn map<J, F: FnOnce(I) -> J>(self, f: F) -> ObjectCrop<J> {
        ObjectCrop {
            image: f(self.image),
            mask: self.mask,
            bbox: self.bbox,
            centroid: self.centroid,
            orientation: self.orientation,
        }
    }
}

/// Extract a canonically oriented, padded crop of one object
///
/// The object centroid is moved to the center of the output canvas and the
/// principal axis is rotated onto the column axis. Pixels sampled from
/// outside the source are filled with the inferred (or supplied) background
/// of each raster before cropping.
///
/// # Arguments
///
/// * `image` - Source image
/// * `mask` - Binary mask of a single object with the image extent
/// * `options` - Padding, masking and background settings
///
/// # Examples
///
/// ```
/// use ovum_core::cv::canonical::{CropOptions, canonicalize};
/// use ovum_core::im::{BinaryMask, OvumBuffer};
///
/// let image = OvumBuffer::from_fn(21, 21, |row, _| row as u8);
/// let mask = BinaryMask::from_fn(21, 21, |row, col| (8..=12).contains(&row) && (5..=15).contains(&col));
///
/// let options = CropOptions { padding: 0, use_mask: true, bg_color: None };
/// let crop = canonicalize(&image, &mask, &options).unwrap();
///
/// assert_eq!(crop.bbox, [8, 5, 13, 16]);
/// assert_eq!(crop.image.shape(), (5, 11, 1));
/// ```
pub fn canonicalize<T>(
    image: &OvumBuffer<T>,
    mask: &BinaryMask,
    options: &CropOptions,
) -> Result<ObjectCrop<OvumBuffer<T>>, OvumError>
where
    T: Copy + Default + ToPrimitive + FromPrimitive,
{
    if image.width() != mask.width() || image.height() != mask.height() {
        return Err(OvumError::ShapeMismatchError {
            image: (image.height(), image.width()),
            mask: (mask.height(), mask.width()),
        });
    }

    if mask.channels() != 1 {
        return Err(OvumError::MaskFormatError);
    }

    let moments = region_moments(mask).ok_or(OvumError::DegenerateRegionError)?;
    let orientation = moments.orientation();

    let mask_bg = mask_background(mask);
    let image_bg = resolve_background(image, options.bg_color.as_deref())?;

    let transform =
        RigidTransform::derotate(moments.centroid, orientation, image.width(), image.height());

    let warped_mask = warp_nearest(mask, &transform).fill_invalid(&[mask_bg])?;
    let warped_image = warp_nearest(image, &transform).fill_invalid(&image_bg)?;

    let [min_row, min_col, max_row, max_col] =
        warped_mask.bbox().ok_or(OvumError::DegenerateRegionError)?;

    let pad = options.padding;
    let bbox = [
        min_row.saturating_sub(pad),
        min_col.saturating_sub(pad),
        max_row.saturating_add(pad).min(warped_mask.height()),
        max_col.saturating_add(pad).min(warped_mask.width()),
    ];

    let (x, y, w, h) = (bbox[1], bbox[0], bbox[3] - bbox[1], bbox[2] - bbox[0]);
    let crop_mask = warped_mask.crop(x, y, w, h)?;
    let mut crop_image = warped_image.crop(x, y, w, h)?;

    if options.use_mask {
        crop_image.retain_where(crop_mask.as_raw(), &image_bg)?;
    }

    Ok(ObjectCrop {
        image: crop_image,
        mask: crop_mask,
        bbox,
        centroid: moments.centroid,
        orientation,
    })
}

#[cfg(test)]
mod test {

    use super::*;

    use crate::cv::draw::rasterize_ellipse;
    use crate::cv::ellipse::Ellipse;
    use crate::mt::Point2D;

    fn no_padding() -> CropOptions {
        CropOptions {
            padding: 0,
            use_mask: true,
            bg_color: None,
        }
    }

    #[test]
    fn test_idempotent_for_centered_horizontal_object() {
        let image = OvumBuffer::from_fn(21, 21, |row, col| (row * 21 + col) as u16);
        let mask = BinaryMask::from_fn(21, 21, |row, col| {
            (8..=12).contains(&row) && (5..=15).contains(&col)
        });

        let crop = canonicalize(&image, &mask, &no_padding()).unwrap();

        assert_eq!(crop.bbox, [8, 5, 13, 16]);
        assert_eq!(crop.centroid, [10.0, 10.0]);
        assert_eq!(crop.orientation, 0.0);
        assert_eq!(crop.image, image.crop(5, 8, 11, 5).unwrap());
        assert_eq!(crop.mask, mask.crop(5, 8, 11, 5).unwrap());
    }

    #[test]
    fn test_rotated_square_padding() {
        // A square rotated by 45 degrees
        let image = OvumBuffer::from_pixel(61, 61, &[10u8, 20, 30]).unwrap();
        let mask = BinaryMask::from_fn(61, 61, |row, col| {
            (row as i64 - 30).abs() + (col as i64 - 30).abs() <= 10
        });

        let options = CropOptions {
            padding: 5,
            ..no_padding()
        };

        let crop = canonicalize(&image, &mask, &options).unwrap();
        assert_eq!(crop.bbox, [15, 15, 46, 46]);
        assert_eq!(crop.mask.shape(), (31, 31, 1));
        assert_eq!(crop.image.shape(), (31, 31, 3));
        assert_eq!(crop.mask.count(), mask.count());

        let options = CropOptions {
            padding: 25,
            ..no_padding()
        };

        let crop = canonicalize(&image, &mask, &options).unwrap();
        assert_eq!(crop.bbox, [0, 0, 61, 61]);
    }

    #[test]
    fn test_vertical_object_becomes_horizontal() {
        let image = OvumBuffer::from_fn(9, 21, |row, _| row as u8);
        let mask = BinaryMask::from_fn(9, 21, |row, col| (3..18).contains(&row) && col == 4);

        let crop = canonicalize(&image, &mask, &no_padding()).unwrap();

        assert_eq!(crop.mask.shape(), (1, 15, 1));
        assert!(crop.mask.iter().all(|&p| p));

        // Source rows 3..18 are laid out along the columns
        let values: Vec<u8> = crop.image.iter().copied().collect();
        assert_eq!(values, (3..18).collect::<Vec<u8>>());
    }

    #[test]
    fn test_crop_contains_rotated_object() {
        let ellipse = Ellipse::new(Point2D::new(30.0, 30.0), 20.0, 6.0, 0.8);
        let mask = rasterize_ellipse(&ellipse, 60, 60);
        let image = OvumBuffer::from_fn(60, 60, |row, col| if mask.pixel(row, col)[0] { 200u8 } else { 0u8 });

        let options = CropOptions {
            padding: 3,
            ..no_padding()
        };

        let crop = canonicalize(&image, &mask, &options).unwrap();
        let (height, width, _) = crop.mask.shape();

        assert!(width > height);
        assert_eq!(crop.mask.bbox(), Some([3, 3, height - 3, width - 3]));

        // Masked pixels keep object values, the rest hold the background
        for (p, m) in crop.image.iter().zip(crop.mask.iter()) {
            assert_eq!(*p, if *m { 200 } else { 0 });
        }
    }

    #[test]
    fn test_single_pixel_object() {
        let image = OvumBuffer::from_fn(7, 7, |row, col| (row * 7 + col) as u8);
        let mask = BinaryMask::from_fn(7, 7, |row, col| row == 3 && col == 5);

        let options = CropOptions {
            padding: 1,
            use_mask: false,
            bg_color: None,
        };

        let crop = canonicalize(&image, &mask, &options).unwrap();

        assert_eq!(crop.orientation, 0.0);
        assert_eq!(crop.mask.shape(), (3, 3, 1));
        assert_eq!(crop.mask.count(), 1);
        assert_eq!(crop.mask.pixel(1, 1), &[true]);
        assert_eq!(crop.image.pixel(1, 1), &[26]);
    }

    #[test]
    fn test_supplied_background_fills_outside() {
        let image = OvumBuffer::from_pixel(11, 11, &[5u8]).unwrap();
        let mask = BinaryMask::from_fn(11, 11, |row, col| row == 5 && (3..8).contains(&col));

        let options = CropOptions {
            padding: 2,
            use_mask: true,
            bg_color: Some(vec![99.0]),
        };

        let crop = canonicalize(&image, &mask, &options).unwrap();
        assert_eq!(crop.image.pixel(2, 2), &[5]);
        assert_eq!(crop.image.pixel(0, 0), &[99]);
    }

    #[test]
    fn test_outside_source_uses_inferred_background() {
        // A bright corner object on a uniform background of 7
        let image = OvumBuffer::from_fn(21, 21, |row, col| {
            if row < 3 && col < 3 { 200u8 } else { 7u8 }
        });
        let mask = BinaryMask::from_fn(21, 21, |row, col| row < 3 && col < 3);

        let options = CropOptions {
            padding: 30,
            use_mask: false,
            bg_color: None,
        };

        let crop = canonicalize(&image, &mask, &options).unwrap();

        assert_eq!(crop.orientation, 0.0);
        assert_eq!(crop.centroid, [1.0, 1.0]);
        assert_eq!(crop.bbox, [0, 0, 21, 21]);
        assert_eq!(crop.mask.bbox(), Some([9, 9, 12, 12]));

        // The top left corner samples from outside the source
        assert_eq!(crop.image.pixel(0, 0), &[7]);
        assert_eq!(crop.image.pixel(10, 10), &[200]);
        assert_eq!(crop.image.iter().filter(|&&p| p == 200).count(), 9);
        assert_eq!(crop.image.iter().filter(|&&p| p == 7).count(), 21 * 21 - 9);
    }

    #[test]
    fn test_shape_mismatch() {
        let image = OvumBuffer::from_pixel(5, 4, &[0u8]).unwrap();
        let mask = BinaryMask::from_fn(4, 5, |_, _| true);

        assert_eq!(
            canonicalize(&image, &mask, &CropOptions::default()),
            Err(OvumError::ShapeMismatchError {
                image: (4, 5),
                mask: (5, 4)
            })
        );
    }

    #[test]
    fn test_empty_mask_is_degenerate() {
        let image = OvumBuffer::from_pixel(5, 5, &[0u8]).unwrap();
        let mask = BinaryMask::zeros(5, 5);

        assert_eq!(
            canonicalize(&image, &mask, &CropOptions::default()),
            Err(OvumError::DegenerateRegionError)
        );
    }
}
