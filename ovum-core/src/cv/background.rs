// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use num::{FromPrimitive, ToPrimitive};

use crate::error::OvumError;
use crate::im::{BinaryMask, OvumBuffer};

/// Majority value of the four border lines of a mask
///
/// Ties resolve to background (false).
///
/// # Examples
///
/// ```
/// use ovum_core::cv::background::mask_background;
/// use ovum_core::im::BinaryMask;
///
/// let mask = BinaryMask::from_fn(5, 5, |row, col| row == 2 && col == 2);
/// assert!(!mask_background(&mask));
///
/// let mask = BinaryMask::from_fn(5, 5, |row, col| !(row == 2 && col == 2));
/// assert!(mask_background(&mask));
/// ```
pub fn mask_background(mask: &BinaryMask) -> bool {
    let border = mask.border_pixels();
    let foreground = border.iter().filter(|p| p[0]).count();
    foreground > border.len() - foreground
}

/// Most frequent value in a sequence, ties resolving to the smallest value
fn mode(mut values: Vec<f64>) -> Option<f64> {
    values.sort_by(|a, b| a.total_cmp(b));

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < values.len() {
        let value = values[i];
        let mut j = i;
        while j < values.len() && values[j].total_cmp(&value).is_eq() {
            j += 1;
        }

        if best.is_none_or(|(_, count)| j - i > count) {
            best = Some((value, j - i));
        }

        i = j;
    }

    best.map(|(value, _)| value)
}

/// Median of a sequence, averaging the two middle values for even lengths
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len();
    if n % 2 == 1 {
        Some(values[n / 2])
    } else {
        Some(0.5 * (values[n / 2 - 1] + values[n / 2]))
    }
}

fn cast_pixel<T: FromPrimitive>(values: &[f64]) -> Result<Vec<T>, OvumError> {
    values
        .iter()
        .map(|&v| T::from_f64(v))
        .collect::<Option<Vec<T>>>()
        .ok_or(OvumError::BackgroundError(
            "Background value is out of range for the pixel type.",
        ))
}

/// Representative background pixel inferred from the image border
///
/// Single channel images use the most frequent border value (ties resolve to
/// the smallest value). Multi-channel images use the per-channel median of the
/// border pixels, cast to the pixel type.
///
/// # Examples
///
/// ```
/// use ovum_core::cv::background::image_background;
/// use ovum_core::im::OvumBuffer;
///
/// let image = OvumBuffer::from_fn(4, 4, |row, col| if row == 0 && col == 0 { 9u8 } else { 3u8 });
/// assert_eq!(image_background(&image).unwrap(), vec![3]);
/// ```
pub fn image_background<T>(image: &OvumBuffer<T>) -> Result<Vec<T>, OvumError>
where
    T: Copy + ToPrimitive + FromPrimitive,
{
    let border = image.border_pixels();

    if border.is_empty() {
        return Err(OvumError::BackgroundError("Image has no border pixels."));
    }

    let to_f64 = |v: &T| {
        v.to_f64().ok_or(OvumError::BackgroundError(
            "Pixel values could not be represented as floating point.",
        ))
    };

    let channels = image.channels() as usize;
    let mut values = Vec::with_capacity(channels);

    for channel in 0..channels {
        let samples = border
            .iter()
            .map(|p| to_f64(&p[channel]))
            .collect::<Result<Vec<f64>, OvumError>>()?;

        let value = if channels == 1 {
            mode(samples)
        } else {
            median(samples)
        };

        values.push(value.ok_or(OvumError::BackgroundError("Image has no border pixels."))?);
    }

    cast_pixel(&values)
}

/// Background pixel from a user supplied color, or inferred from the border
///
/// # Arguments
///
/// * `image` - Source image
/// * `bg_color` - Either one value for all channels or one value per channel
pub fn resolve_background<T>(
    image: &OvumBuffer<T>,
    bg_color: Option<&[f64]>,
) -> Result<Vec<T>, OvumError>
where
    T: Copy + ToPrimitive + FromPrimitive,
{
    let channels = image.channels() as usize;

    match bg_color {
        None => image_background(image),
        Some([value]) => cast_pixel(&vec![*value; channels]),
        Some(values) if values.len() == channels => cast_pixel(values),
        Some(_) => Err(OvumError::BackgroundError(
            "Background color must have one value or one value per channel.",
        )),
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_mask_background_tie() {
        // Border lines: [T, T], [T, F], [F, F], [T, F]
        let mask = BinaryMask::from_fn(2, 2, |row, _| row == 0);

        let border = mask.border_pixels();
        let foreground = border.iter().filter(|p| p[0]).count();
        assert_eq!(foreground * 2, border.len());

        assert!(!mask_background(&mask));
    }

    #[test]
    fn test_gray_mode_tie_smallest() {
        // Border of a 3x1 image: [5, 7, 9], [5], [5, 7, 9], [9]
        let image = OvumBuffer::new(3, 1, 1, vec![5u8, 7, 9]).unwrap();
        assert_eq!(image_background(&image).unwrap(), vec![5]);
    }

    #[test]
    fn test_rgb_median_even_count() {
        // Border of a 1x1 image holds the same pixel four times
        let image = OvumBuffer::new(1, 1, 3, vec![10u8, 20, 30]).unwrap();
        assert_eq!(image_background(&image).unwrap(), vec![10, 20, 30]);

        // Border of a 2x1 image: [a, b], [a], [a, b], [b]
        let image = OvumBuffer::new(2, 1, 3, vec![10u8, 0, 100, 21, 0, 200]).unwrap();
        assert_eq!(image_background(&image).unwrap(), vec![15, 0, 150]);
    }

    #[test]
    fn test_median_float_pixels() {
        let image = OvumBuffer::new(2, 1, 2, vec![0.0f32, 1.0, 1.0, 2.0]).unwrap();
        assert_eq!(image_background(&image).unwrap(), vec![0.5, 1.5]);
    }

    #[test]
    fn test_resolve_background() {
        let image = OvumBuffer::from_pixel(3, 3, &[1u16, 2, 3]).unwrap();

        assert_eq!(resolve_background(&image, None).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            resolve_background(&image, Some(&[7.0][..])).unwrap(),
            vec![7, 7, 7]
        );
        assert_eq!(
            resolve_background(&image, Some(&[4.0, 5.0, 6.0][..])).unwrap(),
            vec![4, 5, 6]
        );
        assert!(resolve_background(&image, Some(&[4.0, 5.0][..])).is_err());
        assert!(resolve_background(&image, Some(&[-1.0][..])).is_err());
    }
}
