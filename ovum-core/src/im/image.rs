// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma, Rgb, open as open_dynamic};
use npyz::{DType, NpyFile, TypeChar};

use crate::constant;
use crate::cv::canonical::{CropOptions, ObjectCrop, canonicalize};
use crate::error::OvumError;
use crate::im::{BinaryMask, OvumBuffer};
use crate::impl_enum_dispatch;
use crate::io::{numpy_extent, read_numpy_bytes, write_numpy};

/// A wrapper for representing and storing array-shaped pixels
///
/// The enum holds the subpixel types that object crops can be extracted
/// from. All external image types (e.g `DynamicImage`) should be converted
/// to an OvumImage via a method on this enum.
///
/// # Examples
///
/// ```
/// use image::{RgbImage, DynamicImage};
/// use ovum_core::im::OvumImage;
///
/// let rgb = RgbImage::new(10, 10);
/// let dynamic = DynamicImage::ImageRgb8(rgb);
/// let image = OvumImage::new_from_default(dynamic).unwrap();
///
/// assert_eq!(image.channels(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum OvumImage {
    U8(OvumBuffer<u8>),
    U16(OvumBuffer<u16>),
    F32(OvumBuffer<f32>),
}

// >>> I/O METHODS

impl OvumImage {
    /// Open a new image from a provided path
    ///
    /// # Arguments
    ///
    /// * `path` - A path to an image with a valid extension
    ///
    /// ```no_run
    /// use ovum_core::im::OvumImage;
    /// let image = OvumImage::open("image.png");
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<OvumImage, OvumError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        if let Some(ext) = extension {
            if ext == "npy" {
                let bytes = read_numpy_bytes(&path)?;
                let npy = NpyFile::new(&bytes[..]).map_err(|_| OvumError::ImageReadError)?;
                return Self::new_from_numpy(npy);
            }

            if constant::IMAGE_DYNAMIC_FORMATS.iter().any(|e| e == &ext) {
                let image = open_dynamic(&path).map_err(|_| OvumError::ImageReadError)?;
                return Self::new_from_default(image);
            }
        }

        Err(OvumError::ImageExtensionError)
    }

    /// Initialize a new image from a DynamicImage
    ///
    /// Alpha channels are dropped.
    ///
    /// # Arguments
    ///
    /// * `image` - An 8 or 16-bit grayscale or rgb DynamicImage, or a 32-bit rgb DynamicImage
    pub fn new_from_default(image: DynamicImage) -> Result<OvumImage, OvumError> {
        let width = image.width();
        let height = image.height();

        fn drop_alpha<T: Copy>(raw: Vec<T>, stride: usize) -> Vec<T> {
            raw.chunks_exact(stride)
                .flat_map(|pixel| pixel[..stride - 1].to_vec())
                .collect()
        }

        match image {
            DynamicImage::ImageLuma8(buffer) => Ok(OvumImage::U8(OvumBuffer::new(
                width,
                height,
                1,
                buffer.into_raw(),
            )?)),
            DynamicImage::ImageLumaA8(buffer) => Ok(OvumImage::U8(OvumBuffer::new(
                width,
                height,
                1,
                drop_alpha(buffer.into_raw(), 2),
            )?)),
            DynamicImage::ImageLuma16(buffer) => Ok(OvumImage::U16(OvumBuffer::new(
                width,
                height,
                1,
                buffer.into_raw(),
            )?)),
            DynamicImage::ImageLumaA16(buffer) => Ok(OvumImage::U16(OvumBuffer::new(
                width,
                height,
                1,
                drop_alpha(buffer.into_raw(), 2),
            )?)),
            DynamicImage::ImageRgb8(buffer) => Ok(OvumImage::U8(OvumBuffer::new(
                width,
                height,
                3,
                buffer.into_raw(),
            )?)),
            DynamicImage::ImageRgba8(buffer) => Ok(OvumImage::U8(OvumBuffer::new(
                width,
                height,
                3,
                drop_alpha(buffer.into_raw(), 4),
            )?)),
            DynamicImage::ImageRgb16(buffer) => Ok(OvumImage::U16(OvumBuffer::new(
                width,
                height,
                3,
                buffer.into_raw(),
            )?)),
            DynamicImage::ImageRgba16(buffer) => Ok(OvumImage::U16(OvumBuffer::new(
                width,
                height,
                3,
                drop_alpha(buffer.into_raw(), 4),
            )?)),
            DynamicImage::ImageRgb32F(buffer) => Ok(OvumImage::F32(OvumBuffer::new(
                width,
                height,
                3,
                buffer.into_raw(),
            )?)),
            DynamicImage::ImageRgba32F(buffer) => Ok(OvumImage::F32(OvumBuffer::new(
                width,
                height,
                3,
                drop_alpha(buffer.into_raw(), 4),
            )?)),
            _ => Err(OvumError::ImageFormatError),
        }
    }

    /// Initialize a new image from a numpy array buffer
    ///
    /// Unsigned 8/16-bit arrays keep their type, floating point arrays are
    /// stored as f32.
    ///
    /// # Arguments
    ///
    /// * `npy` - A (height, width) or (height, width, channel) shaped numpy array
    pub fn new_from_numpy(npy: NpyFile<&[u8]>) -> Result<OvumImage, OvumError> {
        let (h, w, c) = numpy_extent(&npy)?;

        let read_error = |_| OvumError::ImageError("Numpy array could not be decoded.");

        match npy.dtype() {
            DType::Plain(x) => match (x.type_char(), x.size_field()) {
                (TypeChar::Uint, 1) => Ok(OvumImage::U8(OvumBuffer::new(
                    w,
                    h,
                    c,
                    npy.into_vec::<u8>().map_err(read_error)?,
                )?)),
                (TypeChar::Uint, 2) => Ok(OvumImage::U16(OvumBuffer::new(
                    w,
                    h,
                    c,
                    npy.into_vec::<u16>().map_err(read_error)?,
                )?)),
                (TypeChar::Float, 4) => Ok(OvumImage::F32(OvumBuffer::new(
                    w,
                    h,
                    c,
                    npy.into_vec::<f32>().map_err(read_error)?,
                )?)),
                (TypeChar::Float, 8) => Ok(OvumImage::F32(OvumBuffer::new(
                    w,
                    h,
                    c,
                    npy.into_vec::<f64>()
                        .map_err(read_error)?
                        .into_iter()
                        .map(|v| v as f32)
                        .collect(),
                )?)),
                _ => Err(OvumError::ImageFormatError),
            },
            _ => Err(OvumError::ImageError(
                "Only plain numpy arrays are currently supported.",
            )),
        }
    }

    /// Save image
    ///
    /// # Arguments
    ///
    /// * `path` - A path to an image with a valid extension
    ///
    /// ```no_run
    /// use ovum_core::im::OvumImage;
    /// let image = OvumImage::open("image.png").unwrap();
    /// image.save("image.npy").unwrap();
    /// ```
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<(), OvumError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        if let Some(ext) = extension {
            if ext == "npy" {
                return self.save_as_numpy(path);
            }

            if constant::IMAGE_DYNAMIC_FORMATS.iter().any(|e| e == &ext) {
                return self.save_as_default(path);
            }
        }

        Err(OvumError::ImageExtensionError)
    }

    /// Save image as a default image format
    ///
    /// # Arguments
    ///
    /// * `path` - Path to output image
    pub fn save_as_default<P: AsRef<Path>>(self, path: P) -> Result<(), OvumError> {
        let channels = self.channels();
        match (self, channels) {
            (OvumImage::U8(buffer), 1) => {
                ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(
                    buffer.width(),
                    buffer.height(),
                    buffer.into_raw(),
                )
                .ok_or(OvumError::ImageWriteError)?
                .save(path)
                .map_err(|_| OvumError::ImageWriteError)
            }
            (OvumImage::U16(buffer), 1) => {
                ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(
                    buffer.width(),
                    buffer.height(),
                    buffer.into_raw(),
                )
                .ok_or(OvumError::ImageWriteError)?
                .save(path)
                .map_err(|_| OvumError::ImageWriteError)
            }
            (OvumImage::U8(buffer), 3) => {
                ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(
                    buffer.width(),
                    buffer.height(),
                    buffer.into_raw(),
                )
                .ok_or(OvumError::ImageWriteError)?
                .save(path)
                .map_err(|_| OvumError::ImageWriteError)
            }
            (OvumImage::U16(buffer), 3) => {
                ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(
                    buffer.width(),
                    buffer.height(),
                    buffer.into_raw(),
                )
                .ok_or(OvumError::ImageWriteError)?
                .save(path)
                .map_err(|_| OvumError::ImageWriteError)
            }
            (OvumImage::F32(buffer), 3) => {
                ImageBuffer::<Rgb<f32>, Vec<f32>>::from_raw(
                    buffer.width(),
                    buffer.height(),
                    buffer.into_raw(),
                )
                .ok_or(OvumError::ImageWriteError)?
                .save(path)
                .map_err(|_| OvumError::ImageWriteError)
            }
            _ => Err(OvumError::ImageError(
                "Only 1 or 3 channel RGB/grayscale images can be saved as a default image format (e.g. png).",
            )),
        }
    }

    /// Save image as a (height, width, channel) numpy array
    ///
    /// # Arguments
    ///
    /// * `path` - Path to output image
    pub fn save_as_numpy<P: AsRef<Path>>(self, path: P) -> Result<(), OvumError> {
        let shape = vec![
            self.height() as u64,
            self.width() as u64,
            self.channels() as u64,
        ];

        match self {
            OvumImage::U8(buffer) => write_numpy(path, buffer.into_raw(), shape),
            OvumImage::U16(buffer) => write_numpy(path, buffer.into_raw(), shape),
            OvumImage::F32(buffer) => write_numpy(path, buffer.into_raw(), shape),
        }
    }
}

// <<< I/O METHODS

// >>> PROPERTY METHODS

impl_enum_dispatch!(OvumImage, U8, U16, F32; width(&self) -> u32);
impl_enum_dispatch!(OvumImage, U8, U16, F32; height(&self) -> u32);
impl_enum_dispatch!(OvumImage, U8, U16, F32; channels(&self) -> u32);
impl_enum_dispatch!(OvumImage, U8, U16, F32; shape(&self) -> (u32, u32, u32));
impl_enum_dispatch!(OvumImage, U8, U16, F32; len(&self) -> usize);
impl_enum_dispatch!(OvumImage, U8, U16, F32; is_empty(&self) -> bool);

// <<< PROPERTY METHODS

// >>> TRANSFORM METHODS

impl OvumImage {
    /// Extract a canonically oriented crop of the object in `mask`
    ///
    /// # Arguments
    ///
    /// * `mask` - A binary mask of one object with the same extent as the image
    /// * `options` - Padding, masking and background settings
    pub fn canonicalize(
        &self,
        mask: &BinaryMask,
        options: &CropOptions,
    ) -> Result<ObjectCrop<OvumImage>, OvumError> {
        match self {
            OvumImage::U8(buffer) => Ok(canonicalize(buffer, mask, options)?.map(OvumImage::U8)),
            OvumImage::U16(buffer) => Ok(canonicalize(buffer, mask, options)?.map(OvumImage::U16)),
            OvumImage::F32(buffer) => Ok(canonicalize(buffer, mask, options)?.map(OvumImage::F32)),
        }
    }
}

// <<< TRANSFORM METHODS

#[cfg(test)]
mod test {

    use super::*;

    use image::{GrayImage, RgbaImage};

    #[test]
    fn test_image_from_default_drops_alpha() {
        let rgba = RgbaImage::from_pixel(2, 2, image::Rgba([1u8, 2, 3, 4]));
        let image = OvumImage::new_from_default(DynamicImage::ImageRgba8(rgba)).unwrap();

        assert_eq!(image.shape(), (2, 2, 3));
        match image {
            OvumImage::U8(buffer) => assert_eq!(buffer.pixel(1, 1), &[1, 2, 3]),
            _ => panic!("Expected an 8-bit image"),
        }
    }

    #[test]
    fn test_image_save_open_png() {
        let path = std::env::temp_dir().join("ovum_test_image_save_open.png");
        let gray = GrayImage::from_pixel(3, 2, Luma([42u8]));
        let image = OvumImage::new_from_default(DynamicImage::ImageLuma8(gray)).unwrap();

        image.clone().save(&path).unwrap();
        assert_eq!(OvumImage::open(&path).unwrap(), image);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_image_save_open_npy() {
        let path = std::env::temp_dir().join("ovum_test_image_save_open.npy");
        let buffer = OvumBuffer::new(2, 1, 2, vec![0.5f32, 1.0, 1.5, 2.0]).unwrap();
        let image = OvumImage::F32(buffer);

        image.clone().save(&path).unwrap();
        assert_eq!(OvumImage::open(&path).unwrap(), image);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_image_save_errors() {
        let buffer = OvumBuffer::new(1, 1, 2, vec![0u8, 0]).unwrap();
        assert!(OvumImage::U8(buffer.clone()).save("image.png").is_err());
        assert_eq!(
            OvumImage::U8(buffer).save("image.json"),
            Err(OvumError::ImageExtensionError)
        );
    }
}
