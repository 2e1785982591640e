// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::collections::BTreeSet;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma, open as open_dynamic};
use npyz::{DType, NpyFile, TypeChar};

use crate::constant;
use crate::cv::connected_components;
use crate::error::OvumError;
use crate::im::OvumBuffer;
use crate::io::{numpy_extent, read_numpy_bytes, write_numpy};

/// A row-major container storing integer object labels
///
/// Masks are read from u8, u16 or u32 sources and always stored as u32.
/// A label of zero is background.
///
/// # Examples
///
/// ```
/// use ovum_core::im::LabelMask;
///
/// let buffer = vec![0u32; 100];
/// let mask = LabelMask::new(10, 10, 1, buffer);
///
/// assert_eq!(mask.unwrap().len(), 100);
/// ```
pub type LabelMask = OvumBuffer<u32>;

/// A row-major grid of foreground (true) and background (false) pixels
///
/// # Examples
///
/// ```
/// use ovum_core::im::BinaryMask;
///
/// let mask = BinaryMask::from_fn(4, 3, |row, col| row == 1 && col > 0);
///
/// assert_eq!(mask.count(), 3);
/// assert_eq!(mask.bbox(), Some([1, 1, 2, 4]));
/// ```
pub type BinaryMask = OvumBuffer<bool>;

// >>> I/O METHODS

impl LabelMask {
    /// Open a new label mask from a provided path
    ///
    /// # Arguments
    ///
    /// * `path` - A path to an image with a valid extension
    ///
    /// ```no_run
    /// use ovum_core::im::LabelMask;
    /// let mask = LabelMask::open("mask.png");
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<LabelMask, OvumError> {
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
                let mask = open_dynamic(&path).map_err(|_| OvumError::ImageReadError)?;
                return Self::new_from_dynamic(mask);
            }
        }

        Err(OvumError::ImageExtensionError)
    }

    /// Initialize a new label mask from a DynamicImage
    ///
    /// # Arguments
    ///
    /// * `mask` - An 8 or 16-bit grayscale DynamicImage
    ///
    /// # Examples
    ///
    /// ```
    /// use image::{GrayImage, DynamicImage};
    /// use ovum_core::im::LabelMask;
    ///
    /// let gray = GrayImage::new(10, 10);
    /// let mask = LabelMask::new_from_dynamic(DynamicImage::ImageLuma8(gray));
    ///
    /// assert!(mask.is_ok());
    /// ```
    pub fn new_from_dynamic(mask: DynamicImage) -> Result<LabelMask, OvumError> {
        let width = mask.width();
        let height = mask.height();

        let buffer: Vec<u32> = match mask {
            DynamicImage::ImageLuma8(buffer) => {
                buffer.into_raw().into_iter().map(u32::from).collect()
            }
            DynamicImage::ImageLumaA8(buffer) => buffer
                .into_raw()
                .chunks_exact(2)
                .map(|pixel| pixel[0] as u32)
                .collect(),
            DynamicImage::ImageLuma16(buffer) => {
                buffer.into_raw().into_iter().map(u32::from).collect()
            }
            DynamicImage::ImageLumaA16(buffer) => buffer
                .into_raw()
                .chunks_exact(2)
                .map(|pixel| pixel[0] as u32)
                .collect(),
            _ => return Err(OvumError::MaskFormatError),
        };

        LabelMask::new(width, height, 1, buffer)
    }

    /// Initialize a new label mask from a numpy array buffer
    ///
    /// # Arguments
    ///
    /// * `npy` - A (height, width) or (height, width, 1) shaped numpy array
    pub fn new_from_numpy(npy: NpyFile<&[u8]>) -> Result<LabelMask, OvumError> {
        let (h, w, c) = numpy_extent(&npy)?;

        if c != 1 {
            return Err(OvumError::MaskFormatError);
        }

        let read_error = |_| OvumError::MaskError("Numpy mask array could not be decoded.");

        let buffer: Vec<u32> = match npy.dtype() {
            DType::Plain(x) => match (x.type_char(), x.size_field()) {
                (TypeChar::Uint, 1) => npy
                    .into_vec::<u8>()
                    .map_err(read_error)?
                    .into_iter()
                    .map(u32::from)
                    .collect(),
                (TypeChar::Uint, 2) => npy
                    .into_vec::<u16>()
                    .map_err(read_error)?
                    .into_iter()
                    .map(u32::from)
                    .collect(),
                (TypeChar::Uint, 4) => npy.into_vec::<u32>().map_err(read_error)?,
                (TypeChar::Int, 4) => npy
                    .into_vec::<i32>()
                    .map_err(read_error)?
                    .into_iter()
                    .map(|pixel| pixel.max(0) as u32)
                    .collect(),
                (TypeChar::Int, 8) => npy
                    .into_vec::<i64>()
                    .map_err(read_error)?
                    .into_iter()
                    .map(|pixel| pixel.clamp(0, u32::MAX as i64) as u32)
                    .collect(),
                _ => return Err(OvumError::MaskFormatError),
            },
            _ => {
                return Err(OvumError::MaskError(
                    "Only plain numpy mask arrays are currently supported.",
                ));
            }
        };

        LabelMask::new(w, h, 1, buffer)
    }
}

impl BinaryMask {
    /// Save the mask with foreground as 255 and background as 0
    ///
    /// # Arguments
    ///
    /// * `path` - A path with a supported image extension or `.npy`
    ///
    /// ```no_run
    /// use ovum_core::im::BinaryMask;
    ///
    /// let mask = BinaryMask::from_fn(10, 10, |row, _| row < 5);
    /// mask.save("mask.png").unwrap();
    /// ```
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), OvumError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        let pixels: Vec<u8> = self.iter().map(|&p| if p { 255u8 } else { 0u8 }).collect();

        if let Some(ext) = extension {
            if ext == "npy" {
                return write_numpy(
                    path,
                    pixels,
                    vec![self.height() as u64, self.width() as u64],
                );
            }

            if constant::IMAGE_DYNAMIC_FORMATS.iter().any(|e| e == &ext) {
                return ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(
                    self.width(),
                    self.height(),
                    pixels,
                )
                .ok_or(OvumError::ImageWriteError)?
                .save(path)
                .map_err(|_| OvumError::ImageWriteError);
            }
        }

        Err(OvumError::ImageExtensionError)
    }
}

// <<< I/O METHODS

// >>> TRANSFORM METHODS

impl LabelMask {
    /// Sorted unique non-zero labels
    pub fn labels(&self) -> Vec<u32> {
        self.iter()
            .filter(|&&x| x != 0)
            .copied()
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .collect()
    }

    /// Re-label single-label masks into connected components
    ///
    /// A mask holding exactly one non-zero value is treated as a binary
    /// segmentation and split into 8-connected objects labelled `1..=K`.
    /// Masks with more than one label are assumed to be labelled already and
    /// are left untouched. Returns the sorted unique labels.
    pub fn relabel(&mut self) -> Vec<u32> {
        let labels = self.labels();

        if labels.len() == 1 {
            self.buffer = connected_components(self.width(), self.height(), &self.buffer);
            return self.labels();
        }

        labels
    }

    /// Binary mask of all pixels equal to `label`
    ///
    /// # Examples
    ///
    /// ```
    /// use ovum_core::im::LabelMask;
    ///
    /// let mask = LabelMask::new(2, 2, 1, vec![0, 3, 3, 1]).unwrap();
    /// let binary = mask.binary(3);
    ///
    /// assert_eq!(binary.as_raw(), &vec![false, true, true, false]);
    /// ```
    pub fn binary(&self, label: u32) -> BinaryMask {
        self.map(|v| v == label)
    }
}

impl BinaryMask {
    /// Empty mask of the given size
    pub fn zeros(width: u32, height: u32) -> BinaryMask {
        let n = (width as usize) * (height as usize);
        BinaryMask::from_parts(width, height, 1, vec![false; n])
    }

    /// Number of foreground pixels
    pub fn count(&self) -> usize {
        self.iter().filter(|&&p| p).count()
    }

    /// Bounding box of foreground pixels
    ///
    /// Returned as `[min_row, min_col, max_row, max_col]` with exclusive maxima,
    /// or `None` when the mask has no foreground.
    pub fn bbox(&self) -> Option<[u32; 4]> {
        let width = self.width() as usize;

        let mut min_row = u32::MAX;
        let mut min_col = u32::MAX;
        let mut max_row = 0;
        let mut max_col = 0;
        let mut found = false;

        for (i, &p) in self.iter().enumerate() {
            if p {
                let row = (i / width) as u32;
                let col = (i % width) as u32;
                min_row = min_row.min(row);
                min_col = min_col.min(col);
                max_row = max_row.max(row + 1);
                max_col = max_col.max(col + 1);
                found = true;
            }
        }

        found.then_some([min_row, min_col, max_row, max_col])
    }
}

// <<< TRANSFORM METHODS
