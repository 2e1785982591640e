// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use crate::error::OvumError;

/// A row-major container storing an image, mask or any grid of pixels.
///
/// The struct is generic over the subpixel type `T`. Pixels are stored
/// interleaved, so the length of the buffer must be equal to the product
/// of `w` * `h` * `c`. Coordinates passed to pixel accessors are always
/// given as (row, col) to match raster indexing.
///
/// # Examples
///
/// ```
/// use ovum_core::im::OvumBuffer;
///
/// let width = 10;
/// let height = 10;
/// let channels = 3; // RGB
/// let data = vec![0u8; (width * height * channels) as usize];
///
/// let buffer = OvumBuffer::new(width, height, channels, data);
///
/// assert_eq!(buffer.unwrap().len(), (width * height * channels) as usize);
/// ```
///
/// ```
/// use ovum_core::im::OvumBuffer;
///
/// let data = vec![0u8; 7];
/// let buffer = OvumBuffer::new(2, 2, 1, data);
///
/// assert!(buffer.is_err()); // Buffer size does not match dimensions
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OvumBuffer<T> {
    w: u32,             // Width
    h: u32,             // Height
    c: u32,             // Channels
    pub buffer: Vec<T>, // Interleaved subpixels
}

impl<T: Copy> OvumBuffer<T> {
    /// Initializes a buffer from a vector of interleaved subpixels
    ///
    /// # Arguments
    ///
    /// * `width` - Image width
    /// * `height` - Image height
    /// * `channels` - Number of image channels (e.g. 1 for grayscale)
    /// * `buffer` - Row-major interleaved subpixels
    pub fn new(
        width: u32,
        height: u32,
        channels: u32,
        buffer: Vec<T>,
    ) -> Result<OvumBuffer<T>, OvumError> {
        if channels == 0 {
            return Err(OvumError::BufferSizeError);
        }

        if (width as usize) * (height as usize) * (channels as usize) == buffer.len() {
            Ok(OvumBuffer {
                w: width,
                h: height,
                c: channels,
                buffer,
            })
        } else {
            Err(OvumError::BufferSizeError)
        }
    }

    // Caller guarantees the buffer length matches the dimensions
    pub(crate) fn from_parts(width: u32, height: u32, channels: u32, buffer: Vec<T>) -> Self {
        debug_assert_eq!(
            (width as usize) * (height as usize) * (channels as usize),
            buffer.len()
        );

        OvumBuffer {
            w: width,
            h: height,
            c: channels,
            buffer,
        }
    }

    /// Initializes a buffer where every pixel is set to `pixel`
    ///
    /// The number of channels is the length of `pixel`, which must not be empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ovum_core::im::OvumBuffer;
    ///
    /// let buffer = OvumBuffer::from_pixel(3, 2, &[1u8, 2, 3]).unwrap();
    /// assert_eq!(buffer.channels(), 3);
    /// assert_eq!(buffer.pixel(1, 2), &[1, 2, 3]);
    ///
    /// assert!(OvumBuffer::<u8>::from_pixel(3, 2, &[]).is_err());
    /// ```
    pub fn from_pixel(
        width: u32,
        height: u32,
        pixel: &[T],
    ) -> Result<OvumBuffer<T>, OvumError> {
        if pixel.is_empty() {
            return Err(OvumError::BufferSizeError);
        }

        let n = (width as usize) * (height as usize);
        let mut buffer = Vec::with_capacity(n * pixel.len());
        for _ in 0..n {
            buffer.extend_from_slice(pixel);
        }

        Ok(OvumBuffer {
            w: width,
            h: height,
            c: pixel.len() as u32,
            buffer,
        })
    }

    /// Initializes a single channel buffer from a (row, col) generator
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> OvumBuffer<T>
    where
        F: FnMut(u32, u32) -> T,
    {
        let mut buffer = Vec::with_capacity((width as usize) * (height as usize));
        for row in 0..height {
            for col in 0..width {
                buffer.push(f(row, col));
            }
        }

        OvumBuffer {
            w: width,
            h: height,
            c: 1,
            buffer,
        }
    }
}

// >>> PROPERTY METHODS

impl<T: Copy> OvumBuffer<T> {
    /// Width of the image
    pub fn width(&self) -> u32 {
        self.w
    }

    /// Height of the image
    pub fn height(&self) -> u32 {
        self.h
    }

    /// Number of channels in the image
    pub fn channels(&self) -> u32 {
        self.c
    }

    /// Shape/dimensions of the image
    pub fn shape(&self) -> (u32, u32, u32) {
        (self.h, self.w, self.c)
    }

    /// Length of the raw image
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// <<< PROPERTY METHODS

// >>> ACCESS METHODS

impl<T: Copy> OvumBuffer<T> {
    /// Returns the raw image
    pub fn into_raw(self) -> Vec<T> {
        self.buffer
    }

    /// Returns a reference to the raw image
    pub fn as_raw(&self) -> &Vec<T> {
        &self.buffer
    }

    // An iterator over the raw buffer
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    #[inline]
    fn offset(&self, row: u32, col: u32) -> usize {
        ((row as usize) * (self.w as usize) + col as usize) * self.c as usize
    }

    /// Subpixels of the pixel at (row, col)
    #[inline]
    pub fn pixel(&self, row: u32, col: u32) -> &[T] {
        let start = self.offset(row, col);
        &self.buffer[start..start + self.c as usize]
    }

    /// Pixels along the four border lines of the raster
    ///
    /// Pixels are returned as the top row, the left column, the bottom row and
    /// the right column, in that order. Corner pixels therefore appear twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use ovum_core::im::OvumBuffer;
    ///
    /// let buffer = OvumBuffer::new(3, 2, 1, vec![0u8, 1, 2, 3, 4, 5]).unwrap();
    /// let border: Vec<u8> = buffer.border_pixels().iter().map(|p| p[0]).collect();
    ///
    /// assert_eq!(border, vec![0, 1, 2, 0, 3, 3, 4, 5, 2, 5]);
    /// ```
    pub fn border_pixels(&self) -> Vec<&[T]> {
        if self.w == 0 || self.h == 0 {
            return vec![];
        }

        let last_row = self.h - 1;
        let last_col = self.w - 1;

        let mut pixels = Vec::with_capacity(2 * (self.w + self.h) as usize);
        pixels.extend((0..self.w).map(|col| self.pixel(0, col)));
        pixels.extend((0..self.h).map(|row| self.pixel(row, 0)));
        pixels.extend((0..self.w).map(|col| self.pixel(last_row, col)));
        pixels.extend((0..self.h).map(|row| self.pixel(row, last_col)));
        pixels
    }
}

// <<< ACCESS METHODS

// >>> TRANSFORM METHODS

impl<T: Copy> OvumBuffer<T> {
    /// Create a new buffer with copied cropped contents
    ///
    /// # Arguments
    ///
    /// * `x` - Minimum x-coordinate (left column)
    /// * `y` - Minimum y-coordinate (top row)
    /// * `w` - Width of crop
    /// * `h` - Height of crop
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Result<OvumBuffer<T>, OvumError> {
        if x + w > self.w || y + h > self.h {
            return Err(OvumError::ImageError("Cropping coordinates out of bounds"));
        }

        let c = self.c as usize;
        let mut new_buffer = Vec::with_capacity((w as usize) * (h as usize) * c);

        for row in y..y + h {
            let start = self.offset(row, x);
            let end = start + (w as usize) * c;
            new_buffer.extend_from_slice(&self.buffer[start..end]);
        }

        Ok(OvumBuffer {
            w,
            h,
            c: self.c,
            buffer: new_buffer,
        })
    }

    /// Apply `f` to every subpixel, keeping the shape
    pub fn map<U: Copy, F: Fn(T) -> U>(&self, f: F) -> OvumBuffer<U> {
        OvumBuffer {
            w: self.w,
            h: self.h,
            c: self.c,
            buffer: self.buffer.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Replace every pixel whose `selector` entry is false with `pixel`
    ///
    /// # Arguments
    ///
    /// * `selector` - One flag per pixel; pixels flagged true are kept
    /// * `pixel` - Replacement subpixels for all other pixels
    pub fn retain_where(&mut self, selector: &[bool], pixel: &[T]) -> Result<(), OvumError> {
        if selector.len() != (self.w as usize) * (self.h as usize) {
            return Err(OvumError::BufferSizeError);
        }

        if pixel.len() != self.c as usize {
            return Err(OvumError::ChannelBoundsError);
        }

        for (keep, chunk) in selector
            .iter()
            .zip(self.buffer.chunks_exact_mut(pixel.len()))
        {
            if !keep {
                chunk.copy_from_slice(pixel);
            }
        }

        Ok(())
    }
}

// <<< TRANSFORM METHODS

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_buffer_new_success() {
        let buffer = OvumBuffer::new(1, 3, 2, vec![1, 2, 3, 4, 5, 6]);
        assert!(buffer.is_ok());
    }

    #[test]
    fn test_buffer_new_error() {
        let buffer = OvumBuffer::new(2, 3, 2, vec![1, 2, 3, 4, 5, 6]);
        assert!(buffer.is_err());

        let buffer = OvumBuffer::<u8>::new(0, 0, 0, vec![]);
        assert!(buffer.is_err());
    }

    #[test]
    fn test_buffer_shape() {
        let buffer = OvumBuffer::new(1, 3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(buffer.shape(), (3, 1, 2));
        assert_eq!(buffer.len(), 6);
    }

    #[test]
    fn test_pixel_access() {
        let buffer = OvumBuffer::new(2, 2, 2, vec![0u8, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert_eq!(buffer.pixel(1, 0), &[4, 5]);
        assert_eq!(buffer.pixel(1, 1), &[6, 7]);
    }

    #[test]
    fn test_from_pixel_rejects_empty_pixel() {
        let buffer = OvumBuffer::from_pixel(2, 3, &[4u8, 5]).unwrap();
        assert_eq!(buffer.shape(), (3, 2, 2));
        assert_eq!(buffer.len(), 12);

        assert_eq!(
            OvumBuffer::<u8>::from_pixel(2, 3, &[]),
            Err(OvumError::BufferSizeError)
        );
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let buffer = OvumBuffer::from_fn(3, 2, |row, col| row * 10 + col);
        assert_eq!(buffer.as_raw(), &vec![0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn test_crop() {
        let buffer = OvumBuffer::from_fn(4, 4, |row, col| row * 4 + col);

        let crop = buffer.crop(1, 2, 2, 2).unwrap();
        assert_eq!(crop.as_raw(), &vec![9, 10, 13, 14]);

        assert!(buffer.crop(3, 3, 2, 1).is_err());
    }

    #[test]
    fn test_retain_where() {
        let mut buffer = OvumBuffer::new(2, 1, 3, vec![1u8, 2, 3, 4, 5, 6]).unwrap();
        buffer.retain_where(&[false, true], &[0, 0, 9]).unwrap();
        assert_eq!(buffer.as_raw(), &vec![0, 0, 9, 4, 5, 6]);

        assert!(buffer.retain_where(&[true], &[0, 0, 0]).is_err());
        assert!(buffer.retain_where(&[true, true], &[0]).is_err());
    }
}
