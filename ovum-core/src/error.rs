// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum OvumError {
    AnnotationError(String),
    BackgroundError(&'static str),
    BufferSizeError,
    ChannelBoundsError,
    DegenerateRegionError,
    ImageError(&'static str),
    ImageReadError,
    ImageWriteError,
    ImageFormatError,
    ImageExtensionError,
    MaskError(&'static str),
    MaskFormatError,
    MissingCandidatesError(String),
    ShapeMismatchError {
        image: (u32, u32),
        mask: (u32, u32),
    },
    TableReadError(String),
    TableWriteError(String),
    NoFileError(String),
    DirError(String),
    OtherError(String),
}

impl fmt::Display for OvumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OvumError::AnnotationError(message) => {
                write!(
                    f,
                    "[ovum::AnnotationError] Invalid egg annotation. {}",
                    message
                )
            }
            OvumError::BackgroundError(message) => {
                write!(
                    f,
                    "[ovum::BackgroundError] Background color could not be resolved. {}",
                    message
                )
            }
            OvumError::BufferSizeError => {
                write!(
                    f,
                    "[ovum::BufferSizeError] The buffer does not match provided size"
                )
            }
            OvumError::ChannelBoundsError => {
                write!(
                    f,
                    "[ovum::ChannelBoundsError] The indexed channel is out of bounds."
                )
            }
            OvumError::DegenerateRegionError => {
                write!(
                    f,
                    "[ovum::DegenerateRegionError] The object has no foreground pixels after canonicalization."
                )
            }
            OvumError::ImageError(message) => {
                write!(f, "[ovum::ImageError] Failed to create image. {}", message)
            }
            OvumError::ImageReadError => {
                write!(f, "[ovum::ImageReadError] Failed to read image.")
            }
            OvumError::ImageWriteError => {
                write!(f, "[ovum::ImageWriteError] Failed to write image.")
            }
            OvumError::ImageFormatError => {
                write!(
                    f,
                    "[ovum::ImageFormatError] Only 1 and 3-channel u8, u16 and f32 images are currently supported."
                )
            }
            OvumError::ImageExtensionError => {
                write!(
                    f,
                    "[ovum::ImageExtensionError] Could not detect a valid image extension for input."
                )
            }
            OvumError::MaskError(message) => {
                write!(f, "[ovum::MaskError] Failed to create mask. {}", message)
            }
            OvumError::MaskFormatError => {
                write!(
                    f,
                    "[ovum::MaskFormatError] Only 1-channel u8, u16 and u32 masks are currently supported."
                )
            }
            OvumError::MissingCandidatesError(message) => {
                write!(
                    f,
                    "[ovum::MissingCandidatesError] No ellipse candidates available. {}",
                    message
                )
            }
            OvumError::ShapeMismatchError { image, mask } => {
                write!(
                    f,
                    "[ovum::ShapeMismatchError] Image extent {}x{} does not match mask extent {}x{}.",
                    image.0, image.1, mask.0, mask.1
                )
            }
            OvumError::TableReadError(message) => {
                write!(f, "[ovum::TableReadError] Failed to read table. {}", message)
            }
            OvumError::TableWriteError(message) => {
                write!(
                    f,
                    "[ovum::TableWriteError] Failed to write table. {}",
                    message
                )
            }
            OvumError::NoFileError(message) => {
                write!(
                    f,
                    "[ovum::NoFileError] File could not be found. {}.",
                    message
                )
            }
            OvumError::DirError(message) => {
                write!(
                    f,
                    "[ovum::DirError] Directory could not be read. {}.",
                    message
                )
            }
            OvumError::OtherError(message) => {
                write!(f, "[ovum::OtherError] Error: {}.", message)
            }
        }
    }
}

impl std::error::Error for OvumError {}

impl OvumError {
    /// Short name of the error kind, used when recording per-item failures
    pub fn kind(&self) -> &'static str {
        match self {
            OvumError::AnnotationError(_) => "AnnotationError",
            OvumError::BackgroundError(_) => "BackgroundError",
            OvumError::BufferSizeError => "BufferSizeError",
            OvumError::ChannelBoundsError => "ChannelBoundsError",
            OvumError::DegenerateRegionError => "DegenerateRegionError",
            OvumError::ImageError(_) => "ImageError",
            OvumError::ImageReadError => "ImageReadError",
            OvumError::ImageWriteError => "ImageWriteError",
            OvumError::ImageFormatError => "ImageFormatError",
            OvumError::ImageExtensionError => "ImageExtensionError",
            OvumError::MaskError(_) => "MaskError",
            OvumError::MaskFormatError => "MaskFormatError",
            OvumError::MissingCandidatesError(_) => "MissingCandidatesError",
            OvumError::ShapeMismatchError { .. } => "ShapeMismatchError",
            OvumError::TableReadError(_) => "TableReadError",
            OvumError::TableWriteError(_) => "TableWriteError",
            OvumError::NoFileError(_) => "NoFileError",
            OvumError::DirError(_) => "DirError",
            OvumError::OtherError(_) => "OtherError",
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_display_prefix() {
        let err = OvumError::MissingCandidatesError("image_01".to_string());
        assert!(err.to_string().starts_with("[ovum::MissingCandidatesError]"));
        assert!(err.to_string().contains("image_01"));
        assert_eq!(err.kind(), "MissingCandidatesError");
    }

    #[test]
    fn test_display_shape_mismatch() {
        let err = OvumError::ShapeMismatchError {
            image: (10, 12),
            mask: (10, 11),
        };
        assert_eq!(
            err.to_string(),
            "[ovum::ShapeMismatchError] Image extent 10x12 does not match mask extent 10x11."
        );
    }
}
