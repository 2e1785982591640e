mod buffer;
mod image;
mod mask;

pub use buffer::OvumBuffer;
pub use image::OvumImage;

pub use mask::BinaryMask;
pub use mask::LabelMask;
