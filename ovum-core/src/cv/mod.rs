pub mod background;
pub mod canonical;
pub mod connected;
pub mod draw;
pub mod ellipse;
pub mod moments;
pub mod overlap;
pub mod transform;

pub use canonical::{CropOptions, ObjectCrop, canonicalize};
pub use connected::connected_components;
pub use overlap::jaccard;
