pub mod image;

pub use image::{ImageFile, UploadedImage};
