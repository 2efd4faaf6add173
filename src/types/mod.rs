// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Container IDs and generated image names.

mod id;
mod image_name;

pub use id::ContainerId;
pub use image_name::{ImageName, ImageNameError};
