//! Pixel array transforms used when composing pages.

mod resample;
mod rotate;

pub use resample::resample;
pub(crate) use rotate::buffer_len;
pub use rotate::{rotate, rotate_into};
