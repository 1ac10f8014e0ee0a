//! Composition of two images into one panorama canvas.
//!
//! The second image is warped into the first image's frame, then the first
//! image is pasted on top unchanged. Overlapping pixels are not blended.

mod compositor;
mod error;
mod layout;
mod warp;

pub use compositor::Compositor;
pub use error::{ComposeError, ComposeResult};
pub use layout::CanvasLayout;
pub use warp::{sample_bilinear, sample_nearest, warp_into};
