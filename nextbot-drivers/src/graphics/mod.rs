//! Display graphics

pub mod canvas;
pub mod framebuffer;

pub use canvas::Canvas;
pub use framebuffer::{Framebuffer, HEIGHT, WIDTH};
