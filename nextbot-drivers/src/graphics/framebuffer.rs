//! 128x64 monochrome framebuffer
//!
//! One bit per pixel, organized in eight 8-pixel-high pages the way
//! SH1106/SSD1306 controllers expect it, so a page can be sent to a panel
//! as is.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};

/// Display width in pixels
pub const WIDTH: usize = 128;
/// Display height in pixels
pub const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// In-RAM display contents
pub struct Framebuffer {
    pages: [[u8; WIDTH]; PAGES],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    /// Create a blank framebuffer
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    /// Check whether a pixel is lit; out-of-range pixels read as unlit
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        self.pages[y / 8][x] & (1 << (y % 8)) != 0
    }

    /// Number of lit pixels
    pub fn lit(&self) -> usize {
        self.pages
            .iter()
            .flatten()
            .map(|b| b.count_ones() as usize)
            .sum()
    }

    /// Raw page data, page 0 at the top
    pub fn pages(&self) -> &[[u8; WIDTH]; PAGES] {
        &self.pages
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                continue;
            };
            if x >= WIDTH || y >= HEIGHT {
                continue;
            }

            let mask = 1 << (y % 8);
            match color {
                BinaryColor::On => self.pages[y / 8][x] |= mask,
                BinaryColor::Off => self.pages[y / 8][x] &= !mask,
            }
        }
        Ok(())
    }
}
