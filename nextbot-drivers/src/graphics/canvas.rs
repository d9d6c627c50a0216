//! Graphics collaborator over an `embedded-graphics` draw target
//!
//! Shapes are drawn in the "on" color with a 1 px stroke, or filled for
//! discs and boxes. Circles are given by center and radius. Text goes on a
//! cursor line that moves down one line per call and wraps at the bottom.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle, Triangle};
use embedded_graphics::text::{Baseline, Text};
use nextbot_core::traits::GraphicsEngine;

/// Height of one text line in pixels
pub const LINE_HEIGHT: u32 = 10;

/// Draws commands onto a monochrome display
pub struct Canvas<D> {
    target: D,
    text_line: u32,
}

impl<D: DrawTarget<Color = BinaryColor>> Canvas<D> {
    /// Create a canvas; text starts on the top line
    pub fn new(target: D) -> Self {
        Self {
            target,
            text_line: 0,
        }
    }

    /// Draw target
    pub fn target(&self) -> &D {
        &self.target
    }

    /// Draw target, mutably
    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    /// Release the draw target
    pub fn into_inner(self) -> D {
        self.target
    }

    /// Line the next text goes on
    pub fn text_line(&self) -> u32 {
        self.text_line
    }

    fn lines(&self) -> u32 {
        (self.target.bounding_box().size.height / LINE_HEIGHT).max(1)
    }

    fn stroke() -> PrimitiveStyle<BinaryColor> {
        PrimitiveStyle::with_stroke(BinaryColor::On, 1)
    }

    fn fill() -> PrimitiveStyle<BinaryColor> {
        PrimitiveStyle::with_fill(BinaryColor::On)
    }

    fn check<T>(result: Result<T, D::Error>) {
        if result.is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("draw target rejected a drawing");
        }
    }
}

fn point(x: u8, y: u8) -> Point {
    Point::new(x as i32, y as i32)
}

fn diameter(radius: u8) -> u32 {
    2 * radius as u32 + 1
}

impl<D: DrawTarget<Color = BinaryColor>> GraphicsEngine for Canvas<D> {
    fn draw_pixel(&mut self, x: u8, y: u8) {
        Self::check(Pixel(point(x, y), BinaryColor::On).draw(&mut self.target));
    }

    fn draw_line(&mut self, x0: u8, y0: u8, x1: u8, y1: u8) {
        let line = Line::new(point(x0, y0), point(x1, y1)).into_styled(Self::stroke());
        Self::check(line.draw(&mut self.target));
    }

    fn draw_circle(&mut self, x: u8, y: u8, radius: u8) {
        let circle = Circle::with_center(point(x, y), diameter(radius)).into_styled(Self::stroke());
        Self::check(circle.draw(&mut self.target));
    }

    fn draw_disc(&mut self, x: u8, y: u8, radius: u8) {
        let disc = Circle::with_center(point(x, y), diameter(radius)).into_styled(Self::fill());
        Self::check(disc.draw(&mut self.target));
    }

    fn draw_triangle(&mut self, x0: u8, y0: u8, x1: u8, y1: u8, x2: u8, y2: u8) {
        let triangle = Triangle::new(point(x0, y0), point(x1, y1), point(x2, y2))
            .into_styled(Self::stroke());
        Self::check(triangle.draw(&mut self.target));
    }

    fn draw_rectangle(&mut self, x: u8, y: u8, width: u8, height: u8) {
        let rect = Rectangle::new(point(x, y), Size::new(width as u32, height as u32))
            .into_styled(Self::stroke());
        Self::check(rect.draw(&mut self.target));
    }

    fn draw_box(&mut self, x: u8, y: u8, width: u8, height: u8) {
        let rect = Rectangle::new(point(x, y), Size::new(width as u32, height as u32))
            .into_styled(Self::fill());
        Self::check(rect.draw(&mut self.target));
    }

    fn draw_str(&mut self, text: &str) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let origin = Point::new(0, (self.text_line * LINE_HEIGHT) as i32);
        Self::check(Text::with_baseline(text, origin, style, Baseline::Top).draw(&mut self.target));
        self.text_line = (self.text_line + 1) % self.lines();
    }

    fn clear(&mut self) {
        Self::check(self.target.clear(BinaryColor::Off));
        self.text_line = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Framebuffer;

    fn canvas() -> Canvas<Framebuffer> {
        Canvas::new(Framebuffer::new())
    }

    #[test]
    fn test_rectangle_outline() {
        let mut c = canvas();
        c.draw_rectangle(10, 10, 20, 5);

        let fb = c.target();
        assert!(fb.pixel(10, 10));
        assert!(fb.pixel(29, 10));
        assert!(fb.pixel(10, 14));
        assert!(fb.pixel(29, 14));
        assert!(!fb.pixel(30, 10));
        assert!(!fb.pixel(15, 12));
        // 2 × 20 + 2 × 3
        assert_eq!(fb.lit(), 46);
    }

    #[test]
    fn test_box_is_filled() {
        let mut c = canvas();
        c.draw_box(0, 0, 4, 3);
        assert_eq!(c.target().lit(), 12);
        assert!(c.target().pixel(1, 1));
    }

    #[test]
    fn test_pixel_and_line() {
        let mut c = canvas();
        c.draw_pixel(127, 63);
        assert!(c.target().pixel(127, 63));

        c.draw_line(0, 0, 9, 0);
        assert!(c.target().pixel(0, 0));
        assert!(c.target().pixel(9, 0));
        assert_eq!(c.target().lit(), 11);
    }

    #[test]
    fn test_circle_and_disc() {
        let mut c = canvas();
        c.draw_circle(20, 20, 5);
        assert!(c.target().pixel(25, 20));
        assert!(!c.target().pixel(20, 20));

        c.draw_disc(60, 20, 5);
        assert!(c.target().pixel(60, 20));
    }

    #[test]
    fn test_triangle() {
        let mut c = canvas();
        c.draw_triangle(0, 0, 10, 0, 0, 10);
        assert!(c.target().pixel(5, 0));
        assert!(c.target().pixel(0, 5));
        assert!(!c.target().pixel(3, 3));
        assert!(c.target().lit() >= 25);
    }

    #[test]
    fn test_text_lines_advance_and_wrap() {
        let mut c = canvas();
        c.draw_str("Hi");
        assert_eq!(c.text_line(), 1);
        assert!(c.target().lit() > 0);

        for _ in 0..5 {
            c.draw_str("x");
        }
        // 64 px / 10 px per line
        assert_eq!(c.text_line(), 0);
    }

    #[test]
    fn test_clear_resets_text_line() {
        let mut c = canvas();
        c.draw_str("Hello");
        c.draw_box(0, 40, 10, 10);

        c.clear();
        assert_eq!(c.target().lit(), 0);
        assert_eq!(c.text_line(), 0);
    }
}
