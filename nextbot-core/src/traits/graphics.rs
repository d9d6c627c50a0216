//! Graphics collaborator trait
//!
//! Drawing commands from the master are forwarded here without waiting for
//! any completion. Coordinates are display pixels.

/// Display drawing operations
pub trait GraphicsEngine {
    /// Set a single pixel
    fn draw_pixel(&mut self, x: u8, y: u8);

    /// Draw a line between two points
    fn draw_line(&mut self, x0: u8, y0: u8, x1: u8, y1: u8);

    /// Draw a circle outline
    fn draw_circle(&mut self, x: u8, y: u8, radius: u8);

    /// Draw a filled circle
    fn draw_disc(&mut self, x: u8, y: u8, radius: u8);

    /// Draw a triangle outline
    fn draw_triangle(&mut self, x0: u8, y0: u8, x1: u8, y1: u8, x2: u8, y2: u8);

    /// Draw a rectangle outline
    fn draw_rectangle(&mut self, x: u8, y: u8, width: u8, height: u8);

    /// Draw a filled rectangle
    fn draw_box(&mut self, x: u8, y: u8, width: u8, height: u8);

    /// Print text on the current text line
    fn draw_str(&mut self, text: &str);

    /// Clear the whole display
    fn clear(&mut self);
}
