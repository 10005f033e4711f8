//! Host-side monochrome frame buffer
//!
//! Stands in for the OLED panel when running off-target: any code drawing to
//! an `embedded-graphics` target can draw here, and the result can be dumped
//! as text.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use std::convert::Infallible;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<BinaryColor>,
}

impl FrameBuffer {
    /// Create a frame buffer with every pixel off
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![BinaryColor::Off; width * height],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<BinaryColor> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn count(&self, color: BinaryColor) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }

    /// Render as text, `on`/`off` characters per pixel
    pub fn to_ascii(&self, on: char, off: char) -> String {
        self.pixels
            .chunks(self.width.max(1))
            .map(|row| {
                row.iter()
                    .map(|&p| if p.is_on() { on } else { off })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 {
                let (x, y) = (point.x as usize, point.y as usize);
                if x < self.width && y < self.height {
                    self.pixels[y * self.width + x] = color;
                }
            }
        }
        Ok(())
    }
}
