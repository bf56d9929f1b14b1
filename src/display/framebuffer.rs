use crate::error::DisplayError;
use crate::frame::Rectangle;

const BYTES_PER_PIXEL: usize = 4;

/// RGBA screen contents assembled from partial render updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Copy an RGBA tile covering `rectangle` into the framebuffer.
    ///
    /// `pixels` must hold exactly `width * height * 4` bytes. Parts of the tile
    /// outside the framebuffer are clipped.
    pub fn blit(&mut self, rectangle: Rectangle, pixels: &[u8]) -> Result<(), DisplayError> {
        let expected = rectangle.rgba_len();
        if pixels.len() != expected {
            return Err(DisplayError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        if rectangle.x >= self.width || rectangle.y >= self.height {
            return Ok(());
        }

        let visible_width = rectangle.width.min(self.width - rectangle.x) as usize;
        let visible_height = rectangle.height.min(self.height - rectangle.y) as usize;
        let src_stride = rectangle.width as usize * BYTES_PER_PIXEL;
        let dst_stride = self.width as usize * BYTES_PER_PIXEL;
        let row_len = visible_width * BYTES_PER_PIXEL;

        for row in 0..visible_height {
            let src = row * src_stride;
            let dst = (rectangle.y as usize + row) * dst_stride
                + rectangle.x as usize * BYTES_PER_PIXEL;
            self.pixels[dst..dst + row_len].copy_from_slice(&pixels[src..src + row_len]);
        }

        Ok(())
    }
}
