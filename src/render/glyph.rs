/// A rendered status glyph.
///
/// Sizes are in points; the pixel buffer is `ceil(points × scale)` on each
/// axis, straight (non-premultiplied) RGBA8, row-major from the top-left.
#[derive(Clone, PartialEq)]
pub struct Glyph {
    width: f64,
    height: f64,
    scale: u32,
    pixel_width: u32,
    pixel_height: u32,
    pixels: Vec<u8>,
    is_template: bool,
}

impl Glyph {
    pub(super) fn from_parts(
        width: f64,
        height: f64,
        scale: u32,
        (pixel_width, pixel_height): (u32, u32),
        pixels: Vec<u8>,
        is_template: bool,
    ) -> Self {
        debug_assert_eq!(pixels.len(), pixel_width as usize * pixel_height as usize * 4);
        Glyph {
            width,
            height,
            scale,
            pixel_width,
            pixel_height,
            pixels,
            is_template,
        }
    }

    pub fn width(&self) -> f64 { self.width }

    pub fn height(&self) -> f64 { self.height }

    pub fn scale(&self) -> u32 { self.scale }

    pub fn pixel_width(&self) -> u32 { self.pixel_width }

    pub fn pixel_height(&self) -> u32 { self.pixel_height }

    /// Template glyphs are monochrome and get recoloured by the menu bar to
    /// match light or dark appearance.
    pub fn is_template(&self) -> bool { self.is_template }

    pub fn rgba(&self) -> &[u8] { &self.pixels }

    /// Pixel at `(x, y)` in pixel coordinates, or transparent when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.pixel_width || y >= self.pixel_height {
            return [0; 4];
        }
        let i = (y as usize * self.pixel_width as usize + x as usize) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    pub fn alpha(&self, x: u32, y: u32) -> u8 { self.pixel(x, y)[3] }

    pub fn is_blank(&self) -> bool { self.pixels.chunks_exact(4).all(|p| p[3] == 0) }
}

impl std::fmt::Debug for Glyph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Glyph")
            .field("size", &(self.width, self.height))
            .field("pixels", &(self.pixel_width, self.pixel_height))
            .field("scale", &self.scale)
            .field("is_template", &self.is_template)
            .finish()
    }
}
