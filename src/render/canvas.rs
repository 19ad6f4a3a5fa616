//! Software rasteriser for the handful of shapes a glyph needs.
//!
//! Shapes are described in points with a top-left origin and anti-aliased
//! from their signed distance, one pixel wide.

use super::font::TextMask;
use super::glyph::Glyph;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self { Color { r, g, b, a: 1.0 } }

    pub const fn with_alpha(self, a: f32) -> Self { Color { a, ..self } }
}

pub struct Canvas {
    width: f64,
    height: f64,
    scale: u32,
    pixel_width: u32,
    pixel_height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: f64, height: f64, scale: u32) -> Self {
        let scale = scale.max(1);
        let pixel_width = (width * scale as f64).ceil().max(1.0) as u32;
        let pixel_height = (height * scale as f64).ceil().max(1.0) as u32;
        Canvas {
            width,
            height,
            scale,
            pixel_width,
            pixel_height,
            pixels: vec![0; pixel_width as usize * pixel_height as usize * 4],
        }
    }

    pub fn scale(&self) -> u32 { self.scale }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Color) {
        self.shade(cx - radius, cy - radius, cx + radius, cy + radius, color, |x, y| {
            (x - cx).hypot(y - cy) - radius
        });
    }

    /// Strokes a circle outline centred on `radius`, like an AppKit path stroke.
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, line_width: f64, color: Color) {
        let half = line_width / 2.0;
        let outer = radius + half;
        self.shade(cx - outer, cy - outer, cx + outer, cy + outer, color, |x, y| {
            ((x - cx).hypot(y - cy) - radius).abs() - half
        });
    }

    pub fn fill_rounded_rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        color: Color,
    ) {
        let radius = radius.min(width / 2.0).min(height / 2.0).max(0.0);
        let (cx, cy) = (x + width / 2.0, y + height / 2.0);
        let (hx, hy) = (width / 2.0 - radius, height / 2.0 - radius);
        self.shade(x, y, x + width, y + height, color, |px, py| {
            let qx = (px - cx).abs() - hx;
            let qy = (py - cy).abs() - hy;
            let outside = qx.max(0.0).hypot(qy.max(0.0));
            outside + qx.max(qy).min(0.0) - radius
        });
    }

    /// Blends a text coverage mask whose top-left corner sits at `(x, y)` points.
    pub fn draw_mask(&mut self, mask: &TextMask, x: f64, y: f64, color: Color) {
        let scale = self.scale as f64;
        let left = (x * scale).round() as i64;
        let top = (y * scale).round() as i64;
        for row in 0..mask.height {
            for col in 0..mask.width {
                let coverage = mask.coverage[row * mask.width + col];
                if coverage == 0 {
                    continue;
                }
                self.blend(left + col as i64, top + row as i64, color, coverage as f32 / 255.0);
            }
        }
    }

    pub fn into_glyph(self, is_template: bool) -> Glyph {
        Glyph::from_parts(
            self.width,
            self.height,
            self.scale,
            (self.pixel_width, self.pixel_height),
            self.pixels,
            is_template,
        )
    }

    /// Shades every pixel in the point-space box `[x0, x1] × [y0, y1]` using
    /// `distance`, a signed distance in points (negative inside).
    fn shade(
        &mut self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        color: Color,
        distance: impl Fn(f64, f64) -> f64,
    ) {
        let scale = self.scale as f64;
        let px0 = ((x0 * scale).floor() as i64 - 1).max(0);
        let py0 = ((y0 * scale).floor() as i64 - 1).max(0);
        let px1 = ((x1 * scale).ceil() as i64 + 1).min(self.pixel_width as i64);
        let py1 = ((y1 * scale).ceil() as i64 + 1).min(self.pixel_height as i64);

        for py in py0..py1 {
            for px in px0..px1 {
                let d = distance((px as f64 + 0.5) / scale, (py as f64 + 0.5) / scale);
                let coverage = (0.5 - d * scale).clamp(0.0, 1.0) as f32;
                if coverage > 0.0 {
                    self.blend(px, py, color, coverage);
                }
            }
        }
    }

    /// Source-over blend in straight alpha.
    fn blend(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x >= self.pixel_width as i64 || y >= self.pixel_height as i64 {
            return;
        }
        let i = (y as usize * self.pixel_width as usize + x as usize) * 4;
        let dst = &mut self.pixels[i..i + 4];

        let sa = color.a.clamp(0.0, 1.0) * coverage;
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        let mix = |s: u8, d: u8| {
            ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8
        };
        dst[0] = mix(color.r, dst[0]);
        dst[1] = mix(color.g, dst[1]);
        dst[2] = mix(color.b, dst[2]);
        dst[3] = (out_a * 255.0).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_size_rounds_up_and_scales() {
        let glyph = Canvas::new(10.5, 18.0, 2).into_glyph(true);
        assert_eq!((glyph.pixel_width(), glyph.pixel_height()), (21, 36));
        assert_eq!(glyph.width(), 10.5);
        assert!(glyph.is_blank());
    }

    #[test]
    fn filled_circle_is_solid_inside_and_clear_outside() {
        let mut canvas = Canvas::new(10.0, 10.0, 1);
        canvas.fill_circle(5.0, 5.0, 3.0, Color::BLACK);
        let glyph = canvas.into_glyph(true);
        assert_eq!(glyph.pixel(5, 5), [0, 0, 0, 255]);
        assert_eq!(glyph.alpha(0, 0), 0);
        assert_eq!(glyph.alpha(9, 5), 0);
    }

    #[test]
    fn stroked_circle_leaves_the_centre_empty() {
        let mut canvas = Canvas::new(10.0, 10.0, 1);
        canvas.stroke_circle(5.0, 5.0, 3.0, 1.2, Color::BLACK);
        let glyph = canvas.into_glyph(true);
        assert_eq!(glyph.alpha(5, 5), 0);
        // Pixel centre sits 2.9pt from the centre, inside the ring.
        assert!(glyph.alpha(6, 2) > 200, "{}", glyph.alpha(6, 2));
    }

    #[test]
    fn rounded_rect_clears_its_corners() {
        let mut canvas = Canvas::new(20.0, 20.0, 1);
        canvas.fill_rounded_rect(0.0, 0.0, 20.0, 20.0, 6.0, Color::WHITE);
        let glyph = canvas.into_glyph(false);
        assert_eq!(glyph.alpha(0, 0), 0);
        assert_eq!(glyph.pixel(10, 0), [255, 255, 255, 255]);
        assert_eq!(glyph.alpha(10, 10), 255);
    }

    #[test]
    fn translucent_colour_blends_over_existing_pixels() {
        let mut canvas = Canvas::new(4.0, 4.0, 1);
        canvas.fill_rounded_rect(0.0, 0.0, 4.0, 4.0, 0.0, Color::WHITE.with_alpha(0.5));
        canvas.fill_rounded_rect(0.0, 0.0, 4.0, 4.0, 0.0, Color::BLACK.with_alpha(0.5));
        let [r, g, b, a] = canvas.into_glyph(false).pixel(1, 1);
        assert!((190..=192).contains(&a), "{a}");
        assert_eq!((r, g, b), (85, 85, 85));
    }

    #[test]
    fn mask_outside_the_canvas_is_clipped() {
        let mask = TextMask { width: 4, height: 4, coverage: vec![255; 16] };
        let mut canvas = Canvas::new(4.0, 4.0, 1);
        canvas.draw_mask(&mask, 2.0, -2.0, Color::BLACK);
        let glyph = canvas.into_glyph(false);
        assert_eq!(glyph.alpha(2, 0), 255);
        assert_eq!(glyph.alpha(3, 1), 255);
        assert_eq!(glyph.alpha(1, 0), 0);
        assert_eq!(glyph.alpha(2, 2), 0);
    }
}
