//! Text measurement and rasterisation.

mod lookup;

use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use tracing::{debug, info, warn};

/// Extent of a single line of text, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

/// 8-bit coverage of a rendered line. The top-left corner is the top of the
/// line box at the pen's starting position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMask {
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
}

pub trait Typeface {
    fn measure(&self, text: &str, size: f32) -> TextExtent;

    /// Rasterises `text` at `size` points with `scale` pixels per point.
    fn rasterize(&self, text: &str, size: f32, scale: u32) -> TextMask;
}

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("no usable monospaced font found")]
    NotFound,
    #[error("failed to read font {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse font {path}: {reason}")]
    Parse { path: PathBuf, reason: &'static str },
}

/// Well-known file locations, tried when lookup by family name finds nothing.
const BERKELEY_MONO: &[&str] = &["BerkeleyMono-Regular.otf", "BerkeleyMono-Regular.ttf"];
const SYSTEM_FALLBACKS: &[&str] = &[
    "/Library/Fonts/BerkeleyMono-Regular.otf",
    "/Library/Fonts/BerkeleyMono-Regular.ttf",
    "/System/Library/Fonts/SFNSMono.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
];

/// A font loaded through `fontdue`.
pub struct FontdueTypeface {
    font: Font,
    path: PathBuf,
}

impl FontdueTypeface {
    pub fn load(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path)
            .map_err(|source| FontError::Read { path: path.to_owned(), source })?;
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|reason| FontError::Parse { path: path.to_owned(), reason })?;
        info!(?path, "loaded font");
        Ok(FontdueTypeface { font, path: path.to_owned() })
    }

    /// Loads `explicit` if given and usable, otherwise the first installed
    /// monospaced font that parses.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, FontError> {
        if let Some(path) = explicit {
            match Self::load(path) {
                Ok(face) => return Ok(face),
                Err(err) => warn!(%err, "configured font unusable; searching installed fonts"),
            }
        }
        for path in candidates() {
            if !path.is_file() {
                continue;
            }
            match Self::load(&path) {
                Ok(face) => return Ok(face),
                Err(err) => debug!(%err, "skipping font candidate"),
            }
        }
        Err(FontError::NotFound)
    }

    pub fn path(&self) -> &Path { &self.path }

    fn line_metrics(&self, px: f32) -> (f32, f32) {
        match self.font.horizontal_line_metrics(px) {
            Some(m) => (m.ascent, m.ascent - m.descent + m.line_gap),
            None => (px * 0.8, px * 1.2),
        }
    }
}

fn candidates() -> Vec<PathBuf> {
    let mut paths = lookup::installed_monospace();
    paths.extend(fallback_paths());
    paths
}

fn fallback_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::font_dir() {
        paths.extend(BERKELEY_MONO.iter().map(|name| dir.join(name)));
    }
    paths.extend(SYSTEM_FALLBACKS.iter().map(PathBuf::from));
    paths
}

impl Typeface for FontdueTypeface {
    fn measure(&self, text: &str, size: f32) -> TextExtent {
        let width: f32 = text.chars().map(|c| self.font.metrics(c, size).advance_width).sum();
        let (_, height) = self.line_metrics(size);
        TextExtent { width: width as f64, height: height as f64 }
    }

    fn rasterize(&self, text: &str, size: f32, scale: u32) -> TextMask {
        let px = size * scale.max(1) as f32;
        let (ascent, line_height) = self.line_metrics(px);
        let advance: f32 = text.chars().map(|c| self.font.metrics(c, px).advance_width).sum();

        let width = advance.ceil().max(0.0) as usize;
        let height = line_height.ceil().max(0.0) as usize;
        let mut coverage = vec![0u8; width * height];

        let mut pen = 0.0f32;
        for c in text.chars() {
            let (metrics, bitmap) = self.font.rasterize(c, px);
            let (left, top) = glyph_origin(&metrics, pen, ascent);
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let (x, y) = (left + col as i64, top + row as i64);
                    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                        continue;
                    }
                    let dst = &mut coverage[y as usize * width + x as usize];
                    *dst = (*dst).max(bitmap[row * metrics.width + col]);
                }
            }
            pen += metrics.advance_width;
        }

        TextMask { width, height, coverage }
    }
}

/// Top-left pixel of a glyph bitmap within the line box. `ymin` is the
/// offset of the bitmap's bottom edge from the baseline.
fn glyph_origin(metrics: &fontdue::Metrics, pen: f32, ascent: f32) -> (i64, i64) {
    let left = (pen + metrics.xmin as f32).round() as i64;
    let top = (ascent - metrics.ymin as f32 - metrics.height as f32).round() as i64;
    (left, top)
}
