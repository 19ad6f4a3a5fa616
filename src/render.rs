//! Turns a space snapshot into the menu bar glyph.

mod canvas;
mod font;
mod glyph;

use std::path::PathBuf;

pub use canvas::{Canvas, Color};
pub use font::{FontError, FontdueTypeface, TextExtent, TextMask, Typeface};
pub use glyph::Glyph;
#[cfg(test)]
pub(crate) use font::testing;
use tracing::{instrument, trace, warn};

use crate::classifier::DisplayClassifier;
use crate::common::config::{DisplayMode, DisplayStyle, RenderConfig};
use crate::model::Space;
use crate::sys::display::DisplayMetrics;

pub const GLYPH_HEIGHT: f64 = 18.0;

pub const DOT_SIZE: f64 = 6.0;
pub const DOT_SPACING: f64 = 5.0;
const DOT_LINE_WIDTH: f64 = 1.2;

const PLACEHOLDER_WIDTH: f64 = 8.0;
const PLACEHOLDER_DOT_ORIGIN: (f64, f64) = (1.0, 6.0);

pub const LABEL_SPACING: f64 = 6.0;
pub const LABEL_PAD_V: f64 = 2.0;
const LABEL_CORNER_RADIUS: f64 = 4.0;

const CURRENT_PILL: Color = Color::WHITE.with_alpha(0.9);
const CURRENT_TEXT: Color = Color::BLACK.with_alpha(0.85);
const OTHER_TEXT: Color = Color::WHITE.with_alpha(0.5);

/// Per-style label parameters.
#[derive(Debug, Clone, Copy)]
struct LabelStyle {
    pad_h: f64,
    initial_only: bool,
}

const ABBREVIATED: LabelStyle = LabelStyle { pad_h: 4.0, initial_only: true };
const NAMED: LabelStyle = LabelStyle { pad_h: 6.0, initial_only: false };

impl DisplayStyle {
    fn label_style(self) -> Option<LabelStyle> {
        match self {
            DisplayStyle::Dots => None,
            DisplayStyle::Abbreviated => Some(ABBREVIATED),
            DisplayStyle::Named => Some(NAMED),
        }
    }
}

enum Fonts {
    /// Supplied by the caller; never reloaded.
    Pinned(Option<Box<dyn Typeface>>),
    /// Discovered on first use and again whenever the configured path changes.
    Discovered {
        loaded_for: Option<Option<PathBuf>>,
        face: Option<Box<dyn Typeface>>,
    },
}

pub struct GlyphRenderer<D: DisplayMetrics> {
    classifier: DisplayClassifier<D>,
    fonts: Fonts,
    scale: u32,
}

impl<D: DisplayMetrics> GlyphRenderer<D> {
    /// A renderer that finds a monospaced font on the system.
    pub fn new(classifier: DisplayClassifier<D>) -> Self {
        GlyphRenderer {
            classifier,
            fonts: Fonts::Discovered { loaded_for: None, face: None },
            scale: 1,
        }
    }

    /// A renderer with a fixed typeface. `None` renders every style as dots.
    pub fn with_typeface(classifier: DisplayClassifier<D>, face: Option<Box<dyn Typeface>>) -> Self {
        GlyphRenderer { classifier, fonts: Fonts::Pinned(face), scale: 1 }
    }

    /// Pixels per point of the produced bitmaps, e.g. 2 on Retina displays.
    pub fn set_scale(&mut self, scale: u32) { self.scale = scale.max(1); }

    pub fn classifier(&self) -> &DisplayClassifier<D> { &self.classifier }

    pub fn classifier_mut(&mut self) -> &mut DisplayClassifier<D> { &mut self.classifier }

    /// Manual mode uses the configured style; auto mode derives it from the
    /// size of the menu bar display.
    pub fn effective_style(&self, config: &RenderConfig) -> DisplayStyle {
        match config.display_mode {
            DisplayMode::Manual => config.display_style,
            DisplayMode::Auto => {
                let override_tier = config.size_override.or(self.classifier.override_tier());
                self.classifier.classify_with(override_tier).auto_style()
            }
        }
    }

    #[instrument(name = "render::render", skip(self, spaces, config), fields(count = spaces.len()))]
    pub fn render(&mut self, spaces: &[Space], config: &RenderConfig) -> Glyph {
        if spaces.is_empty() {
            return placeholder(self.scale);
        }
        let style = self.effective_style(config);
        trace!(?style, mode = ?config.display_mode, "rendering");

        let Some(label_style) = style.label_style() else {
            return render_dots(spaces, self.scale);
        };
        let scale = self.scale;
        match self.typeface(config) {
            Some(face) => render_labels(face, spaces, config.font_size, label_style, scale),
            None => render_dots(spaces, scale),
        }
    }

    fn typeface(&mut self, config: &RenderConfig) -> Option<&dyn Typeface> {
        match &mut self.fonts {
            Fonts::Pinned(face) => face.as_deref(),
            Fonts::Discovered { loaded_for, face } => {
                if loaded_for.as_ref() != Some(&config.font_path) {
                    *face = match FontdueTypeface::discover(config.font_path.as_deref()) {
                        Ok(found) => Some(Box::new(found)),
                        Err(err) => {
                            warn!(%err, "no font for labels; falling back to dots");
                            None
                        }
                    };
                    *loaded_for = Some(config.font_path.clone());
                }
                face.as_deref()
            }
        }
    }
}

/// A single filled dot, shown when there is nothing else to draw.
pub fn placeholder(scale: u32) -> Glyph {
    let mut canvas = Canvas::new(PLACEHOLDER_WIDTH, GLYPH_HEIGHT, scale);
    let radius = DOT_SIZE / 2.0;
    let (x, y) = PLACEHOLDER_DOT_ORIGIN;
    canvas.fill_circle(x + radius, y + radius, radius, Color::BLACK);
    canvas.into_glyph(true)
}

fn render_dots(spaces: &[Space], scale: u32) -> Glyph {
    if spaces.is_empty() {
        return placeholder(scale);
    }
    let count = spaces.len() as f64;
    let width = count * DOT_SIZE + (count - 1.0) * DOT_SPACING;
    let mut canvas = Canvas::new(width, GLYPH_HEIGHT, scale);

    let radius = DOT_SIZE / 2.0;
    let cy = GLYPH_HEIGHT / 2.0;
    for (i, space) in spaces.iter().enumerate() {
        let cx = i as f64 * (DOT_SIZE + DOT_SPACING) + radius;
        if space.is_current {
            canvas.fill_circle(cx, cy, radius, Color::BLACK);
        } else {
            canvas.stroke_circle(cx, cy, radius, DOT_LINE_WIDTH, Color::BLACK);
        }
    }
    canvas.into_glyph(true)
}

struct Label {
    text: String,
    extent: TextExtent,
    is_current: bool,
}

fn render_labels(
    face: &dyn Typeface,
    spaces: &[Space],
    font_size: f32,
    style: LabelStyle,
    scale: u32,
) -> Glyph {
    if spaces.is_empty() {
        return placeholder(scale);
    }
    let labels: Vec<Label> = spaces
        .iter()
        .map(|space| {
            let text = if style.initial_only { space.initial() } else { space.name.clone() };
            let extent = face.measure(&text, font_size);
            Label { text, extent, is_current: space.is_current }
        })
        .collect();

    let height = labels
        .iter()
        .map(|l| l.extent.height + LABEL_PAD_V * 2.0)
        .fold(GLYPH_HEIGHT, f64::max);
    let width: f64 = labels.iter().map(|l| l.extent.width + style.pad_h * 2.0).sum::<f64>()
        + (labels.len() - 1) as f64 * LABEL_SPACING;

    let mut canvas = Canvas::new(width.ceil(), height, scale);
    let mut x = 0.0;
    for label in &labels {
        let label_width = label.extent.width + style.pad_h * 2.0;
        let text_y = (height - label.extent.height) / 2.0;
        let color = if label.is_current {
            let pill_height = label.extent.height + LABEL_PAD_V * 2.0;
            canvas.fill_rounded_rect(
                x,
                (height - pill_height) / 2.0,
                label_width,
                pill_height,
                LABEL_CORNER_RADIUS,
                CURRENT_PILL,
            );
            CURRENT_TEXT
        } else {
            OTHER_TEXT
        };
        let mask = face.rasterize(&label.text, font_size, canvas.scale());
        canvas.draw_mask(&mask, x + style.pad_h, text_y, color);
        x += label_width + LABEL_SPACING;
    }
    canvas.into_glyph(false)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::font::testing::CellFace;
    use super::*;
    use crate::common::config::{DEFAULT_FONT_SIZE, SizeTier};
    use crate::model::SpaceId;
    use crate::sys::display::{DisplayInfo, Fixed};

    fn spaces(names: &[&str], current: usize) -> Vec<Space> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Space {
                display_id: "Main".into(),
                space_id: SpaceId::new(100 + i as u64),
                name: name.to_string(),
                global_index: i + 1,
                is_current: i + 1 == current,
                is_full_screen: false,
            })
            .collect()
    }

    fn laptop() -> Fixed {
        Fixed(Some(DisplayInfo {
            physical_size_mm: (302.0, 196.0),
            pixel_width: 1512,
            is_builtin: true,
        }))
    }

    fn renderer(metrics: Fixed) -> GlyphRenderer<Fixed> {
        GlyphRenderer::with_typeface(DisplayClassifier::new(metrics), Some(Box::new(CellFace)))
    }

    fn manual(style: DisplayStyle) -> RenderConfig {
        RenderConfig { display_style: style, ..RenderConfig::default() }
    }

    #[test]
    fn dots_width_and_fill() {
        let glyph = renderer(laptop()).render(&spaces(&["1", "2", "3"], 2), &manual(DisplayStyle::Dots));

        assert_eq!(glyph.width(), 3.0 * DOT_SIZE + 2.0 * DOT_SPACING);
        assert_eq!(glyph.height(), GLYPH_HEIGHT);
        assert_eq!((glyph.pixel_width(), glyph.pixel_height()), (28, 18));
        assert!(glyph.is_template());

        // Pixel at the centre of each dot: only the second one is filled.
        let centres = [3, 14, 25];
        let filled: Vec<bool> = centres.iter().map(|&x| glyph.alpha(x, 9) == 255).collect();
        assert_eq!(filled, vec![false, true, false]);
        assert!(centres.iter().all(|&x| glyph.alpha(x, 9) == 255 || glyph.alpha(x, 9) == 0));
        // Outlines are still drawn.
        assert!(glyph.alpha(0, 9) > 0);
        assert!(glyph.alpha(22, 9) > 0);
        // Nothing between dots.
        assert_eq!(glyph.alpha(8, 9), 0);
    }

    #[test]
    fn empty_input_renders_placeholder_in_every_style() {
        for style in [DisplayStyle::Dots, DisplayStyle::Abbreviated, DisplayStyle::Named] {
            let glyph = renderer(laptop()).render(&[], &manual(style));
            assert_eq!((glyph.width(), glyph.height()), (8.0, 18.0), "{style}");
            assert!(glyph.is_template());
            assert!(!glyph.is_blank());
            assert_eq!(glyph.alpha(4, 9), 255);
        }

        let mut auto = RenderConfig { display_mode: DisplayMode::Auto, ..Default::default() };
        auto.size_override = Some(SizeTier::Large);
        assert!(!renderer(laptop()).render(&[], &auto).is_blank());
    }

    #[test]
    fn abbreviated_layout_from_measured_text() {
        let glyph = renderer(laptop())
            .render(&spaces(&["Work", "Mail", "Code"], 2), &manual(DisplayStyle::Abbreviated));

        // Each capsule: one 6.5pt cell plus 4pt padding per side.
        let capsule = CellFace::advance(13.0) + 8.0;
        assert_eq!(glyph.width(), (3.0 * capsule + 2.0 * LABEL_SPACING).ceil());
        assert_eq!(glyph.width(), 56.0);
        assert_eq!(glyph.height(), CellFace::line_height(13.0) + 2.0 * LABEL_PAD_V);
        assert!(!glyph.is_template());

        // Pill of the current label, above its text.
        let [r, g, b, a] = glyph.pixel(27, 1);
        assert_eq!((r, g, b), (255, 255, 255));
        assert!((229..=230).contains(&a), "{a}");
        // Dark text on the pill.
        let [r, _, _, a] = glyph.pixel(27, 10);
        assert!(r < 60 && a > 240, "{:?}", glyph.pixel(27, 10));
        // Pill corners are rounded.
        assert_eq!(glyph.alpha(20, 0), 0);
        // Dimmed text without a pill for the other labels.
        assert_eq!(glyph.pixel(6, 10), [255, 255, 255, 128]);
        assert_eq!(glyph.alpha(6, 1), 0);
        // Gap between labels.
        assert_eq!(glyph.alpha(17, 10), 0);
    }

    #[test]
    fn named_uses_full_names_and_wider_padding() {
        let glyph = renderer(laptop())
            .render(&spaces(&["Work", "Mail", "3"], 1), &manual(DisplayStyle::Named));

        let text = CellFace::advance(13.0) * 9.0;
        assert_eq!(glyph.width(), (text + 3.0 * 12.0 + 2.0 * LABEL_SPACING).ceil());
        assert_eq!(glyph.width(), 107.0);
        assert!(!glyph.is_template());
    }

    #[test]
    fn labels_never_shrink_below_the_minimum_height() {
        let config = RenderConfig { font_size: 8.0, ..manual(DisplayStyle::Named) };
        let glyph = renderer(laptop()).render(&spaces(&["a"], 1), &config);
        assert_eq!(glyph.height(), GLYPH_HEIGHT);
    }

    #[test]
    fn long_names_widen_the_glyph() {
        let mut renderer = renderer(laptop());
        let config = manual(DisplayStyle::Named);
        let short = renderer.render(&spaces(&["A", "B"], 1), &config);
        let long = renderer.render(&spaces(&["A", "Quarterly planning"], 1), &config);
        assert!(long.width() > short.width() + 100.0);
    }

    #[test]
    fn switching_to_auto_follows_the_classifier() {
        let mut renderer = renderer(laptop());
        let input = spaces(&["Work", "Mail", "Code"], 1);
        let mut config = manual(DisplayStyle::Named);

        assert_eq!(renderer.effective_style(&config), DisplayStyle::Named);
        let named = renderer.render(&input, &config);
        assert!(!named.is_template());

        config.display_mode = DisplayMode::Auto;
        assert_eq!(renderer.effective_style(&config), DisplayStyle::Dots);
        let dots = renderer.render(&input, &config);
        assert!(dots.is_template());
        assert_eq!(dots.width(), 28.0);
    }

    #[test]
    fn auto_mode_honours_size_override() {
        let renderer = renderer(laptop());
        let mut config = RenderConfig { display_mode: DisplayMode::Auto, ..Default::default() };

        config.size_override = Some(SizeTier::Medium);
        assert_eq!(renderer.effective_style(&config), DisplayStyle::Abbreviated);
        config.size_override = Some(SizeTier::Large);
        assert_eq!(renderer.effective_style(&config), DisplayStyle::Named);

        // The override is ignored in manual mode.
        config.display_mode = DisplayMode::Manual;
        assert_eq!(renderer.effective_style(&config), DisplayStyle::Dots);
    }

    #[test]
    fn classifier_override_applies_when_config_has_none() {
        let mut renderer = renderer(laptop());
        renderer.classifier_mut().set_override(Some(SizeTier::Large));
        let config = RenderConfig { display_mode: DisplayMode::Auto, ..Default::default() };
        assert_eq!(renderer.effective_style(&config), DisplayStyle::Named);
    }

    #[test_log::test]
    fn missing_font_degrades_to_dots() {
        let mut renderer = GlyphRenderer::with_typeface(DisplayClassifier::new(laptop()), None);
        let glyph = renderer.render(&spaces(&["Work", "Mail"], 1), &manual(DisplayStyle::Named));
        assert!(glyph.is_template());
        assert_eq!(glyph.width(), 2.0 * DOT_SIZE + DOT_SPACING);
    }

    #[test_log::test]
    fn stale_configured_font_falls_back_to_installed_fonts() {
        let mut renderer = GlyphRenderer::new(DisplayClassifier::new(laptop()));
        let config = RenderConfig {
            font_path: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..manual(DisplayStyle::Abbreviated)
        };
        let glyph = renderer.render(&spaces(&["Work"], 1), &config);
        let installed = FontdueTypeface::discover(None).is_ok();
        assert_eq!(glyph.is_template(), !installed);
        if !installed {
            assert_eq!(glyph.width(), DOT_SIZE);
        }
    }

    #[test]
    fn named_labels_with_an_installed_font() {
        let Ok(face) = FontdueTypeface::discover(None) else {
            eprintln!("no installed monospaced font, skipping");
            return;
        };
        let work = face.measure("Work", DEFAULT_FONT_SIZE);
        let mail = face.measure("Mail", DEFAULT_FONT_SIZE);
        let mut renderer =
            GlyphRenderer::with_typeface(DisplayClassifier::new(laptop()), Some(Box::new(face)));
        renderer.set_scale(2);

        let glyph = renderer.render(&spaces(&["Work", "Mail"], 1), &manual(DisplayStyle::Named));

        let pad = 6.0;
        let first = work.width + 2.0 * pad;
        let expected = (first + LABEL_SPACING + mail.width + 2.0 * pad).ceil();
        assert!(!glyph.is_template());
        assert_eq!(glyph.width(), expected);
        assert_eq!(glyph.height(), (work.height + 2.0 * LABEL_PAD_V).max(GLYPH_HEIGHT));

        // Between the current pill and the next label's text nothing is drawn.
        let gap_start = ((first + 1.0) * 2.0).ceil() as u32;
        let gap_end = ((first + LABEL_SPACING + pad - 2.0) * 2.0).floor() as u32;
        for x in gap_start..gap_end {
            for y in 0..glyph.pixel_height() {
                assert_eq!(glyph.alpha(x, y), 0, "ink at ({x}, {y})");
            }
        }
        assert!(glyph.alpha(6, glyph.pixel_height() / 2) > 200, "pill missing");
    }

    #[test]
    fn scale_multiplies_pixels_not_points() {
        let mut renderer = renderer(laptop());
        renderer.set_scale(2);
        let glyph = renderer.render(&spaces(&["1", "2", "3"], 3), &manual(DisplayStyle::Dots));
        assert_eq!(glyph.width(), 28.0);
        assert_eq!((glyph.pixel_width(), glyph.pixel_height()), (56, 36));
        assert_eq!(glyph.alpha(50, 18), 255);
        assert_eq!(glyph.alpha(6, 18), 0);
    }
}
