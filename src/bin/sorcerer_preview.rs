//! Renders the status glyph for a made-up list of spaces and writes it as a PNG.
//!
//! ```text
//! sorcerer-preview --spaces "Work,*Mail,Code" --style named --out glyph.png
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use space_sorcerer::classifier::DisplayClassifier;
use space_sorcerer::common::config::{
    DisplayMode, DisplayStyle, RenderConfig, SizeTier, clamp_font_size,
};
use space_sorcerer::model::{Space, SpaceId};
use space_sorcerer::render::{Glyph, GlyphRenderer};
use space_sorcerer::sys::display::{DisplayMetrics, Fixed};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Render a Space Sorcerer glyph to a PNG")]
struct Cli {
    /// Comma separated space names; prefix the current one with `*`. An empty
    /// name falls back to the space's index.
    #[arg(long, default_value = "1,*2,3")]
    spaces: String,

    /// Render in manual mode with this style.
    #[arg(long, conflicts_with = "tier")]
    style: Option<DisplayStyle>,

    /// Render in auto mode as if the menu bar display had this size.
    #[arg(long)]
    tier: Option<SizeTier>,

    #[arg(long, default_value_t = 0.0)]
    font_size: f32,

    /// Font file to use instead of searching for a monospaced one.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Pixels per point.
    #[arg(long, default_value_t = 2)]
    scale: u32,

    /// Read the spaces and display size from the running window server
    /// (macOS only).
    #[arg(long)]
    live: bool,

    #[arg(long, short)]
    out: PathBuf,
}

impl Cli {
    /// Layers the command line over `base`: only the flags that were given
    /// change anything.
    fn apply_to(&self, mut config: RenderConfig) -> RenderConfig {
        if let Some(tier) = self.tier {
            config.display_mode = DisplayMode::Auto;
            config.size_override = Some(tier);
        }
        if let Some(style) = self.style {
            config.display_mode = DisplayMode::Manual;
            config.display_style = style;
        }
        if self.font_size != 0.0 {
            config.font_size = clamp_font_size(self.font_size);
        }
        if let Some(font) = &self.font {
            config.font_path = Some(font.clone());
        }
        config
    }
}

fn parse_spaces(list: &str) -> Vec<Space> {
    list.split(',')
        .enumerate()
        .map(|(i, raw)| {
            let raw = raw.trim();
            let (is_current, name) = match raw.strip_prefix('*') {
                Some(rest) => (true, rest.trim()),
                None => (false, raw),
            };
            let global_index = i + 1;
            Space {
                display_id: "Preview".into(),
                space_id: SpaceId::new(global_index as u64),
                name: if name.is_empty() { global_index.to_string() } else { name.to_owned() },
                global_index,
                is_current,
                is_full_screen: false,
            }
        })
        .collect()
}

fn render<D: DisplayMetrics>(metrics: D, spaces: &[Space], config: &RenderConfig, scale: u32) -> Glyph {
    let mut renderer = GlyphRenderer::new(DisplayClassifier::new(metrics));
    renderer.set_scale(scale);
    info!(style = %renderer.effective_style(&config), "rendering {} spaces", spaces.len());
    renderer.render(spaces, config)
}

/// Renders what the menu bar would show right now: the live spaces with the
/// stored names and settings, overridden by any flags.
#[cfg(target_os = "macos")]
fn live_glyph(cli: &Cli) -> anyhow::Result<Glyph> {
    use space_sorcerer::registry::SpaceRegistry;
    use space_sorcerer::store::{FileStore, MemoryStore, RenderConfigStore};
    use space_sorcerer::sys::{display, window_server};
    use tracing::warn;

    let Some(store) = FileStore::open_default() else {
        warn!("no config directory; using default names and settings");
        let spaces = SpaceRegistry::new(window_server::Actual, MemoryStore::new()).query_spaces();
        return Ok(render(display::Actual, &spaces, &cli.apply_to(RenderConfig::default()), cli.scale));
    };
    let stored = store.render_config().unwrap_or_else(|err| {
        warn!(%err, "could not read stored settings; using defaults");
        RenderConfig::default()
    });
    let spaces = SpaceRegistry::new(window_server::Actual, store).query_spaces();
    Ok(render(display::Actual, &spaces, &cli.apply_to(stored), cli.scale))
}

#[cfg(not(target_os = "macos"))]
fn live_glyph(_: &Cli) -> anyhow::Result<Glyph> {
    anyhow::bail!("--live needs the macOS window server")
}

fn write_png(glyph: &Glyph, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let (width, height) = (glyph.pixel_width(), glyph.pixel_height());
    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(glyph.rgba())?;
    writer.finish()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    let glyph = if cli.live {
        live_glyph(&cli)?
    } else {
        let config = cli.apply_to(RenderConfig::default());
        render(Fixed(None), &parse_spaces(&cli.spaces), &config, cli.scale)
    };

    write_png(&glyph, &cli.out)?;
    info!(
        width = glyph.width(),
        height = glyph.height(),
        pixels = ?(glyph.pixel_width(), glyph.pixel_height()),
        template = glyph.is_template(),
        path = %cli.out.display(),
        "wrote glyph"
    );
    Ok(())
}
