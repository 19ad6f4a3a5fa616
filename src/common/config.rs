//! Render configuration and the enums that drive glyph selection.
//!
//! The configuration is read on every render call; nothing here caches
//! derived state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

pub const CONFIG_DIR_ENV: &str = "SPACE_SORCERER_CONFIG_DIR";

pub const DEFAULT_FONT_SIZE: f32 = 13.0;
pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MAX_FONT_SIZE: f32 = 24.0;

/// Whether the glyph style follows the display size or the user's choice.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,
    Display, EnumString, IntoStaticStr, EnumIter
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DisplayMode {
    Auto,
    #[default]
    Manual,
}

#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,
    Display, EnumString, IntoStaticStr, EnumIter
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DisplayStyle {
    #[default]
    Dots,
    Abbreviated,
    Named,
}

impl DisplayStyle {
    pub fn label(self) -> &'static str {
        match self {
            DisplayStyle::Dots => "Dots",
            DisplayStyle::Abbreviated => "Abbreviated",
            DisplayStyle::Named => "Named",
        }
    }
}

/// Physical size class of the display hosting the menu bar.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    IntoStaticStr, EnumIter
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SizeTier {
    /// Under 16 inches, usually a built-in laptop panel.
    Compact,
    /// 16 to 25 inches inclusive.
    Medium,
    /// Over 25 inches.
    Large,
}

impl SizeTier {
    pub fn label(self) -> &'static str {
        match self {
            SizeTier::Compact => "Compact (<16\")",
            SizeTier::Medium => "Medium (16–25\")",
            SizeTier::Large => "Large (>25\")",
        }
    }

    /// The style auto mode picks for this tier.
    pub fn auto_style(self) -> DisplayStyle {
        match self {
            SizeTier::Compact => DisplayStyle::Dots,
            SizeTier::Medium => DisplayStyle::Abbreviated,
            SizeTier::Large => DisplayStyle::Named,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub display_mode: DisplayMode,
    pub display_style: DisplayStyle,
    pub font_size: f32,
    pub size_override: Option<SizeTier>,
    /// Explicit font file; discovery is used when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            display_mode: DisplayMode::default(),
            display_style: DisplayStyle::default(),
            font_size: DEFAULT_FONT_SIZE,
            size_override: None,
            font_path: None,
        }
    }
}

/// Normalizes a stored font size. Zero (and anything non-finite) means the
/// value was never set.
pub fn clamp_font_size(size: f32) -> f32 {
    if size == 0.0 || !size.is_finite() {
        return DEFAULT_FONT_SIZE;
    }
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Directory holding `names.toml` and `settings.toml`.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|dir| dir.join("space-sorcerer"))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn font_size_zero_means_default() {
        assert_eq!(clamp_font_size(0.0), DEFAULT_FONT_SIZE);
        assert_eq!(clamp_font_size(f32::NAN), DEFAULT_FONT_SIZE);
    }

    #[test]
    fn font_size_clamps_to_range() {
        assert_eq!(clamp_font_size(2.0), MIN_FONT_SIZE);
        assert_eq!(clamp_font_size(40.0), MAX_FONT_SIZE);
        assert_eq!(clamp_font_size(15.5), 15.5);
    }

    #[test]
    fn tiers_map_to_auto_styles() {
        assert_eq!(SizeTier::Compact.auto_style(), DisplayStyle::Dots);
        assert_eq!(SizeTier::Medium.auto_style(), DisplayStyle::Abbreviated);
        assert_eq!(SizeTier::Large.auto_style(), DisplayStyle::Named);
    }

    #[test]
    fn string_forms_parse_back() {
        for style in DisplayStyle::iter() {
            assert_eq!(DisplayStyle::from_str(&style.to_string()).unwrap(), style);
        }
        for tier in SizeTier::iter() {
            let name: &'static str = tier.into();
            assert_eq!(SizeTier::from_str(name).unwrap(), tier);
        }
        assert_eq!(DisplayMode::from_str("auto").unwrap(), DisplayMode::Auto);
        assert!(DisplayStyle::from_str("sparkles").is_err());
    }

    #[test]
    fn defaults_match_a_fresh_install() {
        let config = RenderConfig::default();
        assert_eq!(config.display_mode, DisplayMode::Manual);
        assert_eq!(config.display_style, DisplayStyle::Dots);
        assert_eq!(config.font_size, 13.0);
        assert_eq!(config.size_override, None);
    }
}
