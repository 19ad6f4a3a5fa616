//! Persistence for user-assigned names and render preferences.
//!
//! Both stores are consumed through traits so the registry and the renderer
//! never see the on-disk representation.

mod file;
mod memory;

use std::path::PathBuf;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::common::config::{DisplayMode, DisplayStyle, RenderConfig, SizeTier};
use crate::model::NameTable;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Decode { path: PathBuf, source: toml::de::Error },
    #[error("failed to encode {path}: {source}")]
    Encode { path: PathBuf, source: toml::ser::Error },
    #[error("store rejected the write")]
    Rejected,
}

pub trait NameStore {
    fn load_names(&self) -> Result<NameTable, StoreError>;

    fn save_names(&mut self, names: &NameTable) -> Result<(), StoreError>;
}

/// Each setting is persisted independently: a setter only rewrites its own
/// field.
pub trait RenderConfigStore {
    fn render_config(&self) -> Result<RenderConfig, StoreError>;

    fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(), StoreError>;

    fn set_display_style(&mut self, style: DisplayStyle) -> Result<(), StoreError>;

    fn set_font_size(&mut self, size: f32) -> Result<(), StoreError>;

    fn set_size_override(&mut self, tier: Option<SizeTier>) -> Result<(), StoreError>;

    fn display_mode(&self) -> Result<DisplayMode, StoreError> {
        Ok(self.render_config()?.display_mode)
    }

    fn display_style(&self) -> Result<DisplayStyle, StoreError> {
        Ok(self.render_config()?.display_style)
    }

    fn font_size(&self) -> Result<f32, StoreError> { Ok(self.render_config()?.font_size) }

    fn size_override(&self) -> Result<Option<SizeTier>, StoreError> {
        Ok(self.render_config()?.size_override)
    }
}
