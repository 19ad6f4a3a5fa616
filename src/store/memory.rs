use std::cell::RefCell;
use std::rc::Rc;

use super::{NameStore, RenderConfigStore, StoreError};
use crate::common::config::{DisplayMode, DisplayStyle, RenderConfig, SizeTier, clamp_font_size};
use crate::model::NameTable;

#[derive(Debug, Default)]
struct State {
    names: NameTable,
    config: RenderConfig,
    reject_writes: bool,
}

/// In-process store. Clones share state, so a clone handed to a fresh
/// registry behaves like the same store after a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore(Rc<RefCell<State>>);

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_config(config: RenderConfig) -> Self {
        let store = Self::default();
        store.0.borrow_mut().config = config;
        store
    }

    /// Makes every subsequent write fail with [`StoreError::Rejected`].
    pub fn reject_writes(&self, reject: bool) { self.0.borrow_mut().reject_writes = reject; }

    fn write(&self, f: impl FnOnce(&mut State)) -> Result<(), StoreError> {
        let mut state = self.0.borrow_mut();
        if state.reject_writes {
            return Err(StoreError::Rejected);
        }
        f(&mut state);
        Ok(())
    }
}

impl NameStore for MemoryStore {
    fn load_names(&self) -> Result<NameTable, StoreError> { Ok(self.0.borrow().names.clone()) }

    fn save_names(&mut self, names: &NameTable) -> Result<(), StoreError> {
        self.write(|state| state.names = names.clone())
    }
}

impl RenderConfigStore for MemoryStore {
    fn render_config(&self) -> Result<RenderConfig, StoreError> {
        Ok(self.0.borrow().config.clone())
    }

    fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(), StoreError> {
        self.write(|state| state.config.display_mode = mode)
    }

    fn set_display_style(&mut self, style: DisplayStyle) -> Result<(), StoreError> {
        self.write(|state| state.config.display_style = style)
    }

    fn set_font_size(&mut self, size: f32) -> Result<(), StoreError> {
        self.write(|state| state.config.font_size = clamp_font_size(size))
    }

    fn set_size_override(&mut self, tier: Option<SizeTier>) -> Result<(), StoreError> {
        self.write(|state| state.config.size_override = tier)
    }
}
