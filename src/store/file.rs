use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{NameStore, RenderConfigStore, StoreError};
use crate::common::collections::BTreeMap;
use crate::common::config::{
    self, DisplayMode, DisplayStyle, RenderConfig, SizeTier, clamp_font_size,
};
use crate::model::NameTable;

const NAMES_FILE: &str = "names.toml";
const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Default, Serialize, serde::Deserialize)]
struct NamesFile {
    #[serde(default)]
    names: BTreeMap<String, String>,
}

#[derive(Debug, Default, Serialize, serde::Deserialize)]
#[serde(default)]
struct SettingsFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    display_mode: Option<DisplayMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_style: Option<DisplayStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size_override: Option<SizeTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_path: Option<PathBuf>,
}

impl SettingsFile {
    /// Keeps every field of `table` that decodes on its own, so one bad value
    /// does not discard the rest of the user's settings.
    fn salvage(table: &toml::Table) -> Self {
        fn field<T: DeserializeOwned>(table: &toml::Table, key: &str) -> Option<T> {
            let value = table.get(key)?.clone();
            match value.try_into() {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    warn!(key, %err, "ignoring invalid setting");
                    None
                }
            }
        }
        SettingsFile {
            display_mode: field(table, "display_mode"),
            display_style: field(table, "display_style"),
            font_size: field(table, "font_size"),
            size_override: field(table, "size_override"),
            font_path: field(table, "font_path"),
        }
    }

    fn to_config(&self) -> RenderConfig {
        RenderConfig {
            display_mode: self.display_mode.unwrap_or_default(),
            display_style: self.display_style.unwrap_or_default(),
            font_size: clamp_font_size(self.font_size.unwrap_or(0.0)),
            size_override: self.size_override,
            font_path: self.font_path.clone(),
        }
    }
}

/// TOML-backed store rooted at a config directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self { FileStore { dir: dir.into() } }

    /// Opens the store in the per-user config directory.
    pub fn open_default() -> Option<Self> { config::config_dir().map(FileStore::new) }

    pub fn dir(&self) -> &Path { &self.dir }

    fn read<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T, StoreError> {
        let path = self.dir.join(file);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(?path, "no persisted file yet, using defaults");
                return Ok(T::default());
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };
        toml::from_str(&text).map_err(|source| StoreError::Decode { path, source })
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<(), StoreError> {
        let path = self.dir.join(file);
        let text = toml::to_string(value)
            .map_err(|source| StoreError::Encode { path: path.clone(), source })?;
        fs::create_dir_all(&self.dir)
            .map_err(|source| StoreError::Write { path: path.clone(), source })?;

        // Write beside the target and rename so a crash never leaves a torn file.
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, text).map_err(|source| StoreError::Write { path: tmp.clone(), source })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Write { path, source })
    }

    /// Reads `settings.toml`, dropping individual fields that fail to decode.
    /// Only a file that is not TOML at all is a decode error.
    fn read_settings(&self) -> Result<SettingsFile, StoreError> {
        match self.read::<SettingsFile>(SETTINGS_FILE) {
            Err(StoreError::Decode { path, source }) => {
                warn!(?path, %source, "settings file has invalid values");
                let table: toml::Table = self.read(SETTINGS_FILE)?;
                Ok(SettingsFile::salvage(&table))
            }
            result => result,
        }
    }

    /// Read-modify-write of one setting. An unreadable file is replaced
    /// rather than blocking the change.
    fn update_settings(&mut self, f: impl FnOnce(&mut SettingsFile)) -> Result<(), StoreError> {
        let mut settings = match self.read_settings() {
            Err(StoreError::Decode { path, source }) => {
                warn!(?path, %source, "overwriting unparsable settings file");
                SettingsFile::default()
            }
            result => result?,
        };
        f(&mut settings);
        self.write(SETTINGS_FILE, &settings)
    }
}

impl NameStore for FileStore {
    fn load_names(&self) -> Result<NameTable, StoreError> {
        let file: NamesFile = self.read(NAMES_FILE)?;
        Ok(NameTable::from_persisted(file.names))
    }

    fn save_names(&mut self, names: &NameTable) -> Result<(), StoreError> {
        self.write(NAMES_FILE, &NamesFile { names: names.to_persisted() })
    }
}

impl RenderConfigStore for FileStore {
    fn render_config(&self) -> Result<RenderConfig, StoreError> {
        Ok(self.read_settings()?.to_config())
    }

    fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(), StoreError> {
        self.update_settings(|s| s.display_mode = Some(mode))
    }

    fn set_display_style(&mut self, style: DisplayStyle) -> Result<(), StoreError> {
        self.update_settings(|s| s.display_style = Some(style))
    }

    fn set_font_size(&mut self, size: f32) -> Result<(), StoreError> {
        self.update_settings(|s| s.font_size = Some(clamp_font_size(size)))
    }

    fn set_size_override(&mut self, tier: Option<SizeTier>) -> Result<(), StoreError> {
        self.update_settings(|s| s.size_override = tier)
    }
}
