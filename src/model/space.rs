use serde::{Deserialize, Serialize};

/// The window server's identifier for a space. Stable for the lifetime of the
/// space within a login session, not across reboots.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SpaceId(u64);

impl SpaceId {
    pub fn new(id: u64) -> SpaceId { SpaceId(id) }

    pub fn get(&self) -> u64 { self.0 }
}

impl From<SpaceId> for u64 {
    fn from(id: SpaceId) -> u64 { id.get() }
}

impl std::fmt::Display for SpaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
}

/// One space as seen by a single query. Snapshots are rebuilt wholesale on
/// every query and never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub display_id: String,
    pub space_id: SpaceId,
    /// User override from the name table, else the global index.
    pub name: String,
    /// 1-based position across all displays.
    pub global_index: usize,
    pub is_current: bool,
    pub is_full_screen: bool,
}

impl Space {
    /// First character of the resolved name, used by the abbreviated glyph.
    pub fn initial(&self) -> String { self.name.chars().take(1).collect() }
}
