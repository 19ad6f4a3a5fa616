use tracing::warn;

use super::space::SpaceId;
use crate::common::collections::{BTreeMap, HashMap};

/// User-assigned space names keyed by [`SpaceId`].
///
/// Empty names are never stored: assigning one removes the override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    names: HashMap<SpaceId, String>,
}

impl NameTable {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, id: SpaceId) -> Option<&str> { self.names.get(&id).map(String::as_str) }

    /// Sets or clears the override for `id`. Returns the previous name.
    pub fn assign(&mut self, id: SpaceId, name: &str) -> Option<String> {
        if name.is_empty() {
            self.names.remove(&id)
        } else {
            self.names.insert(id, name.to_owned())
        }
    }

    pub fn len(&self) -> usize { self.names.len() }

    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (SpaceId, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Builds a table from its persisted, string-keyed form. Keys that are
    /// not integers and empty names are dropped.
    pub fn from_persisted(raw: BTreeMap<String, String>) -> Self {
        let mut table = NameTable::new();
        for (key, name) in raw {
            match key.trim().parse::<u64>() {
                Ok(id) => {
                    table.assign(SpaceId::new(id), &name);
                }
                Err(_) => warn!(?key, "ignoring space name with non-numeric key"),
            }
        }
        table
    }

    pub fn to_persisted(&self) -> BTreeMap<String, String> {
        self.names.iter().map(|(id, name)| (id.get().to_string(), name.clone())).collect()
    }
}

impl FromIterator<(SpaceId, String)> for NameTable {
    fn from_iter<I: IntoIterator<Item = (SpaceId, String)>>(iter: I) -> Self {
        let mut table = NameTable::new();
        for (id, name) in iter {
            table.assign(id, &name);
        }
        table
    }
}
