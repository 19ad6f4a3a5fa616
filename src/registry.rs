//! Discovery of the current spaces and the user's names for them.
//!
//! Every query rebuilds the whole snapshot from the window server. The global
//! index runs across displays in the order the window server reports them,
//! then across each display's spaces in reported order.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, info_span, instrument, trace, warn};

use crate::common::collections::HashSet;
use crate::model::{NameTable, Space, SpaceId};
use crate::store::{NameStore, StoreError};
use crate::sys::notification::{SpaceChangeSource, Subscription};
use crate::sys::window_server::WindowServer;

/// Display identifier used when an entry does not report one.
pub const UNKNOWN_DISPLAY: &str = "Unknown";

type Observer = Box<dyn FnMut(&[Space])>;

pub struct SpaceRegistry<W: WindowServer, N: NameStore> {
    server: W,
    store: N,
    names: NameTable,
    observer: Option<Observer>,
}

impl<W: WindowServer, N: NameStore> SpaceRegistry<W, N> {
    /// Creates a registry, loading persisted names. A store that cannot be
    /// read starts with no overrides.
    pub fn new(server: W, store: N) -> Self {
        let names = store.load_names().unwrap_or_else(|err| {
            warn!(%err, "could not load space names; starting without overrides");
            NameTable::new()
        });
        SpaceRegistry { server, store, names, observer: None }
    }

    pub fn names(&self) -> &NameTable { &self.names }

    /// Installs the observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: impl FnMut(&[Space]) + 'static) {
        if self.observer.is_some() {
            debug!("replacing space observer");
        }
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) { self.observer = None; }

    /// Reads the current display → space layout. Never fails: an unavailable
    /// window server yields an empty list and malformed space entries are skipped.
    #[instrument(name = "registry::query_spaces", skip(self))]
    pub fn query_spaces(&self) -> Vec<Space> {
        let Some(conn) = self.server.connect() else {
            warn!("no window server connection");
            return vec![];
        };
        let Some(displays) = self.server.managed_display_spaces(conn) else {
            warn!("managed display spaces unavailable");
            return vec![];
        };
        let active_space = self.server.active_space(conn);

        let mut spaces: Vec<Space> = Vec::new();
        let mut seen = HashSet::default();
        let mut active_listed = false;
        let mut marked: Option<SpaceId> = None;

        for display in displays {
            let display_id = display.identifier.unwrap_or_else(|| UNKNOWN_DISPLAY.to_owned());
            let Some(entries) = display.spaces else {
                debug!(%display_id, "display has no space list");
                continue;
            };

            for entry in entries {
                let Some(space_id) = entry.id else {
                    debug!(%display_id, ?entry, "skipping space without an id");
                    continue;
                };
                if !seen.insert(space_id) {
                    debug!(%display_id, %space_id, "skipping duplicate space");
                    continue;
                }
                active_listed |= Some(space_id) == active_space;
                if marked.is_none() && Some(space_id) == display.current_space {
                    marked = Some(space_id);
                }

                let global_index = spaces.len() + 1;
                let name = self
                    .names
                    .get(space_id)
                    .map(str::to_owned)
                    .unwrap_or_else(|| global_index.to_string());

                spaces.push(Space {
                    display_id: display_id.clone(),
                    space_id,
                    name,
                    global_index,
                    is_current: false,
                    is_full_screen: entry.is_full_screen(),
                });
            }
        }

        // Either signal marks the current space. The global active space wins
        // when both resolve, so at most one space is ever flagged.
        let current = if active_listed { active_space } else { marked };
        if let Some(space) = spaces.iter_mut().find(|s| Some(s.space_id) == current) {
            space.is_current = true;
        }

        trace!(count = spaces.len(), ?active_space, "queried spaces");
        spaces
    }

    /// Queries and hands the result to the observer.
    pub fn refresh(&mut self) -> Vec<Space> {
        let spaces = self.query_spaces();
        if let Some(observer) = &mut self.observer {
            observer(&spaces);
        }
        spaces
    }

    /// Sets the name of `space_id`, or clears it when `name` is empty.
    ///
    /// The change is persisted before it becomes visible. If the store rejects
    /// the write the table is left as it was and no refresh happens.
    #[instrument(name = "registry::rename", skip(self))]
    pub fn rename(&mut self, space_id: SpaceId, name: &str) -> Result<(), StoreError> {
        let mut updated = self.names.clone();
        updated.assign(space_id, name);

        if let Err(err) = self.store.save_names(&updated) {
            warn!(%err, "failed to persist space name; keeping previous names");
            return Err(err);
        }
        self.names = updated;
        self.refresh();
        Ok(())
    }
}

impl<W: WindowServer + 'static, N: NameStore + 'static> SpaceRegistry<W, N> {
    /// Refreshes `registry` every time `source` fires, for as long as the
    /// returned subscription is alive. The handler holds only a weak
    /// reference, so the subscription never keeps the registry alive.
    pub fn watch(this: &Rc<RefCell<Self>>, source: &dyn SpaceChangeSource) -> Subscription {
        let weak: Weak<RefCell<Self>> = Rc::downgrade(this);
        source.subscribe(Box::new(move || {
            let _s = info_span!("registry::active_space_changed").entered();
            let Some(registry) = weak.upgrade() else { return };
            match registry.try_borrow_mut() {
                Ok(mut registry) => {
                    registry.refresh();
                }
                Err(_) => warn!("space change delivered during a refresh; ignoring"),
            }
        }))
    }
}
