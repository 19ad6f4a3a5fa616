//! Wiring between the registry, the renderer and the status item.
//!
//! The platform shell owns exactly one [`Sorcerer`] on its UI thread, calls
//! [`Sorcerer::launch`] once the status item exists and
//! [`Sorcerer::run_deferred`] on the following run loop pass. Everything runs
//! synchronously on that thread.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info, instrument, warn};

use crate::common::config::RenderConfig;
use crate::menu::{self, MenuEntry};
use crate::model::{Space, SpaceId};
use crate::registry::SpaceRegistry;
use crate::render::{Glyph, GlyphRenderer};
use crate::store::{NameStore, RenderConfigStore, StoreError};
use crate::sys::display::DisplayMetrics;
use crate::sys::notification::{SpaceChangeSource, Subscription};
use crate::sys::window_server::WindowServer;

/// The persistent status item the glyph and menu are pushed to.
pub trait StatusSurface {
    fn set_glyph(&mut self, glyph: Glyph);

    fn set_menu(&mut self, menu: Vec<MenuEntry>);
}

thread_local! {
    static INSTANCE_ALIVE: Cell<bool> = const { Cell::new(false) };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Launch {
    NotLaunched,
    RefreshPending,
    Running,
}

struct Presenter<D: DisplayMetrics, C: RenderConfigStore, S: StatusSurface> {
    renderer: GlyphRenderer<D>,
    settings: C,
    surface: S,
}

impl<D: DisplayMetrics, C: RenderConfigStore, S: StatusSurface> Presenter<D, C, S> {
    fn present(&mut self, spaces: &[Space]) {
        let config = self.settings.render_config().unwrap_or_else(|err| {
            warn!(%err, "could not read render settings; using defaults");
            RenderConfig::default()
        });
        let glyph = self.renderer.render(spaces, &config);
        debug!(?glyph, "updating status item");
        self.surface.set_glyph(glyph);
        self.surface.set_menu(menu::entries(spaces));
    }
}

pub struct Sorcerer<W, N, D, C, S>
where
    W: WindowServer + 'static,
    N: NameStore + 'static,
    D: DisplayMetrics + 'static,
    C: RenderConfigStore + 'static,
    S: StatusSurface + 'static,
{
    registry: Rc<RefCell<SpaceRegistry<W, N>>>,
    presenter: Rc<RefCell<Presenter<D, C, S>>>,
    subscription: Option<Subscription>,
    launch: Launch,
}

impl<W, N, D, C, S> Sorcerer<W, N, D, C, S>
where
    W: WindowServer + 'static,
    N: NameStore + 'static,
    D: DisplayMetrics + 'static,
    C: RenderConfigStore + 'static,
    S: StatusSurface + 'static,
{
    /// Creates the application, or returns `None` while another instance is
    /// alive on this thread.
    pub fn new(
        mut registry: SpaceRegistry<W, N>,
        renderer: GlyphRenderer<D>,
        settings: C,
        surface: S,
    ) -> Option<Self> {
        if INSTANCE_ALIVE.with(|alive| alive.replace(true)) {
            warn!("a Sorcerer is already running on this thread");
            return None;
        }

        let presenter = Rc::new(RefCell::new(Presenter { renderer, settings, surface }));
        let target = Rc::clone(&presenter);
        registry.set_observer(move |spaces| target.borrow_mut().present(spaces));

        Some(Sorcerer {
            registry: Rc::new(RefCell::new(registry)),
            presenter,
            subscription: None,
            launch: Launch::NotLaunched,
        })
    }

    /// Starts listening for space changes and schedules the post-launch
    /// refresh. Later calls do nothing.
    #[instrument(name = "app::launch", skip_all)]
    pub fn launch(&mut self, source: &dyn SpaceChangeSource) {
        if self.launch != Launch::NotLaunched {
            debug!("already launched");
            return;
        }
        self.subscription = Some(SpaceRegistry::watch(&self.registry, source));
        self.launch = Launch::RefreshPending;
        info!("launched; initial refresh deferred");
    }

    /// Runs the deferred refresh scheduled by [`launch`](Self::launch).
    /// Returns whether a refresh happened; only the first call after launch
    /// does anything.
    pub fn run_deferred(&mut self) -> bool {
        if self.launch != Launch::RefreshPending {
            return false;
        }
        self.launch = Launch::Running;
        self.refresh();
        true
    }

    /// Re-renders after a preference change.
    pub fn settings_changed(&self) -> Vec<Space> { self.refresh() }

    /// Applies `change` to the render settings and refreshes if it succeeds.
    pub fn update_settings<R>(
        &self,
        change: impl FnOnce(&mut C) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let result = change(&mut self.presenter.borrow_mut().settings);
        match &result {
            Ok(_) => {
                self.settings_changed();
            }
            Err(err) => warn!(%err, "settings change rejected"),
        }
        result
    }

    pub fn rename(&self, space_id: SpaceId, name: &str) -> Result<(), StoreError> {
        self.registry.borrow_mut().rename(space_id, name)
    }

    /// The current snapshot, without notifying the status item.
    pub fn spaces(&self) -> Vec<Space> { self.registry.borrow().query_spaces() }

    pub fn refresh(&self) -> Vec<Space> { self.registry.borrow_mut().refresh() }

    pub fn is_watching(&self) -> bool { self.subscription.is_some() }
}

impl<W, N, D, C, S> Drop for Sorcerer<W, N, D, C, S>
where
    W: WindowServer + 'static,
    N: NameStore + 'static,
    D: DisplayMetrics + 'static,
    C: RenderConfigStore + 'static,
    S: StatusSurface + 'static,
{
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        self.registry.borrow_mut().clear_observer();
        INSTANCE_ALIVE.with(|alive| alive.set(false));
        debug!("sorcerer shut down");
    }
}
