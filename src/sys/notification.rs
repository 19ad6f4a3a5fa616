//! The "active space changed" event and its subscription lifetime.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::common::collections::BTreeMap;

/// Releases an event subscription when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Subscription { release: Some(Box::new(release)) }
    }

    /// Unsubscribes now. Equivalent to dropping.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.release.is_some()).finish()
    }
}

/// Something that announces when the focused space changes.
pub trait SpaceChangeSource {
    fn subscribe(&self, handler: Box<dyn Fn()>) -> Subscription;
}

/// A source fired by hand. Shells without a native notification (and tests)
/// drive refreshes through it.
#[derive(Clone, Default)]
pub struct ManualSource {
    handlers: Rc<RefCell<BTreeMap<u64, Rc<dyn Fn()>>>>,
    next_id: Rc<Cell<u64>>,
}

impl ManualSource {
    pub fn new() -> Self { Self::default() }

    pub fn fire(&self) {
        // Handlers may subscribe or unsubscribe while running.
        let handlers: Vec<_> = self.handlers.borrow().values().cloned().collect();
        for handler in handlers {
            handler();
        }
    }

    pub fn subscriber_count(&self) -> usize { self.handlers.borrow().len() }
}

impl SpaceChangeSource for ManualSource {
    fn subscribe(&self, handler: Box<dyn Fn()>) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.handlers.borrow_mut().insert(id, Rc::from(handler));

        let handlers = Rc::downgrade(&self.handlers);
        Subscription::new(move || {
            if let Some(handlers) = handlers.upgrade() {
                handlers.borrow_mut().remove(&id);
            }
        })
    }
}

#[cfg(target_os = "macos")]
pub use workspace::WorkspaceNotifications;

#[cfg(target_os = "macos")]
mod workspace {
    use objc2::rc::Retained;
    use objc2::{AnyThread, DefinedClass, define_class, msg_send, sel};
    use objc2_app_kit::{NSWorkspace, NSWorkspaceActiveSpaceDidChangeNotification};
    use objc2_foundation::{NSNotification, NSObject};
    use tracing::{info_span, trace};

    use super::{SpaceChangeSource, Subscription};

    struct Handler(Box<dyn Fn()>);

    define_class! {
        // SAFETY:
        // - The superclass NSObject does not have any subclassing requirements.
        // - `SpaceChangeTarget` does not implement `Drop`.
        #[unsafe(super(NSObject))]
        #[ivars = Handler]
        struct SpaceChangeTarget;

        // SAFETY: The method signature matches the selector registered below.
        impl SpaceChangeTarget {
            #[unsafe(method(activeSpaceDidChange:))]
            fn active_space_did_change(&self, notif: &NSNotification) {
                trace!("{notif:#?}");
                let _s = info_span!("notification::active_space_did_change").entered();
                (self.ivars().0)();
            }
        }
    }

    impl SpaceChangeTarget {
        fn new(handler: Box<dyn Fn()>) -> Retained<Self> {
            let this = Self::alloc().set_ivars(Handler(handler));
            unsafe { msg_send![super(this), init] }
        }
    }

    /// `NSWorkspaceActiveSpaceDidChangeNotification`, delivered on the main run loop.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct WorkspaceNotifications;

    impl SpaceChangeSource for WorkspaceNotifications {
        fn subscribe(&self, handler: Box<dyn Fn()>) -> Subscription {
            let target = SpaceChangeTarget::new(handler);
            let center = NSWorkspace::sharedWorkspace().notificationCenter();

            // SAFETY: Selector has signature fn(&self, &NSNotification).
            unsafe {
                center.addObserver_selector_name_object(
                    &target,
                    sel!(activeSpaceDidChange:),
                    Some(NSWorkspaceActiveSpaceDidChangeNotification),
                    None,
                );
            }

            Subscription::new(move || unsafe { center.removeObserver(&target) })
        }
    }
}
