//! Read-only access to the window server's display → space mapping.

use crate::model::SpaceId;

/// Kind tag the window server reports for a fullscreen-app space.
pub const FULLSCREEN_SPACE_KIND: i64 = 4;

/// One display entry of the managed display spaces structure. Every field is
/// optional because the window server gives no schema guarantees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagedDisplay {
    pub identifier: Option<String>,
    /// The space currently shown on this display, if reported.
    pub current_space: Option<SpaceId>,
    /// `None` when the entry has no usable space list.
    pub spaces: Option<Vec<ManagedSpace>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManagedSpace {
    pub id: Option<SpaceId>,
    pub kind: Option<i64>,
}

impl ManagedSpace {
    pub fn is_full_screen(&self) -> bool { self.kind == Some(FULLSCREEN_SPACE_KIND) }
}

pub trait WindowServer {
    type Connection: Copy;

    /// `None` if no connection to the window server could be obtained.
    fn connect(&self) -> Option<Self::Connection>;

    /// `None` if the structure is unavailable or malformed as a whole.
    fn managed_display_spaces(&self, conn: Self::Connection) -> Option<Vec<ManagedDisplay>>;

    fn active_space(&self, conn: Self::Connection) -> Option<SpaceId>;
}

#[cfg(target_os = "macos")]
pub use actual::Actual;

#[cfg(target_os = "macos")]
mod actual {
    use objc2::rc::Retained;
    use objc2::runtime::AnyObject;
    use objc2_foundation::{NSArray, NSDictionary, NSNumber, NSString, ns_string};
    use tracing::{debug, trace};

    use super::{ManagedDisplay, ManagedSpace, WindowServer};
    use crate::model::SpaceId;
    use crate::sys::skylight::{
        CGSCopyManagedDisplaySpaces, CGSGetActiveSpace, SLSMainConnectionID, cid_t,
    };

    /// The SkyLight-backed window server of the current login session.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct Actual;

    impl WindowServer for Actual {
        type Connection = cid_t;

        fn connect(&self) -> Option<cid_t> {
            let cid = unsafe { SLSMainConnectionID() };
            if cid == 0 {
                debug!("SLSMainConnectionID returned no connection");
                return None;
            }
            Some(cid)
        }

        fn managed_display_spaces(&self, cid: cid_t) -> Option<Vec<ManagedDisplay>> {
            // SAFETY: the copy function returns a +1 reference (or null) that we take ownership of.
            let displays: Retained<NSArray> =
                unsafe { Retained::from_raw(CGSCopyManagedDisplaySpaces(cid)) }?;
            trace!("managed display spaces: {displays:?}");

            // An entry of the wrong type becomes an empty display so it is
            // skipped without dropping the others.
            let parsed = displays
                .iter()
                .map(|entry| match entry.downcast::<NSDictionary>() {
                    Ok(dict) => parse_display(&dict),
                    Err(_) => ManagedDisplay::default(),
                })
                .collect();
            Some(parsed)
        }

        fn active_space(&self, cid: cid_t) -> Option<SpaceId> {
            match unsafe { CGSGetActiveSpace(cid) } {
                0 => None,
                id => Some(SpaceId::new(id)),
            }
        }
    }

    fn parse_display(dict: &NSDictionary) -> ManagedDisplay {
        let identifier = object(dict, ns_string!("Display Identifier"))
            .and_then(|o| o.downcast::<NSString>().ok())
            .map(|s| s.to_string());
        let current_space = object(dict, ns_string!("Current Space"))
            .and_then(|o| o.downcast::<NSDictionary>().ok())
            .and_then(|current| space_id(&current));
        let spaces = object(dict, ns_string!("Spaces"))
            .and_then(|o| o.downcast::<NSArray>().ok())
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| match entry.downcast::<NSDictionary>() {
                        Ok(dict) => parse_space(&dict),
                        Err(_) => ManagedSpace::default(),
                    })
                    .collect()
            });
        ManagedDisplay { identifier, current_space, spaces }
    }

    fn parse_space(dict: &NSDictionary) -> ManagedSpace {
        ManagedSpace {
            id: space_id(dict),
            kind: number(dict, ns_string!("type")),
        }
    }

    fn space_id(dict: &NSDictionary) -> Option<SpaceId> {
        number(dict, ns_string!("ManagedSpaceID"))
            .and_then(|id| u64::try_from(id).ok())
            .map(SpaceId::new)
    }

    fn object(dict: &NSDictionary, key: &NSString) -> Option<Retained<AnyObject>> {
        dict.objectForKey(key)
    }

    fn number(dict: &NSDictionary, key: &NSString) -> Option<i64> {
        object(dict, key)?.downcast::<NSNumber>().ok().map(|n| n.as_i64())
    }
}
