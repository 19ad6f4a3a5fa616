#![allow(non_camel_case_types)]

// Private SkyLight entry points. The framework is linked from build.rs.
// https://github.com/NUIKit/CGSInternal/blob/master/CGSSpace.h

use objc2_foundation::NSArray;

pub type cid_t = i32;

unsafe extern "C" {
    pub fn SLSMainConnectionID() -> cid_t;

    /// Returns 0 when the active space cannot be resolved.
    pub fn CGSGetActiveSpace(cid: cid_t) -> u64;

    /// Returns a +1 retained array of per-display dictionaries, or null.
    pub fn CGSCopyManagedDisplaySpaces(cid: cid_t) -> *mut NSArray;
}
