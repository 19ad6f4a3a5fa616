//! Finding installed font files by family name.
//!
//! CoreText resolves names on macOS and fontconfig everywhere else. Both
//! return their closest match for an unknown family, so a result is only
//! accepted when its family actually matches the request.

use std::path::PathBuf;

use tracing::{debug, warn};

const PREFERRED_FAMILY: &str = "Berkeley Mono";

/// Tried in order after the platform's own monospaced font.
const MONOSPACE_FAMILIES: &[&str] = &[
    "SF Mono",
    "Menlo",
    "DejaVu Sans Mono",
    "Liberation Mono",
    "Noto Sans Mono",
];

/// Font files in preference order: the preferred family, the system
/// monospaced font, then the other monospaced families that are installed.
pub fn installed_monospace() -> Vec<PathBuf> {
    let Some(finder) = FontFinder::new() else {
        warn!("font lookup unavailable; using well-known font paths only");
        return Vec::new();
    };

    let mut paths = Vec::new();
    paths.extend(finder.find_family(PREFERRED_FAMILY));
    paths.extend(finder.system_monospace());
    for family in MONOSPACE_FAMILIES {
        paths.extend(finder.find_family(family));
    }
    paths.dedup();
    debug!(?paths, "installed monospaced fonts");
    paths
}

/// Whether a resolved family name is the requested one or a variant of it,
/// ignoring case, spaces and hyphens ("BerkeleyMono" matches "Berkeley Mono").
pub(super) fn family_matches(requested: &str, found: &str) -> bool {
    let normalize = |name: &str| -> String {
        name.chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .flat_map(char::to_lowercase)
            .collect()
    };
    let (requested, found) = (normalize(requested), normalize(found));
    !requested.is_empty() && found.contains(&requested)
}

#[cfg(target_os = "macos")]
use coretext::FontFinder;
#[cfg(not(target_os = "macos"))]
use fc::FontFinder;

#[cfg(target_os = "macos")]
#[allow(unused_unsafe)]
mod coretext {
    use std::path::PathBuf;

    use objc2_core_foundation::{CFRetained, CFString, CFURL};
    use objc2_core_text::{
        CTFont, CTFontDescriptor, CTFontUIFontType, kCTFontFamilyNameAttribute, kCTFontURLAttribute,
    };
    use tracing::trace;

    use super::family_matches;

    pub struct FontFinder;

    impl FontFinder {
        pub fn new() -> Option<Self> { Some(FontFinder) }

        pub fn find_family(&self, family: &str) -> Option<PathBuf> {
            let name = CFString::from_str(family);
            let requested = unsafe { CTFontDescriptor::with_name_and_size(&name, 0.0) };
            let matched = unsafe { requested.matching_font_descriptor(None) }?;

            let found = unsafe { matched.attribute(kCTFontFamilyNameAttribute) }?
                .downcast::<CFString>()
                .ok()?
                .to_string();
            if !family_matches(family, &found) {
                trace!(family, %found, "CoreText substituted another family");
                return None;
            }
            file_of(&matched)
        }

        /// The user's fixed-pitch UI font.
        pub fn system_monospace(&self) -> Option<PathBuf> {
            let font = unsafe {
                CTFont::new_ui_font_for_language(CTFontUIFontType::UserFixedPitch, 0.0, None)
            }?;
            file_of(&unsafe { font.font_descriptor() })
        }
    }

    fn file_of(descriptor: &CFRetained<CTFontDescriptor>) -> Option<PathBuf> {
        unsafe { descriptor.attribute(kCTFontURLAttribute) }?
            .downcast::<CFURL>()
            .ok()?
            .to_file_path()
    }
}

#[cfg(not(target_os = "macos"))]
mod fc {
    use std::path::PathBuf;

    use fontconfig::Fontconfig;
    use tracing::trace;

    use super::family_matches;

    pub struct FontFinder {
        fc: Fontconfig,
    }

    impl FontFinder {
        pub fn new() -> Option<Self> { Fontconfig::new().map(|fc| FontFinder { fc }) }

        pub fn find_family(&self, family: &str) -> Option<PathBuf> {
            let font = self.fc.find(family, None)?;
            if !family_matches(family, &font.name) {
                trace!(family, found = %font.name, "fontconfig substituted another family");
                return None;
            }
            Some(font.path)
        }

        /// Whatever the `monospace` alias resolves to.
        pub fn system_monospace(&self) -> Option<PathBuf> {
            self.fc.find("monospace", None).map(|font| font.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_names_match_loosely() {
        assert!(family_matches("Berkeley Mono", "Berkeley Mono"));
        assert!(family_matches("Berkeley Mono", "BerkeleyMono"));
        assert!(family_matches("Berkeley Mono", "berkeley mono variable"));
        assert!(family_matches("DejaVu Sans Mono", "DejaVu-Sans-Mono"));
    }

    #[test]
    fn substituted_families_are_rejected() {
        assert!(!family_matches("Berkeley Mono", "Helvetica"));
        assert!(!family_matches("Berkeley Mono", "DejaVu Sans"));
        assert!(!family_matches("DejaVu Sans Mono", "DejaVu Sans"));
        assert!(!family_matches("Menlo", ""));
    }
}
