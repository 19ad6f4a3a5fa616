//! Size classification of the display hosting the menu bar.

use tracing::{debug, trace};

use crate::common::config::SizeTier;
use crate::sys::display::{DisplayInfo, DisplayMetrics};

/// Diagonals below this many inches are compact.
const COMPACT_BELOW_INCHES: f64 = 16.0;
/// Diagonals up to and including this many inches are medium.
const MEDIUM_UP_TO_INCHES: f64 = 25.0;
/// Logical width above which a display of unknown size counts as large.
const LARGE_ABOVE_PIXELS: usize = 2560;

pub struct DisplayClassifier<D: DisplayMetrics> {
    metrics: D,
    override_tier: Option<SizeTier>,
}

impl<D: DisplayMetrics> DisplayClassifier<D> {
    pub fn new(metrics: D) -> Self { DisplayClassifier { metrics, override_tier: None } }

    pub fn set_override(&mut self, tier: Option<SizeTier>) { self.override_tier = tier; }

    pub fn override_tier(&self) -> Option<SizeTier> { self.override_tier }

    /// Classifies the main display. Queries the metrics on every call since
    /// displays can be attached or removed at any time.
    pub fn classify(&self) -> SizeTier { self.classify_with(self.override_tier) }

    /// Like [`classify`](Self::classify) but with an explicit override, e.g.
    /// the one stored in the render configuration.
    pub fn classify_with(&self, override_tier: Option<SizeTier>) -> SizeTier {
        if let Some(tier) = override_tier {
            trace!(?tier, "using size tier override");
            return tier;
        }
        match self.metrics.main_display() {
            Some(info) => tier_for(&info),
            None => {
                debug!("no main display; assuming a compact panel");
                SizeTier::Compact
            }
        }
    }
}

fn tier_for(info: &DisplayInfo) -> SizeTier {
    if let Some(diagonal) = info.diagonal_inches() {
        let tier = tier_for_diagonal(diagonal);
        trace!(diagonal, ?tier, "classified by physical size");
        return tier;
    }

    debug!(?info, "physical size unavailable; falling back to panel heuristics");
    if info.is_builtin {
        SizeTier::Compact
    } else if info.pixel_width > LARGE_ABOVE_PIXELS {
        SizeTier::Large
    } else {
        SizeTier::Medium
    }
}

fn tier_for_diagonal(inches: f64) -> SizeTier {
    if inches < COMPACT_BELOW_INCHES {
        SizeTier::Compact
    } else if inches <= MEDIUM_UP_TO_INCHES {
        SizeTier::Medium
    } else {
        SizeTier::Large
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::sys::display::Fixed;

    fn sized(width_mm: f64, height_mm: f64) -> Fixed {
        Fixed(Some(DisplayInfo {
            physical_size_mm: (width_mm, height_mm),
            pixel_width: 1920,
            is_builtin: false,
        }))
    }

    fn no_size(pixel_width: usize, is_builtin: bool) -> Fixed {
        Fixed(Some(DisplayInfo { physical_size_mm: (0.0, 0.0), pixel_width, is_builtin }))
    }

    #[test]
    fn thresholds_on_diagonal() {
        assert_eq!(tier_for_diagonal(13.3), SizeTier::Compact);
        assert_eq!(tier_for_diagonal(15.99), SizeTier::Compact);
        assert_eq!(tier_for_diagonal(16.0), SizeTier::Medium);
        assert_eq!(tier_for_diagonal(25.0), SizeTier::Medium);
        assert_eq!(tier_for_diagonal(25.01), SizeTier::Large);
        assert_eq!(tier_for_diagonal(34.0), SizeTier::Large);
    }

    #[test]
    fn classifies_physical_sizes() {
        // 14" MacBook Pro panel.
        assert_eq!(DisplayClassifier::new(sized(302.0, 196.0)).classify(), SizeTier::Compact);
        // 24" 16:9 monitor.
        assert_eq!(DisplayClassifier::new(sized(531.0, 299.0)).classify(), SizeTier::Medium);
        // 32" 16:9 monitor.
        assert_eq!(DisplayClassifier::new(sized(708.0, 398.0)).classify(), SizeTier::Large);
    }

    #[test]
    fn falls_back_to_heuristics_without_physical_size() {
        assert_eq!(DisplayClassifier::new(no_size(3456, true)).classify(), SizeTier::Compact);
        assert_eq!(DisplayClassifier::new(no_size(3840, false)).classify(), SizeTier::Large);
        assert_eq!(DisplayClassifier::new(no_size(2560, false)).classify(), SizeTier::Medium);
        assert_eq!(DisplayClassifier::new(no_size(1920, false)).classify(), SizeTier::Medium);
    }

    #[test]
    fn no_display_is_compact() {
        assert_eq!(DisplayClassifier::new(Fixed(None)).classify(), SizeTier::Compact);
    }

    #[test]
    fn override_ignores_metrics() {
        let mut classifier = DisplayClassifier::new(sized(302.0, 196.0));
        classifier.set_override(Some(SizeTier::Large));
        assert_eq!(classifier.classify(), SizeTier::Large);

        let classifier = DisplayClassifier::new(no_size(1280, true));
        assert_eq!(classifier.classify_with(Some(SizeTier::Large)), SizeTier::Large);
        assert_eq!(classifier.classify_with(None), SizeTier::Compact);
    }

    struct Hotplug(Cell<Option<DisplayInfo>>);

    impl DisplayMetrics for Hotplug {
        fn main_display(&self) -> Option<DisplayInfo> { self.0.get() }
    }

    #[test]
    fn reflects_display_changes_without_caching() {
        let classifier = DisplayClassifier::new(Hotplug(Cell::new(sized(302.0, 196.0).0)));
        assert_eq!(classifier.classify(), SizeTier::Compact);

        classifier.metrics.0.set(sized(708.0, 398.0).0);
        assert_eq!(classifier.classify(), SizeTier::Large);
    }
}
