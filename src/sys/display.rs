//! Metrics of the display that hosts the menu bar.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayInfo {
    /// Physical width and height in millimetres; zero when the display does
    /// not report them (projectors, some KVMs, virtual displays).
    pub physical_size_mm: (f64, f64),
    pub pixel_width: usize,
    pub is_builtin: bool,
}

impl DisplayInfo {
    /// Diagonal in inches, or `None` if the physical size is unknown.
    pub fn diagonal_inches(&self) -> Option<f64> {
        let (w, h) = self.physical_size_mm;
        if w > 0.0 && h > 0.0 {
            Some(w.hypot(h) / 25.4)
        } else {
            None
        }
    }
}

pub trait DisplayMetrics {
    /// The main display, if any is attached.
    fn main_display(&self) -> Option<DisplayInfo>;
}

/// Metrics that never change; used for previews and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixed(pub Option<DisplayInfo>);

impl DisplayMetrics for Fixed {
    fn main_display(&self) -> Option<DisplayInfo> { self.0 }
}

#[cfg(target_os = "macos")]
pub use actual::Actual;

#[cfg(target_os = "macos")]
mod actual {
    use objc2_core_graphics::{
        CGDisplayIsBuiltin, CGDisplayPixelsWide, CGDisplayScreenSize, CGMainDisplayID,
    };
    use tracing::trace;

    use super::{DisplayInfo, DisplayMetrics};

    /// Queries CoreGraphics on every call; the display can be hot-plugged at any time.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct Actual;

    impl DisplayMetrics for Actual {
        fn main_display(&self) -> Option<DisplayInfo> {
            let id = CGMainDisplayID();
            if id == 0 {
                return None;
            }
            let size = CGDisplayScreenSize(id);
            let info = DisplayInfo {
                physical_size_mm: (size.width, size.height),
                pixel_width: CGDisplayPixelsWide(id),
                is_builtin: CGDisplayIsBuiltin(id),
            };
            trace!(?info, "main display metrics");
            Some(info)
        }
    }
}
