//! Platform seams. Each module defines the trait the core consumes and, on
//! macOS, the `Actual` implementation backed by the window server.

pub mod display;
pub mod notification;
#[cfg(target_os = "macos")]
pub mod skylight;
pub mod window_server;
