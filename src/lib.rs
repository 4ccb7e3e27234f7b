//! Backends and process plumbing for the Conway screensaver.
//!
//! The simulation and frame loop live in the `life` crate; this crate provides the screens
//! it draws on and the glue the binaries share.

/// Top-level error type for the binaries
mod error;
pub use error::Error;

/// Logging to a file, because the terminal is busy
pub mod logging;

/// Full-screen terminal display using crossterm
pub mod terminal;

/// Scaled pixel window display using minifb
#[cfg(feature = "window")]
pub mod window;
