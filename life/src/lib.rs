//! Conway's Game of Life, run as a screensaver.
//!
//! The crate owns the simulation and the frame loop. Drawing and input are left to whatever
//! implements [`Display`], so everything here can be driven from tests without a terminal.

/// Cells, the board, and the update rule
mod grid;
pub use grid::*;

/// The two boards we alternate between every generation
mod buffers;
pub use buffers::*;

/// Fixed patterns (glider, blinker) and how they get stamped onto a board
mod pattern;
pub use pattern::*;

/// Periodic glider injection for infinite mode
mod inject;
pub use inject::*;

/// Runtime parameters and the `key=value` file they are read from
mod config;
pub use config::*;

/// What the frame loop needs from a screen
mod display;
pub use display::*;

/// The frame loop itself
mod screensaver;
pub use screensaver::*;
