use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to set up the terminal: {0}")]
    Terminal(#[source] io::Error),

    #[cfg(feature = "window")]
    #[error("failed to open a window: {0}")]
    Window(#[from] minifb::Error),

    #[error(transparent)]
    Screensaver(#[from] life::Error),
}
