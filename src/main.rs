use std::process::ExitCode;

use conway_screensaver::{logging, terminal::TerminalDisplay, Error};
use life::{Config, Screensaver};
use rand::{rngs::SmallRng, SeedableRng};
use tracing::info;

fn run(config: Config) -> Result<(), Error> {
    let display = TerminalDisplay::new(&config.cell_glyph).map_err(Error::Terminal)?;
    let rng = SmallRng::from_entropy();

    // Dropping the screensaver drops the display, which gives the terminal back before any error
    // gets printed
    Screensaver::new(config, display, rng).run()?;
    Ok(())
}

fn main() -> ExitCode {
    if let Some(path) = logging::init() {
        info!(log = %path.display(), "logging enabled");
    }

    let config = Config::load(&Config::default_path());

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[ERROR] conway-screensaver: {err}");
            ExitCode::FAILURE
        }
    }
}
