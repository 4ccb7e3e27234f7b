use std::process::ExitCode;

use conway_screensaver::{logging, window::WindowDisplay, Error};
use life::{Config, Screensaver};
use rand::{rngs::SmallRng, SeedableRng};

const WIDTH: usize = 160;
const HEIGHT: usize = 96;

fn run(config: Config) -> Result<(), Error> {
    let display = WindowDisplay::new(WIDTH, HEIGHT)?;
    Screensaver::new(config, display, SmallRng::from_entropy()).run()?;
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    let config = Config::load(&Config::default_path());

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[ERROR] conway-window: {err}");
            ExitCode::FAILURE
        }
    }
}
