use std::io;
use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::{
    seed_named_pattern, step, BlockedPlacement, Config, Display, DoubleBuffer, GliderInjector,
    Grid, Injection, Key, MAX_UPDATE_INTERVAL_US, MIN_UPDATE_INTERVAL_US,
};

/// How much `+` and `-` change the frame delay by, in microseconds
pub const SPEED_STEP_US: u32 = 10_000;

pub const PATTERN_PROMPT: &str = "Choose a pattern (glider/blinker): ";

/// Longest starting pattern name we read from the prompt
pub const PATTERN_MAX_LEN: usize = 19;

pub const KEY_HELP: &str = "q: quit  r: reset  +: faster  -: slower";

#[derive(Debug, Error)]
pub enum Error {
    #[error("display failed: {0}")]
    Display(#[from] io::Error),

    #[error("display reported an empty viewport ({rows} rows x {cols} columns)")]
    EmptyViewport { rows: usize, cols: usize },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Created, but [`Screensaver::init()`] hasn't run yet
    Init,
    Running,
    Terminated,
}

/// Something a key press asks the loop to do
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,

    /// Reseed the board at random and start counting generations from zero
    Reset,

    SpeedUp,
    SlowDown,
}

impl Action {
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Char('q') | Key::Escape | Key::Interrupt => Some(Action::Quit),
            Key::Char('r') => Some(Action::Reset),
            Key::Char('+') => Some(Action::SpeedUp),
            Key::Char('-') => Some(Action::SlowDown),
            _ => None,
        }
    }
}

/// The frame loop: owns the boards, the glider injector, and the display, and advances the
/// simulation one generation per frame.
///
/// Each frame:
/// 1. Rebuilds the boards if the display changed size
/// 2. Draws the current generation and presents it
/// 3. Steps into the back buffer, maybe drops a glider there, and swaps
/// 4. Handles at most one key press
///
/// [`Screensaver::run()`] then sleeps for the configured interval and goes again.
pub struct Screensaver<D, R> {
    config: Config,
    display: D,
    rng: R,

    buffers: DoubleBuffer,
    injector: GliderInjector,

    phase: Phase,
    generation: u64,
    last_spawn: Option<(usize, usize)>,
}

impl<D: Display, R: Rng> Screensaver<D, R> {
    pub fn new(config: Config, display: D, rng: R) -> Self {
        let injector = GliderInjector::from_config(&config, Instant::now());
        Self {
            config,
            display,
            rng,
            buffers: DoubleBuffer::new(0, 0),
            injector,
            phase: Phase::Init,
            generation: 0,
            last_spawn: None,
        }
    }

    /// See [`BlockedPlacement`]
    pub fn with_blocked_placement(mut self, on_blocked: BlockedPlacement) -> Self {
        self.injector = self.injector.with_blocked_placement(on_blocked);
        self
    }

    pub fn blocked_placement(&self) -> BlockedPlacement {
        self.injector.blocked_placement()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Generations stepped since startup or the last reset
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The generation currently on screen
    pub fn grid(&self) -> &Grid {
        self.buffers.front()
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        self.buffers.front_mut()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn update_interval(&self) -> Duration {
        self.config.update_interval()
    }

    /// Sizes the boards to the display, seeds them, and asks for a starting pattern
    pub fn init(&mut self, now: Instant) -> Result<(), Error> {
        let (rows, cols) = self.display.size()?;
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyViewport { rows, cols });
        }

        self.buffers.reallocate(cols, rows);
        self.buffers
            .front_mut()
            .seed_random(self.config.initial_density, &mut self.rng);
        info!(rows, cols, "board created");

        let name = self
            .display
            .read_line(0, 0, PATTERN_PROMPT, PATTERN_MAX_LEN)?;
        seed_named_pattern(self.buffers.front_mut(), &name);

        self.injector.restart(now);
        self.generation = 0;
        self.last_spawn = None;
        self.phase = Phase::Running;
        Ok(())
    }

    /// Runs a single frame (without the sleep at the end) and returns the phase after it.
    ///
    /// Calls [`Screensaver::init()`] first if it hasn't been yet. Does nothing once terminated.
    pub fn frame(&mut self, now: Instant) -> Result<Phase, Error> {
        match self.phase {
            Phase::Init => self.init(now)?,
            Phase::Running => {}
            Phase::Terminated => return Ok(Phase::Terminated),
        }

        self.reconcile_size()?;

        self.render();
        self.display.present()?;

        self.advance(now);

        if let Some(key) = self.display.poll_key()? {
            match Action::from_key(key) {
                Some(action) => self.apply(action),
                None => trace!(?key, "ignoring key"),
            }
        }

        Ok(self.phase)
    }

    /// Runs frames until quit, sleeping the (possibly changing) update interval between them
    pub fn run(&mut self) -> Result<(), Error> {
        while self.frame(Instant::now())? == Phase::Running {
            std::thread::sleep(self.update_interval());
        }

        info!(generation = self.generation, "screensaver stopped");
        self.buffers.reallocate(0, 0);
        Ok(())
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => {
                debug!("quit requested");
                self.phase = Phase::Terminated;
            }
            Action::Reset => {
                debug!(generation = self.generation, "resetting board");
                self.buffers
                    .front_mut()
                    .seed_random(self.config.initial_density, &mut self.rng);
                self.generation = 0;
                self.last_spawn = None;
            }
            Action::SpeedUp => self.speed_up(),
            Action::SlowDown => self.slow_down(),
        }
    }

    /// Shortens the frame delay by [`SPEED_STEP_US`], down to 1µs
    pub fn speed_up(&mut self) {
        self.config.update_interval_us = self
            .config
            .update_interval_us
            .saturating_sub(SPEED_STEP_US)
            .max(MIN_UPDATE_INTERVAL_US);
        debug!(interval_us = self.config.update_interval_us, "speed up");
    }

    /// Lengthens the frame delay by [`SPEED_STEP_US`], up to one second
    pub fn slow_down(&mut self) {
        self.config.update_interval_us = self
            .config
            .update_interval_us
            .saturating_add(SPEED_STEP_US)
            .min(MAX_UPDATE_INTERVAL_US);
        debug!(interval_us = self.config.update_interval_us, "slow down");
    }

    /// A viewport of a different size gets brand new, randomly seeded boards.
    fn reconcile_size(&mut self) -> Result<(), Error> {
        let (rows, cols) = self.display.size()?;
        if self.buffers.dimensions() == (cols, rows) {
            return Ok(());
        }

        info!(
            old_rows = self.buffers.height(),
            old_cols = self.buffers.width(),
            rows,
            cols,
            "viewport resized, reseeding"
        );
        self.buffers.reallocate(cols, rows);
        self.buffers
            .front_mut()
            .seed_random(self.config.initial_density, &mut self.rng);
        self.last_spawn = None;
        Ok(())
    }

    fn render(&mut self) {
        let grid = self.buffers.front();
        let glyph = self.config.cell_glyph.as_str();

        for (row, cells) in grid.rows().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.alive {
                    let color = self.config.color_for_age(cell.age);
                    self.display.draw_cell(row, col, glyph, color);
                } else {
                    self.display.clear_cell(row, col);
                }
            }
        }

        let rows = grid.height();
        if rows == 0 {
            return;
        }

        if let (Some((x, y)), true) = (self.last_spawn, rows >= 2) {
            self.display
                .draw_text(rows - 2, 0, &format!("Glider spawned at ({x}, {y})"));
        }
        self.display.draw_text(
            rows - 1,
            0,
            &format!("Generation: {} | {KEY_HELP}", self.generation),
        );
    }

    fn advance(&mut self, now: Instant) {
        let edges = self.config.edges();
        let (current, next) = self.buffers.split();
        let n_updated = step(current, next, edges);

        if let Injection::Spawned { x, y } = self.injector.maybe_inject(next, now, &mut self.rng) {
            self.last_spawn = Some((x, y));
        }

        self.buffers.swap();
        self.generation += 1;
        trace!(generation = self.generation, n_updated, "stepped");
    }
}
