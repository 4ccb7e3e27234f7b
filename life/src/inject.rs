use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, trace};

use crate::{region_is_clear, stamp_glider, Config, Grid, GLIDER};

/// What to do with the injection timer when the randomly picked site is occupied
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BlockedPlacement {
    /// Keep the timer where it is, so another random site is tried on the very next frame
    #[default]
    Retry,

    /// Restart the timer as if a glider had spawned. Busy boards can go a whole interval (or
    /// several) without receiving anything.
    ResetTimer,
}

/// The outcome of one [`GliderInjector::maybe_inject()`] call
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Injection {
    /// Infinite mode is off
    Disabled,

    /// The interval hasn't elapsed yet
    Waiting,

    /// The board can't fit a glider
    TooSmall,

    /// A site was picked, but something was alive under the glider's cells
    Blocked { x: usize, y: usize },

    /// A glider was stamped with its top-left corner at `(x, y)`
    Spawned { x: usize, y: usize },
}

/// Keeps a board from settling down by dropping a fresh glider onto it every so often
#[derive(Clone, Debug)]
pub struct GliderInjector {
    enabled: bool,
    interval: Duration,
    last_glider_time: Instant,
    on_blocked: BlockedPlacement,
}

impl GliderInjector {
    pub fn new(enabled: bool, interval: Duration, now: Instant) -> Self {
        Self {
            enabled,
            interval,
            last_glider_time: now,
            on_blocked: BlockedPlacement::default(),
        }
    }

    pub fn from_config(config: &Config, now: Instant) -> Self {
        Self::new(config.infinite_mode, config.glider_interval(), now)
    }

    pub fn with_blocked_placement(mut self, on_blocked: BlockedPlacement) -> Self {
        self.on_blocked = on_blocked;
        self
    }

    pub fn blocked_placement(&self) -> BlockedPlacement {
        self.on_blocked
    }

    /// Starts the interval over from `now`
    pub fn restart(&mut self, now: Instant) {
        self.last_glider_time = now;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_glider_time(&self) -> Instant {
        self.last_glider_time
    }

    /// Once the interval has elapsed, picks a random site that fits the glider entirely on the
    /// board and stamps one there if none of its cells would land on a live cell.
    pub fn maybe_inject(&mut self, grid: &mut Grid, now: Instant, rng: &mut impl Rng) -> Injection {
        if !self.enabled {
            return Injection::Disabled;
        }

        if now.saturating_duration_since(self.last_glider_time) < self.interval {
            return Injection::Waiting;
        }

        let (width, height) = grid.dimensions();
        if width < GLIDER.width() || height < GLIDER.height() {
            trace!(width, height, "board is too small for a glider");
            return Injection::TooSmall;
        }

        let x = rng.gen_range(0..=width - GLIDER.width());
        let y = rng.gen_range(0..=height - GLIDER.height());

        if region_is_clear(grid, x, y) {
            stamp_glider(grid, x, y);
            self.last_glider_time = now;
            debug!(x, y, "glider spawned");
            Injection::Spawned { x, y }
        } else {
            if self.on_blocked == BlockedPlacement::ResetTimer {
                self.last_glider_time = now;
            }
            debug!(x, y, policy = ?self.on_blocked, "glider site is occupied");
            Injection::Blocked { x, y }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::{rngs::SmallRng, SeedableRng};

    const INTERVAL: Duration = Duration::from_secs(5);

    fn full_grid(width: usize, height: usize) -> Grid {
        let mut grid = Grid::new(width, height);
        let mut rng = SmallRng::seed_from_u64(0);
        grid.seed_random(1.0, &mut rng);
        grid
    }

    #[test]
    fn check_disabled() {
        let start = Instant::now();
        let mut injector = GliderInjector::new(false, INTERVAL, start);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut grid = Grid::new(20, 20);

        let result = injector.maybe_inject(&mut grid, start + INTERVAL * 10, &mut rng);
        assert_eq!(result, Injection::Disabled);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn check_waits_for_interval() {
        let start = Instant::now();
        let mut injector = GliderInjector::new(true, INTERVAL, start);
        let mut rng = SmallRng::seed_from_u64(2);
        let mut grid = Grid::new(20, 20);

        let almost = start + INTERVAL - Duration::from_millis(1);
        assert_eq!(
            injector.maybe_inject(&mut grid, almost, &mut rng),
            Injection::Waiting
        );
        assert_eq!(grid.population(), 0);

        // Exactly one interval is enough
        let Injection::Spawned { x, y } =
            injector.maybe_inject(&mut grid, start + INTERVAL, &mut rng)
        else {
            panic!("expected a glider to spawn");
        };
        assert!(x <= 17 && y <= 17);
        assert_eq!(grid.population(), 5);
        assert_eq!(injector.last_glider_time(), start + INTERVAL);

        let mut expected = Grid::new(20, 20);
        stamp_glider(&mut expected, x, y);
        assert_eq!(grid, expected);

        // And the timer starts over
        assert_eq!(
            injector.maybe_inject(&mut grid, start + INTERVAL + INTERVAL / 2, &mut rng),
            Injection::Waiting
        );
    }

    #[test]
    fn check_sites_stay_on_board() {
        let start = Instant::now();
        let mut rng = SmallRng::seed_from_u64(3);

        for _ in 0..200 {
            let mut injector = GliderInjector::new(true, INTERVAL, start);
            let mut grid = Grid::new(4, 3);
            match injector.maybe_inject(&mut grid, start + INTERVAL, &mut rng) {
                Injection::Spawned { x, y } => assert!(x <= 1 && y == 0, "({x}, {y})"),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn check_blocked_retries_by_default() {
        let start = Instant::now();
        let mut injector = GliderInjector::new(true, INTERVAL, start);
        let mut rng = SmallRng::seed_from_u64(4);
        let mut grid = full_grid(10, 10);
        let before = grid.clone();

        let later = start + INTERVAL * 2;
        assert!(matches!(
            injector.maybe_inject(&mut grid, later, &mut rng),
            Injection::Blocked { .. }
        ));
        assert_eq!(grid, before);
        assert_eq!(injector.last_glider_time(), start);

        // The very next frame tries again once there is room
        grid.clear();
        assert!(matches!(
            injector.maybe_inject(&mut grid, later, &mut rng),
            Injection::Spawned { .. }
        ));
    }

    #[test]
    fn check_blocked_can_reset_timer() {
        let start = Instant::now();
        let mut injector = GliderInjector::new(true, INTERVAL, start)
            .with_blocked_placement(BlockedPlacement::ResetTimer);
        let mut rng = SmallRng::seed_from_u64(5);
        let mut grid = full_grid(10, 10);

        let later = start + INTERVAL * 2;
        assert!(matches!(
            injector.maybe_inject(&mut grid, later, &mut rng),
            Injection::Blocked { .. }
        ));
        assert_eq!(injector.last_glider_time(), later);

        grid.clear();
        assert_eq!(
            injector.maybe_inject(&mut grid, later, &mut rng),
            Injection::Waiting
        );
    }

    #[test]
    fn check_too_small() {
        let start = Instant::now();
        let mut injector = GliderInjector::new(true, INTERVAL, start);
        let mut rng = SmallRng::seed_from_u64(6);

        for (width, height) in [(2, 10), (10, 2), (0, 0)] {
            let mut grid = Grid::new(width, height);
            assert_eq!(
                injector.maybe_inject(&mut grid, start + INTERVAL, &mut rng),
                Injection::TooSmall
            );
        }
        assert_eq!(injector.last_glider_time(), start);
    }

    #[test]
    fn check_from_config() {
        let start = Instant::now();
        let config = Config {
            infinite_mode: true,
            glider_interval_s: 3,
            ..Config::default()
        };

        let injector = GliderInjector::from_config(&config, start);
        assert!(injector.is_enabled());
        assert_eq!(injector.interval(), Duration::from_secs(3));
        assert!(!GliderInjector::from_config(&Config::default(), start).is_enabled());
    }

    #[test]
    fn check_restart_keeps_policy() {
        let start = Instant::now();
        let mut injector = GliderInjector::new(true, INTERVAL, start)
            .with_blocked_placement(BlockedPlacement::ResetTimer);

        let later = start + INTERVAL * 2;
        injector.restart(later);
        assert_eq!(injector.last_glider_time(), later);
        assert_eq!(injector.blocked_placement(), BlockedPlacement::ResetTimer);

        let mut grid = Grid::new(8, 8);
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(
            injector.maybe_inject(&mut grid, later + INTERVAL / 2, &mut rng),
            Injection::Waiting
        );
    }
}
