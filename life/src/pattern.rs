use tracing::debug;

use crate::{Cell, Grid};

/// A small fixed shape that can be written onto a [`Grid`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    width: usize,
    height: usize,

    /// Row-major, `1` for a live cell
    cells: &'static [u8],
}

/// Travels one cell down and to the right every 4 generations
#[rustfmt::skip]
pub const GLIDER: Pattern = Pattern {
    width: 3,
    height: 3,
    cells: &[
        0, 1, 0,
        0, 0, 1,
        1, 1, 1,
    ],
};

/// Period 2 oscillator, horizontal phase
pub const BLINKER: Pattern = Pattern {
    width: 3,
    height: 1,
    cells: &[1, 1, 1],
};

impl Pattern {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_set(&self, dx: usize, dy: usize) -> bool {
        self.cells[dx + dy * self.width] != 0
    }

    /// Every `(dx, dy)` in the footprint, and whether the pattern has a live cell there
    fn footprint(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        (0..self.height)
            .flat_map(move |dy| (0..self.width).map(move |dx| (dx, dy, self.is_set(dx, dy))))
    }

    /// Overwrites the whole footprint with top-left at `(x, y)`: pattern cells become newborns and
    /// the gaps between them are cleared.
    ///
    /// Target coordinates wrap around the board whatever the simulation's edge policy is.
    pub fn stamp(&self, grid: &mut Grid, x: usize, y: usize) {
        if grid.is_empty() {
            return;
        }

        let (width, height) = grid.dimensions();
        for (dx, dy, alive) in self.footprint() {
            grid.set_alive((x + dx) % width, (y + dy) % height, alive);
        }
    }

    /// Like [`Pattern::stamp()`] but additive: only the pattern's live cells are written and
    /// everything else in the footprint is left alone.
    pub fn overlay(&self, grid: &mut Grid, x: usize, y: usize) {
        if grid.is_empty() {
            return;
        }

        let (width, height) = grid.dimensions();
        for (dx, dy, alive) in self.footprint() {
            if alive {
                grid.set((x + dx) % width, (y + dy) % height, Cell::BORN);
            }
        }
    }

    /// True if none of the pattern's live cells would land on a cell that is already alive
    pub fn region_is_clear(&self, grid: &Grid, x: usize, y: usize) -> bool {
        if grid.is_empty() {
            return true;
        }

        let (width, height) = grid.dimensions();
        self.footprint()
            .filter(|&(_, _, alive)| alive)
            .all(|(dx, dy, _)| !grid.is_alive((x + dx) % width, (y + dy) % height))
    }
}

/// Writes a [`GLIDER`] with its top-left corner at `(x, y)`
pub fn stamp_glider(grid: &mut Grid, x: usize, y: usize) {
    GLIDER.stamp(grid, x, y);
}

/// Whether a glider stamped at `(x, y)` would land only on dead cells
pub fn region_is_clear(grid: &Grid, x: usize, y: usize) -> bool {
    GLIDER.region_is_clear(grid, x, y)
}

/// A pattern that can be picked by name at startup
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NamedPattern {
    Glider,
    Blinker,
}

impl NamedPattern {
    pub const ALL: [NamedPattern; 2] = [NamedPattern::Glider, NamedPattern::Blinker];

    /// Case-insensitive, surrounding whitespace ignored
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    pub fn name(&self) -> &'static str {
        match self {
            NamedPattern::Glider => "glider",
            NamedPattern::Blinker => "blinker",
        }
    }

    /// Places the pattern around the middle of the board, on top of whatever is there already
    pub fn place(&self, grid: &mut Grid) {
        let (width, height) = grid.dimensions();
        if grid.is_empty() {
            return;
        }

        match self {
            NamedPattern::Glider => GLIDER.stamp(grid, width / 2, height / 2),
            // The middle cell of the blinker sits on the center
            NamedPattern::Blinker => {
                BLINKER.overlay(grid, (width / 2 + width - 1) % width, height / 2)
            }
        }
    }
}

/// Seeds `grid` with the pattern called `name`.
///
/// Unknown names (including the empty string) leave the grid untouched.
pub fn seed_named_pattern(grid: &mut Grid, name: &str) -> Option<NamedPattern> {
    let pattern = NamedPattern::from_name(name);
    match pattern {
        Some(pattern) => {
            debug!(pattern = pattern.name(), "seeding starting pattern");
            pattern.place(grid);
        }
        None if !name.trim().is_empty() => debug!(pattern = name, "no pattern by that name"),
        None => {}
    }
    pattern
}
