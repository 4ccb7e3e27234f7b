use core::fmt;
use core::str::FromStr;

use rand::Rng;
use thiserror::Error;

/// One square of the board
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub alive: bool,

    /// Consecutive generations this cell has stayed alive.
    /// Zero on the generation it was born, and zero for every dead cell.
    pub age: u32,
}

impl Cell {
    pub const DEAD: Cell = Cell {
        alive: false,
        age: 0,
    };

    pub const BORN: Cell = Cell {
        alive: true,
        age: 0,
    };
}

/// What happens to neighbor lookups that fall off the board
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Edges {
    /// Opposite edges are joined, making the board a torus
    #[default]
    Wrap,

    /// Anything past the edge counts as dead
    Bounded,
}

impl Edges {
    pub fn from_wrap(wrap: bool) -> Self {
        if wrap {
            Edges::Wrap
        } else {
            Edges::Bounded
        }
    }
}

/// A `width x height` board of [`Cell`]s, stored row-major.
///
/// Coordinates are `(x, y)` with `x` the column and `y` the row, both from the top-left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a board where every cell is dead
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::DEAD; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterates over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        // chunks() rejects a zero size, and a zero-width board has no rows anyway
        self.cells.chunks(self.width.max(1))
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "({x}, {y}) is outside a {}x{} grid",
            self.width,
            self.height
        );
        x + y * self.width
    }

    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[self.idx(x, y)]
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.get(x, y).alive
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        let idx = self.idx(x, y);
        self.cells[idx] = cell;
    }

    /// Sets a cell alive or dead with a fresh age of zero
    pub fn set_alive(&mut self, x: usize, y: usize, alive: bool) {
        self.set(x, y, Cell { alive, age: 0 });
    }

    /// Kills every cell
    pub fn clear(&mut self) {
        self.cells.fill(Cell::DEAD);
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.alive).count()
    }

    /// Counts the live cells among the 8 Moore neighbors of `(x, y)`
    pub fn neighbor_count(&self, x: usize, y: usize, edges: Edges) -> u8 {
        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let Some((nx, ny)) = self.neighbor(x, y, dx, dy, edges) else {
                    continue;
                };

                if self.cells[self.idx(nx, ny)].alive {
                    count += 1;
                }
            }
        }
        count
    }

    fn neighbor(
        &self,
        x: usize,
        y: usize,
        dx: isize,
        dy: isize,
        edges: Edges,
    ) -> Option<(usize, usize)> {
        match edges {
            Edges::Wrap => Some((wrap(x, dx, self.width), wrap(y, dy, self.height))),
            Edges::Bounded => {
                let nx = x.checked_add_signed(dx)?;
                let ny = y.checked_add_signed(dy)?;
                (nx < self.width && ny < self.height).then_some((nx, ny))
            }
        }
    }

    /// Replaces every cell with a fresh one that is alive with probability `density`.
    ///
    /// Densities outside of `[0, 1]` are clamped, and NaN seeds an empty board.
    pub fn seed_random(&mut self, density: f64, rng: &mut impl Rng) {
        let p = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };

        for cell in &mut self.cells {
            *cell = Cell {
                alive: rng.gen_bool(p),
                age: 0,
            };
        }
    }
}

#[inline]
fn wrap(v: usize, delta: isize, len: usize) -> usize {
    (v as isize + delta).rem_euclid(len as isize) as usize
}

/// Computes the generation after `current` into `next`.
///
/// Every cell of `next` is overwritten and none of it is read, so the result does not depend
/// on what `next` held before or on the order cells are visited.
///
/// Returns how many cells changed between alive and dead.
pub fn step(current: &Grid, next: &mut Grid, edges: Edges) -> usize {
    assert_eq!(
        current.dimensions(),
        next.dimensions(),
        "both generations must have the same dimensions"
    );

    let mut n_updated = 0;
    for y in 0..current.height {
        for x in 0..current.width {
            let cell = current.get(x, y);
            let neighbors = current.neighbor_count(x, y, edges);

            let new_cell = match (cell.alive, neighbors) {
                // Survival
                (true, 2) | (true, 3) => Cell {
                    alive: true,
                    age: cell.age.saturating_add(1),
                },
                // Birth
                (false, 3) => Cell::BORN,
                // Death, or staying dead
                _ => Cell::DEAD,
            };

            if new_cell.alive != cell.alive {
                n_updated += 1;
            }
            next.set(x, y, new_cell);
        }
    }

    n_updated
}

/// Draws live cells as `#` and dead cells as `.`, one line per row
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = if self.is_alive(x, y) { '#' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridParseError {
    #[error("row {row} is {found} cells wide, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unexpected {ch:?} at row {row}, column {col}")]
    BadCell { row: usize, col: usize, ch: char },
}

/// Reads the format written by [`Grid`]'s `Display` impl.
///
/// `#` or `O` is a live cell and `.` is a dead one. Leading and trailing whitespace on every line
/// is ignored, as are blank lines.
impl FromStr for Grid {
    type Err = GridParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let width = lines.first().map_or(0, |line| line.chars().count());
        let mut grid = Grid::new(width, lines.len());

        for (y, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GridParseError::Ragged {
                    row: y,
                    expected: width,
                    found,
                });
            }

            for (x, ch) in line.chars().enumerate() {
                match ch {
                    '#' | 'O' => grid.set_alive(x, y, true),
                    '.' => {}
                    _ => return Err(GridParseError::BadCell { row: y, col: x, ch }),
                }
            }
        }

        Ok(grid)
    }
}
