use crate::Grid;

/// Two same-sized [`Grid`]s: the front one is the generation on screen, the back one is where the
/// next generation gets written.
///
/// The pair is only ever resized together, so the two can never disagree on dimensions.
#[derive(Clone, Debug)]
pub struct DoubleBuffer {
    buffers: [Grid; 2],
    front: usize,
}

impl DoubleBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            buffers: [Grid::new(width, height), Grid::new(width, height)],
            front: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.front().width()
    }

    pub fn height(&self) -> usize {
        self.front().height()
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        self.front().dimensions()
    }

    /// The current generation
    pub fn front(&self) -> &Grid {
        &self.buffers[self.front]
    }

    pub fn front_mut(&mut self) -> &mut Grid {
        &mut self.buffers[self.front]
    }

    /// The buffer the next generation is written into
    pub fn back_mut(&mut self) -> &mut Grid {
        &mut self.buffers[1 - self.front]
    }

    /// Borrows `(read-from, write-to)` at once. These are always different grids.
    pub fn split(&mut self) -> (&Grid, &mut Grid) {
        let [a, b] = &mut self.buffers;
        if self.front == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        }
    }

    /// Makes the back buffer the new front
    pub fn swap(&mut self) {
        self.front = 1 - self.front;
    }

    /// Throws both grids away and allocates fresh, all-dead ones.
    ///
    /// Nothing from the old generations carries over, not even a cropped corner.
    pub fn reallocate(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }
}
