//! The puzzle instance: grid, hints, and the solve lock.
//!
//! A [`Puzzle`] exclusively owns its [`Grid`] and [`Hints`]. While a solve is
//! in progress the instance is in the [`SolveState::Solving`] state and every
//! mutation entry point — clearing, hint regeneration, manual toggling — is
//! refused as a documented no-op return value. The lock is not a mutex: it
//! guards against re-entrant mutation, not against data races, and callers
//! that share an instance across threads must add real synchronisation.

use crate::nonogram::format::{self, FormatError};
use crate::nonogram::grid::Grid;
use crate::nonogram::hints::{HintLine, Hints};
use crate::nonogram::solver::{Backtracking, Propagated, Solution, Solver};
use std::io::{Read, Write};

/// Whether a solve currently owns the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolveState {
    /// No solve in progress; mutation entry points are live.
    #[default]
    Idle,
    /// A solve owns the grid; mutation entry points are refused.
    Solving,
}

/// One nonogram puzzle: the board, its hints, and the solve lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    grid: Grid,
    hints: Hints,
    state: SolveState,
}

impl Puzzle {
    /// Creates an instance from explicit hints. The number of row sequences
    /// is the height, the number of column sequences the width; the grid
    /// starts empty.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or exceeds
    /// [`MAX_DIMENSION`](crate::nonogram::grid::MAX_DIMENSION).
    #[must_use]
    pub fn from_hints(rows: Vec<HintLine>, cols: Vec<HintLine>) -> Self {
        let grid = Grid::new(cols.len(), rows.len());
        Self {
            grid,
            hints: Hints::from_lines(rows, cols),
            state: SolveState::Idle,
        }
    }

    /// Creates a blank instance of the given size; every hint is `[0]`.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or exceeds
    /// [`MAX_DIMENSION`](crate::nonogram::grid::MAX_DIMENSION).
    #[must_use]
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::new(width, height),
            hints: Hints::empty(width, height),
            state: SolveState::Idle,
        }
    }

    /// Creates an instance from a finished board, deriving all hints from it.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions are out of range or `cells` is not exactly
    /// `width * height` values in raster order.
    #[must_use]
    pub fn from_cells(width: usize, height: usize, cells: &[bool]) -> Self {
        let grid = Grid::from_cells(width, height, cells);
        let hints = Hints::derived_from(&grid);
        Self {
            grid,
            hints,
            state: SolveState::Idle,
        }
    }

    /// Reads an instance from the binary persistence format and derives its
    /// hints from the stored cells.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] for I/O failures, zero dimensions, or a
    /// stream whose length disagrees with its header. No partially
    /// initialised instance is ever produced.
    pub fn load<R: Read>(reader: R) -> Result<Self, FormatError> {
        let grid = format::load_grid(reader)?;
        let hints = Hints::derived_from(&grid);
        Ok(Self {
            grid,
            hints,
            state: SolveState::Idle,
        })
    }

    /// Writes the dimensions and cells in the binary persistence format.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] wrapping any I/O failure.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), FormatError> {
        format::save_grid(&self.grid, writer)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub const fn hints(&self) -> &Hints {
        &self.hints
    }

    #[must_use]
    pub const fn state(&self) -> SolveState {
        self.state
    }

    /// Whether a solve currently owns the instance.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state == SolveState::Solving
    }

    /// Empties the grid and the impossible mask, keeping the hints.
    ///
    /// Returns `false` without touching anything while a solve is in
    /// progress.
    pub fn clear(&mut self) -> bool {
        if self.is_locked() {
            return false;
        }
        self.grid.clear();
        true
    }

    /// Re-derives every hint line from the current grid, for the authoring
    /// workflow.
    ///
    /// Returns `false` without touching anything while a solve is in
    /// progress.
    pub fn generate_hints(&mut self) -> bool {
        if self.is_locked() {
            return false;
        }
        self.hints.regenerate(&self.grid);
        true
    }

    /// Flips one cell and incrementally re-derives the hints of its row and
    /// column.
    ///
    /// Out-of-range coordinates are clamped into the board, not rejected —
    /// callers expecting rejection should validate first. Returns the cell's
    /// new value, or `None` (and no change) while a solve is in progress.
    pub fn toggle(&mut self, x: usize, y: usize) -> Option<bool> {
        if self.is_locked() {
            return None;
        }
        let (x, y) = self.grid.clamp(x, y);
        let index = self.grid.index(x, y);
        let value = !self.grid.filled(index);
        self.grid.set(index, value);
        self.hints.update_row(&self.grid, y);
        self.hints.update_column(&self.grid, x);
        Some(value)
    }

    /// Forcibly returns the instance to [`SolveState::Idle`].
    ///
    /// This is cooperative cancellation only: it re-enables mutation entry
    /// points but does not interrupt a search that is still running — no
    /// cancellation token is threaded into the search itself.
    pub fn unlock(&mut self) {
        self.state = SolveState::Idle;
    }

    /// Clears the board and solves by exhaustive search alone.
    ///
    /// `None` means the hints admit no solution (the grid is left cleared),
    /// or that the instance was already locked.
    pub fn solve_backtracking(&mut self) -> Option<Solution> {
        Backtracking::new().solve(self)
    }

    /// Clears the board, runs the propagation pre-pass, then searches.
    ///
    /// `None` means the hints admit no solution (the grid is left cleared),
    /// or that the instance was already locked.
    pub fn solve_propagated(&mut self) -> Option<Solution> {
        Propagated::new().solve(self)
    }

    /// Takes the lock for a solve, clearing the board first. Refuses (and
    /// changes nothing) if a solve already owns the instance.
    pub(crate) fn begin_solve(&mut self) -> bool {
        if self.is_locked() {
            return false;
        }
        self.grid.clear();
        self.state = SolveState::Solving;
        true
    }

    /// Releases the lock; on an unsolved outcome the board is wiped back to
    /// its cleared pre-solve state.
    pub(crate) fn finish_solve(&mut self, solved: bool) {
        if !solved {
            self.grid.clear();
        }
        self.state = SolveState::Idle;
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Grid, &Hints) {
        (&mut self.grid, &self.hints)
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, state: SolveState) {
        self.state = state;
    }
}
