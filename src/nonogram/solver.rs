//! Solving strategies and their shared plumbing.
//!
//! Two strategies run the same backtracking search and differ only in their
//! pre-pass: [`Backtracking`] clears the grid and searches directly, while
//! [`Propagated`] first runs the [propagation
//! engine](crate::nonogram::propagation) so the search starts from every cell
//! the hints force on their own. Each strategy makes two top-level attempts —
//! position 0 filled-first, then a retry empty-first — before reporting
//! exhaustion.

use crate::nonogram::grid::Grid;
use crate::nonogram::puzzle::Puzzle;
use crate::nonogram::{propagation, search};
use bit_vec::BitVec;
use log::debug;
use std::fmt::Display;

/// Counters collected over one solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveStats {
    /// Tentative values written to free cells (both polarities).
    pub decisions: usize,
    /// Consistency checks that rejected a line prefix.
    pub conflicts: usize,
    /// Visits to cells whose value was fixed before the search.
    pub pinned_visits: usize,
    /// Cells the pre-pass forced filled (zero for the bare strategy).
    pub prefilled: usize,
    /// Cells the pre-pass proved empty (zero for the bare strategy).
    pub premarked: usize,
}

/// A solved board, detached from the puzzle instance that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    width: usize,
    height: usize,
    cells: BitVec,
}

impl Solution {
    fn from_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            cells: grid.bits().clone(),
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Cell value at `(x, y)`.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> bool {
        self.cells.get(y * self.width + x).unwrap_or(false)
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                write!(f, "{}", if self.cell(x, y) { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A solving strategy over a puzzle instance.
///
/// `solve` locks the instance, clears the board, runs the strategy, and
/// unlocks on the way out. `Some` carries the solution (which the puzzle's
/// grid also holds); `None` means the hints admit no solution — the grid is
/// then left cleared — or that the instance was already locked, in which case
/// the call is the documented no-op.
pub trait Solver {
    fn new() -> Self;

    fn solve(&mut self, puzzle: &mut Puzzle) -> Option<Solution>;

    /// Counters from the most recent `solve` call.
    fn stats(&self) -> SolveStats;
}

/// The bare strategy: exhaustive search from an empty board.
#[derive(Debug, Clone, Copy, Default)]
pub struct Backtracking {
    stats: SolveStats,
}

impl Solver for Backtracking {
    fn new() -> Self {
        Self::default()
    }

    fn solve(&mut self, puzzle: &mut Puzzle) -> Option<Solution> {
        self.stats = SolveStats::default();
        run_solve(puzzle, false, &mut self.stats)
    }

    fn stats(&self) -> SolveStats {
        self.stats
    }
}

/// The accelerated strategy: propagation pre-pass, then the same search.
#[derive(Debug, Clone, Copy, Default)]
pub struct Propagated {
    stats: SolveStats,
}

impl Solver for Propagated {
    fn new() -> Self {
        Self::default()
    }

    fn solve(&mut self, puzzle: &mut Puzzle) -> Option<Solution> {
        self.stats = SolveStats::default();
        run_solve(puzzle, true, &mut self.stats)
    }

    fn stats(&self) -> SolveStats {
        self.stats
    }
}

fn run_solve(puzzle: &mut Puzzle, with_prepass: bool, stats: &mut SolveStats) -> Option<Solution> {
    if !puzzle.begin_solve() {
        return None;
    }

    if with_prepass {
        let (grid, hints) = puzzle.parts_mut();
        let summary = propagation::propagate(grid, hints);
        stats.prefilled = summary.filled;
        stats.premarked = summary.impossible;
    }

    let (grid, hints) = puzzle.parts_mut();
    let mut solved = search::run(&mut *grid, hints, true, stats);
    if !solved {
        solved = search::run(grid, hints, false, stats);
    }

    let solution = solved.then(|| Solution::from_grid(puzzle.grid()));
    puzzle.finish_solve(solved);

    debug!(
        "solve finished: solved={solved} decisions={} conflicts={} pinned={} prefilled={} premarked={}",
        stats.decisions, stats.conflicts, stats.pinned_visits, stats.prefilled, stats.premarked
    );
    solution
}
