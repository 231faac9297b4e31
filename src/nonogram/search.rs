//! The backtracking search over raster-ordered cell positions.
//!
//! The search walks positions `0..W*H`, turning each free cell into a binary
//! decision tried filled-first, and treating pinned cells (pre-filled or
//! proven empty) as fixed values that are only verified. Every tentative
//! value is vetted by the [`checker`](crate::nonogram::checker) against the
//! cell's row and column prefix; a rejection backtracks to the most recent
//! decision with an untried value.
//!
//! Recursion depth would equal the cell count (up to 65 025 on a 255x255
//! board), so the walk is driven by an explicit frame stack on the heap
//! rather than the call stack. The candidate contract of the recursive
//! formulation is preserved exactly: filled before empty, restore-to-empty on
//! failure, and no branching on pinned cells.

use crate::nonogram::checker;
use crate::nonogram::grid::Grid;
use crate::nonogram::hints::Hints;
use crate::nonogram::solver::SolveStats;
use log::trace;

/// What a stack frame's position currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    /// The value was fixed before the search reached it; never restored.
    Pinned,
    /// The cell was chosen filled; `empty` remains to be tried.
    Filled,
    /// The cell was chosen empty; no candidate left after this.
    Empty,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    position: usize,
    candidate: Candidate,
}

/// Runs one full search attempt.
///
/// `first_value` is the sole candidate for position 0 when it is free; every
/// deeper free cell tries filled then empty. The caller makes the two
/// top-level attempts (`true`, then `false`) — the asymmetry only exists at
/// position 0.
///
/// On success the grid holds the solution and `true` is returned. On
/// exhaustion every free cell has been restored to empty (pinned cells are
/// left as the pre-pass wrote them) and `false` is returned.
pub(crate) fn run(
    grid: &mut Grid,
    hints: &Hints,
    first_value: bool,
    stats: &mut SolveStats,
) -> bool {
    let total = grid.len();
    let mut stack: Vec<Frame> = Vec::with_capacity(total);
    let mut position = 0usize;

    loop {
        // Descend: establish a value at `position` and vet it.
        let placed = if position == total {
            return true;
        } else if grid.pinned(position) {
            stats.pinned_visits += 1;
            consistent(grid, hints, position, stats).then_some(Candidate::Pinned)
        } else {
            let value = if stack.is_empty() { first_value } else { true };
            place(grid, hints, position, value, stats).or_else(|| {
                // Filled was rejected; fall through to empty, except at the
                // seeded root where the caller owns the second attempt.
                (value && !stack.is_empty())
                    .then(|| place(grid, hints, position, false, stats))
                    .flatten()
            })
        };

        match placed {
            Some(candidate) => {
                stack.push(Frame {
                    position,
                    candidate,
                });
                position += 1;
            }
            None => {
                // Backtrack to the nearest frame with an untried candidate.
                position = loop {
                    let Some(frame) = stack.pop() else {
                        trace!("search exhausted (first_value={first_value})");
                        return false;
                    };
                    match frame.candidate {
                        Candidate::Pinned | Candidate::Empty => {}
                        Candidate::Filled => {
                            grid.set(frame.position, false);
                            if stack.is_empty() {
                                // Seeded root: no fallback here.
                                continue;
                            }
                            if place(grid, hints, frame.position, false, stats).is_some() {
                                stack.push(Frame {
                                    position: frame.position,
                                    candidate: Candidate::Empty,
                                });
                                break frame.position + 1;
                            }
                        }
                    }
                };
            }
        }
    }
}

/// Writes `value` at `position` and checks the affected row and column
/// prefixes. Returns the candidate on success; restores the cell to empty and
/// returns `None` on rejection.
fn place(
    grid: &mut Grid,
    hints: &Hints,
    position: usize,
    value: bool,
    stats: &mut SolveStats,
) -> Option<Candidate> {
    grid.set(position, value);
    stats.decisions += 1;
    if consistent(grid, hints, position, stats) {
        Some(if value {
            Candidate::Filled
        } else {
            Candidate::Empty
        })
    } else {
        grid.set(position, false);
        None
    }
}

fn consistent(grid: &Grid, hints: &Hints, position: usize, stats: &mut SolveStats) -> bool {
    let x = position % grid.width();
    let y = position / grid.width();
    let ok = checker::cell_consistent(grid, hints, x, y);
    if !ok {
        stats.conflicts += 1;
    }
    ok
}
