//! Line-prefix consistency checking.
//!
//! After every tentative assignment the search asks whether the affected row
//! and column, read from their start up to the assigned cell, can still agree
//! with their hints. The check re-scans the prefix on every call; at O(line)
//! per node this trades raw speed for having no incremental state to keep
//! correct across backtracking.

use crate::nonogram::grid::{Grid, Orientation};
use crate::nonogram::hints::Hints;

/// Checks the row and column through `(x, y)` up to and including that cell.
///
/// This is the per-assignment pruning test of the search: both the row prefix
/// `0..=x` and the column prefix `0..=y` must still be consistent.
#[must_use]
pub fn cell_consistent(grid: &Grid, hints: &Hints, x: usize, y: usize) -> bool {
    line_prefix_consistent(grid, hints, Orientation::Row, y, x)
        && line_prefix_consistent(grid, hints, Orientation::Column, x, y)
}

/// Reconstructs the run-length sequence of one line prefix and compares it
/// against the line's hints.
///
/// The prefix `0..=position` is inconsistent when any of the following holds:
/// - a completed run (terminated by an empty cell) differs from its hint;
/// - more runs have been opened than the hint sequence contains;
/// - the still-open run already exceeds its hint;
/// - `position` is the line's last cell and the number of runs differs from
///   the number of hints, or the line ends mid-run at the wrong length.
///
/// A hint sequence of exactly `[0]` denotes a line with no runs at all, so an
/// all-empty prefix is consistent with it and any filled cell is not.
#[must_use]
pub fn line_prefix_consistent(
    grid: &Grid,
    hints: &Hints,
    orientation: Orientation,
    line: usize,
    position: usize,
) -> bool {
    let len = grid.line_len(orientation);
    let hint = effective(hints.line(orientation, line));

    let mut runs = 0usize;
    let mut run_len = 0usize;
    let mut previous = false;

    for offset in 0..=position {
        let current = grid.filled(grid.line_index(orientation, line, offset));
        if current {
            if !previous {
                runs += 1;
            }
            run_len += 1;
        } else if previous {
            // A run just closed; it must match its hint exactly.
            if runs > hint.len() || usize::from(hint[runs - 1]) != run_len {
                return false;
            }
            run_len = 0;
        }
        previous = current;
    }

    if runs > hint.len() {
        return false;
    }
    if previous && usize::from(hint[runs - 1]) < run_len {
        return false;
    }
    if position + 1 == len {
        if runs != hint.len() {
            return false;
        }
        if previous && usize::from(hint[runs - 1]) != run_len {
            return false;
        }
    }
    true
}

/// Maps the `[0]` empty-line convention to a zero-run sequence.
fn effective(hint: &[u16]) -> &[u16] {
    if hint.len() == 1 && hint[0] == 0 {
        &[]
    } else {
        hint
    }
}
