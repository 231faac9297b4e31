//! The constraint-propagation pre-pass.
//!
//! Before the search starts, every line is inspected on its own and the cells
//! that are the same in *every* valid placement of that line's runs are
//! committed up front: forced-filled cells go to the grid, forced-empty cells
//! to the impossible mask. The pass is purely additive — it never clears a
//! cell — and running it a second time changes nothing.
//!
//! Three deductions are applied, in order, each seeing the writes of the
//! previous one:
//!
//! 1. **Overlap fill.** Packing all runs to the left and to the right leaves
//!    `slack = len - (sum(hints) + count - 1)` cells of play. The central
//!    `run - slack` cells of each run coincide in both packings, so every
//!    placement fills them.
//! 2. **Empty-line marking.** A `[0]` line is all impossible.
//! 3. **Edge-run extension.** Within the first `hint` cells from an edge, a
//!    filled cell must belong to the edge run, which therefore extends from
//!    that cell through the end of the span. When the line has a single hint,
//!    cells at `2*hint - observed` and beyond from that edge are out of the
//!    run's reach and are marked impossible. Applied from all four edges.

use crate::nonogram::grid::{Grid, Orientation};
use crate::nonogram::hints::Hints;
use log::debug;

/// Cell counts written by one propagation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropagationSummary {
    /// Cells newly forced filled.
    pub filled: usize,
    /// Cells newly marked impossible.
    pub impossible: usize,
}

/// Runs the full pre-pass over every row and column.
pub fn propagate(grid: &mut Grid, hints: &Hints) -> PropagationSummary {
    let mut summary = PropagationSummary::default();

    for orientation in [Orientation::Row, Orientation::Column] {
        for line in 0..grid.line_count(orientation) {
            overlap_fill(grid, hints, orientation, line, &mut summary);
        }
    }

    for orientation in [Orientation::Row, Orientation::Column] {
        for line in 0..grid.line_count(orientation) {
            mark_empty_line(grid, hints, orientation, line, &mut summary);
        }
    }

    for (orientation, from_end) in [
        (Orientation::Row, false),
        (Orientation::Row, true),
        (Orientation::Column, false),
        (Orientation::Column, true),
    ] {
        for line in 0..grid.line_count(orientation) {
            extend_edge_run(grid, hints, orientation, line, from_end, &mut summary);
        }
    }

    debug!(
        "propagation pre-pass forced {} filled, {} impossible of {} cells",
        summary.filled,
        summary.impossible,
        grid.len()
    );
    summary
}

/// Fills the cells shared by the leftmost and rightmost packing of a line.
fn overlap_fill(
    grid: &mut Grid,
    hints: &Hints,
    orientation: Orientation,
    line: usize,
    summary: &mut PropagationSummary,
) {
    let len = grid.line_len(orientation);
    let hint = hints.line(orientation, line);

    // Minimum span: every run plus one separating gap, minus the gap after
    // the last run.
    let min_span: usize = hint
        .iter()
        .map(|&h| usize::from(h) + 1)
        .sum::<usize>()
        .saturating_sub(1);
    // Contradictory hints do not fit the line at all; leave the line to the
    // search, which will exhaust it.
    let Some(slack) = len.checked_sub(min_span) else {
        return;
    };

    let mut position = 0usize;
    for &h in hint {
        let run = usize::from(h);
        let forced = run.saturating_sub(slack);
        position += run - forced;
        for _ in 0..forced {
            set_filled(grid, orientation, line, position, summary);
            position += 1;
        }
        position += 1;
    }
}

/// Marks every cell of a `[0]` line impossible.
fn mark_empty_line(
    grid: &mut Grid,
    hints: &Hints,
    orientation: Orientation,
    line: usize,
    summary: &mut PropagationSummary,
) {
    let hint = hints.line(orientation, line);
    if hint[0] != 0 {
        return;
    }
    for offset in 0..grid.line_len(orientation) {
        set_impossible(grid, orientation, line, offset, summary);
    }
}

/// Extends a filled cell found inside the edge run's span out to the span's
/// end, and for single-hint lines bounds the run's reach from that edge.
fn extend_edge_run(
    grid: &mut Grid,
    hints: &Hints,
    orientation: Orientation,
    line: usize,
    from_end: bool,
    summary: &mut PropagationSummary,
) {
    let hint = hints.line(orientation, line);
    if hint[0] == 0 {
        return;
    }
    let len = grid.line_len(orientation);
    let edge = usize::from(if from_end { hint[hint.len() - 1] } else { hint[0] });
    let span = edge.min(len);

    let offset_at = |i: usize| if from_end { len - 1 - i } else { i };

    let mut seen = false;
    let mut observed = 0usize;
    for i in 0..span {
        let offset = offset_at(i);
        seen |= grid.filled(grid.line_index(orientation, line, offset));
        if seen {
            set_filled(grid, orientation, line, offset, summary);
            observed += 1;
        }
    }

    // A single run that starts within `observed` of this edge cannot reach
    // past 2*edge - observed cells from it.
    if hint.len() == 1 && seen {
        for i in (2 * edge).saturating_sub(observed)..len {
            set_impossible(grid, orientation, line, offset_at(i), summary);
        }
    }
}

fn set_filled(
    grid: &mut Grid,
    orientation: Orientation,
    line: usize,
    offset: usize,
    summary: &mut PropagationSummary,
) {
    let index = grid.line_index(orientation, line, offset);
    if !grid.filled(index) {
        grid.set(index, true);
        summary.filled += 1;
    }
}

fn set_impossible(
    grid: &mut Grid,
    orientation: Orientation,
    line: usize,
    offset: usize,
    summary: &mut PropagationSummary,
) {
    let index = grid.line_index(orientation, line, offset);
    if !grid.impossible(index) {
        grid.mark_impossible(index);
        summary.impossible += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nonogram::hints::HintLine;
    use smallvec::smallvec;

    /// A width-cells wide, one-row puzzle for exercising a single line. The
    /// column hints are placeholders; the line helpers under test only read
    /// the row's hints.
    fn one_row(width: usize, row: HintLine) -> (Grid, Hints) {
        let grid = Grid::new(width, 1);
        let cols = vec![smallvec![0]; width];
        (grid, Hints::from_lines(vec![row], cols))
    }

    #[test]
    fn test_overlap_forces_central_cells() {
        // [2,1] in width 5: slack 1, so only the second cell of the 2-run is
        // shared by all placements.
        let (mut grid, hints) = one_row(5, smallvec![2, 1]);
        let mut summary = PropagationSummary::default();
        overlap_fill(&mut grid, &hints, Orientation::Row, 0, &mut summary);
        let filled: Vec<bool> = (0..5).map(|i| grid.filled(i)).collect();
        assert_eq!(filled, [false, true, false, false, false]);
        assert_eq!(summary.filled, 1);
    }

    #[test]
    fn test_overlap_fills_whole_line_when_exact() {
        let (mut grid, hints) = one_row(5, smallvec![5]);
        let mut summary = PropagationSummary::default();
        overlap_fill(&mut grid, &hints, Orientation::Row, 0, &mut summary);
        assert!((0..5).all(|i| grid.filled(i)));
    }

    #[test]
    fn test_overlap_with_no_slack_fills_gap_layout() {
        // [2,2] in width 5 fits exactly one way: ##.##
        let (mut grid, hints) = one_row(5, smallvec![2, 2]);
        let mut summary = PropagationSummary::default();
        overlap_fill(&mut grid, &hints, Orientation::Row, 0, &mut summary);
        let filled: Vec<bool> = (0..5).map(|i| grid.filled(i)).collect();
        assert_eq!(filled, [true, true, false, true, true]);
        assert!(!grid.impossible(2));
    }

    #[test]
    fn test_empty_line_marked_impossible() {
        // A blank 1x4 puzzle is fully consistent; propagation must pin every
        // cell of the [0] row empty.
        let (mut grid, hints) = one_row(4, smallvec![0]);
        propagate(&mut grid, &hints);
        assert!((0..4).all(|i| grid.impossible(i)));
        assert!((0..4).all(|i| !grid.filled(i)));
    }

    #[test]
    fn test_contradictory_hints_are_skipped() {
        // Needs 6 cells in a width-4 line; the overlap pass must not write.
        let (mut grid, hints) = one_row(4, smallvec![3, 2]);
        let mut summary = PropagationSummary::default();
        overlap_fill(&mut grid, &hints, Orientation::Row, 0, &mut summary);
        assert_eq!(summary, PropagationSummary::default());
        assert!((0..4).all(|i| !grid.filled(i)));
    }

    #[test]
    fn test_edge_run_extension_forward() {
        // Single hint [4] in width 10 with a seed at index 1: the run must
        // cover 1..=3, and cannot reach index 5 or beyond.
        let (mut grid, hints) = one_row(10, smallvec![4]);
        grid.set(1, true);
        let mut summary = PropagationSummary::default();
        extend_edge_run(&mut grid, &hints, Orientation::Row, 0, false, &mut summary);
        assert!(grid.filled(1) && grid.filled(2) && grid.filled(3));
        assert!(!grid.filled(0) && !grid.filled(4));
        assert!((5..10).all(|i| grid.impossible(i)));
        assert!(!grid.impossible(4));
    }

    #[test]
    fn test_edge_run_extension_backward() {
        let (mut grid, hints) = one_row(10, smallvec![4]);
        grid.set(8, true);
        let mut summary = PropagationSummary::default();
        extend_edge_run(&mut grid, &hints, Orientation::Row, 0, true, &mut summary);
        assert!(grid.filled(8) && grid.filled(7) && grid.filled(6));
        assert!(!grid.filled(9) && !grid.filled(5));
        assert!((0..5).all(|i| grid.impossible(i)));
    }

    #[test]
    fn test_edge_extension_without_seed_does_nothing() {
        let (mut grid, hints) = one_row(10, smallvec![4]);
        let mut summary = PropagationSummary::default();
        extend_edge_run(&mut grid, &hints, Orientation::Row, 0, false, &mut summary);
        assert_eq!(summary, PropagationSummary::default());
    }

    #[test]
    fn test_idempotence() {
        // Solvable 5x3 puzzle (one solution: ###.. / .#.#. / .....).
        let rows: Vec<HintLine> = vec![smallvec![3], smallvec![1, 1], smallvec![0]];
        let cols: Vec<HintLine> = vec![
            smallvec![1],
            smallvec![2],
            smallvec![1],
            smallvec![1],
            smallvec![0],
        ];
        let hints = Hints::from_lines(rows, cols);
        let mut grid = Grid::new(5, 3);
        propagate(&mut grid, &hints);
        let snapshot = grid.clone();
        let second = propagate(&mut grid, &hints);
        assert_eq!(grid, snapshot);
        assert_eq!(second, PropagationSummary::default());
    }

    #[test]
    fn test_column_empty_marking_uses_column_length() {
        // Non-square grid: an empty column must mark height cells, not width.
        let mut grid = Grid::new(2, 5);
        let rows: Vec<HintLine> = vec![smallvec![1]; 5];
        let cols: Vec<HintLine> = vec![smallvec![5], smallvec![0]];
        let hints = Hints::from_lines(rows, cols);
        propagate(&mut grid, &hints);
        for y in 0..5 {
            assert!(grid.impossible(grid.index(1, y)), "column cell at y={y}");
            assert!(grid.filled(grid.index(0, y)));
        }
    }
}
