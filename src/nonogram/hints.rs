//! The hint model: ordered run-length sequences for every row and column.
//!
//! Hints are the ground truth handed to the solver; the solver never
//! recomputes them. Derivation from a grid exists for the authoring and
//! manual-editing workflow: scan a line once, open a new run on every
//! false-to-true transition, and drop a trailing empty run. A line with no
//! filled cells is represented by the single-element sequence `[0]`.

use crate::nonogram::grid::{Grid, Orientation};
use smallvec::{SmallVec, smallvec};

/// One line's run lengths, left to right (rows) or top to bottom (columns).
///
/// Runs are short in practice; eight inline slots cover any line of a
/// 255-cell board that a human would publish.
pub type HintLine = SmallVec<[u16; 8]>;

/// Per-row and per-column hints of one puzzle instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hints {
    rows: Vec<HintLine>,
    cols: Vec<HintLine>,
}

impl Hints {
    /// Builds the model from explicit per-line sequences. Empty input lines
    /// are normalised to the `[0]` convention.
    #[must_use]
    pub fn from_lines(rows: Vec<HintLine>, cols: Vec<HintLine>) -> Self {
        let normalise = |mut line: HintLine| {
            if line.is_empty() {
                line.push(0);
            }
            line
        };
        Self {
            rows: rows.into_iter().map(normalise).collect(),
            cols: cols.into_iter().map(normalise).collect(),
        }
    }

    /// Hints for an entirely blank board: every line is `[0]`.
    #[must_use]
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            rows: vec![smallvec![0]; height],
            cols: vec![smallvec![0]; width],
        }
    }

    /// Derives every line's hints from the current grid.
    #[must_use]
    pub fn derived_from(grid: &Grid) -> Self {
        let mut hints = Self::empty(grid.width(), grid.height());
        hints.regenerate(grid);
        hints
    }

    /// Number of hinted columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.cols.len()
    }

    /// Number of hinted rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// The run lengths of row `y`.
    #[must_use]
    pub fn row(&self, y: usize) -> &[u16] {
        &self.rows[y]
    }

    /// The run lengths of column `x`.
    #[must_use]
    pub fn column(&self, x: usize) -> &[u16] {
        &self.cols[x]
    }

    /// The run lengths of line `line` in the given orientation.
    #[must_use]
    pub fn line(&self, orientation: Orientation, line: usize) -> &[u16] {
        match orientation {
            Orientation::Row => self.row(line),
            Orientation::Column => self.column(line),
        }
    }

    /// Re-derives every line from `grid`.
    pub fn regenerate(&mut self, grid: &Grid) {
        for y in 0..grid.height() {
            self.update_row(grid, y);
        }
        for x in 0..grid.width() {
            self.update_column(grid, x);
        }
    }

    /// Re-derives a single row, for incremental updates after a cell edit.
    pub fn update_row(&mut self, grid: &Grid, y: usize) {
        self.rows[y] = scan_line(grid, Orientation::Row, y);
    }

    /// Re-derives a single column, for incremental updates after a cell edit.
    pub fn update_column(&mut self, grid: &Grid, x: usize) {
        self.cols[x] = scan_line(grid, Orientation::Column, x);
    }
}

/// Run-length encodes one line of the grid.
fn scan_line(grid: &Grid, orientation: Orientation, line: usize) -> HintLine {
    let mut hints: HintLine = smallvec![0];
    let mut previous = false;
    for offset in 0..grid.line_len(orientation) {
        let current = grid.filled(grid.line_index(orientation, line, offset));
        if current {
            let open = hints.len() - 1;
            hints[open] += 1;
        }
        if previous && !current {
            hints.push(0);
        }
        previous = current;
    }
    // A run followed by trailing empties leaves a dangling zero.
    if hints.len() > 1 && hints[hints.len() - 1] == 0 {
        hints.pop();
    }
    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from_rows(rows: &[&str]) -> Grid {
        let height = rows.len();
        let width = rows[0].len();
        let cells: Vec<bool> = rows
            .iter()
            .flat_map(|row| row.chars().map(|c| c == '#'))
            .collect();
        Grid::from_cells(width, height, &cells)
    }

    #[test]
    fn test_empty_line_is_single_zero() {
        let grid = Grid::new(5, 1);
        let hints = Hints::derived_from(&grid);
        assert_eq!(hints.row(0), [0]);
        assert_eq!(hints.column(3), [0]);
    }

    #[test]
    fn test_runs_are_scanned_in_order() {
        let grid = grid_from_rows(&["##.#.", ".####"]);
        let hints = Hints::derived_from(&grid);
        assert_eq!(hints.row(0), [2, 1]);
        assert_eq!(hints.row(1), [4]);
        assert_eq!(hints.column(0), [1]);
        assert_eq!(hints.column(1), [2]);
        assert_eq!(hints.column(2), [1]);
        assert_eq!(hints.column(3), [2]);
        assert_eq!(hints.column(4), [1]);
    }

    #[test]
    fn test_trailing_empty_run_is_dropped() {
        let grid = grid_from_rows(&["#..."]);
        let hints = Hints::derived_from(&grid);
        assert_eq!(hints.row(0), [1]);
    }

    #[test]
    fn test_line_ending_mid_run() {
        let grid = grid_from_rows(&["..###"]);
        let hints = Hints::derived_from(&grid);
        assert_eq!(hints.row(0), [3]);
    }

    #[test]
    fn test_full_line() {
        let grid = grid_from_rows(&["#####"]);
        let hints = Hints::derived_from(&grid);
        assert_eq!(hints.row(0), [5]);
    }

    #[test]
    fn test_incremental_update_matches_full_regeneration() {
        let mut grid = grid_from_rows(&["#.#..", ".....", "##.##"]);
        let mut hints = Hints::derived_from(&grid);
        grid.set(grid.index(3, 1), true);
        hints.update_row(&grid, 1);
        hints.update_column(&grid, 3);
        assert_eq!(hints, Hints::derived_from(&grid));
    }

    #[test]
    fn test_from_lines_normalises_empty_sequences() {
        let hints = Hints::from_lines(
            vec![smallvec![2], HintLine::new()],
            vec![smallvec![1], smallvec![1]],
        );
        assert_eq!(hints.row(1), [0]);
    }
}
