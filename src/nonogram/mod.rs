#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The nonogram core: grid state, hints, consistency checking, propagation,
//! and the backtracking search, plus the puzzle instance tying them together
//! and the file formats around it.

pub mod checker;
pub mod format;
pub mod grid;
pub mod hints;
pub mod propagation;
pub mod puzzle;
pub mod search;
pub mod solver;

pub use format::FormatError;
pub use grid::{Grid, Orientation};
pub use hints::{HintLine, Hints};
pub use puzzle::{Puzzle, SolveState};
pub use solver::{Backtracking, Propagated, Solution, SolveStats, Solver};
