#![warn(missing_docs)]
//! A nonogram (picture-logic) puzzle solver: recursive backtracking over the
//! cell grid, accelerated by a constraint-propagation pre-pass that pins
//! every cell the hints force on their own.

/// The `nonogram` module holds the whole core: grid state, the hint model,
/// the consistency checker, the propagation engine, the backtracking search,
/// and the puzzle instance with its file formats.
pub mod nonogram;
