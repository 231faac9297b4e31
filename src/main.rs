//! # nonogram-solver
//!
//! A command-line nonogram (picture-logic) puzzle solver. Puzzles are given
//! as row and column run-length hints in a small text format; the solver
//! finds a consistent board by recursive backtracking, optionally seeded by a
//! constraint-propagation pre-pass that pins every cell the hints force on
//! their own.
//!
//! ## Usage
//!
//! ```sh
//! # Solve a puzzle file with the accelerated (propagated) strategy
//! nonogram-solver puzzle.non
//!
//! # Solve with bare backtracking and debug output
//! nonogram-solver solve --path puzzle.non --solver bare --debug
//!
//! # Solve every .non file under a directory
//! nonogram-solver batch --path puzzles/
//!
//! # Generate a random 10x10 puzzle
//! nonogram-solver generate --width 10 --height 10 --seed 42
//! ```
//!
//! Set `RUST_LOG=debug` for the solver's internal logging.

mod command_line;

/// Global allocator using `tikv-jemallocator` for potentially better
/// performance and memory usage tracking.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    env_logger::init();
    command_line::run();
}
