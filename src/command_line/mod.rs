//! Command-line surface of the solver binary.

mod cli;

pub(crate) use cli::run;
