#![allow(clippy::cast_precision_loss)]

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use nonogram_solver::nonogram::format;
use nonogram_solver::nonogram::hints::Hints;
use nonogram_solver::nonogram::puzzle::Puzzle;
use nonogram_solver::nonogram::solver::{Backtracking, Propagated, Solution, SolveStats, Solver};
use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};
use walkdir::WalkDir;

/// Defines the command-line interface for the nonogram solver application.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "nonogram-solver", version, about = "A nonogram puzzle solver")]
pub(crate) struct Cli {
    /// An optional path argument. If provided without a subcommand, it's
    /// treated as the path to a puzzle file to solve.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `solve`, `batch`, `generate`).
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub common: CommonOptions,
}

/// Enumerates the available subcommands for the solver.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve a puzzle file in the text puzzle format.
    Solve {
        /// Path to the puzzle file.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve every `.non` puzzle file under a directory.
    Batch {
        /// Path to the directory of puzzle files.
        #[arg(long)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate a random puzzle and print it in the text puzzle format.
    /// The hints are derived from a random board, so the puzzle is solvable
    /// by construction.
    Generate {
        /// Board width in cells.
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..))]
        width: u8,

        /// Board height in cells.
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..))]
        height: u8,

        /// Probability that a cell of the generating board is filled.
        #[arg(long, default_value_t = 0.5)]
        density: f64,

        /// Seed for reproducible generation; random when omitted.
        #[arg(long)]
        seed: Option<u64>,

        /// Write the puzzle here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// The solving strategy to apply.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum StrategyType {
    /// Exhaustive backtracking from an empty board.
    Bare,
    /// Propagation pre-pass, then the same backtracking.
    #[default]
    Propagated,
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CommonOptions {
    /// Enable debug output, providing more verbose logging during the solving process.
    #[arg(short, long, default_value_t = false)]
    pub(crate) debug: bool,

    /// Enable verification of the found solution against the puzzle's hints.
    #[arg(short, long, default_value_t = true)]
    pub(crate) verify: bool,

    /// Enable printing of performance and problem statistics after solving.
    #[arg(short, long, default_value_t = true)]
    pub(crate) stats: bool,

    /// Enable printing of the solved board.
    #[arg(short, long, default_value_t = true)]
    pub(crate) print_solution: bool,

    /// Specifies the solving strategy to use.
    #[arg(long, value_enum, default_value_t = StrategyType::Propagated)]
    pub(crate) solver: StrategyType,
}

/// Parses the command line and dispatches to the matching handler.
pub(crate) fn run() {
    let cli = Cli::parse();

    // A bare path argument without a subcommand solves that file.
    if let Some(path) = cli.path.clone() {
        if cli.command.is_none() {
            solve_file(&path, &cli.common);
            return;
        }
    }

    match cli.command {
        Some(Commands::Solve { path, common }) => solve_file(&path, &common),
        Some(Commands::Batch { path, common }) => solve_dir(&path, &common),
        Some(Commands::Generate {
            width,
            height,
            density,
            seed,
            output,
        }) => generate(width, height, density, seed, output.as_deref()),
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "nonogram-solver",
                &mut io::stdout(),
            );
        }
        None => {
            eprintln!("No command provided. Use --help for more information.");
            std::process::exit(1);
        }
    }
}

/// Parses a puzzle file, solves it, and reports the outcome.
fn solve_file(path: &Path, common: &CommonOptions) {
    let parse_start = Instant::now();
    let mut puzzle = match format::parse_puzzle_file(path) {
        Ok(puzzle) => puzzle,
        Err(e) => {
            eprintln!("Error parsing puzzle file {}: {e}", path.display());
            std::process::exit(1);
        }
    };
    let parse_time = parse_start.elapsed();

    println!("Solving: {}", path.display());
    if common.debug {
        println!("Grid: {}x{}", puzzle.width(), puzzle.height());
        for y in 0..puzzle.height() {
            println!("Row {y}: {:?}", puzzle.hints().row(y));
        }
        for x in 0..puzzle.width() {
            println!("Col {x}: {:?}", puzzle.hints().column(x));
        }
    }

    let (solution, elapsed, solve_stats) = solve(&mut puzzle, common);
    let (allocated_mib, resident_mib) = memory_mib();

    if common.verify {
        verify_solution(&puzzle, solution.as_ref());
    }

    if common.stats {
        print_stats(
            parse_time,
            elapsed,
            &puzzle,
            &solve_stats,
            allocated_mib,
            resident_mib,
        );
    }

    match &solution {
        Some(solution) if common.print_solution => println!("\n{solution}"),
        Some(_) => {}
        None => println!("No solution found"),
    }

    if solution.is_some() {
        println!("\nSOLVED");
    } else {
        println!("\nUNSOLVABLE");
    }
}

/// Solves every `.non` puzzle file under a directory and prints a summary.
fn solve_dir(path: &Path, common: &CommonOptions) {
    if !path.is_dir() {
        eprintln!("Provided path is not a directory: {}", path.display());
        std::process::exit(1);
    }

    let mut outcomes: FxHashMap<&'static str, usize> = FxHashMap::default();

    for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        if file_path.extension().is_none_or(|ext| ext != "non") {
            eprintln!("Skipping non-puzzle file: {}", file_path.display());
            continue;
        }

        let outcome = match format::parse_puzzle_file(file_path) {
            Err(e) => {
                eprintln!("Error parsing {}: {e}", file_path.display());
                "parse error"
            }
            Ok(mut puzzle) => {
                let (solution, elapsed, solve_stats) = solve(&mut puzzle, common);
                println!(
                    "{}: {} in {:.3}s ({} decisions, {} conflicts)",
                    file_path.display(),
                    if solution.is_some() { "solved" } else { "no solution" },
                    elapsed.as_secs_f64(),
                    solve_stats.decisions,
                    solve_stats.conflicts
                );
                if solution.is_some() { "solved" } else { "no solution" }
            }
        };
        *outcomes.entry(outcome).or_insert(0) += 1;
    }

    println!("\n========================[ Batch Summary ]============================");
    for (outcome, count) in outcomes.iter().sorted() {
        stat_line(outcome, count);
    }
    println!("=====================================================================");
}

/// Generates a random board, derives its hints, and emits the puzzle in the
/// text puzzle format.
///
/// # Panics
///
/// Panics if the output file cannot be written.
fn generate(width: u8, height: u8, density: f64, seed: Option<u64>, output: Option<&Path>) {
    let mut rng = seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let (width, height) = (usize::from(width), usize::from(height));
    let cells: Vec<bool> = (0..width * height).map(|_| rng.f64() < density).collect();
    let puzzle = Puzzle::from_cells(width, height, &cells);

    match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .unwrap_or_else(|e| panic!("Unable to create {}: {e}", path.display()));
            write_or_die(&puzzle, file, path);
            println!("Puzzle written to: {}", path.display());
        }
        None => write_or_die(&puzzle, io::stdout(), Path::new("stdout")),
    }
}

fn write_or_die<W: io::Write>(puzzle: &Puzzle, writer: W, label: &Path) {
    format::write_puzzle(puzzle, writer)
        .unwrap_or_else(|e| panic!("Unable to write {}: {e}", label.display()));
}

/// Runs the selected strategy over the puzzle and times it.
fn solve(puzzle: &mut Puzzle, common: &CommonOptions) -> (Option<Solution>, Duration, SolveStats) {
    // Advance epoch for jemalloc stats, helps isolate memory usage for this
    // solving phase.
    epoch::advance().unwrap();

    let time = Instant::now();
    let (solution, solve_stats) = match common.solver {
        StrategyType::Bare => {
            let mut solver = Backtracking::new();
            (solver.solve(puzzle), solver.stats())
        }
        StrategyType::Propagated => {
            let mut solver = Propagated::new();
            (solver.solve(puzzle), solver.stats())
        }
    };
    let elapsed = time.elapsed();

    if common.debug {
        println!("Solution: {solution:?}");
        println!("Time: {elapsed:?}");
    }

    (solution, elapsed, solve_stats)
}

/// Verifies a found solution by re-deriving hints from the solved board and
/// comparing them against the puzzle's own.
///
/// # Panics
///
/// Panics if the solved board does not reproduce the puzzle's hints.
fn verify_solution(puzzle: &Puzzle, solution: Option<&Solution>) {
    if solution.is_some() {
        let ok = Hints::derived_from(puzzle.grid()) == *puzzle.hints();
        println!("Verified: {ok:?}");
        assert!(ok, "Solution failed verification!");
    } else {
        println!("UNSOLVABLE");
    }
}

/// Reads jemalloc's allocation figures, in MiB.
fn memory_mib() -> (f64, f64) {
    epoch::advance().unwrap();
    let allocated_bytes = stats::allocated::mib().unwrap().read().unwrap();
    let resident_bytes = stats::resident::mib().unwrap().read().unwrap();
    (
        allocated_bytes as f64 / (1024.0 * 1024.0),
        resident_bytes as f64 / (1024.0 * 1024.0),
    )
}

/// Helper function to print a single statistic line in a formatted table row.
fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate (value/second).
fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics.
fn print_stats(
    parse_time: Duration,
    elapsed: Duration,
    puzzle: &Puzzle,
    s: &SolveStats,
    allocated: f64,
    resident: f64,
) {
    let elapsed_secs = elapsed.as_secs_f64();

    println!("\n=======================[ Problem Statistics ]========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line(
        "Grid",
        format!("{}x{}", puzzle.width(), puzzle.height()),
    );
    stat_line("Cells", puzzle.width() * puzzle.height());

    println!("========================[ Search Statistics ]========================");
    stat_line("Pre-filled cells", s.prefilled);
    stat_line("Pre-marked impossible", s.premarked);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Pinned visits", s.pinned_visits, elapsed_secs);
    stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
    stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("=====================================================================");
}
