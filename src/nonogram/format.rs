//! Reading and writing puzzles.
//!
//! Two formats live here. The *text puzzle format* carries hints and is what
//! the command line consumes:
//!
//! ```text
//! # optional comments anywhere
//! 5 5
//! --
//! 1 1          <- one line of row hints per row, top to bottom
//! ...
//! --
//! 2            <- one line of column hints per column, left to right
//! ...
//! ```
//!
//! A blank hint line means the `[0]` empty line. The *binary grid format*
//! persists a board without its hints (they are re-derived on load): one
//! width byte, one height byte, then the cells packed eight to a byte in
//! raster order, most significant bit first. A load either yields a fully
//! consistent instance or an error — never a partially initialised one.

use crate::nonogram::grid::{Grid, MAX_DIMENSION};
use crate::nonogram::hints::HintLine;
use crate::nonogram::puzzle::Puzzle;
use bit_vec::BitVec;
use itertools::Itertools;
use smallvec::smallvec;
use std::cmp::Ordering;
use std::fmt::Display;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;

/// Everything that can go wrong while reading or writing a puzzle.
#[derive(Debug)]
pub enum FormatError {
    /// An underlying I/O failure.
    Io(io::Error),
    /// A malformed line in the text puzzle format.
    Parse {
        /// 1-based line number of the offending input line.
        line: usize,
        /// What was wrong with it.
        message: String,
    },
    /// A dimension of zero or above [`MAX_DIMENSION`].
    BadDimensions {
        width: usize,
        height: usize,
    },
    /// A binary stream that ended before the declared cell count.
    Truncated,
    /// A binary stream with bytes left over after the declared cell count.
    TrailingData,
}

impl Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Parse { line, message } => write!(f, "parse error [line {line}]: {message}"),
            Self::BadDimensions { width, height } => {
                write!(f, "dimensions {width}x{height} outside 1..={MAX_DIMENSION}")
            }
            Self::Truncated => write!(f, "stream ended before the declared cell count"),
            Self::TrailingData => write!(f, "stream continues past the declared cell count"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Rows,
    Cols,
}

/// Parses the text puzzle format from a buffered reader.
///
/// # Errors
///
/// Returns a [`FormatError`] for I/O failures, malformed lines, out-of-range
/// dimensions, or a hint-line count that disagrees with the header.
pub fn parse_puzzle<R: BufRead>(reader: R) -> Result<Puzzle, FormatError> {
    let mut section = Section::Header;
    let mut dimensions: Option<(usize, usize)> = None;
    let mut rows: Vec<HintLine> = Vec::new();
    let mut cols: Vec<HintLine> = Vec::new();
    let mut last_line = 0;

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let number = number + 1;
        last_line = number;
        let trimmed = line.trim();

        if trimmed.starts_with('#') {
            continue;
        }
        if trimmed == "--" {
            section = match section {
                Section::Header => Section::Rows,
                Section::Rows => Section::Cols,
                Section::Cols => {
                    return Err(parse_error(number, "unexpected third section separator"));
                }
            };
            continue;
        }

        match section {
            Section::Header => {
                if trimmed.is_empty() {
                    continue;
                }
                if dimensions.is_some() {
                    return Err(parse_error(number, "expected `--` after the size line"));
                }
                dimensions = Some(parse_header(trimmed, number)?);
            }
            Section::Rows => rows.push(parse_hint_line(trimmed, number)?),
            Section::Cols => cols.push(parse_hint_line(trimmed, number)?),
        }
    }

    let Some((width, height)) = dimensions else {
        return Err(parse_error(last_line, "missing size line"));
    };
    if rows.len() != height {
        return Err(parse_error(
            last_line,
            &format!("expected {height} row hint lines, found {}", rows.len()),
        ));
    }
    if cols.len() != width {
        return Err(parse_error(
            last_line,
            &format!("expected {width} column hint lines, found {}", cols.len()),
        ));
    }
    Ok(Puzzle::from_hints(rows, cols))
}

/// Opens and parses a text puzzle file.
///
/// # Errors
///
/// As [`parse_puzzle`], plus the usual failures opening the file.
pub fn parse_puzzle_file<P: AsRef<Path>>(path: P) -> Result<Puzzle, FormatError> {
    let file = std::fs::File::open(path)?;
    parse_puzzle(BufReader::new(file))
}

/// Writes a puzzle's hints in the text puzzle format.
///
/// # Errors
///
/// Returns a [`FormatError`] wrapping any I/O failure.
pub fn write_puzzle<W: Write>(puzzle: &Puzzle, mut writer: W) -> Result<(), FormatError> {
    writeln!(writer, "{} {}", puzzle.width(), puzzle.height())?;
    writeln!(writer, "--")?;
    for y in 0..puzzle.height() {
        writeln!(writer, "{}", format_hint_line(puzzle.hints().row(y)))?;
    }
    writeln!(writer, "--")?;
    for x in 0..puzzle.width() {
        writeln!(writer, "{}", format_hint_line(puzzle.hints().column(x)))?;
    }
    Ok(())
}

fn format_hint_line(hint: &[u16]) -> String {
    if hint.len() == 1 && hint[0] == 0 {
        String::new()
    } else {
        hint.iter().join(" ")
    }
}

fn parse_header(line: &str, number: usize) -> Result<(usize, usize), FormatError> {
    let fields = line.split_whitespace().collect_vec();
    let [width, height] = fields.as_slice() else {
        return Err(parse_error(number, "size line must be `<width> <height>`"));
    };
    let width: usize = width
        .parse()
        .map_err(|_| parse_error(number, "width is not a number"))?;
    let height: usize = height
        .parse()
        .map_err(|_| parse_error(number, "height is not a number"))?;
    if !(1..=MAX_DIMENSION).contains(&width) || !(1..=MAX_DIMENSION).contains(&height) {
        return Err(FormatError::BadDimensions { width, height });
    }
    Ok((width, height))
}

fn parse_hint_line(line: &str, number: usize) -> Result<HintLine, FormatError> {
    if line.is_empty() {
        return Ok(smallvec![0]);
    }
    let mut hint = HintLine::new();
    for field in line.split_whitespace() {
        let value: u16 = field
            .parse()
            .map_err(|_| parse_error(number, &format!("`{field}` is not a run length")))?;
        if value == 0 || usize::from(value) > MAX_DIMENSION {
            return Err(parse_error(
                number,
                &format!("run length {value} outside 1..={MAX_DIMENSION}"),
            ));
        }
        hint.push(value);
    }
    Ok(hint)
}

fn parse_error(line: usize, message: &str) -> FormatError {
    FormatError::Parse {
        line,
        message: message.to_string(),
    }
}

/// Writes a grid in the binary persistence format.
///
/// # Errors
///
/// Returns a [`FormatError`] wrapping any I/O failure.
pub fn save_grid<W: Write>(grid: &Grid, mut writer: W) -> Result<(), FormatError> {
    // Dimensions are capped at 255 by construction, so one byte each.
    #[allow(clippy::cast_possible_truncation)]
    writer.write_all(&[grid.width() as u8, grid.height() as u8])?;
    writer.write_all(&grid.bits().to_bytes())?;
    Ok(())
}

/// Reads a grid from the binary persistence format.
///
/// # Errors
///
/// Returns [`FormatError::Truncated`] / [`FormatError::TrailingData`] when
/// the stream length disagrees with the header, [`FormatError::BadDimensions`]
/// for a zero dimension, and [`FormatError::Io`] for other I/O failures.
pub fn load_grid<R: Read>(mut reader: R) -> Result<Grid, FormatError> {
    let mut header = [0u8; 2];
    reader.read_exact(&mut header).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            FormatError::Truncated
        } else {
            FormatError::Io(e)
        }
    })?;
    let (width, height) = (usize::from(header[0]), usize::from(header[1]));
    if width == 0 || height == 0 {
        return Err(FormatError::BadDimensions { width, height });
    }

    let expected = (width * height).div_ceil(8);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    match bytes.len().cmp(&expected) {
        Ordering::Less => Err(FormatError::Truncated),
        Ordering::Greater => Err(FormatError::TrailingData),
        Ordering::Equal => {
            let mut cells = BitVec::from_bytes(&bytes);
            cells.truncate(width * height);
            Ok(Grid::from_bits(width, height, cells))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "# a 5x3 sample\n\
                          5 3\n\
                          --\n\
                          3\n\
                          1 1\n\
                          \n\
                          --\n\
                          1\n\
                          2\n\
                          1\n\
                          1\n\
                          \n";

    #[test]
    fn test_parse_sample() {
        let puzzle = parse_puzzle(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(puzzle.width(), 5);
        assert_eq!(puzzle.height(), 3);
        assert_eq!(puzzle.hints().row(0), [3]);
        assert_eq!(puzzle.hints().row(1), [1, 1]);
        assert_eq!(puzzle.hints().row(2), [0]);
        assert_eq!(puzzle.hints().column(1), [2]);
        assert_eq!(puzzle.hints().column(4), [0]);
    }

    #[test]
    fn test_text_round_trip() {
        let puzzle = parse_puzzle(Cursor::new(SAMPLE)).unwrap();
        let mut buffer = Vec::new();
        write_puzzle(&puzzle, &mut buffer).unwrap();
        let again = parse_puzzle(Cursor::new(&buffer)).unwrap();
        assert_eq!(puzzle.hints(), again.hints());
    }

    #[test]
    fn test_parse_rejects_row_count_mismatch() {
        let input = "2 2\n--\n1\n--\n1\n1\n";
        let result = parse_puzzle(Cursor::new(input));
        assert!(matches!(result, Err(FormatError::Parse { .. })));
    }

    #[test]
    fn test_parse_rejects_bad_run_length() {
        let input = "2 1\n--\nx\n--\n1\n1\n";
        let Err(FormatError::Parse { line, .. }) = parse_puzzle(Cursor::new(input)) else {
            panic!("expected a parse error");
        };
        assert_eq!(line, 3);
    }

    #[test]
    fn test_parse_rejects_zero_run_in_multi_hint() {
        let input = "2 1\n--\n0 1\n--\n1\n1\n";
        assert!(matches!(
            parse_puzzle(Cursor::new(input)),
            Err(FormatError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_oversized_board() {
        let input = "300 2\n--\n--\n";
        assert!(matches!(
            parse_puzzle(Cursor::new(input)),
            Err(FormatError::BadDimensions { width: 300, .. })
        ));
    }

    #[test]
    fn test_binary_round_trip() {
        let cells: Vec<bool> = (0..15).map(|i| i % 2 == 0).collect();
        let grid = Grid::from_cells(5, 3, &cells);
        let mut buffer = Vec::new();
        save_grid(&grid, &mut buffer).unwrap();
        assert_eq!(buffer.len(), 2 + 2);
        let loaded = load_grid(Cursor::new(&buffer)).unwrap();
        assert_eq!(loaded, grid);
    }

    #[test]
    fn test_binary_truncated_stream() {
        let grid = Grid::from_cells(4, 4, &[false; 16]);
        let mut buffer = Vec::new();
        save_grid(&grid, &mut buffer).unwrap();
        buffer.pop();
        assert!(matches!(
            load_grid(Cursor::new(&buffer)),
            Err(FormatError::Truncated)
        ));
    }

    #[test]
    fn test_binary_trailing_garbage() {
        let grid = Grid::from_cells(4, 4, &[false; 16]);
        let mut buffer = Vec::new();
        save_grid(&grid, &mut buffer).unwrap();
        buffer.push(0xFF);
        assert!(matches!(
            load_grid(Cursor::new(&buffer)),
            Err(FormatError::TrailingData)
        ));
    }

    #[test]
    fn test_binary_zero_dimension() {
        assert!(matches!(
            load_grid(Cursor::new([0u8, 4u8])),
            Err(FormatError::BadDimensions { .. })
        ));
    }

    #[test]
    fn test_binary_empty_stream() {
        assert!(matches!(
            load_grid(Cursor::new([0u8; 0])),
            Err(FormatError::Truncated)
        ));
    }

    #[test]
    fn test_puzzle_save_load_derives_hints() {
        let original = Puzzle::from_cells(3, 2, &[true, true, false, false, false, true]);
        let mut buffer = Vec::new();
        original.save(&mut buffer).unwrap();
        let loaded = Puzzle::load(Cursor::new(&buffer)).unwrap();
        assert_eq!(loaded.hints(), original.hints());
        assert_eq!(loaded.grid(), original.grid());
    }
}
