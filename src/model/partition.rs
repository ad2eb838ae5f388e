//! Column ranges of a supermatrix attributable to one marker.
//!
//! Partition files list one marker per line as `name = start-end` in 1-based
//! inclusive coordinates, in concatenation order. RAxML-style lines with a
//! leading model (`DNA, ITS = 1-520`) are accepted on input.

use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;
use std::fmt;
use std::ops::Range;
use std::path::Path;

// =#========================================================================#=
// PARTITION
// =#========================================================================#=
/// Contiguous 1-based, inclusive column range `start..=end` named after its marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    name: String,
    start: usize,
    end: usize,
}

impl Partition {
    /// Creates a new partition.
    ///
    /// # Panics
    /// Panics if `start` is 0 or `end < start`.
    pub fn new<S: Into<String>>(name: S, start: usize, end: usize) -> Self {
        assert!(start >= 1, "Partitions are 1-based, got start {}", start);
        assert!(end >= start, "Empty partition {}-{}", start, end);
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Marker name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First column, 1-based
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last column, 1-based and inclusive
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always `false`, partitions span at least one column
    pub fn is_empty(&self) -> bool {
        false
    }

    /// 0-based, half-open column range for slicing rows.
    pub fn range(&self) -> Range<usize> {
        (self.start - 1)..self.end
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}-{}", self.name, self.start, self.end)
    }
}

// ============================================================================
// Parsing (pub)
// ============================================================================
/// Parses partition lines from a string.
///
/// Blank lines and lines starting with `#` are skipped.
///
/// # Example
/// ```
/// use fungphy::model::partition::parse_partitions;
///
/// let partitions = parse_partitions("ITS = 1-520\nDNA, BenA = 521-1000\n").unwrap();
/// assert_eq!(partitions[1].name(), "BenA");
/// assert_eq!(partitions[1].len(), 480);
/// ```
pub fn parse_partitions(text: &str) -> Result<Vec<Partition>, ParsingError> {
    parse_all(ByteParser::for_str(text))
}

/// Parses a partition file.
pub fn read_partitions<P: AsRef<Path>>(path: P) -> Result<Vec<Partition>, ParsingError> {
    parse_all(ByteParser::from_file(path)?)
}

/// Checks that partitions are contiguous, start at column 1 and, if given,
/// cover exactly `num_columns`.
///
/// # Returns
/// An error message naming the first offending partition.
pub fn check_contiguous(partitions: &[Partition], num_columns: Option<usize>) -> Result<(), String> {
    let mut expected_start = 1;
    for partition in partitions {
        if partition.start != expected_start {
            return Err(format!(
                "partition '{}' starts at column {}, expected {}",
                partition, partition.start, expected_start
            ));
        }
        expected_start = partition.end + 1;
    }

    match num_columns {
        Some(n) if expected_start - 1 != n => Err(format!(
            "partitions cover {} columns, alignment has {}",
            expected_start - 1,
            n
        )),
        _ => Ok(()),
    }
}

fn parse_all<S: ByteSource>(mut parser: ByteParser<S>) -> Result<Vec<Partition>, ParsingError> {
    let mut partitions = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.is_eof() {
            break;
        }
        if parser.peek_is(b'#') {
            parser.parse_unquoted_label(b"\n");
            continue;
        }
        partitions.push(parse_line(&mut parser)?);
    }
    Ok(partitions)
}

/// Parses `[MODEL,] name = start-end` up to the end of the line.
fn parse_line<S: ByteSource>(parser: &mut ByteParser<S>) -> Result<Partition, ParsingError> {
    let mut name = parser.parse_unquoted_label(b",=\n").trim().to_string();
    if parser.consume_if(b',') {
        // Leading model, e.g. "DNA, ITS = 1-520"
        name = parser.parse_unquoted_label(b"=\n").trim().to_string();
    }
    if name.is_empty() {
        return Err(ParsingError::invalid_partition(
            parser,
            "Missing marker name".to_string(),
        ));
    }

    if !parser.consume_if(b'=') {
        return Err(ParsingError::invalid_partition(
            parser,
            format!("Expected '=' after marker name '{}'", name),
        ));
    }

    let start = parse_column(parser)?;
    skip_blanks(parser);
    if !parser.consume_if(b'-') {
        return Err(ParsingError::invalid_partition(
            parser,
            format!("Expected '-' in column range of '{}'", name),
        ));
    }
    let end = parse_column(parser)?;

    let rest = parser.parse_unquoted_label(b"\n");
    if !rest.trim().is_empty() {
        return Err(ParsingError::invalid_partition(
            parser,
            format!("Unexpected '{}' after column range of '{}'", rest.trim(), name),
        ));
    }

    if start == 0 || end < start {
        return Err(ParsingError::invalid_partition(
            parser,
            format!("Invalid column range {}-{} for '{}'", start, end, name),
        ));
    }

    Ok(Partition::new(name, start, end))
}

/// Parses a column number, skipping blanks before it.
fn parse_column<S: ByteSource>(parser: &mut ByteParser<S>) -> Result<usize, ParsingError> {
    skip_blanks(parser);
    let mut digits = String::new();
    while let Some(b) = parser.peek() {
        if !b.is_ascii_digit() {
            break;
        }
        digits.push(b as char);
        parser.next_byte();
    }

    digits.parse().map_err(|_| {
        ParsingError::invalid_partition(parser, format!("Invalid column number '{}'", digits))
    })
}

/// Skips spaces and tabs, but not newlines.
fn skip_blanks<S: ByteSource>(parser: &mut ByteParser<S>) {
    while matches!(parser.peek(), Some(b' ' | b'\t')) {
        parser.next_byte();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_parse_with_comments_and_blank_lines() {
        let text = "# markers\nITS = 1-520\n\n  BenA=521-1000  \n";
        let partitions = parse_partitions(text).unwrap();
        assert_eq!(
            partitions,
            vec![Partition::new("ITS", 1, 520), Partition::new("BenA", 521, 1000)]
        );
    }

    #[test_case("ITS 1-520" ; "missing equals sign")]
    #[test_case("ITS = 1520" ; "missing range dash")]
    #[test_case("ITS = 0-520" ; "zero start")]
    #[test_case("ITS = 30-20" ; "reversed range")]
    #[test_case("ITS = 1-520 extra" ; "trailing text")]
    #[test_case(" = 1-520" ; "empty name")]
    fn test_parse_errors(line: &str) {
        assert!(parse_partitions(line).is_err());
    }

    #[test]
    fn test_check_contiguous() {
        let partitions = vec![Partition::new("ITS", 1, 520), Partition::new("BenA", 521, 1000)];
        assert!(check_contiguous(&partitions, Some(1000)).is_ok());
        assert!(check_contiguous(&partitions, Some(999)).is_err());

        let gap = vec![Partition::new("ITS", 1, 520), Partition::new("BenA", 530, 1000)];
        assert!(check_contiguous(&gap, None).is_err());
    }
}
