//! Per-record column count validation.
//!
//! The first line (header) fixes the expected field count; every later line is
//! tokenized on its own and compared against it. Blank lines are not skipped:
//! they tokenize to one empty field like any other line.

use serde::Serialize;

use crate::delimiter::Delimiter;
use crate::error::{CheckError, Result};
use crate::stats::FieldCountStats;
use crate::tokenizer::{count_fields, has_nested_delimiter};

/// A line whose field count differs from the header's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// 1-based line number.
    pub line: usize,
    /// Field count found on the line.
    pub observed: usize,
    /// Field count the line was held to: the header's, or the configured
    /// column count when the line matches the header but not the override.
    pub expected: usize,
}

impl Mismatch {
    /// Returns true if the line has more fields than expected.
    #[inline]
    pub fn is_over(&self) -> bool {
        self.observed > self.expected
    }

    /// Returns true if the line has fewer fields than expected.
    #[inline]
    pub fn is_under(&self) -> bool {
        self.observed < self.expected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingHeader,
    Validating { expected: usize },
}

/// Streaming validator for one source.
///
/// # Example
///
/// ```
/// use delim_check::{Delimiter, RecordValidator};
///
/// let mut validator = RecordValidator::new(Delimiter::Comma);
/// for line in ["a,b,c", "1,2,3", "4,5"] {
///     validator.push(line);
/// }
/// let validation = validator.finish().unwrap();
/// assert_eq!(validation.expected_count, 3);
/// assert_eq!(validation.mismatches.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RecordValidator {
    delimiter: Delimiter,
    expected_columns: Option<usize>,
    state: State,
    line_no: usize,
    mismatches: Vec<Mismatch>,
    stats: FieldCountStats,
}

impl RecordValidator {
    /// Create a validator awaiting its header line.
    pub fn new(delimiter: Delimiter) -> Self {
        Self {
            delimiter,
            expected_columns: None,
            state: State::AwaitingHeader,
            line_no: 0,
            mismatches: Vec::new(),
            stats: FieldCountStats::new(),
        }
    }

    /// Also require every detail line to have exactly `columns` fields.
    ///
    /// Zero clears the override.
    pub fn expected_columns(&mut self, columns: usize) -> &mut Self {
        self.expected_columns = (columns > 0).then_some(columns);
        self
    }

    /// Number of lines consumed so far.
    #[inline]
    pub fn lines_seen(&self) -> usize {
        self.line_no
    }

    /// Field count fixed by the header, once it has been seen.
    pub fn header_count(&self) -> Option<usize> {
        match self.state {
            State::AwaitingHeader => None,
            State::Validating { expected } => Some(expected),
        }
    }

    /// Feed the next line. Returns the mismatch it produced, if any.
    pub fn push(&mut self, line: &str) -> Option<Mismatch> {
        self.line_no += 1;
        let observed = count_fields(line, self.delimiter);
        let nested = has_nested_delimiter(line, self.delimiter);

        match self.state {
            State::AwaitingHeader => {
                self.stats.record_header(line.len(), nested);
                self.state = State::Validating { expected: observed };
                None
            }
            State::Validating { expected } => {
                self.stats
                    .record_detail(observed, expected, line.len(), nested);

                let off_expected = self.expected_columns.filter(|&cols| cols != observed);
                if off_expected.is_some() {
                    self.stats.off_expected += 1;
                }

                let bound = if observed != expected {
                    Some(expected)
                } else {
                    off_expected
                };

                if let Some(expected) = bound {
                    let mismatch = Mismatch {
                        line: self.line_no,
                        observed,
                        expected,
                    };
                    self.mismatches.push(mismatch);
                    Some(mismatch)
                } else {
                    None
                }
            }
        }
    }

    /// Finish the pass.
    ///
    /// # Errors
    ///
    /// [`CheckError::EmptyInput`] if no line was pushed.
    pub fn finish(self) -> Result<Validation> {
        let State::Validating { expected } = self.state else {
            return Err(CheckError::EmptyInput);
        };

        Ok(Validation {
            delimiter: self.delimiter,
            expected_count: expected,
            expected_columns: self.expected_columns,
            mismatches: self.mismatches,
            stats: self.stats,
        })
    }
}

/// Outcome of validating one source.
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    /// Delimiter used for tokenizing.
    pub delimiter: Delimiter,
    /// Field count of the header line.
    pub expected_count: usize,
    /// Explicit expected column count, if one was configured.
    pub expected_columns: Option<usize>,
    /// Mismatching lines in file order.
    pub mismatches: Vec<Mismatch>,
    /// Field count distribution.
    pub stats: FieldCountStats,
}

impl Validation {
    /// Returns true if no line mismatched.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Returns true if the header itself disagrees with the configured column count.
    pub fn header_conflict(&self) -> bool {
        self.expected_columns
            .is_some_and(|cols| cols != self.expected_count)
    }
}

/// Validate a whole line sequence.
///
/// # Errors
///
/// [`CheckError::EmptyInput`] if `lines` is empty.
pub fn validate<I, S>(lines: I, delimiter: Delimiter) -> Result<Validation>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut validator = RecordValidator::new(delimiter);
    for line in lines {
        validator.push(line.as_ref());
    }
    validator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_clean() {
        let v = validate(
            ["column1,column2,column3", "A,B,c", "D,E,F"],
            Delimiter::Comma,
        )
        .unwrap();
        assert_eq!(v.expected_count, 3);
        assert!(v.is_consistent());
    }

    #[test]
    fn test_validate_quoted_comma_is_one_field() {
        let v = validate(["column1,column2,column3", "A,\"B1,B2\",C"], Delimiter::Comma).unwrap();
        assert_eq!(v.expected_count, 3);
        assert!(v.mismatches.is_empty());
        assert_eq!(v.stats.nested, 1);
    }

    #[test]
    fn test_validate_reports_line_numbers() {
        let v = validate(
            ["col1,col2,col3", "val1,val2", "onlyonefield", "val4,val5,val6,val7"],
            Delimiter::Comma,
        )
        .unwrap();
        assert_eq!(
            v.mismatches,
            vec![
                Mismatch { line: 2, observed: 2, expected: 3 },
                Mismatch { line: 3, observed: 1, expected: 3 },
                Mismatch { line: 4, observed: 4, expected: 3 },
            ]
        );
        assert!(v.mismatches[0].is_under());
        assert!(v.mismatches[2].is_over());
    }

    #[test]
    fn test_validate_blank_line_mismatches() {
        let v = validate(["a,b", "", "c,d"], Delimiter::Comma).unwrap();
        assert_eq!(
            v.mismatches,
            vec![Mismatch { line: 2, observed: 1, expected: 2 }]
        );
    }

    #[test]
    fn test_validate_blank_line_single_column() {
        let v = validate(["header", "", "value"], Delimiter::Comma).unwrap();
        assert!(v.is_consistent());
    }

    #[test]
    fn test_validate_empty() {
        let lines: Vec<String> = Vec::new();
        assert!(matches!(
            validate(lines, Delimiter::Comma),
            Err(CheckError::EmptyInput)
        ));
    }

    #[test]
    fn test_header_only() {
        let v = validate(["a|b|c"], Delimiter::Pipe).unwrap();
        assert_eq!(v.expected_count, 3);
        assert!(v.is_consistent());
        assert_eq!(v.stats.total_records, 1);
        assert_eq!(v.stats.detail_records(), 0);
    }

    #[test]
    fn test_expected_columns_override() {
        let mut validator = RecordValidator::new(Delimiter::Comma);
        validator.expected_columns(4);
        for line in ["col1,col2,col3", "val1,val2,val3", "val4,val5,val6"] {
            validator.push(line);
        }
        let v = validator.finish().unwrap();

        assert!(v.header_conflict());
        assert_eq!(
            v.mismatches,
            vec![
                Mismatch { line: 2, observed: 3, expected: 4 },
                Mismatch { line: 3, observed: 3, expected: 4 },
            ]
        );
        assert!(v.mismatches.iter().all(Mismatch::is_under));
        assert_eq!(v.stats.off_expected, 2);
        assert_eq!(v.stats.equal, 2);
    }

    #[test]
    fn test_header_mismatch_wins_over_override() {
        let mut validator = RecordValidator::new(Delimiter::Comma);
        validator.expected_columns(4);
        validator.push("a,b,c");

        // Off from both bounds: held to the header.
        assert_eq!(
            validator.push("1,2"),
            Some(Mismatch { line: 2, observed: 2, expected: 3 })
        );
        // Matches the override, still off from the header.
        assert_eq!(
            validator.push("1,2,3,4"),
            Some(Mismatch { line: 3, observed: 4, expected: 3 })
        );
    }

    #[test]
    fn test_zero_expected_columns_clears_override() {
        let mut validator = RecordValidator::new(Delimiter::Comma);
        validator.expected_columns(3).expected_columns(0);
        for line in ["a,b,c", "1,2,3"] {
            validator.push(line);
        }
        let v = validator.finish().unwrap();

        assert_eq!(v.expected_columns, None);
        assert!(v.is_consistent());
        assert_eq!(v.stats.off_expected, 0);
    }

    #[test]
    fn test_push_returns_mismatch() {
        let mut validator = RecordValidator::new(Delimiter::Tab);
        assert_eq!(validator.header_count(), None);
        assert_eq!(validator.push("a\tb"), None);
        assert_eq!(validator.header_count(), Some(2));
        assert_eq!(
            validator.push("a"),
            Some(Mismatch { line: 2, observed: 1, expected: 2 })
        );
        assert_eq!(validator.lines_seen(), 2);
    }
}
