//! Main Checker builder and check methods.
//!
//! One check runs the full pipeline for one source: decode, split into lines,
//! detect the delimiter (unless one is given), validate every line and classify
//! the result. Sources never share state, so many can run in parallel.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use crate::delimiter::Delimiter;
use crate::detector::detect;
use crate::error::{CheckError, Result};
use crate::report::{BAD_RECORD_REPORT_LIMIT, BadRecord, SourceReport, Status};
use crate::sample::SampleSize;
use crate::source::{decode, split_lines};
use crate::validator::RecordValidator;

/// Records between progress log lines.
const PROGRESS_INTERVAL: usize = 100_000;

/// Delimiter consistency checker.
///
/// # Example
///
/// ```
/// use delim_check::{Checker, Delimiter, Status};
///
/// let checker = Checker::new();
/// let report = checker.check_bytes("inline", b"a|b|c\n1|2|3\n").unwrap();
/// assert_eq!(report.validation.delimiter, Delimiter::Pipe);
/// assert_eq!(report.status, Status::Good);
///
/// // A bad line makes the sample inconsistent, so the header decides.
/// let report = checker.check_bytes("inline", b"a|b|c\n1|2|3\n4|5\n").unwrap();
/// assert_eq!(report.validation.delimiter, Delimiter::Pipe);
/// assert_eq!(report.status, Status::Bad);
/// assert_eq!(report.validation.mismatches[0].line, 3);
/// ```
#[derive(Debug, Clone)]
pub struct Checker {
    /// Lines used for delimiter detection.
    sample_size: SampleSize,
    /// Optional forced delimiter.
    forced_delimiter: Option<Delimiter>,
    /// Delimiters detection may choose from.
    candidates: Vec<Delimiter>,
    /// Optional expected column count.
    expected_columns: Option<usize>,
    /// Tolerate lines with more fields than the header.
    ignore_over_count: bool,
    /// Batch identifier attached to log output.
    batch_id: Option<String>,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker {
    /// Create a new Checker with default settings.
    pub fn new() -> Self {
        Self {
            sample_size: SampleSize::default(),
            forced_delimiter: None,
            candidates: Delimiter::PRIORITY.to_vec(),
            expected_columns: None,
            ignore_over_count: false,
            batch_id: None,
        }
    }

    /// Set the sample size for delimiter detection.
    pub fn sample_size(&mut self, sample_size: SampleSize) -> &mut Self {
        self.sample_size = sample_size;
        self
    }

    /// Force a specific delimiter (skip delimiter detection).
    pub fn delimiter(&mut self, delimiter: Delimiter) -> &mut Self {
        self.forced_delimiter = Some(delimiter);
        self
    }

    /// Restrict the delimiters detection may choose from.
    pub fn candidates(&mut self, candidates: &[Delimiter]) -> &mut Self {
        self.candidates = candidates.to_vec();
        self
    }

    /// Require every detail line to have exactly `columns` fields.
    ///
    /// Zero means no override.
    pub fn expected_columns(&mut self, columns: usize) -> &mut Self {
        self.expected_columns = (columns > 0).then_some(columns);
        self
    }

    /// Classify sources whose only mismatches are over-count lines as Fair.
    pub fn ignore_over_count(&mut self, ignore: bool) -> &mut Self {
        self.ignore_over_count = ignore;
        self
    }

    /// Attach a batch identifier to log output.
    pub fn batch_id(&mut self, batch_id: impl Into<String>) -> &mut Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    /// Check a file at the given path.
    pub fn check_path<P: AsRef<Path>>(&self, path: P) -> Result<SourceReport> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        self.check_bytes(&path.display().to_string(), &data)
    }

    /// Check data from a reader.
    pub fn check_reader<R: Read>(&self, source: &str, mut reader: R) -> Result<SourceReport> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.check_bytes(source, &data)
    }

    /// Check raw bytes.
    pub fn check_bytes(&self, source: &str, data: &[u8]) -> Result<SourceReport> {
        let text = decode(data);
        let lines = split_lines(&text);
        self.check_lines(source, &lines)
    }

    /// Check an already split line sequence.
    pub fn check_lines<S: AsRef<str>>(&self, source: &str, lines: &[S]) -> Result<SourceReport> {
        let span = info_span!(
            "check",
            source,
            batch = self.batch_id.as_deref().unwrap_or_default()
        );
        let _guard = span.enter();

        let Some(header) = lines.first() else {
            warn!("source has no lines");
            return Err(CheckError::EmptyInput);
        };

        let (delimiter, detected) = match self.forced_delimiter {
            Some(delimiter) => (delimiter, false),
            None => (self.detect_delimiter(lines)?, true),
        };
        debug!(delimiter = delimiter.name(), detected, "delimiter selected");

        let mut validator = RecordValidator::new(delimiter);
        if let Some(columns) = self.expected_columns {
            validator.expected_columns(columns);
        }

        let mut bad_records = Vec::new();
        for line in lines {
            let line = line.as_ref();
            if let Some(mismatch) = validator.push(line) {
                if bad_records.len() < BAD_RECORD_REPORT_LIMIT {
                    bad_records.push(BadRecord {
                        line: mismatch.line,
                        observed: mismatch.observed,
                        text: line.to_string(),
                    });
                    if bad_records.len() == BAD_RECORD_REPORT_LIMIT {
                        debug!(limit = BAD_RECORD_REPORT_LIMIT, "bad record report limit reached");
                    }
                }
            }

            let seen = validator.lines_seen();
            if seen % PROGRESS_INTERVAL == 0 {
                info!(records = seen, "processing");
            }
        }

        let validation = validator.finish()?;
        let status = Status::classify(&validation, self.ignore_over_count);

        info!(
            %status,
            delimiter = delimiter.name(),
            fields = validation.expected_count,
            records = validation.stats.total_records,
            mismatches = validation.mismatches.len(),
            "checked"
        );
        if validation.header_conflict() {
            warn!(
                expected = ?self.expected_columns,
                found = validation.expected_count,
                "header does not match expected columns: correct filename with wrong data, or wrong file"
            );
        }

        Ok(SourceReport {
            source: source.to_string(),
            status,
            detected,
            validation,
            header: header.as_ref().to_string(),
            bad_records,
        })
    }

    /// Check many files in parallel.
    ///
    /// Results keep the order of `paths`. A failing source does not stop the
    /// others.
    pub fn check_paths(&self, paths: &[PathBuf]) -> Vec<(PathBuf, Result<SourceReport>)> {
        paths
            .par_iter()
            .map(|path| (path.clone(), self.check_path(path)))
            .collect()
    }

    fn detect_delimiter<S: AsRef<str>>(&self, lines: &[S]) -> Result<Delimiter> {
        let sample = self.sample_size.apply(lines);
        if sample.is_empty() {
            return Err(CheckError::InvalidConfig(
                "detection sample must hold at least one record".to_string(),
            ));
        }

        match detect(sample, &self.candidates) {
            Err(CheckError::NoDelimiterFound) if sample.len() > 1 => {
                debug!(
                    sampled = sample.len(),
                    "no consistent delimiter in sample, detecting on the header"
                );
                detect(&sample[..1], &self.candidates)
            }
            result => result,
        }
        .inspect_err(|e| {
            warn!(sampled = sample.len(), "delimiter detection failed: {e}");
        })
    }
}
