//! Per-source results and their renderings.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::Result;
use crate::validator::Validation;

/// Maximum number of bad record texts kept per source.
pub const BAD_RECORD_REPORT_LIMIT: usize = 100;

/// Suffix of the error report written next to a failing file.
pub const ERROR_REPORT_SUFFIX: &str = ".ERROR_DELIMITER";

/// Classification of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Every detail line matches the header.
    Good,
    /// Every mismatch has more fields than the header, and over-count lines
    /// were tolerated.
    Fair,
    /// At least one line fails the check.
    Bad,
}

impl Status {
    /// Classify a validation result.
    pub fn classify(validation: &Validation, ignore_over_count: bool) -> Self {
        if validation.is_consistent() {
            Status::Good
        } else if ignore_over_count && validation.mismatches.iter().all(|m| m.is_over()) {
            Status::Fair
        } else {
            Status::Bad
        }
    }

    /// Returns true for Good and Fair.
    #[inline]
    pub fn is_passing(self) -> bool {
        !matches!(self, Status::Bad)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Good => write!(f, "GOOD"),
            Status::Fair => write!(f, "FAIR"),
            Status::Bad => write!(f, "BAD"),
        }
    }
}

/// The text of a mismatching line, kept for the error report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadRecord {
    /// 1-based line number.
    pub line: usize,
    /// Field count found on the line.
    pub observed: usize,
    /// The raw line.
    pub text: String,
}

/// Everything known about one checked source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    /// Source name, usually the file path.
    pub source: String,
    /// Classification of the source.
    pub status: Status,
    /// Whether the delimiter was inferred rather than supplied.
    pub detected: bool,
    /// Validation outcome.
    #[serde(flatten)]
    pub validation: Validation,
    /// The header line.
    #[serde(skip)]
    pub header: String,
    /// The first mismatching lines, up to [`BAD_RECORD_REPORT_LIMIT`].
    #[serde(skip)]
    pub bad_records: Vec<BadRecord>,
}

impl SourceReport {
    /// Number of mismatching lines.
    #[inline]
    pub fn mismatch_count(&self) -> usize {
        self.validation.mismatches.len()
    }
}

/// Write a human-readable summary of `report`.
///
/// With `verbose`, every mismatch is listed by line number.
pub fn write_text<W: Write>(out: &mut W, report: &SourceReport, verbose: bool) -> Result<()> {
    let v = &report.validation;
    let stats = &v.stats;

    writeln!(out, "File: {}", report.source)?;
    writeln!(out, "  Status: {}", report.status)?;
    writeln!(
        out,
        "  Delimiter: {:?} ({})",
        v.delimiter.as_char(),
        if report.detected { "detected" } else { "given" }
    )?;
    writeln!(out, "  Header fields: {}", v.expected_count)?;
    if let Some(cols) = v.expected_columns {
        writeln!(out, "  Expected fields: {cols}")?;
        if v.header_conflict() {
            writeln!(
                out,
                "  Header does not match expected fields: correct filename with wrong data, or wrong file"
            )?;
        }
    }
    writeln!(
        out,
        "  Records: {} (1 header, {} detail)",
        stats.total_records,
        stats.detail_records()
    )?;
    writeln!(
        out,
        "  Under/Equal/Over: {}/{}/{}",
        stats.under, stats.equal, stats.over
    )?;
    writeln!(out, "  Nested delimiters: {}", stats.nested)?;

    let histogram = stats.histogram();
    if !histogram.is_empty() {
        writeln!(out, "  Field counts (fields: records):")?;
        for (fields, records) in histogram {
            writeln!(out, "    {fields}: {records}")?;
        }
    }

    writeln!(out, "  Mismatches: {}", report.mismatch_count())?;
    if verbose {
        for m in &v.mismatches {
            writeln!(out, "    line {}: {} fields", m.line, m.observed)?;
        }
    }

    writeln!(out)?;
    Ok(())
}

/// Write `report` as one line of JSON.
pub fn write_json<W: Write>(out: &mut W, report: &SourceReport) -> Result<()> {
    serde_json::to_writer(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

/// CSV output with one row per mismatch across all sources.
pub struct CsvReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvReportWriter<W> {
    /// Create the writer and emit the header row.
    pub fn new(out: W) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(["file", "line", "observed", "expected"])?;
        Ok(Self { writer })
    }

    /// Append the mismatches of one source.
    pub fn write_report(&mut self, report: &SourceReport) -> Result<()> {
        for m in &report.validation.mismatches {
            let line = m.line.to_string();
            let observed = m.observed.to_string();
            let expected = m.expected.to_string();
            self.writer.write_record([
                report.source.as_str(),
                line.as_str(),
                observed.as_str(),
                expected.as_str(),
            ])?;
        }
        Ok(())
    }

    /// Flush buffered rows.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Path of the error report for `path` at time `now`:
/// `<path>_<YYYY_MM_DD_HH_MM_SS>.ERROR_DELIMITER`.
pub fn error_report_path(path: &Path, now: DateTime<Local>) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!("_{}{}", now.format("%Y_%m_%d_%H_%M_%S"), ERROR_REPORT_SUFFIX));
    PathBuf::from(name)
}

/// Write the error report for a source that failed the check.
pub fn write_error_report_to<W: Write>(out: &mut W, report: &SourceReport) -> Result<()> {
    let v = &report.validation;

    writeln!(out, "Bad Delimited File Check Report:")?;
    writeln!(out, "filename       : {}", report.source)?;
    writeln!(out, "delimiter value: {}", v.delimiter)?;
    writeln!(out, "header fields  : {:04}", v.expected_count)?;
    if let Some(cols) = v.expected_columns {
        writeln!(out, "expected fields: {cols:04}")?;
    }

    writeln!(out, "\nField Count Summary:")?;
    writeln!(out, "fcnt records")?;
    writeln!(out, "---- --------")?;
    for (fields, records) in v.stats.histogram() {
        writeln!(out, "{fields:04}:{records:08}")?;
    }

    if let Some(cols) = v.expected_columns.filter(|_| v.header_conflict()) {
        writeln!(
            out,
            "\n*PROBLEM Mismatched Fields: Expected {cols} but found {} records with different field counts",
            v.stats.off_expected
        )?;
    }

    let scope = if report.mismatch_count() > report.bad_records.len() {
        format!("Top {BAD_RECORD_REPORT_LIMIT}")
    } else {
        "All".to_string()
    };
    writeln!(out, "\n{scope} Bad Record Field Detail:")?;
    writeln!(out, " record#  fcnt data")?;
    writeln!(out, "--------- ---- {}", "-".repeat(v.stats.max_line_len))?;
    writeln!(
        out,
        "{:09}:{:04}:{} (header)",
        1, v.expected_count, report.header
    )?;
    for bad in &report.bad_records {
        writeln!(out, "{:09}:{:04}:{}", bad.line, bad.observed, bad.text)?;
    }

    Ok(())
}

/// Write the error report for `report` next to `path` and return where it went.
pub fn write_error_report(path: &Path, report: &SourceReport) -> Result<PathBuf> {
    let target = error_report_path(path, Local::now());
    let mut file = BufWriter::new(File::create(&target)?);
    write_error_report_to(&mut file, report)?;
    file.flush()?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delimiter::Delimiter;
    use crate::validator::{RecordValidator, validate};
    use chrono::TimeZone;

    fn report_for(lines: &[&str], ignore_over_count: bool) -> SourceReport {
        let validation = validate(lines, Delimiter::Comma).unwrap();
        let status = Status::classify(&validation, ignore_over_count);
        let bad_records = validation
            .mismatches
            .iter()
            .map(|m| BadRecord {
                line: m.line,
                observed: m.observed,
                text: lines[m.line - 1].to_string(),
            })
            .collect();
        SourceReport {
            source: "test.csv".to_string(),
            status,
            detected: true,
            validation,
            header: lines[0].to_string(),
            bad_records,
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(report_for(&["a,b", "1,2"], false).status, Status::Good);
        assert_eq!(report_for(&["a,b", "1,2,3"], false).status, Status::Bad);
        assert_eq!(report_for(&["a,b", "1,2,3"], true).status, Status::Fair);
        assert_eq!(report_for(&["a,b", "1,2,3", "4"], true).status, Status::Bad);
        assert!(Status::Fair.is_passing());
        assert!(!Status::Bad.is_passing());
    }

    #[test]
    fn test_error_report_path() {
        let now = Local.with_ymd_and_hms(2024, 11, 1, 13, 5, 9).unwrap();
        let path = error_report_path(Path::new("data/file.csv"), now);
        assert_eq!(
            path,
            PathBuf::from("data/file.csv_2024_11_01_13_05_09.ERROR_DELIMITER")
        );
    }

    #[test]
    fn test_error_report_contents() {
        let report = report_for(&["col1,col2,col3", "val1,val2", "val3,val4,val5"], false);
        let mut out = Vec::new();
        write_error_report_to(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("filename       : test.csv"));
        assert!(text.contains("header fields  : 0003"));
        assert!(text.contains("0002:00000001"));
        assert!(text.contains("0003:00000001"));
        assert!(text.contains("All Bad Record Field Detail:"));
        assert!(text.contains("000000001:0003:col1,col2,col3 (header)"));
        assert!(text.contains("000000002:0002:val1,val2"));
        assert!(!text.contains("val3,val4,val5"));
    }

    #[test]
    fn test_write_text() {
        let report = report_for(&["a,b", "1"], false);
        let mut out = Vec::new();
        write_text(&mut out, &report, true).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Status: BAD"));
        assert!(text.contains("Delimiter: ',' (detected)"));
        assert!(text.contains("line 2: 1 fields"));
    }

    #[test]
    fn test_write_json() {
        let report = report_for(&["a,b", "1"], false);
        let mut out = Vec::new();
        write_json(&mut out, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["source"], "test.csv");
        assert_eq!(value["status"], "bad");
        assert_eq!(value["delimiter"], ",");
        assert_eq!(value["expected_count"], 2);
        assert_eq!(value["mismatches"][0]["line"], 2);
        assert_eq!(value["mismatches"][0]["observed"], 1);
    }

    #[test]
    fn test_csv_writer() {
        let report = report_for(&["a|b", "1|2"], false);
        let bad = report_for(&["a,b", "1,2,3", "4"], false);

        let mut buf = Vec::new();
        {
            let mut writer = CsvReportWriter::new(&mut buf).unwrap();
            writer.write_report(&report).unwrap();
            writer.write_report(&bad).unwrap();
            writer.flush().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "file,line,observed,expected\ntest.csv,2,3,2\ntest.csv,3,1,2\n"
        );
    }

    #[test]
    fn test_csv_writer_reports_override_bound() {
        let mut validator = RecordValidator::new(Delimiter::Comma);
        validator.expected_columns(4);
        for line in ["a,b,c", "1,2,3"] {
            validator.push(line);
        }
        let validation = validator.finish().unwrap();
        let report = SourceReport {
            source: "x.csv".to_string(),
            status: Status::classify(&validation, false),
            detected: false,
            validation,
            header: "a,b,c".to_string(),
            bad_records: Vec::new(),
        };

        let mut buf = Vec::new();
        {
            let mut writer = CsvReportWriter::new(&mut buf).unwrap();
            writer.write_report(&report).unwrap();
            writer.flush().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "file,line,observed,expected\nx.csv,2,3,4\n");
        assert_eq!(report.status, Status::Bad);
    }
}
