//! delim-check: delimiter consistency checker for delimited record files
//!
//! Scans CSV-like or pipe-delimited files and flags lines whose column count
//! differs from the header's, under a deliberately naive quoting model.
//!
//! # Quick Start
//!
//! ```no_run
//! use delim_check::Checker;
//!
//! let checker = Checker::new();
//! let report = checker.check_path("data.csv").unwrap();
//!
//! println!("Status: {}", report.status);
//! println!("Delimiter: {}", report.validation.delimiter);
//! println!("Fields: {}", report.validation.expected_count);
//! for m in &report.validation.mismatches {
//!     println!("line {} has {} fields", m.line, m.observed);
//! }
//! ```
//!
//! # The core engine
//!
//! The checker is a two-stage pipeline that can also be driven directly:
//!
//! 1. [`detect`] infers the delimiter: the first of `, | \t ;` under which every
//!    sampled line splits into the same number of fields (at least two).
//! 2. [`validate`] fixes the expected field count from the first line and
//!    reports every later line whose count differs.
//!
//! ```
//! use delim_check::{detect, validate, Delimiter};
//!
//! let lines = ["id|name", "1|alice", "2|bob"];
//! let delimiter = detect(&lines, &Delimiter::PRIORITY).unwrap();
//! assert_eq!(delimiter, Delimiter::Pipe);
//!
//! let validation = validate(["a,b,c", "1,2", "3,4,5"], Delimiter::Comma).unwrap();
//! assert_eq!(validation.expected_count, 3);
//! assert_eq!(validation.mismatches[0].line, 2);
//! ```
//!
//! # Quoting
//!
//! Every `"` toggles an "inside quotes" state; a delimiter inside quotes is
//! field content. There is no escape handling, so quoted fields containing
//! their own quote characters can be split in the wrong place.

mod checker;
mod delimiter;
mod detector;
mod error;
mod report;
mod sample;
pub mod source;
mod stats;
mod tokenizer;
mod validator;

pub use checker::Checker;
pub use delimiter::Delimiter;
pub use detector::{detect, uniform_field_count};
pub use error::{CheckError, Result};
pub use report::{
    BAD_RECORD_REPORT_LIMIT, BadRecord, CsvReportWriter, ERROR_REPORT_SUFFIX, SourceReport,
    Status, error_report_path, write_error_report, write_error_report_to, write_json, write_text,
};
pub use sample::{DEFAULT_SAMPLE_RECORDS, SampleSize};
pub use stats::FieldCountStats;
pub use tokenizer::{Fields, count_fields, has_nested_delimiter, tokenize};
pub use validator::{Mismatch, RecordValidator, Validation, validate};
