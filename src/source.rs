//! Line sources: decoding raw bytes into lines and discovering files to check.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use simdutf8::basic::from_utf8;
use tracing::{debug, warn};

use crate::error::Result;

/// Check if the data starts with a UTF-8 BOM (Byte Order Mark).
///
/// The UTF-8 BOM is the byte sequence: EF BB BF
pub fn has_utf8_bom(data: &[u8]) -> bool {
    data.starts_with(&[0xEF, 0xBB, 0xBF])
}

/// Skip the UTF-8 BOM if present and return the remaining data.
pub fn skip_bom(data: &[u8]) -> &[u8] {
    if has_utf8_bom(data) { &data[3..] } else { data }
}

/// Decode bytes as UTF-8 text.
///
/// A leading BOM is removed. Valid input is borrowed as-is; invalid sequences
/// are replaced with U+FFFD and a warning is logged. No other encodings are
/// detected.
pub fn decode(data: &[u8]) -> Cow<'_, str> {
    let data = skip_bom(data);
    if let Ok(text) = from_utf8(data) {
        return Cow::Borrowed(text);
    }

    let (text, had_errors) = encoding_rs::UTF_8.decode_without_bom_handling(data);
    if had_errors {
        warn!("input is not valid UTF-8, invalid sequences were replaced");
    }
    text
}

/// Line terminator sequences.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTerminator {
    /// Unix-style line ending (\n).
    LF,
    /// Windows-style line ending (\r\n).
    CRLF,
    /// Old Mac-style line ending (\r).
    CR,
}

/// Detect the most likely line terminator from data.
pub fn detect_line_terminator(data: &[u8]) -> LineTerminator {
    let lf_total = bytecount::count(data, b'\n');
    let cr_total = bytecount::count(data, b'\r');
    let crlf_count = data.windows(2).filter(|w| *w == b"\r\n").count();
    let lf_count = lf_total - crlf_count;
    let cr_count = cr_total - crlf_count;

    // Prefer CRLF if present (Windows), then LF (Unix), then CR (old Mac)
    if crlf_count > 0 && crlf_count >= lf_count && crlf_count >= cr_count {
        LineTerminator::CRLF
    } else if lf_count >= cr_count {
        LineTerminator::LF
    } else {
        LineTerminator::CR
    }
}

/// Split decoded text into lines.
///
/// Line terminators are removed and a terminator at the very end does not
/// produce an extra empty line. Empty text has no lines.
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }

    match detect_line_terminator(text.as_bytes()) {
        LineTerminator::CR => {
            let body = text.strip_suffix('\r').unwrap_or(text);
            body.split('\r').collect()
        }
        LineTerminator::LF | LineTerminator::CRLF => {
            let body = text.strip_suffix('\n').unwrap_or(text);
            body.split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .collect()
        }
    }
}

/// Which directory entries are treated as record files.
#[derive(Debug, Clone)]
pub enum FileFilter {
    /// Match the file extension, ignoring case.
    Extension(String),
    /// Match the file name against a regular expression.
    Pattern(Regex),
}

impl Default for FileFilter {
    fn default() -> Self {
        FileFilter::Extension("csv".to_string())
    }
}

impl FileFilter {
    /// Build a filter from a regular expression over file names.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(FileFilter::Pattern(Regex::new(pattern)?))
    }

    /// Returns true if the file at `path` should be checked.
    pub fn matches(&self, path: &Path) -> bool {
        match self {
            FileFilter::Extension(ext) => path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext)),
            FileFilter::Pattern(re) => path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| re.is_match(n)),
        }
    }
}

/// List the record files directly inside `dir`, sorted by path.
pub fn discover(dir: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && filter.matches(&path) {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), files = files.len(), "discovered record files");
    Ok(files)
}

/// Expand a mix of file and directory paths into the files to check.
///
/// Directories are listed with [`discover`]; other paths are passed through so
/// that a missing file surfaces as a per-source error later.
pub fn expand_paths(paths: &[PathBuf], filter: &FileFilter) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(discover(path, filter)?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}
