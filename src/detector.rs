//! Delimiter inference over a sample of lines.

use tracing::trace;

use crate::delimiter::Delimiter;
use crate::error::{CheckError, Result};
use crate::tokenizer::count_fields;

/// Returns the field count shared by every sampled line under `delimiter`,
/// or `None` if the lines disagree or the split is trivial (fewer than 2 fields).
pub fn uniform_field_count<S: AsRef<str>>(lines: &[S], delimiter: Delimiter) -> Option<usize> {
    let mut counts = lines.iter().map(|line| count_fields(line.as_ref(), delimiter));
    let first = counts.next()?;
    if first < 2 {
        return None;
    }
    counts.all(|c| c == first).then_some(first)
}

/// Infer the delimiter of a line sample.
///
/// A candidate is consistent when every line splits into the same number of
/// fields, at least two. Among consistent candidates the first in
/// [`Delimiter::PRIORITY`] order wins; delimiters absent from `candidates` are
/// never chosen.
///
/// # Errors
///
/// [`CheckError::EmptyInput`] for an empty sample, [`CheckError::NoDelimiterFound`]
/// when no candidate is consistent.
pub fn detect<S: AsRef<str>>(lines: &[S], candidates: &[Delimiter]) -> Result<Delimiter> {
    if lines.is_empty() {
        return Err(CheckError::EmptyInput);
    }

    Delimiter::PRIORITY
        .into_iter()
        .filter(|d| candidates.contains(d))
        .find(|&d| {
            let count = uniform_field_count(lines, d);
            trace!(delimiter = d.name(), ?count, "delimiter candidate");
            count.is_some()
        })
        .ok_or(CheckError::NoDelimiterFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[Delimiter] = &Delimiter::PRIORITY;

    #[test]
    fn test_detect_each_delimiter() {
        assert_eq!(detect(&["a,b,c", "1,2,3"], ALL).unwrap(), Delimiter::Comma);
        assert_eq!(detect(&["a|b|c", "1|2|3"], ALL).unwrap(), Delimiter::Pipe);
        assert_eq!(detect(&["a\tb", "1\t2"], ALL).unwrap(), Delimiter::Tab);
        assert_eq!(detect(&["a;b;c", "1;2;3"], ALL).unwrap(), Delimiter::Semicolon);
    }

    #[test]
    fn test_detect_priority_tie_break() {
        // Both comma and pipe split every line into two fields.
        let lines = ["a,b|c", "d,e|f"];
        assert_eq!(detect(&lines, ALL).unwrap(), Delimiter::Comma);
        assert_eq!(
            detect(&lines, &[Delimiter::Pipe, Delimiter::Semicolon]).unwrap(),
            Delimiter::Pipe
        );
    }

    #[test]
    fn test_detect_skips_inconsistent_candidate() {
        // Comma counts vary (2 then 3), pipe is uniform.
        let lines = ["a,x|b", "c,y,z|d"];
        assert_eq!(detect(&lines, ALL).unwrap(), Delimiter::Pipe);
    }

    #[test]
    fn test_detect_respects_quotes() {
        let lines = ["name;note", "bob;\"a;b\""];
        assert_eq!(detect(&lines, ALL).unwrap(), Delimiter::Semicolon);
    }

    #[test]
    fn test_detect_empty_input() {
        let lines: [&str; 0] = [];
        assert!(matches!(detect(&lines, ALL), Err(CheckError::EmptyInput)));
    }

    #[test]
    fn test_detect_no_delimiter() {
        assert!(matches!(
            detect(&["just text", "more text"], ALL),
            Err(CheckError::NoDelimiterFound)
        ));
        assert!(matches!(
            detect(&["a,b", "c,d"], &[Delimiter::Pipe]),
            Err(CheckError::NoDelimiterFound)
        ));
    }

    #[test]
    fn test_uniform_field_count() {
        assert_eq!(uniform_field_count(&["a,b", "c,d"], Delimiter::Comma), Some(2));
        assert_eq!(uniform_field_count(&["a,b", "c"], Delimiter::Comma), None);
        assert_eq!(uniform_field_count(&["a", "c"], Delimiter::Comma), None);
    }
}
