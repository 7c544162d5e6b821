//! Field count statistics gathered while validating a source.

use std::collections::BTreeMap;

use foldhash::{HashMap, HashMapExt};
use serde::{Serialize, Serializer};

/// Distribution of field counts across one source.
///
/// The header record counts toward `total_records`, `nested` and
/// `max_line_len`; the comparison counters and the histogram cover detail
/// records only.
#[derive(Debug, Clone, Serialize)]
pub struct FieldCountStats {
    /// Number of records seen, header included.
    pub total_records: usize,
    /// Detail records with fewer fields than the header.
    pub under: usize,
    /// Detail records with as many fields as the header.
    pub equal: usize,
    /// Detail records with more fields than the header.
    pub over: usize,
    /// Detail records whose count differs from an explicit expected column count.
    pub off_expected: usize,
    /// Records with a delimiter inside a quoted span.
    pub nested: usize,
    /// Length in bytes of the longest line.
    pub max_line_len: usize,
    #[serde(rename = "histogram", serialize_with = "serialize_sorted")]
    counts: HashMap<usize, usize>,
}

impl Default for FieldCountStats {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldCountStats {
    /// Create empty statistics.
    pub fn new() -> Self {
        Self {
            total_records: 0,
            under: 0,
            equal: 0,
            over: 0,
            off_expected: 0,
            nested: 0,
            max_line_len: 0,
            counts: HashMap::new(),
        }
    }

    /// Account for the header record.
    pub fn record_header(&mut self, line_len: usize, nested: bool) {
        self.note_line(line_len, nested);
    }

    /// Account for one detail record.
    pub fn record_detail(&mut self, observed: usize, header: usize, line_len: usize, nested: bool) {
        self.note_line(line_len, nested);

        match observed.cmp(&header) {
            std::cmp::Ordering::Less => self.under += 1,
            std::cmp::Ordering::Equal => self.equal += 1,
            std::cmp::Ordering::Greater => self.over += 1,
        }
        *self.counts.entry(observed).or_insert(0) += 1;
    }

    fn note_line(&mut self, line_len: usize, nested: bool) {
        self.total_records += 1;
        self.max_line_len = self.max_line_len.max(line_len);
        if nested {
            self.nested += 1;
        }
    }

    /// Number of detail records (all records but the header).
    #[inline]
    pub fn detail_records(&self) -> usize {
        self.under + self.equal + self.over
    }

    /// Detail field counts with the number of records for each, ascending.
    pub fn histogram(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = self.counts.iter().map(|(&k, &v)| (k, v)).collect();
        pairs.sort_unstable();
        pairs
    }

}

fn serialize_sorted<S: Serializer>(
    counts: &HashMap<usize, usize>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let sorted: BTreeMap<usize, usize> = counts.iter().map(|(&k, &v)| (k, v)).collect();
    sorted.serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut stats = FieldCountStats::new();
        stats.record_header(10, false);
        stats.record_detail(3, 3, 5, false);
        stats.record_detail(2, 3, 4, false);
        stats.record_detail(4, 3, 12, true);
        stats.record_detail(3, 3, 5, false);

        assert_eq!(stats.total_records, 5);
        assert_eq!(stats.detail_records(), 4);
        assert_eq!((stats.under, stats.equal, stats.over), (1, 2, 1));
        assert_eq!(stats.nested, 1);
        assert_eq!(stats.max_line_len, 12);
        assert_eq!(stats.histogram(), vec![(2, 1), (3, 2), (4, 1)]);
    }

    #[test]
    fn test_histogram_serializes_sorted() {
        let mut stats = FieldCountStats::new();
        stats.record_detail(5, 3, 1, false);
        stats.record_detail(1, 3, 1, false);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains(r#""histogram":{"1":1,"5":1}"#), "{json}");
    }
}
