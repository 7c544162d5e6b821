/// Default number of lines delimiter detection looks at.
pub const DEFAULT_SAMPLE_RECORDS: usize = 100;

/// How many lines delimiter detection looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    /// Detect on the first `n` lines only.
    ///
    /// Bad lines past the sample never hide the delimiter. The checker still
    /// validates every line.
    Records(usize),
    /// Detect on every line of the source.
    ///
    /// Any inconsistent line makes the whole sample inconsistent, so detection
    /// falls back to the header alone on files with bad records.
    All,
}

impl Default for SampleSize {
    fn default() -> Self {
        SampleSize::Records(DEFAULT_SAMPLE_RECORDS)
    }
}

impl SampleSize {
    /// Restrict `lines` to the sample.
    pub fn apply<'a, S>(&self, lines: &'a [S]) -> &'a [S] {
        match self {
            SampleSize::Records(n) => &lines[..lines.len().min(*n)],
            SampleSize::All => lines,
        }
    }
}
