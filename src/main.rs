//! delim-check CLI - delimiter consistency checker

use clap::Parser;
use delim_check::source::{FileFilter, expand_paths};
use delim_check::{
    CheckError, Checker, CsvReportWriter, DEFAULT_SAMPLE_RECORDS, Delimiter, SampleSize,
    SourceReport, Status, write_error_report, write_json, write_text,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Delimiter consistency checker for CSV and pipe-delimited files.
///
/// Compares the field count of every record with the header record and
/// reports the records that differ. Directories are scanned for matching
/// files (non-recursive).
#[derive(Parser, Debug)]
#[command(name = "delim-check")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files or directories to check
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Delimiter to use instead of detecting one (, | ; tab)
    #[arg(short = 'd', long, value_parser = parse_delimiter)]
    delimiter: Option<Delimiter>,

    /// Detect the delimiter from the first N records (default: 100)
    #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_RECORDS)]
    sample_records: usize,

    /// Detect the delimiter from every record (overrides --sample-records)
    #[arg(short = 'a', long)]
    all: bool,

    /// Also require every record to have exactly this many fields
    #[arg(short = 'e', long, value_parser = parse_expected_columns)]
    expected_columns: Option<usize>,

    /// Treat files whose only bad records have too many fields as passing (FAIR)
    #[arg(short = 'i', long)]
    ignore_over_count: bool,

    /// Write an error report next to every file that is not GOOD
    #[arg(short = 'w', long)]
    write_report: bool,

    /// Batch process identifier attached to log output
    #[arg(short = 'b', long)]
    batch_id: Option<String>,

    /// Regular expression selecting file names in directories (default: *.csv)
    #[arg(short = 'p', long)]
    pattern: Option<String>,

    /// Output format: text (default), json, or csv
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// List every bad record and log debug details
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn parse_delimiter(s: &str) -> Result<Delimiter, String> {
    s.parse().map_err(|e: CheckError| e.to_string())
}

fn parse_expected_columns(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("expected columns must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    let filter = match args.pattern.as_deref().map(FileFilter::pattern) {
        None => FileFilter::default(),
        Some(Ok(filter)) => filter,
        Some(Err(e)) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    let mut exit_code = ExitCode::SUCCESS;

    let mut files = Vec::new();
    for root in &args.paths {
        match expand_paths(std::slice::from_ref(root), &filter) {
            Ok(found) => {
                if found.is_empty() {
                    warn!(path = %root.display(), "no matching files");
                }
                files.extend(found);
            }
            Err(e) => {
                eprintln!("Error reading {}: {}", root.display(), e);
                exit_code = ExitCode::FAILURE;
            }
        }
    }

    let checker = build_checker(&args);
    let results = checker.check_paths(&files);

    let mut output = match Output::new(&args) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut failed = 0;
    for (path, result) in results {
        match result {
            Ok(report) => {
                if let Err(e) = output.emit(&report) {
                    eprintln!("Error writing output for {}: {}", path.display(), e);
                }

                if args.write_report && report.status != Status::Good {
                    match write_error_report(&path, &report) {
                        Ok(target) => info!(report = %target.display(), "wrote error report"),
                        Err(e) => eprintln!("Error writing report for {}: {}", path.display(), e),
                    }
                }

                if !report.status.is_passing() {
                    failed += 1;
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {}", path.display(), e);
                if matches!(e, CheckError::NoDelimiterFound) {
                    eprintln!("  hint: the header has no candidate delimiter; pass --delimiter");
                }
                failed += 1;
            }
        }
    }

    if let Err(e) = output.finish() {
        eprintln!("Error: {e}");
        exit_code = ExitCode::FAILURE;
    }

    if failed > 0 {
        if files.len() > 1 {
            eprintln!(
                "{} of {} files {} badly delimited",
                failed,
                files.len(),
                if failed == 1 { "is" } else { "are" }
            );
        }
        exit_code = ExitCode::FAILURE;
    }

    exit_code
}

fn init_logging(args: &Args) {
    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn build_checker(args: &Args) -> Checker {
    let mut checker = Checker::new();

    if args.all {
        checker.sample_size(SampleSize::All);
    } else {
        checker.sample_size(SampleSize::Records(args.sample_records));
    }
    if let Some(delimiter) = args.delimiter {
        checker.delimiter(delimiter);
    }
    if let Some(columns) = args.expected_columns {
        checker.expected_columns(columns);
    }
    if let Some(ref batch_id) = args.batch_id {
        checker.batch_id(batch_id.as_str());
    }
    checker.ignore_over_count(args.ignore_over_count);

    checker
}

enum Output {
    Text { verbose: bool },
    Json,
    Csv(CsvReportWriter<io::Stdout>),
}

impl Output {
    fn new(args: &Args) -> delim_check::Result<Self> {
        Ok(match args.format {
            OutputFormat::Text => Output::Text {
                verbose: args.verbose,
            },
            OutputFormat::Json => Output::Json,
            OutputFormat::Csv => Output::Csv(CsvReportWriter::new(io::stdout())?),
        })
    }

    fn emit(&mut self, report: &SourceReport) -> delim_check::Result<()> {
        match self {
            Output::Text { verbose } => write_text(&mut io::stdout().lock(), report, *verbose),
            Output::Json => write_json(&mut io::stdout().lock(), report),
            Output::Csv(writer) => writer.write_report(report),
        }
    }

    fn finish(&mut self) -> delim_check::Result<()> {
        match self {
            Output::Csv(writer) => writer.flush(),
            Output::Text { .. } | Output::Json => {
                io::stdout().flush()?;
                Ok(())
            }
        }
    }
}
