// CLI-specific types and structures
// This module contains the command-line interface definitions

use clap::Parser;

use crate::config::{ErrorReportStyle, OutputFormat};

// CLI structure - contains all command-line arguments and options
#[derive(Parser, Debug)]
#[command(name = "csvtally")]
#[command(about = "Aggregate a CSV file of (id, value, label, timestamp) rows in parallel")]
#[command(
    long_about = "Aggregate a CSV file of (id, value, label, timestamp) rows in parallel\n\nThe first row is a header. Rows that fail to parse are reported and skipped;\nthe rest are summarized into count, sum, average, min, max, time range and\na per-label distribution.\n\nCOMMON EXAMPLES:\n  csvtally data.csv\n  csvtally -t 4 -b 500 data.csv.gz\n  csvtally --errors summary -F json data.csv"
)]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Input CSV file (stdin if not specified, or use "-" to explicitly specify stdin)
    pub file: Option<String>,

    /// Single-byte field delimiter ("tab" or "\t" for tabs)
    #[arg(
        short = 'd',
        long = "delimiter",
        default_value = ",",
        help_heading = "Input Options"
    )]
    pub delimiter: String,

    /// How skipped rows are reported: print (each row), summary (at the end), off
    #[arg(
        long = "errors",
        value_enum,
        default_value = "print",
        help_heading = "Processing Options"
    )]
    pub errors: ErrorReportStyle,

    /// Fail the run when more than this fraction (0..1) of rows is skipped
    #[arg(long = "max-error-rate", help_heading = "Processing Options")]
    pub max_error_rate: Option<f64>,

    /// Output format for the report
    #[arg(
        short = 'F',
        long = "output-format",
        value_enum,
        default_value = "text",
        help_heading = "Output Options"
    )]
    pub output_format: OutputFormat,

    /// Disable emoji in diagnostics (also honored via NO_EMOJI)
    #[arg(long = "no-emoji", help_heading = "Display Options")]
    pub no_emoji: bool,

    /// Number of worker threads (0 = number of CPUs)
    #[arg(
        short = 't',
        long = "threads",
        default_value_t = 0,
        help_heading = "Performance Options"
    )]
    pub threads: usize,

    /// Records per batch (default: 1000)
    #[arg(short = 'b', long = "batch-size", help_heading = "Performance Options")]
    pub batch_size: Option<usize>,

    /// Print processing statistics to stderr
    #[arg(
        short = 's',
        long = "stats",
        help_heading = "Metrics and Stats",
        overrides_with = "no_stats"
    )]
    pub stats: bool,

    /// Disable processing statistics (overrides --stats from config defaults)
    #[arg(long = "no-stats", help_heading = "Metrics and Stats")]
    pub no_stats: bool,

    /// Specify custom configuration file path
    #[arg(long = "config-file", help_heading = "Configuration Options")]
    pub config_file: Option<String>,

    /// Ignore configuration file
    #[arg(long = "ignore-config", help_heading = "Configuration Options")]
    pub ignore_config: bool,

    /// Show configuration file and exit
    #[arg(long = "show-config", help_heading = "Configuration Options")]
    pub show_config: bool,
}

impl Cli {
    /// Resolve inverted boolean flags to their actual values
    pub fn resolve_boolean_flags(&mut self) {
        if self.no_stats {
            self.stats = false;
        }
    }
}
