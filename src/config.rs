use anyhow::{anyhow, Result};
use clap::ValueEnum;

use crate::parallel::ParallelConfig;

/// Rows per batch when `--batch-size` is not given
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Upper bound accepted for `--threads`
pub const MAX_THREADS: usize = 1000;

/// Main configuration struct for csvtally
#[derive(Debug, Clone)]
pub struct CsvTallyConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
    pub performance: PerformanceConfig,
}

/// Input configuration
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// Path to the CSV file, or "-" for stdin
    pub file: String,
    pub delimiter: u8,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub stats: bool,
    pub no_emoji: bool,
}

/// Processing configuration
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub error_report: ErrorReportConfig,
    /// Fraction of skipped rows (0.0..=1.0) above which the run fails
    pub max_error_rate: Option<f64>,
}

/// Performance configuration
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    /// 0 means one worker per CPU
    pub threads: usize,
    pub batch_size: Option<usize>,
}

/// Report output format
#[derive(ValueEnum, Clone, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// How per-row diagnostics are reported
#[derive(ValueEnum, Clone, Debug, Default, PartialEq)]
pub enum ErrorReportStyle {
    /// Print each skipped row as it happens
    #[default]
    Print,
    /// Print one summary with counts and examples at the end
    Summary,
    /// Count silently
    Off,
}

/// Error reporting configuration
#[derive(Debug, Clone, Default)]
pub struct ErrorReportConfig {
    pub style: ErrorReportStyle,
    pub use_emoji: bool,
}

impl CsvTallyConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let no_emoji = cli.no_emoji || std::env::var("NO_EMOJI").is_ok();

        Ok(Self {
            input: InputConfig {
                file: cli.file.clone().unwrap_or_else(|| "-".to_string()),
                delimiter: parse_delimiter(&cli.delimiter)?,
            },
            output: OutputConfig {
                format: cli.output_format.clone(),
                stats: cli.stats,
                no_emoji,
            },
            processing: ProcessingConfig {
                error_report: ErrorReportConfig {
                    style: cli.errors.clone(),
                    use_emoji: !no_emoji,
                },
                max_error_rate: cli.max_error_rate,
            },
            performance: PerformanceConfig {
                threads: cli.threads,
                batch_size: cli.batch_size,
            },
        })
    }

    /// Get effective batch size with defaults
    pub fn effective_batch_size(&self) -> usize {
        self.performance.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    /// Get effective thread count with defaults
    pub fn effective_threads(&self) -> usize {
        if self.performance.threads == 0 {
            num_cpus::get()
        } else {
            self.performance.threads
        }
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        ParallelConfig {
            num_workers: self.effective_threads(),
            batch_size: self.effective_batch_size(),
            queue_depth: None,
        }
    }

    /// Reject option combinations that cannot run
    pub fn validate(&self) -> Result<()> {
        if self.performance.batch_size == Some(0) {
            return Err(anyhow!("Batch size must be greater than 0"));
        }

        if self.performance.threads > MAX_THREADS {
            return Err(anyhow!("Thread count too high (max {})", MAX_THREADS));
        }

        if let Some(rate) = self.processing.max_error_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(anyhow!(
                    "--max-error-rate must be between 0 and 1, got {}",
                    rate
                ));
            }
        }

        if self.input.file.is_empty() {
            return Err(anyhow!("No input file given"));
        }

        Ok(())
    }

    pub fn format_error_message(&self, message: &str) -> String {
        format_error_message(message, self.output.no_emoji)
    }

    pub fn format_warning_message(&self, message: &str) -> String {
        format_warning_message(message, self.output.no_emoji)
    }

    pub fn format_info_message(&self, message: &str) -> String {
        format_info_message(message, self.output.no_emoji)
    }
}

impl Default for CsvTallyConfig {
    fn default() -> Self {
        Self {
            input: InputConfig {
                file: "-".to_string(),
                delimiter: b',',
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                stats: false,
                no_emoji: false,
            },
            processing: ProcessingConfig {
                error_report: ErrorReportConfig {
                    style: ErrorReportStyle::Print,
                    use_emoji: true,
                },
                max_error_rate: None,
            },
            performance: PerformanceConfig {
                threads: 0,
                batch_size: None,
            },
        }
    }
}

/// Accept a single-byte delimiter; `\t` and `tab` are spelled out for convenience
pub fn parse_delimiter(input: &str) -> Result<u8> {
    match input {
        "\\t" | "tab" => return Ok(b'\t'),
        _ => {}
    }

    match input.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(anyhow!(
            "Delimiter must be a single byte character, got '{}'",
            input
        )),
    }
}

pub fn format_error_message(message: &str, no_emoji: bool) -> String {
    let prefix = if no_emoji { "csvtally: error:" } else { "⚠️ " };
    format!("{} {}", prefix, message)
}

pub fn format_warning_message(message: &str, no_emoji: bool) -> String {
    let prefix = if no_emoji { "csvtally: warning:" } else { "⚠️ " };
    format!("{} {}", prefix, message)
}

pub fn format_info_message(message: &str, no_emoji: bool) -> String {
    let prefix = if no_emoji { "csvtally:" } else { "🔹" };
    format!("{} {}", prefix, message)
}

/// Format an error message, honoring `NO_EMOJI` when no config is at hand
pub fn format_error_message_auto(message: &str) -> String {
    format_error_message(message, std::env::var("NO_EMOJI").is_ok())
}
