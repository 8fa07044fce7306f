use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use std::time::Instant;

use csvtally::cli::Cli;
use csvtally::config::CsvTallyConfig;
use csvtally::config_file::ConfigFile;
use csvtally::formatters::create_formatter;
use csvtally::platform::{ExitCode, SafeStderr, SafeStdout};
use csvtally::run_analysis;

fn main() -> Result<()> {
    let mut stderr = SafeStderr::new();
    let cli = process_args_with_config(&mut stderr);

    let config = match CsvTallyConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            let no_emoji = cli.no_emoji || std::env::var("NO_EMOJI").is_ok();
            stderr.writeln(&csvtally::config::format_error_message(
                &e.to_string(),
                no_emoji,
            ))?;
            ExitCode::InvalidUsage.exit();
        }
    };

    if let Err(e) = config.validate() {
        stderr.writeln(&config.format_error_message(&e.to_string()))?;
        ExitCode::InvalidUsage.exit();
    }

    let start_time = Instant::now();

    let outcome = match run_analysis(&config) {
        Ok(outcome) => outcome,
        Err(e) => {
            stderr.writeln(&config.format_error_message(&format!("{:#}", e)))?;
            ExitCode::GeneralError.exit();
        }
    };

    if let Some(summary) = outcome.reporter.generate_summary() {
        stderr.writeln(&config.format_warning_message(&format!(
            "{} rows skipped:",
            outcome.reporter.error_count()
        )))?;
        stderr.writeln(&summary)?;
    }

    if config.output.stats {
        stderr.writeln(&config.format_info_message(&outcome.stats.format_stats()))?;
    }

    if let Err(e) = outcome.check_error_rate(config.processing.max_error_rate) {
        stderr.writeln(&config.format_error_message(&e.to_string()))?;
        ExitCode::GeneralError.exit();
    }

    let elapsed = start_time.elapsed();
    let output = create_formatter(&config.output.format).format(&outcome.report, elapsed)?;

    let mut stdout = SafeStdout::new();
    stdout.writeln(&output)?;
    stdout.flush()?;

    Ok(())
}

/// Extract --config-file argument from raw args
fn extract_config_file_arg(args: &[String]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config-file" {
            return iter.next().cloned();
        }
        if let Some(path) = arg.strip_prefix("--config-file=") {
            return Some(path.to_string());
        }
    }
    None
}

/// Apply config file defaults, then parse the command line
fn process_args_with_config(stderr: &mut SafeStderr) -> Cli {
    let raw_args: Vec<String> = std::env::args().collect();

    let config_file_path = extract_config_file_arg(&raw_args);
    let has_ignore_config = raw_args.iter().any(|arg| arg == "--ignore-config");

    // Check for --show-config first, before any other processing
    if raw_args.iter().any(|arg| arg == "--show-config") {
        ConfigFile::show_config();
        ExitCode::Success.exit();
    }

    let processed_args = if has_ignore_config {
        raw_args
    } else {
        let processed = ConfigFile::load_with_custom_path(config_file_path.as_deref())
            .and_then(|config_file| config_file.process_args(raw_args));
        match processed {
            Ok(processed) => processed,
            Err(e) => {
                let _ = stderr.writeln(&csvtally::config::format_error_message_auto(&format!(
                    "Config file error: {:#}",
                    e
                )));
                ExitCode::GeneralError.exit();
            }
        }
    };

    // clap exits with status 2 on usage errors
    let matches = Cli::command().get_matches_from(processed_args);
    let mut cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    cli.resolve_boolean_flags();
    cli
}
