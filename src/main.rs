use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

mod console;
mod datetime;
mod logging;
mod overlap;
mod summary;
mod summary_command;
mod time_sheet_csv;
mod time_sheet_entry;
mod validate_command;

use console::{ConsoleJson, ConsoleMarkdownList, ConsolePresenter, OutputFormat};
use datetime::DayZone;
use summary_command::{SummaryArgs, SummaryCommand};
use time_sheet_csv::CsvTimeSheetRepository;
use validate_command::{ValidateArgs, ValidateCommand};

/// タイムシートのCSVを検証し、日毎に集計するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- validate timesheet.csv
/// $ cargo run -- --zone +09:00 summary timesheet.csv
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(
        long = "zone",
        global = true,
        env = "TIMESHEET_ZONE",
        default_value = "UTC",
        help = "Time zone for day boundaries and naive timestamps: UTC, local or an offset like +09:00"
    )]
    zone: DayZone,

    #[clap(
        long = "format",
        global = true,
        env = "TIMESHEET_FORMAT",
        default_value = "markdown",
        help = "Output format: markdown or json"
    )]
    format: OutputFormat,

    #[clap(
        long = "log-level",
        global = true,
        env = "TIMESHEET_LOG",
        default_value = "warn",
        parse(try_from_str = logging::parse_level),
        help = "Minimum level of log messages written to stderr"
    )]
    log_level: LevelFilter,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Check the time sheet for overlapping entries
    Validate(ValidateArgs),
    /// Summarize hours worked per day
    Summary(SummaryArgs),
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    logging::init(args.log_level)?;

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut presenter: Box<dyn ConsolePresenter + '_> = match args.format {
        OutputFormat::Markdown => Box::new(ConsoleMarkdownList::new(&mut writer, args.zone)),
        OutputFormat::Json => Box::new(ConsoleJson::new(&mut writer)),
    };

    let exit_code = match args.subcommand {
        SubCommands::Validate(validate) => {
            let repository = CsvTimeSheetRepository::new(&validate.file, args.zone);
            let outcome = ValidateCommand::new(&repository).run(&validate)?;
            if validate.entries {
                presenter.show_entries(&outcome.entries)?;
            }
            presenter.show_overlap_report(&outcome.report)?;

            if outcome.report.is_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        SubCommands::Summary(summary) => {
            let repository = CsvTimeSheetRepository::new(&summary.file, args.zone);
            let summaries = SummaryCommand::new(&repository, args.zone).run(&summary)?;
            presenter.show_summaries(&summaries)?;

            ExitCode::SUCCESS
        }
    };

    drop(presenter);
    writer.flush().context("Failed to flush stdout")?;

    Ok(exit_code)
}
