use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Duration;
use log::{info, warn};

use crate::datetime::DayZone;
use crate::summary::{summarize_daily_hours, Summary, SummaryOptions};
use crate::time_sheet_csv::TimeSheetRepository;

/// 日毎の集計を出力するためのサブコマンドの引数。
#[derive(Debug, clap::Args)]
pub struct SummaryArgs {
    #[clap(
        parse(from_os_str),
        help = "CSV file with \"Start Date\" and \"End Date\" columns"
    )]
    pub file: PathBuf,

    #[clap(
        long = "overtime-hours",
        default_value = "8",
        help = "Flag entries longer than this many hours as Overtime"
    )]
    pub overtime_hours: f64,
}

pub struct SummaryCommand<'a, T: TimeSheetRepository> {
    repository: &'a T,
    zone: DayZone,
}

impl<'a, T: TimeSheetRepository> SummaryCommand<'a, T> {
    /// 新しい`SummaryCommand`を返す。
    ///
    /// # Arguments
    /// * `repository` - エントリーを読み込むリポジトリ
    /// * `zone` - 日付の区切りに利用するタイムゾーン
    pub fn new(repository: &'a T, zone: DayZone) -> Self {
        Self { repository, zone }
    }

    /// `summary`サブコマンドの処理を行う。
    ///
    /// 開始時刻の日付ごとに作業時間、エントリー数、残業の注記を集計する。
    ///
    /// # Arguments
    ///
    /// * `args` - `summary`サブコマンドの引数
    pub fn run(&self, args: &SummaryArgs) -> Result<Vec<Summary>> {
        let options = SummaryOptions {
            zone: self.zone,
            overtime_threshold: hours_to_duration(args.overtime_hours)
                .context("Invalid overtime threshold")?,
        };

        let entries = self
            .repository
            .read_entries()
            .context("Failed to read time sheet entries")?;
        info!(
            "Summarizing {} entries by day in {}",
            entries.len(),
            self.zone
        );

        let summaries = summarize_daily_hours(&entries, &options);
        summaries
            .iter()
            .filter(|summary| summary.hours_worked <= 0.0)
            .for_each(|summary| {
                warn!(
                    "{} has {:.2} hours worked; check for entries ending before they start",
                    summary.date, summary.hours_worked
                )
            });

        Ok(summaries)
    }
}

/// 時間単位の小数を`Duration`に変換する。
fn hours_to_duration(hours: f64) -> Result<Duration> {
    if !hours.is_finite() || hours < 0.0 {
        bail!("Hours must be a non-negative number: {}", hours);
    }

    Ok(Duration::milliseconds((hours * 3_600_000.0).round() as i64))
}
