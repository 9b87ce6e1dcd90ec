use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::overlap::{annotate_overlaps, validate_data_for_overlaps, OverlapPolicy, OverlapReport};
use crate::time_sheet_csv::TimeSheetRepository;
use crate::time_sheet_entry::TimeSheetEntry;

/// 重複を検証するためのサブコマンドの引数。
#[derive(Debug, clap::Args)]
pub struct ValidateArgs {
    #[clap(
        parse(from_os_str),
        help = "CSV file with \"Start Date\" and \"End Date\" columns"
    )]
    pub file: PathBuf,

    #[clap(
        short = 'p',
        long = "policy",
        default_value = "exhaustive",
        help = "Report every overlapping pair (exhaustive) or only the first one (stop-early)"
    )]
    pub policy: OverlapPolicy,

    #[clap(long = "entries", help = "Also list every entry, marking overlapping ones")]
    pub entries: bool,
}

/// 検証に利用したエントリーと検証結果。
#[derive(Debug)]
pub struct ValidationOutcome {
    /// `overlapping`の注釈を付与した入力順のエントリー
    pub entries: Vec<TimeSheetEntry>,
    pub report: OverlapReport,
}

pub struct ValidateCommand<'a, T: TimeSheetRepository> {
    repository: &'a T,
}

impl<'a, T: TimeSheetRepository> ValidateCommand<'a, T> {
    /// 新しい`ValidateCommand`を返す。
    ///
    /// # Arguments
    /// * `repository` - エントリーを読み込むリポジトリ
    pub fn new(repository: &'a T) -> Self {
        Self { repository }
    }

    /// `validate`サブコマンドの処理を行う。
    ///
    /// 読み込んだすべてのエントリーについて重複を検証し、
    /// 各エントリーに重複しているかどうかの注釈を付与する。
    ///
    /// # Arguments
    ///
    /// * `args` - `validate`サブコマンドの引数
    pub fn run(&self, args: &ValidateArgs) -> Result<ValidationOutcome> {
        let mut entries = self
            .repository
            .read_entries()
            .context("Failed to read time sheet entries")?;
        info!(
            "Validating {} entries with {} policy",
            entries.len(),
            args.policy
        );

        let report = validate_data_for_overlaps(&entries, args.policy);
        annotate_overlaps(&mut entries, &report);
        if report.is_valid {
            info!("No overlapping entries found.");
        } else {
            warn!("Found {} overlapping pair(s).", report.overlaps.len());
        }

        Ok(ValidationOutcome { entries, report })
    }
}
