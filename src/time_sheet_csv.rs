use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;

use crate::datetime::{parse_instant, DayZone};
use crate::time_sheet_entry::TimeSheetEntry;

/// タイムシートのエントリーを読み込むためのtrait。
#[cfg_attr(test, mockall::automock)]
pub trait TimeSheetRepository {
    /// すべてのエントリーを読み込む。
    fn read_entries(&self) -> Result<Vec<TimeSheetEntry>>;
}

/// CSVの1行をデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct RawTimeSheetRecord {
    #[serde(rename = "Start Date", alias = "startDateTime")]
    start_date: String,
    #[serde(rename = "End Date", alias = "endDateTime")]
    end_date: String,
}

/// CSVファイルからタイムシートを読み込むリポジトリ。
///
/// # Examples
///
/// ```
/// let repository = CsvTimeSheetRepository::new("timesheet.csv", DayZone::Utc);
/// let entries = repository.read_entries().unwrap();
/// ```
pub struct CsvTimeSheetRepository {
    path: PathBuf,
    zone: DayZone,
}

impl CsvTimeSheetRepository {
    /// 新しい`CsvTimeSheetRepository`を返す。
    ///
    /// # Arguments
    ///
    /// * `path` - 読み込むCSVファイル
    /// * `zone` - オフセットのない日時を解釈するタイムゾーン
    pub fn new<P: AsRef<Path>>(path: P, zone: DayZone) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            zone,
        }
    }
}

impl TimeSheetRepository for CsvTimeSheetRepository {
    fn read_entries(&self) -> Result<Vec<TimeSheetEntry>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let entries = read_entries_from_reader(file, &self.zone)
            .with_context(|| format!("Failed to import {}", self.path.display()))?;
        info!(
            "Read {} time sheet entries from {}",
            entries.len(),
            self.path.display()
        );

        Ok(entries)
    }
}

/// ヘッダー付きCSVからエントリーを読み込む。
///
/// `Start Date`と`End Date`の列が必要で、それ以外の列は無視する。
/// 空行は読み飛ばす。日時が空またはパースできない行があればエラーとする。
pub fn read_entries_from_reader<R: Read>(
    reader: R,
    zone: &DayZone,
) -> Result<Vec<TimeSheetEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    reader
        .deserialize::<RawTimeSheetRecord>()
        .enumerate()
        .map(|(index, record)| -> Result<TimeSheetEntry> {
            // ヘッダーが1行目
            let row = index + 2;
            let record = record.with_context(|| format!("Failed to read row {}", row))?;
            let entry = normalize_record(&record, zone)
                .with_context(|| format!("Invalid time sheet entry at row {}", row))?;
            if !entry.is_well_formed() {
                warn!(
                    "Row {} ends at or before it starts ({} ~ {})",
                    row, record.start_date, record.end_date
                );
            }
            Ok(entry)
        })
        .collect()
}

/// 文字列の行を`TimeSheetEntry`に変換する。
fn normalize_record(record: &RawTimeSheetRecord, zone: &DayZone) -> Result<TimeSheetEntry> {
    let start = parse_instant(&record.start_date, zone).context("Invalid Start Date")?;
    let end = parse_instant(&record.end_date, zone).context("Invalid End Date")?;

    Ok(TimeSheetEntry::new(start, end))
}
