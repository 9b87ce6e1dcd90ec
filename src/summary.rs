use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::datetime::DayZone;
use crate::time_sheet_entry::TimeSheetEntry;

/// 1日分の集計に付与する注記。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Flag {
    /// 1件のエントリーが残業の閾値を超えている
    Overtime,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::Overtime => write!(f, "Overtime"),
        }
    }
}

/// 1日分の集計結果。
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub date: NaiveDate,
    /// 小数第2位に丸めた作業時間
    pub hours_worked: f64,
    pub num_entries: usize,
    pub flags: Vec<Flag>,
}

/// 日毎の集計の設定。
#[derive(Clone, Copy, Debug)]
pub struct SummaryOptions {
    /// 日付の区切りに利用するタイムゾーン
    pub zone: DayZone,
    /// この時間を超えるエントリーに`Overtime`を付与する
    pub overtime_threshold: Duration,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            zone: DayZone::Utc,
            overtime_threshold: Duration::hours(8),
        }
    }
}

/// エントリーを開始時刻の日付ごとに集計する。
///
/// 作業時間は全精度で合計し、日毎の合計を最後に小数第2位へ丸める。
/// 終了が開始以前のエントリーも0または負の時間としてそのまま合計する。
/// エントリーのない日は出力しない。結果は日付の昇順。
pub fn summarize_daily_hours(
    entries: &[TimeSheetEntry],
    options: &SummaryOptions,
) -> Vec<Summary> {
    let daily: BTreeMap<NaiveDate, (Duration, usize, Vec<Flag>)> =
        entries.iter().fold(BTreeMap::new(), |mut acc, entry| {
            let date = options.zone.date_of(&entry.start_date_time);
            let (total, count, flags) = acc
                .entry(date)
                .or_insert_with(|| (Duration::zero(), 0, Vec::new()));
            let duration = entry.duration();
            *total = *total + duration;
            *count += 1;
            if duration > options.overtime_threshold {
                flags.push(Flag::Overtime);
            }
            acc
        });

    daily
        .into_iter()
        .map(|(date, (total, num_entries, flags))| Summary {
            date,
            hours_worked: round_hours(total),
            num_entries,
            flags,
        })
        .collect()
}

/// 時間を時間単位の小数に変換し、小数第2位に丸める。
fn round_hours(duration: Duration) -> f64 {
    let hours = duration.num_milliseconds() as f64 / 3_600_000.0;
    (hours * 100.0).round() / 100.0
}
