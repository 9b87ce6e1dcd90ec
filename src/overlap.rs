use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::time_sheet_entry::TimeSheetEntry;

/// 重複を見つけた後に走査を続けるかどうか。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlapPolicy {
    /// 最初の重複を見つけた時点で走査を終了する。報告される組は高々1つ。
    StopEarly,
    /// すべての重複する組を報告する。
    #[default]
    Exhaustive,
}

impl FromStr for OverlapPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stop-early" => Ok(OverlapPolicy::StopEarly),
            "exhaustive" => Ok(OverlapPolicy::Exhaustive),
            _ => bail!("Unknown overlap policy: {} (expected exhaustive or stop-early)", s),
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapPolicy::StopEarly => write!(f, "stop-early"),
            OverlapPolicy::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

/// 重複している2つのエントリー。`first`の方が先に開始する。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlapPair {
    pub first: TimeSheetEntry,
    pub second: TimeSheetEntry,
    /// 入力における`first`の位置
    #[serde(skip)]
    pub first_index: usize,
    /// 入力における`second`の位置
    #[serde(skip)]
    pub second_index: usize,
}

/// 重複検証の結果。
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapReport {
    pub is_valid: bool,
    pub overlaps: Vec<OverlapPair>,
}

/// エントリー同士の時間の重複を検証する。
///
/// 開始時刻で安定ソートしたうえで、各エントリーの終了時刻が後続のエントリーの
/// 開始時刻より厳密に後であれば重複とする。終了時刻と開始時刻が等しいだけの
/// エントリーは隣接として扱う。開始時刻が等しい場合は入力順を保つ。
///
/// # Arguments
///
/// * `entries` - 検証するエントリー。順序は問わない
/// * `policy` - 最初の重複で止めるか、すべての重複を報告するか
pub fn validate_data_for_overlaps(
    entries: &[TimeSheetEntry],
    policy: OverlapPolicy,
) -> OverlapReport {
    let mut sorted: Vec<(usize, &TimeSheetEntry)> = entries.iter().enumerate().collect();
    sorted.sort_by_key(|(_, entry)| entry.start_date_time);

    let mut overlaps = Vec::new();
    'outer: for (i, (first_index, first)) in sorted.iter().enumerate() {
        for (second_index, second) in &sorted[i + 1..] {
            // 開始時刻順なので、ここで重ならなければ以降も重ならない
            if first.end_date_time <= second.start_date_time {
                break;
            }

            overlaps.push(OverlapPair {
                first: (*first).clone(),
                second: (*second).clone(),
                first_index: *first_index,
                second_index: *second_index,
            });
            if policy == OverlapPolicy::StopEarly {
                break 'outer;
            }
        }
    }

    OverlapReport {
        is_valid: overlaps.is_empty(),
        overlaps,
    }
}

/// 検証結果に従って`overlapping`の注釈を付与する。
///
/// `report`は同じ`entries`に対する検証結果でなければならない。
pub fn annotate_overlaps(entries: &mut [TimeSheetEntry], report: &OverlapReport) {
    entries
        .iter_mut()
        .for_each(|entry| entry.overlapping = Some(false));
    for pair in &report.overlaps {
        for index in [pair.first_index, pair.second_index] {
            if let Some(entry) = entries.get_mut(index) {
                entry.overlapping = Some(true);
            }
        }
    }
}
