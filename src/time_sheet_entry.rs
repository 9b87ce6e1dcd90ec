use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// タイムシートの1行分のエントリー。
///
/// `overlapping`は入力ではなく、重複検証の結果として付与される注釈。
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSheetEntry {
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlapping: Option<bool>,
}

impl TimeSheetEntry {
    /// 新しい`TimeSheetEntry`を返す。
    pub fn new(start_date_time: DateTime<Utc>, end_date_time: DateTime<Utc>) -> Self {
        Self {
            start_date_time,
            end_date_time,
            overlapping: None,
        }
    }

    /// 開始から終了までの時間。終了が開始以前の場合は0または負になる。
    pub fn duration(&self) -> Duration {
        self.end_date_time - self.start_date_time
    }

    /// 終了が開始より後であればtrue。
    pub fn is_well_formed(&self) -> bool {
        self.end_date_time > self.start_date_time
    }
}
