use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// タイムゾーン指定のない日時として受け付ける書式。
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// 日付の区切りと日時の表示に利用するタイムゾーン。
///
/// 実行環境に依存しない結果を得るため、既定値はUTCとする。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DayZone {
    #[default]
    Utc,
    Local,
    Fixed(FixedOffset),
}

impl DayZone {
    /// 指定した時刻がこのタイムゾーンでどの日付に属するかを返す。
    pub fn date_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        match self {
            DayZone::Utc => instant.date_naive(),
            DayZone::Local => instant.with_timezone(&Local).date_naive(),
            DayZone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }

    /// このタイムゾーンで時刻を文字列に整形する。
    pub fn format(&self, instant: &DateTime<Utc>, fmt: &str) -> String {
        match self {
            DayZone::Utc => instant.format(fmt).to_string(),
            DayZone::Local => instant.with_timezone(&Local).format(fmt).to_string(),
            DayZone::Fixed(offset) => instant.with_timezone(offset).format(fmt).to_string(),
        }
    }

    /// このタイムゾーンの壁時計時刻をUTCの時刻に変換する。
    ///
    /// 夏時間の切り替えなどで一意に定まらない場合はエラーを返す。
    pub fn resolve(&self, naive: &NaiveDateTime) -> Result<DateTime<Utc>> {
        let instant = match self {
            DayZone::Utc => Utc.from_utc_datetime(naive),
            DayZone::Local => Local
                .from_local_datetime(naive)
                .single()
                .with_context(|| format!("Ambiguous local datetime: {}", naive))?
                .to_utc(),
            DayZone::Fixed(offset) => offset
                .from_local_datetime(naive)
                .single()
                .with_context(|| format!("Invalid datetime for offset {}: {}", offset, naive))?
                .to_utc(),
        };

        Ok(instant)
    }
}

impl FromStr for DayZone {
    type Err = anyhow::Error;

    /// `UTC`、`local`、または`+09:00`形式のオフセットをパースする。
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return Ok(DayZone::Utc);
        }
        if s.eq_ignore_ascii_case("local") {
            return Ok(DayZone::Local);
        }

        parse_offset(s).map(DayZone::Fixed)
    }
}

impl fmt::Display for DayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayZone::Utc => write!(f, "UTC"),
            DayZone::Local => write!(f, "local"),
            DayZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// `+HH:MM`、`-HH:MM`、`+HHMM`形式のオフセットをパースする。
fn parse_offset(s: &str) -> Result<FixedOffset> {
    let (sign, rest) = match s.chars().next() {
        Some('+') => (1, &s[1..]),
        Some('-') => (-1, &s[1..]),
        _ => bail!("Unknown time zone: {}", s),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        bail!("Invalid UTC offset: {}", s);
    }
    let hours: i32 = digits[..2]
        .parse()
        .with_context(|| format!("Invalid hour in offset: {}", s))?;
    let minutes: i32 = digits[2..]
        .parse()
        .with_context(|| format!("Invalid minute in offset: {}", s))?;
    if minutes >= 60 {
        bail!("Invalid minute in offset: {}", s);
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .with_context(|| format!("UTC offset out of range: {}", s))
}

/// CSVのセル文字列を時刻に変換する。
///
/// RFC 3339形式の場合は記載されたオフセットに従い、
/// オフセットのない形式の場合は`zone`の壁時計時刻として解釈する。
pub fn parse_instant(s: &str, zone: &DayZone) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Ok(datetime.to_utc());
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .with_context(|| format!("Failed to parse datetime: {}", s))?;

    zone.resolve(&naive)
}
