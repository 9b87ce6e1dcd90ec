use std::io::Write;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::datetime::DayZone;
use crate::overlap::OverlapReport;
use crate::summary::Summary;
use crate::time_sheet_entry::TimeSheetEntry;

/// 出力形式。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            _ => bail!("Unknown output format: {} (expected markdown or json)", s),
        }
    }
}

/// Consoleに検証結果や集計結果を表示するためのtrait。
pub trait ConsolePresenter {
    /// エントリーの一覧を表示する。
    fn show_entries(&mut self, entries: &[TimeSheetEntry]) -> Result<()>;

    /// 重複検証の結果を表示する。
    fn show_overlap_report(&mut self, report: &OverlapReport) -> Result<()>;

    /// 日毎の集計結果を表示する。
    fn show_summaries(&mut self, summaries: &[Summary]) -> Result<()>;
}

/// Markdownのlist形式で表示する。
pub struct ConsoleMarkdownList<'a, W: Write> {
    writer: &'a mut W,
    zone: DayZone,
}

impl<'a, W: Write> ConsoleMarkdownList<'a, W> {
    /// 新しい`ConsoleMarkdownList`を返す。
    ///
    /// # Arguments
    ///
    /// * `writer` - 出力先
    /// * `zone` - 日時の表示に利用するタイムゾーン
    pub fn new(writer: &'a mut W, zone: DayZone) -> Self {
        Self { writer, zone }
    }

    fn format_range(&self, entry: &TimeSheetEntry) -> String {
        format!(
            "{} ~ {}",
            self.zone.format(&entry.start_date_time, "%Y-%m-%d %H:%M"),
            self.zone.format(&entry.end_date_time, "%Y-%m-%d %H:%M"),
        )
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdownList<'a, W> {
    // 入力順のまま表示し、重複しているエントリーには印を付ける
    fn show_entries(&mut self, entries: &[TimeSheetEntry]) -> Result<()> {
        for entry in entries {
            let mark = match entry.overlapping {
                Some(true) => " (overlapping)",
                _ => "",
            };
            let range = self.format_range(entry);
            writeln!(self.writer, "- {}{}", range, mark)
                .with_context(|| format!("Failed to write time sheet entry: {:?}", entry))?;
        }

        Ok(())
    }

    fn show_overlap_report(&mut self, report: &OverlapReport) -> Result<()> {
        if report.is_valid {
            writeln!(self.writer, "No overlapping entries.")
                .context("Failed to write overlap report")?;
            return Ok(());
        }

        writeln!(
            self.writer,
            "Found {} overlapping pair(s):",
            report.overlaps.len()
        )
        .context("Failed to write overlap report")?;
        for pair in &report.overlaps {
            let first = self.format_range(&pair.first);
            let second = self.format_range(&pair.second);
            writeln!(self.writer, "- {} overlaps {}", first, second)
                .with_context(|| format!("Failed to write overlap: {:?}", pair))?;
        }

        Ok(())
    }

    fn show_summaries(&mut self, summaries: &[Summary]) -> Result<()> {
        for summary in summaries {
            writeln!(self.writer, "## {}", summary.date)
                .with_context(|| format!("Failed to write summary: {:?}", summary))?;
            writeln!(self.writer, "- hours worked: {:.2}", summary.hours_worked)
                .with_context(|| format!("Failed to write summary: {:?}", summary))?;
            writeln!(self.writer, "- entries: {}", summary.num_entries)
                .with_context(|| format!("Failed to write summary: {:?}", summary))?;
            if !summary.flags.is_empty() {
                let flags: Vec<String> = summary.flags.iter().map(|f| f.to_string()).collect();
                writeln!(self.writer, "- flags: {}", flags.join(", "))
                    .with_context(|| format!("Failed to write summary: {:?}", summary))?;
            }
        }

        Ok(())
    }
}

/// 整形したJSONで表示する。
pub struct ConsoleJson<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleJson<'a, W> {
    /// 新しい`ConsoleJson`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut *self.writer, value)
            .context("Failed to serialize output")?;
        writeln!(self.writer).context("Failed to write output")?;

        Ok(())
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleJson<'a, W> {
    fn show_entries(&mut self, entries: &[TimeSheetEntry]) -> Result<()> {
        self.write_json(entries)
    }

    fn show_overlap_report(&mut self, report: &OverlapReport) -> Result<()> {
        self.write_json(report)
    }

    fn show_summaries(&mut self, summaries: &[Summary]) -> Result<()> {
        self.write_json(summaries)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::rstest;

    use super::{ConsoleJson, ConsoleMarkdownList, ConsolePresenter, OutputFormat};
    use crate::datetime::DayZone;
    use crate::overlap::{validate_data_for_overlaps, OverlapPolicy, OverlapReport};
    use crate::summary::{Flag, Summary};
    use crate::time_sheet_entry::TimeSheetEntry;

    /// テスト用にダミーのTimeSheetEntryを作成する。
    fn dummy_entry(pattern: u8) -> TimeSheetEntry {
        match pattern {
            1 => TimeSheetEntry::new(
                Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap(),
            ),
            2 => TimeSheetEntry::new(
                Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            ),
            3 => TimeSheetEntry {
                overlapping: Some(true),
                ..dummy_entry(1)
            },
            _ => panic!("Invalid pattern: {}", pattern),
        }
    }

    fn dummy_summary() -> Summary {
        Summary {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            hours_worked: 12.0,
            num_entries: 2,
            flags: vec![Flag::Overtime, Flag::Overtime],
        }
    }

    #[rstest]
    #[case::no_entry(&[], "")]
    #[case::single(&[dummy_entry(1)], "- 2024-03-01 09:00 ~ 2024-03-01 11:00\n")]
    #[case::keeps_input_order(
        &[dummy_entry(2), dummy_entry(1)],
        "- 2024-03-01 10:00 ~ 2024-03-01 12:00\n- 2024-03-01 09:00 ~ 2024-03-01 11:00\n",
    )]
    #[case::overlapping(
        &[dummy_entry(3)],
        "- 2024-03-01 09:00 ~ 2024-03-01 11:00 (overlapping)\n",
    )]
    fn test_show_entries(#[case] input: &[TimeSheetEntry], #[case] expected: &str) {
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer, DayZone::Utc);

        presenter.show_entries(input).unwrap();

        assert_eq!(String::from_utf8(writer).unwrap(), expected);
    }

    #[test]
    fn test_show_entries_in_zone() {
        let mut writer = Vec::new();
        let zone: DayZone = "+09:00".parse().unwrap();
        let mut presenter = ConsoleMarkdownList::new(&mut writer, zone);

        presenter.show_entries(&[dummy_entry(1)]).unwrap();

        assert_eq!(
            String::from_utf8(writer).unwrap(),
            "- 2024-03-01 18:00 ~ 2024-03-01 20:00\n"
        );
    }

    #[test]
    fn test_show_valid_report() {
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer, DayZone::Utc);
        let report = OverlapReport {
            is_valid: true,
            overlaps: vec![],
        };

        presenter.show_overlap_report(&report).unwrap();

        assert_eq!(String::from_utf8(writer).unwrap(), "No overlapping entries.\n");
    }

    #[test]
    fn test_show_invalid_report() {
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer, DayZone::Utc);
        let report = validate_data_for_overlaps(
            &[dummy_entry(1), dummy_entry(2)],
            OverlapPolicy::Exhaustive,
        );

        presenter.show_overlap_report(&report).unwrap();

        assert_eq!(
            String::from_utf8(writer).unwrap(),
            "Found 1 overlapping pair(s):\n\
             - 2024-03-01 09:00 ~ 2024-03-01 11:00 overlaps 2024-03-01 10:00 ~ 2024-03-01 12:00\n"
        );
    }

    #[test]
    fn test_show_summaries() {
        let mut writer = Vec::new();
        let mut presenter = ConsoleMarkdownList::new(&mut writer, DayZone::Utc);
        let no_flags = Summary {
            date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            hours_worked: 1.5,
            num_entries: 1,
            flags: vec![],
        };

        presenter
            .show_summaries(&[dummy_summary(), no_flags])
            .unwrap();

        assert_eq!(
            String::from_utf8(writer).unwrap(),
            "## 2024-03-01\n\
             - hours worked: 12.00\n\
             - entries: 2\n\
             - flags: Overtime, Overtime\n\
             ## 2024-03-02\n\
             - hours worked: 1.50\n\
             - entries: 1\n"
        );
    }

    #[test]
    fn test_json_summaries() {
        let mut writer = Vec::new();
        let mut presenter = ConsoleJson::new(&mut writer);

        presenter.show_summaries(&[dummy_summary()]).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&writer).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "date": "2024-03-01",
                "hoursWorked": 12.0,
                "numEntries": 2,
                "flags": ["Overtime", "Overtime"],
            }])
        );
    }

    #[test]
    fn test_json_report() {
        let mut writer = Vec::new();
        let mut presenter = ConsoleJson::new(&mut writer);
        let report = validate_data_for_overlaps(
            &[dummy_entry(1), dummy_entry(2)],
            OverlapPolicy::Exhaustive,
        );

        presenter.show_overlap_report(&report).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&writer).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["overlaps"].as_array().unwrap().len(), 1);
    }

    #[rstest]
    #[case::markdown("markdown", OutputFormat::Markdown)]
    #[case::md("md", OutputFormat::Markdown)]
    #[case::json("json", OutputFormat::Json)]
    fn test_parse_format(#[case] input: &str, #[case] expected: OutputFormat) {
        assert_eq!(input.parse::<OutputFormat>().unwrap(), expected);
    }

    #[test]
    fn test_parse_format_error() {
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
