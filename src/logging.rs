use anyhow::{anyhow, Context, Result};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// ログ出力を初期化する。
///
/// 標準出力は結果の表示に利用するため、ログは標準エラー出力に書き出す。
///
/// # Arguments
///
/// * `level` - 出力するログの最低レベル
pub fn init(level: LevelFilter) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
        .context("Failed to initialize logger")
}

/// ログレベルをパースする。
pub fn parse_level(s: &str) -> Result<LevelFilter> {
    s.parse::<LevelFilter>().map_err(|_| {
        anyhow!(
            "Unknown log level: {} (expected off, error, warn, info, debug or trace)",
            s
        )
    })
}
