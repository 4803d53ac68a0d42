//! Logging setup for finstats.

use chrono::Local;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{Result, StatsError};
use crate::setting::Settings;
use crate::utility::get_folder_path;

/// Integer log levels used by the `log.level` setting
pub const DEBUG: i32 = 10;
pub const INFO: i32 = 20;
pub const WARNING: i32 = 30;

/// Convert integer log level to tracing Level, anything above `WARNING` is an error
pub fn level_from_int(level: i32) -> Level {
    match level {
        l if l <= DEBUG => Level::DEBUG,
        l if l <= INFO => Level::INFO,
        l if l <= WARNING => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Initialize the global subscriber from `log.*` settings.
///
/// `RUST_LOG` directives are honored on top of `log.level`. Does nothing
/// when `log.active` is false. Fails if a subscriber is already installed
/// or the log file cannot be opened.
pub fn init_logger(settings: &Settings) -> Result<()> {
    if !settings.get_bool("log.active").unwrap_or(true) {
        return Ok(());
    }

    let log_level = settings.get_int("log.level").unwrap_or(INFO as i64) as i32;
    let log_console = settings.get_bool("log.console").unwrap_or(true);
    let log_file = settings.get_bool("log.file").unwrap_or(false);

    let level = level_from_int(log_level);
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let console_layer = log_console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .boxed()
    });

    let file_layer = if log_file {
        let path = get_log_file_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                StatsError::Setting(format!("cannot open log file {}: {}", path.display(), e))
            })?;
        Some(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .boxed(),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| StatsError::Setting(e.to_string()))?;

    debug!(level = %level, console = log_console, file = log_file, "logger initialized");
    Ok(())
}

/// Get the log file path for today
fn get_log_file_path() -> PathBuf {
    let log_folder = get_folder_path("log");
    log_folder.join(log_file_name(&Local::now().format("%Y%m%d").to_string()))
}

fn log_file_name(day: &str) -> String {
    format!("finstats_{}.log", day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setting::SettingValue;

    #[test]
    fn test_level_from_int() {
        assert_eq!(level_from_int(DEBUG), Level::DEBUG);
        assert_eq!(level_from_int(INFO), Level::INFO);
        assert_eq!(level_from_int(15), Level::INFO);
        assert_eq!(level_from_int(WARNING), Level::WARN);
        assert_eq!(level_from_int(40), Level::ERROR);
        assert_eq!(level_from_int(50), Level::ERROR);
    }

    #[test]
    fn test_log_file_name() {
        assert_eq!(log_file_name("20240102"), "finstats_20240102.log");
    }

    #[test]
    fn test_inactive_logger_is_noop() {
        let settings = Settings::defaults();
        settings.set("log.active", SettingValue::Bool(false));
        assert!(init_logger(&settings).is_ok());
    }
}
