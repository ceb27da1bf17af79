//! log4rs setup: rolling `app.log` for everything, `audit.log` for the `docexec::audit` target.

use crate::config::LogConfig;
use crate::errors::DbError;
use crate::telemetry::AUDIT_TARGET;
use crate::utils::devlog::TARGET as DEVLOG_TARGET;
use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_RETENTION: usize = 7;
const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";

#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn log_err(e: impl std::fmt::Display) -> DbError {
    DbError::Config(format!("logging: {e}"))
}

fn rolling(base: &Path, name: &str, keep: u32) -> Result<RollingFileAppender, DbError> {
    let roller = FixedWindowRoller::builder()
        .build(&base.join(format!("{name}.{{}}.log")).display().to_string(), keep)
        .map_err(log_err)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{name}.log")), Box::new(policy))
        .map_err(log_err)
}

/// Builds the log4rs configuration without installing it.
///
/// # Errors
/// Returns `Config` when the directory cannot be created or an appender fails to open.
pub fn build_config(dir: Option<&Path>, level: Option<&str>, retention: Option<usize>) -> Result<Config, DbError> {
    let base = dir.map_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")), PathBuf::from);
    std::fs::create_dir_all(&base)?;
    let keep = u32::try_from(retention.unwrap_or(DEFAULT_RETENTION)).unwrap_or(u32::MAX);
    let lvl = parse_level(level);

    Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(&base, "audit", keep)?)))
        .logger(Logger::builder().appender("audit").additive(false).build(AUDIT_TARGET, lvl.max(LevelFilter::Info)))
        // devlog narration is captured by the thread-local sink; keep it out of app.log unless tracing.
        .logger(Logger::builder().build(DEVLOG_TARGET, lvl))
        .build(Root::builder().appender("app").build(lvl))
        .map_err(log_err)
}

/// Installs logging for the process. A second call is a no-op that returns `Ok`.
///
/// # Errors
/// See [`build_config`].
pub fn configure_logging(dir: Option<&Path>, level: Option<&str>, retention: Option<usize>) -> Result<(), DbError> {
    let config = build_config(dir, level, retention)?;
    if log4rs::init_config(config).is_err() {
        log::debug!("logger already initialised");
    }
    Ok(())
}

pub fn configure_from(cfg: &LogConfig) -> Result<(), DbError> {
    configure_logging(cfg.dir.as_deref(), cfg.level.as_deref(), cfg.retention)
}
