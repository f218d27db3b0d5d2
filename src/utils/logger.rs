//! Process-wide logging via log4rs rolling files.
//!
//! Layout under the chosen directory:
//! - `app.log`: everything routed to the root logger
//! - `audit.log`: mutations, target `restlite::audit`
//! - `dev6.log`: bench lines, target `restlite::dev6` (only when enabled)
//!
//! log4rs accepts only one global configuration per process; later calls keep the first one
//! but still create the files.

use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

use crate::config::LogConfig;
use crate::errors::RestError;

pub const AUDIT_TARGET: &str = "restlite::audit";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";

#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").to_ascii_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, RestError> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)
        .map_err(|e| RestError::Config(e.to_string()))?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))
        .map_err(RestError::from)
}

/// Configure logging for the process.
/// - dir: base directory for logs; current directory if None.
/// - level: error|warn|info|debug|trace
/// - retention: rolled files to keep (default 7)
///
/// # Errors
/// Fails when the directory or a log file cannot be created.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
    enable_dev6: bool,
) -> Result<(), RestError> {
    let base = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&base)?;
    let keep = u32::try_from(retention.unwrap_or(7)).unwrap_or(u32::MAX);
    let lvl = parse_level(level);

    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(&base, "audit", keep)?)))
        .logger(Logger::builder().appender("audit").additive(false).build(AUDIT_TARGET, lvl));

    builder = if enable_dev6 {
        builder
            .appender(Appender::builder().build("dev6", Box::new(rolling(&base, "dev6", keep)?)))
            .logger(
                Logger::builder()
                    .appender("dev6")
                    .additive(false)
                    .build(crate::utils::devlog::DEV_TARGET, LevelFilter::Trace),
            )
    } else {
        builder.logger(
            Logger::builder().additive(false).build(crate::utils::devlog::DEV_TARGET, LevelFilter::Off),
        )
    };

    let config = builder
        .build(Root::builder().appender("app").build(lvl))
        .map_err(|e| RestError::Config(e.to_string()))?;
    let _ = log4rs::init_config(config);
    Ok(())
}

/// Configure logging from a loaded [`LogConfig`].
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_config(cfg: &LogConfig) -> Result<(), RestError> {
    configure_logging(cfg.dir.as_deref(), cfg.level.as_deref(), cfg.retention, cfg.dev6)
}

/// Configure logging from environment variables if present:
/// - `RESTLITE_LOG_DIR`
/// - `RESTLITE_LOG_LEVEL`
/// - `RESTLITE_LOG_RETENTION`
/// - `RESTLITE_DEV6` (1|true|yes)
///
/// # Errors
/// See [`configure_logging`].
pub fn configure_from_env() -> Result<(), RestError> {
    configure_from_config(&log_config_from_env(|k| std::env::var(k).ok()))
}

#[must_use]
pub fn log_config_from_env<F: Fn(&str) -> Option<String>>(get: F) -> LogConfig {
    LogConfig {
        dir: get("RESTLITE_LOG_DIR").map(PathBuf::from),
        level: get("RESTLITE_LOG_LEVEL"),
        retention: get("RESTLITE_LOG_RETENTION").and_then(|s| s.trim().parse().ok()),
        dev6: get("RESTLITE_DEV6")
            .is_some_and(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
    }
}
