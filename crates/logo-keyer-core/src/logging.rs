use log::{error, info, LevelFilter};
use std::path::Path;

// For file-based logging with rotation
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::error::{Error, Result};
use crate::types::{FileReport, FileStatus};

/// Environment variable overriding the file log level
pub const LOG_ENV_VAR: &str = "LOGO_KEYER_LOG";

/// Initialize a rolling file logger under `log_dir`.
/// Replaces console logging; call this instead of `env_logger`, not alongside it.
pub fn init_logger(log_dir: &Path, level: LevelFilter) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let log_file_path = log_dir.join("logo-keyer.log");
    let archived_logs_pattern = format!("{}/logo-keyer.{{}}.log", log_dir.display());

    // Rotate at 10MB
    let file_trigger = SizeTrigger::new(10 * 1024 * 1024);

    // Keep 5 archived log files
    let file_roller = FixedWindowRoller::builder()
        .build(&archived_logs_pattern, 5)
        .map_err(|e| Error::Configuration(format!("Failed to create log roller: {}", e)))?;

    let compound_policy = CompoundPolicy::new(Box::new(file_trigger), Box::new(file_roller));

    let rolling_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] [{M}:{L}] - {m}{n}",
        )))
        .build(&log_file_path, Box::new(compound_policy))
        .map_err(|e| Error::Configuration(format!("Failed to create log appender: {}", e)))?;

    let level = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(level);

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(rolling_file)))
        .build(Root::builder().appender("file").build(level))
        .map_err(|e| Error::Configuration(format!("Failed to build log config: {}", e)))?;

    log4rs::init_config(config)
        .map_err(|e| Error::Configuration(format!("Failed to initialize log4rs: {}", e)))?;

    info!("logo-keyer started");
    info!("Logging to file: {}", log_file_path.display());
    Ok(())
}

/// Log file operation that failed
pub fn log_file_error(path: &Path, operation: &str, error: &dyn std::error::Error) {
    error!(
        "File operation failed - Operation: {}, Path: {}, Error: {}",
        operation,
        path.display(),
        error
    );
}

/// Log file system modification
pub fn log_fs_modification(operation: &str, path: &Path, details: Option<&str>) {
    let details_str = details.unwrap_or("");
    info!(
        "FS CHANGE - Operation: {}, Path: {}{}",
        operation,
        path.display(),
        if details_str.is_empty() {
            "".to_string()
        } else {
            format!(", Details: {}", details_str)
        }
    );
}

/// Log the outcome of keying one file
pub fn log_key_result(report: &FileReport) {
    match &report.status {
        FileStatus::Keyed(outcome) => info!(
            "Keyed {} -> {} ({}x{}): {} pixels made transparent",
            outcome.source.display(),
            outcome.destination.display(),
            outcome.width,
            outcome.height,
            outcome.converted
        ),
        FileStatus::Skipped => info!("Skipped {} (not found)", report.path.display()),
        FileStatus::Failed(message) => error!(
            "Keying failed - Path: {}, Error: {}",
            report.path.display(),
            message
        ),
    }
}
