//! Logger setup for the arm executables
//!
//! Every record is stamped with the session time so that log lines can be
//! lined up against the archived arm status reports. The console gets
//! coloured level tags, the session log file gets plain text.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info, Level};
use colored::Colorize;
use std::fmt::Display;
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Targets which are held at `Info` whatever the requested level, their
/// debug output swamps the per-cycle arm logs.
const QUIET_TARGETS: [&str; 2] = ["zmq", "comms_if::net"];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// # Notes
///
/// - `min_level` must be `Info` or more verbose, arm control reports its
///   lifecycle at `Info` and that must never be filtered out.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: self::LevelFilter,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let console = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!(
            "{}",
            format_line(
                session::get_elapsed_seconds(),
                record.level(),
                record.target(),
                message,
                true
            )
        )))
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!(
            "{}",
            format_line(
                session::get_elapsed_seconds(),
                record.level(),
                record.target(),
                message,
                false
            )
        )))
        .chain(log_file);

    let mut dispatch = fern::Dispatch::new().level(min_level);
    for target in QUIET_TARGETS.iter() {
        dispatch = dispatch.level_for(*target, LevelFilter::Info);
    }

    dispatch
        .chain(console)
        .chain(file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Ok(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build one log line.
///
/// The target is only shown for debug and trace records, otherwise the
/// per-cycle output gets too wide to read.
fn format_line<M: Display>(
    elapsed_s: f64,
    level: Level,
    target: &str,
    message: M,
    colour: bool
) -> String {
    let tag = if colour {
        paint(level).to_string()
    }
    else {
        level_tag(level).to_string()
    };

    if level > Level::Info {
        format!("[{:10.6} {}] {}: {}", elapsed_s, tag, short_target(target), message)
    }
    else {
        format!("[{:10.6} {}] {}", elapsed_s, tag, message)
    }
}

/// Drop the crate name from a target, `arm_lib::arm_ctrl::state` becomes
/// `arm_ctrl::state`. Crate roots are left alone.
fn short_target(target: &str) -> &str {
    match target.find("::") {
        Some(i) => &target[i + 2..],
        None => target
    }
}

/// Get the three letter tag of a log level
fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info  => "INF",
        Level::Warn  => "WRN",
        Level::Error => "ERR"
    }
}

fn paint(level: Level) -> colored::ColoredString {
    let tag = level_tag(level);
    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info  => tag.normal(),
        Level::Warn  => tag.yellow(),
        Level::Error => tag.red().bold()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_short_target() {
        assert_eq!(short_target("arm_lib::arm_ctrl::state"), "arm_ctrl::state");
        assert_eq!(short_target("arm_lib::data_store"), "data_store");
        assert_eq!(short_target("arm_exec"), "arm_exec");
    }

    #[test]
    fn test_plain_lines() {
        assert_eq!(
            format_line(1.5, Level::Info, "arm_lib::arm_ctrl::state", "ArmCtrl configured", false),
            "[  1.500000 INF] ArmCtrl configured"
        );
        assert_eq!(
            format_line(12.0, Level::Debug, "arm_lib::arm_ctrl::state", "Moving to Top", false),
            "[ 12.000000 DBG] arm_ctrl::state: Moving to Top"
        );
        assert_eq!(
            format_line(0.02, Level::Error, "arm_lib::data_store", "Drive lost", false),
            "[  0.020000 ERR] Drive lost"
        );
    }

    #[test]
    fn test_coloured_keeps_text() {
        let line = format_line(3.0, Level::Warn, "arm_lib::data_store", "Overrun", true);
        assert!(line.contains("WRN"));
        assert!(line.ends_with("] Overrun"));
    }
}
