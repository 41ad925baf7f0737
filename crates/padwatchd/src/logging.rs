// Daemon log output. Records from both `padwatchd` and the `padwatch` library
// go through one fern dispatcher; the `print_*!` macros tint the daemon's own
// messages by level before handing them to `log`.

use colored::{ColoredString, Colorize};
use fern::Dispatch;
use log::{Level, LevelFilter};

const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S%.3f";
const DAEMON_TARGET: &str = "padwatchd";

pub(crate) fn paint(level: Level, message: &str) -> ColoredString {
    match level {
        Level::Error => message.bright_red(),
        Level::Warn => message.bright_yellow(),
        Level::Info => message.normal(),
        Level::Debug | Level::Trace => message.dimmed(),
    }
}

/// Library records are tagged with their module so they stand apart from
/// the daemon's event lines.
fn format_line(timestamp: &str, target: &str, message: &std::fmt::Arguments<'_>) -> String {
    if target.starts_with(DAEMON_TARGET) {
        format!("[{timestamp}] {message}")
    } else {
        format!("[{timestamp}] {target}: {message}")
    }
}

#[macro_export]
macro_rules! print_log {
    ($level:expr, $($arg:tt)*) => {
        log::log!($level, "{}", $crate::logging::paint($level, &format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => { $crate::print_log!(log::Level::Error, $($arg)*) };
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => { $crate::print_log!(log::Level::Warn, $($arg)*) };
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => { $crate::print_log!(log::Level::Info, $($arg)*) };
}

#[macro_export]
macro_rules! print_debug {
    ($($arg:tt)*) => { $crate::print_log!(log::Level::Debug, $($arg)*) };
}

/// Setup the logger. `--verbose` lowers both the daemon and the library to debug.
pub(crate) fn setup(verbose: bool, no_color: bool) -> Result<(), log::SetLoggerError> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if no_color {
        colored::control::set_override(false);
    }
    Dispatch::new()
        .format(|out, message, record| {
            let now = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
            out.finish(format_args!(
                "{}",
                format_line(&now, record.target(), message)
            ));
        })
        .level(LevelFilter::Warn)
        .level_for(DAEMON_TARGET, log_level)
        .level_for("padwatch", log_level)
        .chain(std::io::stdout())
        .apply()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daemon_lines_carry_no_target() {
        let line = format_line("t", "padwatchd::runner", &format_args!("attach sdl:0"));
        assert_eq!(line, "[t] attach sdl:0");
    }

    #[test]
    fn library_lines_carry_target() {
        let line = format_line("t", "padwatch::session", &format_args!("session started"));
        assert_eq!(line, "[t] padwatch::session: session started");
    }

    #[test]
    fn plain_when_colors_disabled() {
        colored::control::set_override(false);
        assert_eq!(paint(Level::Error, "boom").to_string(), "boom");
        colored::control::unset_override();
    }
}
