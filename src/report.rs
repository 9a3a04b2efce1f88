use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const BANNER_WIDTH: usize = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    #[allow(dead_code)]
    Warning,
    Alert,
    Success,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Alert => "ALERT",
            Self::Success => "SUCCESS",
        })
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub text: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] {}",
            format_timestamp(&self.timestamp),
            self.level,
            self.text
        )
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write to console: {0}")]
    Console(#[source] io::Error),
    #[error("failed to append to log file {path}: {source}")]
    LogFile { path: String, source: io::Error },
}

/// Sends every entry to the console (colored) and appends it to the log file
/// (plain). The file is reopened for each entry.
pub struct Reporter<W: Write> {
    console: W,
    log_path: PathBuf,
}

impl Reporter<io::Stdout> {
    pub fn stdout(log_path: impl Into<PathBuf>) -> Self {
        Self::new(io::stdout(), log_path)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(console: W, log_path: impl Into<PathBuf>) -> Self {
        Self {
            console,
            log_path: log_path.into(),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn report(&mut self, message: impl Into<String>, level: Level) -> Result<(), ReportError> {
        let entry = LogEntry {
            timestamp: Local::now(),
            level,
            text: message.into(),
        };
        let line = entry.to_string();
        writeln!(self.console, "{}", paint(&line, level)).map_err(ReportError::Console)?;
        self.append(&line)
    }

    pub fn banner(&mut self, generated_at: DateTime<Local>) -> Result<(), ReportError> {
        let rule = "=".repeat(BANNER_WIDTH);
        let generated = format!("Generated at: {}", format_timestamp(&generated_at));
        writeln!(
            self.console,
            "\n{rule}\n{}\n{}\n{rule}\n",
            "System Health Monitoring Report".bright_blue(),
            generated.bright_blue()
        )
        .map_err(ReportError::Console)
    }

    pub fn summary(&mut self, all_healthy: bool) -> Result<(), ReportError> {
        let rule = "=".repeat(BANNER_WIDTH);
        let verdict = if all_healthy {
            "\u{2713} System Health: ALL CHECKS PASSED".bright_green()
        } else {
            "\u{2717} System Health: ALERTS DETECTED - Check logs for details".bright_red()
        };
        writeln!(self.console, "\n{rule}\n{verdict}\n{rule}\n").map_err(ReportError::Console)
    }

    fn append(&self, line: &str) -> Result<(), ReportError> {
        let to_error = |source| ReportError::LogFile {
            path: self.log_path.display().to_string(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(to_error)?;
        writeln!(file, "{line}").map_err(to_error)
    }

    #[cfg(test)]
    pub fn console(&self) -> &W {
        &self.console
    }
}

fn paint(line: &str, level: Level) -> ColoredString {
    match level {
        Level::Alert => line.bright_red(),
        Level::Warning => line.bright_yellow(),
        Level::Success => line.bright_green(),
        Level::Info => line.bright_blue(),
    }
}

fn format_timestamp(ts: &DateTime<Local>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn reporter_in(dir: &tempfile::TempDir) -> Reporter<Vec<u8>> {
        Reporter::new(Vec::new(), dir.path().join("system_health.log"))
    }

    fn read_log(reporter: &Reporter<Vec<u8>>) -> String {
        std::fs::read_to_string(reporter.log_path()).expect("read log")
    }

    #[test]
    fn line_has_timestamp_level_and_message() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut reporter = reporter_in(&dir);
        reporter
            .report("CPU Usage: 12.0%", Level::Info)
            .expect("report");

        let log = read_log(&reporter);
        let line = log.lines().next().expect("one line");
        let ts = line
            .strip_prefix('[')
            .and_then(|rest| rest.split_once("] "))
            .map(|(ts, _)| ts)
            .expect("timestamp");
        NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).expect("timestamp format");
        assert!(line.ends_with("] [INFO] CPU Usage: 12.0%"), "{line}");
    }

    #[test]
    fn console_and_file_receive_the_same_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut reporter = reporter_in(&dir);
        reporter.report("disk is full", Level::Alert).expect("report");

        let log = read_log(&reporter);
        let console = String::from_utf8(reporter.console().clone()).expect("utf8");
        let line = log.trim_end();
        assert!(console.contains(line), "console {console:?} lacks {line:?}");
        assert!(!log.contains('\u{1b}'), "log file must stay plain");
    }

    #[test]
    fn entries_are_appended_in_call_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log_path = dir.path().join("system_health.log");
        std::fs::write(&log_path, "earlier run\n").expect("seed log");

        let mut reporter = Reporter::new(Vec::new(), &log_path);
        reporter.report("first", Level::Info).expect("report");
        reporter.report("second", Level::Warning).expect("report");
        reporter.report("third", Level::Success).expect("report");

        let log = read_log(&reporter);
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "earlier run");
        assert!(lines[1].ends_with("[INFO] first"));
        assert!(lines[2].ends_with("[WARNING] second"));
        assert!(lines[3].ends_with("[SUCCESS] third"));
    }

    #[test]
    fn unwritable_log_path_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut reporter = Reporter::new(Vec::new(), dir.path());
        let err = reporter
            .report("anything", Level::Info)
            .expect_err("a directory cannot be appended to");
        assert!(matches!(err, ReportError::LogFile { .. }));
    }

    #[test]
    fn alert_lines_are_red() {
        colored::control::set_override(true);
        let alert = paint("boom", Level::Alert).to_string();
        let painted = paint("ok", Level::Success).to_string();
        colored::control::unset_override();
        assert!(alert.starts_with("\u{1b}[91m"), "{alert:?}");
        assert!(painted.starts_with("\u{1b}[92m"), "{painted:?}");
    }

    #[test]
    fn banners_stay_off_the_log_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut reporter = reporter_in(&dir);
        reporter.banner(Local::now()).expect("banner");
        reporter.summary(false).expect("summary");

        let console = String::from_utf8(reporter.console().clone()).expect("utf8");
        assert!(console.contains("System Health Monitoring Report"));
        assert!(console.contains("Generated at: "));
        assert!(console.contains("ALERTS DETECTED - Check logs for details"));
        assert!(console.contains(&"=".repeat(BANNER_WIDTH)));
        assert!(!reporter.log_path().exists());
    }

    #[test]
    fn level_tags() {
        let tags: Vec<String> = [Level::Info, Level::Warning, Level::Alert, Level::Success]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(tags, ["INFO", "WARNING", "ALERT", "SUCCESS"]);
    }
}
