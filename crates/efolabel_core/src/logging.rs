//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend once per process, either as rotating
//!   files (embedding hosts) or on stderr (CLI).
//! - Capture panics as structured `event=panic_captured` lines.
//!
//! # Invariants
//! - Initialization never panics.
//! - Repeating the same setup is a no-op; switching level or target after
//!   the first successful call is rejected.
//! - Log lines carry identifiers and counts, never operator free text.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "efolabel";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 7;
const MAX_PANIC_PAYLOAD_CHARS: usize = 200;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Rotating `efolabel*.log` files inside an absolute directory.
    Directory(PathBuf),
    Stderr,
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory(dir) => write!(f, "{}", dir.display()),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    CreateDirectory { path: PathBuf, source: std::io::Error },
    Backend(String),
    AlreadyInitialized { active: String, requested: String },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(reason) => write!(f, "invalid log directory: {reason}"),
            Self::CreateDirectory { path, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
            Self::AlreadyInitialized { active, requested } => write!(
                f,
                "logging already initialized as `{active}`; refusing to switch to `{requested}`"
            ),
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            _ => None,
        }
    }
}

struct ActiveLogger {
    level: &'static str,
    target: LogTarget,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn describe(&self) -> String {
        describe(self.level, &self.target)
    }
}

fn describe(level: &str, target: &LogTarget) -> String {
    format!("{level}@{target}")
}

/// Starts rotating file logs under `log_dir` (must be absolute).
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let dir = parse_log_dir(log_dir)?;
    init_with_target(level, LogTarget::Directory(dir))
}

/// Starts logging to stderr.
pub fn init_stderr_logging(level: &str) -> Result<(), LoggingError> {
    init_with_target(level, LogTarget::Stderr)
}

/// Starts logging for `target`; see module invariants.
pub fn init_with_target(level: &str, target: LogTarget) -> Result<(), LoggingError> {
    let level = parse_level(level)?;
    let active = ACTIVE.get_or_try_init(|| start(level, target.clone()))?;

    if active.level != level || active.target != target {
        return Err(LoggingError::AlreadyInitialized {
            active: active.describe(),
            requested: describe(level, &target),
        });
    }
    Ok(())
}

/// `(level, target)` of the running logger, if any.
pub fn logging_status() -> Option<(&'static str, LogTarget)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.target.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(level: &'static str, target: LogTarget) -> Result<ActiveLogger, LoggingError> {
    let logger = Logger::try_with_str(level).map_err(|err| LoggingError::Backend(err.to_string()))?;

    let logger = match &target {
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDirectory {
                path: dir.clone(),
                source,
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format),
    };

    let handle = logger
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();

    info!(
        "event=logging_start module=core status=ok level={} target={} version={} os={}",
        level,
        target,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        level,
        target,
        _handle: handle,
    })
}

fn parse_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn parse_log_dir(log_dir: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(LoggingError::InvalidDirectory("path is empty".to_string()));
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(LoggingError::InvalidDirectory(format!(
            "`{trimmed}` is not absolute"
        )));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            single_line(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous(info);
    }));
}

/// Flattens line breaks and caps length so one event stays on one line.
fn single_line(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let mut capped: String = flattened.chars().take(max_chars).collect();
    capped.push_str("...");
    capped
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, logging_status, parse_level, parse_log_dir, single_line, LogTarget,
        LoggingError,
    };

    #[test]
    fn levels_are_normalized() {
        assert_eq!(parse_level(" WARNING ").unwrap(), "warn");
        assert_eq!(parse_level("Trace").unwrap(), "trace");
        assert!(matches!(
            parse_level("verbose"),
            Err(LoggingError::UnsupportedLevel(level)) if level == "verbose"
        ));
    }

    #[test]
    fn relative_and_blank_directories_are_rejected() {
        assert!(matches!(
            parse_log_dir("logs/efo"),
            Err(LoggingError::InvalidDirectory(_))
        ));
        assert!(matches!(
            parse_log_dir("  "),
            Err(LoggingError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn single_line_flattens_and_caps() {
        assert_eq!(single_line("a\nb", 10), "a b");
        assert_eq!(single_line("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn second_init_must_match_the_first() {
        // Kept on disk: the logger outlives this test.
        let first = tempfile::tempdir().unwrap().keep();
        let other = tempfile::tempdir().unwrap();
        let first_str = first.to_str().unwrap();

        init_logging("info", first_str).unwrap();
        init_logging("INFO", first_str).unwrap();

        assert!(matches!(
            init_logging("debug", first_str),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        assert!(matches!(
            init_logging("info", other.path().to_str().unwrap()),
            Err(LoggingError::AlreadyInitialized { .. })
        ));

        let (level, target) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(target, LogTarget::Directory(first));
    }
}
