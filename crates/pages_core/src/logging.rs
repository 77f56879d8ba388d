//! Process logging for the pages core.
//!
//! # Responsibility
//! - Start the rolling file logger once per process from `CoreConfig`.
//! - Capture panics as log events without leaking credentials.
//!
//! # Invariants
//! - A second start with identical settings is a no-op; differing settings
//!   are rejected and the active logger keeps running.
//! - Session tokens and password encodings never reach a log line, even when
//!   they appear in a panic payload.

use crate::config::CoreConfig;
use crate::crypto::PASSWORD_ALGORITHM;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_BASENAME: &str = "pages";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;
const TOKEN_HEX_LEN: usize = 64;
const REDACTED: &str = "<redacted>";

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    dir: PathBuf,
    _handle: LoggerHandle,
}

#[derive(Debug)]
pub enum LoggingError {
    InvalidLevel(String),
    InvalidDirectory(String),
    CreateDirectory {
        dir: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
    /// Logging already runs with other settings.
    Conflict {
        active: String,
        requested: String,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(value) => {
                write!(f, "log directory must be a non-empty absolute path, got `{value}`")
            }
            Self::CreateDirectory { dir, source } => {
                write!(f, "cannot create log directory `{}`: {source}", dir.display())
            }
            Self::Backend(err) => write!(f, "logger backend failed: {err}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already running with {active}; refusing to switch to {requested}"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FlexiLoggerError> for LoggingError {
    fn from(value: FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let level = parse_level(level)?;
    let dir = parse_dir(log_dir)?;

    let active = ACTIVE.get_or_try_init(|| start(level, &dir))?;
    if active.level != level || active.dir != dir {
        return Err(LoggingError::Conflict {
            active: describe(active.level, &active.dir),
            requested: describe(level, &dir),
        });
    }
    Ok(())
}

/// Starts logging when `config.log_dir` is set; `Ok(false)` means logging
/// stays off.
pub fn init_logging_from_config(config: &CoreConfig) -> Result<bool, LoggingError> {
    let Some(dir) = config.log_dir.as_deref() else {
        return Ok(false);
    };
    let dir = dir
        .to_str()
        .ok_or_else(|| LoggingError::InvalidDirectory(dir.display().to_string()))?;
    init_logging(&config.log_level, dir)?;
    Ok(true)
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(level: &'static str, dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDirectory {
        dir: dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level)?
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    install_panic_hook();
    info!(
        "event=core_init module=core status=ok version={} os={} level={level}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    );

    Ok(ActiveLogger {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

fn parse_level(value: &str) -> Result<&'static str, LoggingError> {
    let level = match value.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => return Err(LoggingError::InvalidLevel(value.trim().to_string())),
    };
    Ok(level)
}

fn parse_dir(value: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = value.trim();
    let path = Path::new(trimmed);
    if trimmed.is_empty() || !path.is_absolute() {
        return Err(LoggingError::InvalidDirectory(trimmed.to_string()));
    }
    Ok(path.to_path_buf())
}

fn describe(level: &str, dir: &Path) -> String {
    format!("level={level} dir={}", dir.display())
}

fn install_panic_hook() {
    PANIC_HOOK.get_or_init(|| {
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
                "event=panic module=core status=error location={location} payload={}",
                scrub_payload(&payload)
            );
            previous(info);
        }));
    });
}

/// Flattens a panic payload onto one line, masks credentials and caps its
/// length.
///
/// Masked: any whitespace-separated word holding a 64-char hex run (session
/// token shape) or a password encoding.
fn scrub_payload(payload: &str) -> String {
    let scrubbed = payload
        .split_whitespace()
        .map(|word| if looks_secret(word) { REDACTED } else { word })
        .collect::<Vec<_>>()
        .join(" ");

    if scrubbed.chars().count() <= PANIC_PAYLOAD_LIMIT {
        return scrubbed;
    }
    let mut capped: String = scrubbed.chars().take(PANIC_PAYLOAD_LIMIT).collect();
    capped.push_str("...");
    capped
}

fn looks_secret(word: &str) -> bool {
    if word.contains(PASSWORD_ALGORITHM) {
        return true;
    }
    let mut run = 0;
    for c in word.chars() {
        run = if c.is_ascii_hexdigit() { run + 1 } else { 0 };
        if run >= TOKEN_HEX_LEN {
            return true;
        }
    }
    false
}
