//! Opt-in file logging for the adapter library.
//!
//! The library runs inside a host VM process, so nothing is written unless a
//! log directory is configured.
//!
//! # Invariants
//! - At most one logger per process; a second init with the same target is a
//!   no-op, a different target is an error.
//! - Panics inside the library are recorded before the previous hook runs.

use crate::config::RuntimeConfig;
use flexi_logger::{
    Cleanup, Criterion, DeferredNow, FileSpec, Logger, LoggerHandle, Naming, WriteMode,
    TS_DASHES_BLANK_COLONS_DOT_BLANK,
};
use log::{error, info, LevelFilter, Record};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

const LOG_BASENAME: &str = "tiext";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEEP_ROTATED: usize = 3;
const PANIC_PAYLOAD_LIMIT: usize = 200;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Where and how verbosely to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub level: LevelFilter,
    pub dir: PathBuf,
}

impl LogTarget {
    /// Validates a level name and an absolute directory.
    ///
    /// Level names are case-insensitive; `warning` is accepted for `warn`.
    pub fn new(level: &str, dir: impl Into<PathBuf>) -> Result<Self, LoggingError> {
        let level = parse_level(level)?;
        let dir = dir.into();
        if dir.as_os_str().is_empty() {
            return Err(LoggingError::EmptyDir);
        }
        if !dir.is_absolute() {
            return Err(LoggingError::RelativeDir(dir));
        }
        Ok(Self { level, dir })
    }

    /// `None` when `config` leaves file logging off.
    pub fn from_config(config: &RuntimeConfig) -> Result<Option<Self>, LoggingError> {
        config
            .log_dir
            .as_deref()
            .map(|dir| Self::new(&config.log_level, dir))
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnknownLevel(String),
    EmptyDir,
    RelativeDir(PathBuf),
    /// Logging already runs with a different target.
    Conflict { active: LogTarget, requested: LogTarget },
    /// Directory creation or logger startup failed.
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "unknown log level `{level}`; expected trace, debug, info, warn or error"
            ),
            Self::EmptyDir => write!(f, "log directory is empty"),
            Self::RelativeDir(dir) => {
                write!(f, "log directory must be absolute: `{}`", dir.display())
            }
            Self::Conflict { active, requested } => write!(
                f,
                "logging already active at `{}` ({}); cannot switch to `{}` ({})",
                active.dir.display(),
                active.level,
                requested.dir.display(),
                requested.level
            ),
            Self::Backend(message) => write!(f, "logger backend failed: {message}"),
        }
    }
}

impl std::error::Error for LoggingError {}

/// Starts logging to `target`, or confirms it is already running there.
pub fn init_logging(target: &LogTarget) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| start(target))?;
    if active.target != *target {
        return Err(LoggingError::Conflict {
            active: active.target.clone(),
            requested: target.clone(),
        });
    }
    Ok(())
}

/// Starts logging when `config` names a directory.
///
/// Returns `Ok(false)` when logging stays off.
pub fn init_from_config(config: &RuntimeConfig) -> Result<bool, LoggingError> {
    match LogTarget::from_config(config)? {
        Some(target) => init_logging(&target).map(|()| true),
        None => Ok(false),
    }
}

/// Target of the running logger, if any.
pub fn logging_status() -> Option<LogTarget> {
    ACTIVE.get().map(|active| active.target.clone())
}

pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter, LoggingError> {
    let name = raw.trim().to_ascii_lowercase();
    let name = if name == "warning" { "warn" } else { name.as_str() };
    match name.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::UnknownLevel(raw.trim().to_string())),
        Ok(level) => Ok(level),
    }
}

fn start(target: &LogTarget) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&target.dir).map_err(|err| {
        LoggingError::Backend(format!("create `{}`: {err}", target.dir.display()))
    })?;

    let spec = target.level.as_str().to_ascii_lowercase();
    let handle = Logger::try_with_str(&spec)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(&target.dir)
                .basename(LOG_BASENAME)
                .suppress_timestamp(),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(format_record)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook(&target.dir);

    info!(
        "event=logging_init module=logging status=ok level={} log_dir={} pid={}",
        target.level,
        target.dir.display(),
        std::process::id()
    );

    Ok(ActiveLogger {
        target: target.clone(),
        _handle: handle,
    })
}

/// `<timestamp> <LEVEL> [<thread>] <message>`, one record per line.
fn format_record(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record<'_>,
) -> std::io::Result<()> {
    let thread = std::thread::current();
    write!(
        w,
        "{} {:<5} [{}] {}",
        now.format(TS_DASHES_BLANK_COLONS_DOT_BLANK),
        record.level(),
        thread.name().unwrap_or("unnamed"),
        record.args()
    )
}

fn install_panic_hook(log_dir: &Path) {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let log_dir = log_dir.display().to_string();
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic module=logging status=error location={location} log_dir={log_dir} payload={}",
            one_line(&panic_payload(info), PANIC_PAYLOAD_LIMIT)
        );
        previous(info);
    }));
}

fn panic_payload(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .map(|text| (*text).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string payload>".to_string())
}

/// Collapses whitespace runs and caps the length at `limit` chars.
fn one_line(text: &str, limit: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
