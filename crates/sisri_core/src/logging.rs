//! Process-wide logging for the search engine.
//!
//! # Responsibility
//! - Start rolling file logs once per process from a [`LogConfig`].
//! - Track the request id of the search running on the current thread so a
//!   panic line can be joined with that search's start/ok/error lines.
//!
//! # Invariants
//! - Log lines are `key=value` metadata: ids, counts, timings. Resident names
//!   and request text never reach the log.
//! - A second init with the same config is a no-op; any other config is
//!   rejected.
//! - Panic payloads are flattened to one line and capped.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const LOG_FILE_BASENAME: &str = "sisri";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

thread_local! {
    static ACTIVE_REQUEST: Cell<Option<Uuid>> = const { Cell::new(None) };
}

struct ActiveLogger {
    config: LogConfig,
    _handle: LoggerHandle,
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    Backend(String),
    /// Logging already runs with a different config.
    AlreadyActive {
        active: LogConfig,
        requested: LogConfig,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(message) => write!(f, "invalid log directory: {message}"),
            Self::CreateDirectory { path, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
            Self::AlreadyActive { active, requested } => write!(
                f,
                "logging already active as {active}; refusing to switch to {requested}"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Validated logging settings: a known level and an absolute directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    level: &'static str,
    dir: PathBuf,
}

impl LogConfig {
    /// Builds a config from an optional level override and a directory.
    ///
    /// A blank or absent level falls back to [`default_log_level`].
    pub fn new(level: Option<&str>, dir: &str) -> Result<Self, LoggingError> {
        Ok(Self {
            level: resolve_log_level(level)?,
            dir: normalize_log_dir(dir)?,
        })
    }
}

impl Display for LogConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "level={} log_dir={}", self.level, self.dir.display())
    }
}

/// Starts file logging for the process.
///
/// # Errors
/// - [`LoggingError::AlreadyActive`] when a different config is already live.
/// - [`LoggingError::CreateDirectory`] / [`LoggingError::Backend`] when the
///   logger cannot start.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(config))?;
    if active.config != *config {
        return Err(LoggingError::AlreadyActive {
            active: active.config.clone(),
            requested: config.clone(),
        });
    }
    Ok(())
}

fn start_logger(config: &LogConfig) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&config.dir).map_err(|source| LoggingError::CreateDirectory {
        path: config.dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_str(config.level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(config.dir.as_path())
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
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();
    info!(
        "event=engine_start module=search status=ok version={} schema_version={} {}",
        env!("CARGO_PKG_VERSION"),
        crate::db::migrations::latest_version(),
        config
    );

    Ok(ActiveLogger {
        config: config.clone(),
        _handle: handle,
    })
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Resolves an optional level override, falling back to [`default_log_level`].
///
/// # Errors
/// - [`LoggingError::UnsupportedLevel`] for a non-blank unknown level.
pub fn resolve_log_level(raw: Option<&str>) -> Result<&'static str, LoggingError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => normalize_level(value),
        None => Ok(default_log_level()),
    }
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, LoggingError> {
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

/// Marks a search as running on the current thread until dropped.
///
/// Scopes nest; dropping one restores the id that was active before it.
pub(crate) struct RequestScope {
    previous: Option<Uuid>,
}

impl RequestScope {
    pub(crate) fn enter(request_id: Uuid) -> Self {
        let previous = ACTIVE_REQUEST.with(|active| active.replace(Some(request_id)));
        Self { previous }
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        ACTIVE_REQUEST.with(|active| active.set(self.previous));
    }
}

fn active_request() -> Option<Uuid> {
    ACTIVE_REQUEST.with(Cell::get)
}

fn install_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        error!("{}", panic_line(active_request(), panic_info));
        previous_hook(panic_info);
    }));
}

fn panic_line(request_id: Option<Uuid>, info: &std::panic::PanicHookInfo<'_>) -> String {
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    format!(
        "event=panic_captured module=search status=error request_id={} location={} payload={}",
        request_id.map_or_else(|| "none".to_string(), |id| id.to_string()),
        location,
        flatten_payload(&payload, MAX_PANIC_PAYLOAD_CHARS)
    )
}

fn flatten_payload(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let mut capped = flattened.chars().take(max_chars).collect::<String>();
    if flattened.chars().count() > max_chars {
        capped.push_str("...");
    }
    capped
}

#[cfg(test)]
mod tests {
    use super::{
        active_request, default_log_level, flatten_payload, init_logging, resolve_log_level,
        LogConfig, LoggingError, RequestScope, ACTIVE_LOGGER,
    };
    use uuid::Uuid;

    #[test]
    fn resolve_log_level_normalizes_and_falls_back() {
        assert_eq!(resolve_log_level(None).unwrap(), default_log_level());
        assert_eq!(resolve_log_level(Some("  ")).unwrap(), default_log_level());
        assert_eq!(resolve_log_level(Some(" Warning ")).unwrap(), "warn");
        assert!(matches!(
            resolve_log_level(Some("loud")),
            Err(LoggingError::UnsupportedLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn log_config_requires_absolute_directory() {
        let err = LogConfig::new(Some("info"), "logs/dev").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidDirectory(_)));
        assert!(LogConfig::new(None, "   ").is_err());
    }

    #[test]
    fn request_scopes_nest_and_restore() {
        let outer = Uuid::new_v4();
        let inner = Uuid::new_v4();
        assert_eq!(active_request(), None);
        {
            let _outer = RequestScope::enter(outer);
            {
                let _inner = RequestScope::enter(inner);
                assert_eq!(active_request(), Some(inner));
            }
            assert_eq!(active_request(), Some(outer));
        }
        assert_eq!(active_request(), None);
    }

    #[test]
    fn panic_payload_is_flattened_and_capped() {
        let flattened = flatten_payload("Ana\nRivera\rSantos", 8);
        assert_eq!(flattened, "Ana Rive...");
        assert_eq!(flatten_payload("short", 8), "short");
    }

    #[test]
    fn init_is_idempotent_and_rejects_a_different_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs");
        let path = path.to_str().unwrap();
        let config = LogConfig::new(Some("info"), path).unwrap();

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();
        assert_eq!(ACTIVE_LOGGER.get().unwrap().config, config);

        let louder = LogConfig::new(Some("debug"), path).unwrap();
        assert!(matches!(
            init_logging(&louder),
            Err(LoggingError::AlreadyActive { .. })
        ));
    }
}
