use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file name inside the log directory
const LOG_FILE_PREFIX: &str = "mysql-query-helper.log";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON lines on the console instead of human-readable text
    pub json: bool,
    /// Daily-rotated log files are written here when set
    pub log_dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

impl LogConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    pub fn with_log_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// `RUST_LOG` wins over the configured level
    fn env_filter(&self) -> Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => self.level_filter(),
        }
    }

    fn level_filter(&self) -> Result<EnvFilter> {
        Ok(EnvFilter::try_new(&self.level)?)
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the program when a log directory is configured.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let console_layer = if config.json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let (file_layer, guard) = match config.log_dir {
        Some(ref dir) => {
            ensure_log_dir(dir)?;
            let (writer, guard) = non_blocking(rolling::daily(dir, LOG_FILE_PREFIX));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

fn ensure_log_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
