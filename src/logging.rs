use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "squat-tracker";
const MAX_LOG_FILES: usize = 14;

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: "./logs".to_string(),
        }
    }
}

impl From<&Config> for LogConfig {
    fn from(config: &Config) -> Self {
        Self {
            log_level: config.log_level.clone(),
            enable_file_logs: config.enable_file_logs,
            log_dir: config.log_dir.clone(),
        }
    }
}

/// Install the global subscriber. The returned guard flushes the file writer
/// on drop and must be held for the life of the process.
///
/// Calling this again after a subscriber is installed is a no-op.
pub fn init_tracing(config: &LogConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let stdout_layer = fmt::layer().with_target(true).with_thread_ids(false);
    let registry = Registry::default().with(env_filter).with(stdout_layer);

    if !config.enable_file_logs {
        report_init_error(registry.try_init().err());
        return None;
    }

    let file_appender = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(&config.log_dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            report_init_error(registry.try_init().err());
            tracing::warn!(error = %e, dir = %config.log_dir, "File logging disabled");
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false).json();
    report_init_error(registry.with(file_layer).try_init().err());
    Some(guard)
}

fn report_init_error(err: Option<tracing_subscriber::util::TryInitError>) {
    if let Some(e) = err {
        let msg = e.to_string();
        if !msg.contains("already been set") {
            eprintln!("failed to initialize tracing: {e}");
        }
    }
}
