//! Logging Infrastructure
//!
//! Structured logging setup for development (console) and production
//! (daily rolling files, optionally JSON).

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor a level is given
const DEFAULT_FILTER: &str = "pos_server=info,tower_http=info";

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional file output
///
/// `RUST_LOG` wins over `log_level`. Files roll daily under `log_dir`
/// when the directory exists; otherwise output goes to stdout.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match log_level {
        Some(level) => format!("pos_server={level},tower_http={level}").into(),
        None => DEFAULT_FILTER.into(),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    // Add file output if log_dir is provided
    if let Some(dir) = log_dir
        && Path::new(dir).is_dir()
    {
        let file_appender = tracing_appender::rolling::daily(dir, "pos-server");
        let builder = builder.with_ansi(false).with_writer(file_appender);
        if json {
            builder.json().init();
        } else {
            builder.init();
        }
        return;
    }

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
