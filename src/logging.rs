use crate::errors::{AppError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

static TRACING_INIT: Once = Once::new();

/// `pipeline_log_YYYYMMDD_HHMMSS.log` for the given start time.
pub fn log_file_name(started: OffsetDateTime) -> Result<String> {
    let stamp = started
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .map_err(|err| AppError::Logging {
            message: err.to_string(),
        })?;
    Ok(format!("pipeline_log_{stamp}.log"))
}

/// Session log path in `log_dir`, stamped with the local time (UTC when the
/// local offset is unavailable).
pub fn session_log_path(log_dir: &Path) -> Result<PathBuf> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    Ok(log_dir.join(log_file_name(now)?))
}

/// Installs the process-wide subscriber: console on stderr plus the session
/// log file. Later calls are no-ops.
pub fn init_tracing(log_file: &Path) -> Result<()> {
    let mut outcome = Ok(());
    TRACING_INIT.call_once(|| outcome = install(log_file));
    outcome
}

fn install(log_file: &Path) -> Result<()> {
    let file = File::create(log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    let session = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(session)
        .try_init()
        .map_err(|err| AppError::Logging {
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::log_file_name;
    use time::macros::datetime;

    #[test]
    fn names_log_after_start_time() {
        let name = log_file_name(datetime!(2026-03-07 09:05:01 UTC)).expect("expected format");
        assert_eq!(name, "pipeline_log_20260307_090501.log");
    }

    #[test]
    fn session_log_lives_in_log_dir() {
        let dir = tempfile::tempdir().expect("expected tempdir");
        let path = super::session_log_path(dir.path()).expect("expected path");

        assert_eq!(path.parent(), Some(dir.path()));
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .expect("expected utf8 name");
        assert!(name.starts_with("pipeline_log_"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "pipeline_log_YYYYMMDD_HHMMSS.log".len());
    }
}
