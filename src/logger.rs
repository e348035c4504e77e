//! File logging with daily rotation in the local timezone.

use anyhow::Result;
use logroller::{LogRollerBuilder, Rotation, RotationAge, TimeZone};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::prelude::*;

use crate::config::Config;

/// Log files are named `cooccur.YYYY-MM-DD`.
const LOG_FILE_PREFIX: &str = "cooccur";

/// Rotated files older than this are removed at startup.
const RETENTION: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Install the global subscriber writing to `config.log_path`.
///
/// The returned guard flushes buffered events when dropped; keep it alive
/// for as long as the process should log.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    if !config.log_path.exists() {
        fs::create_dir_all(&config.log_path)?;
    }

    cleanup_old_logs(&config.log_path, RETENTION)?;

    let appender = LogRollerBuilder::new(config.log_path.as_path(), Path::new(LOG_FILE_PREFIX))
        .rotation(Rotation::AgeBased(RotationAge::Daily))
        .time_zone(TimeZone::Local)
        .max_keep_files(3)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create log roller: {}", e))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let time_format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let local_offset = time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC);
    let timer = OffsetTime::new(local_offset, time_format);

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(timer),
        );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(guard)
}

/// Remove our log files whose modification time is older than `max_age`.
pub fn cleanup_old_logs(log_path: &Path, max_age: Duration) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }
    let cutoff = SystemTime::now() - max_age;

    for entry in fs::read_dir(log_path)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !filename.starts_with(LOG_FILE_PREFIX) {
            continue;
        }

        if let Ok(metadata) = entry.metadata()
            && let Ok(modified) = metadata.modified()
            && modified < cutoff
        {
            let _ = fs::remove_file(&path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age_file(path: &Path, age: Duration) -> std::io::Result<()> {
        let when = SystemTime::now() - age;
        let secs = when.duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs();
        let ts = libc::timespec {
            tv_sec: secs as libc::time_t,
            tv_nsec: 0,
        };
        let times = [ts, ts];
        let c_path = std::ffi::CString::new(path.to_str().unwrap()).unwrap();
        let ret = unsafe { libc::utimensat(libc::AT_FDCWD, c_path.as_ptr(), times.as_ptr(), 0) };
        if ret == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }

    const FOUR_DAYS: Duration = Duration::from_secs(4 * 24 * 60 * 60);

    #[test]
    fn removes_expired_logs_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let old_file = dir.path().join("cooccur.2020-01-01");
        let recent_file = dir.path().join("cooccur.2026-10-19");
        fs::write(&old_file, "old").unwrap();
        fs::write(&recent_file, "recent").unwrap();
        age_file(&old_file, FOUR_DAYS).unwrap();

        cleanup_old_logs(dir.path(), RETENTION).unwrap();

        assert!(!old_file.exists(), "expired log should be deleted");
        assert!(recent_file.exists(), "recent log should be kept");
    }

    #[test]
    fn leaves_foreign_files_alone() {
        let dir = tempfile::TempDir::new().unwrap();
        let other = dir.path().join("other-app.log");
        fs::write(&other, "other").unwrap();
        age_file(&other, FOUR_DAYS).unwrap();

        cleanup_old_logs(dir.path(), RETENTION).unwrap();

        assert!(other.exists());
    }

    #[test]
    fn leaves_subdirectories_alone() {
        let dir = tempfile::TempDir::new().unwrap();
        let subdir = dir.path().join("cooccur.subdir");
        fs::create_dir(&subdir).unwrap();

        cleanup_old_logs(dir.path(), Duration::ZERO).unwrap();

        assert!(subdir.exists());
    }

    #[test]
    fn missing_dir_is_ok() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(cleanup_old_logs(&missing, RETENTION).is_ok());
    }
}
