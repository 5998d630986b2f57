//! Rolling File Logger
//!
//! Installs a global `tracing` subscriber that writes plain-text lines to
//! `<dir>/<app>.log`. When the file grows past its size cap it is rotated
//! to `<app>.log.1`, `<app>.log.2`, ... and the oldest file is dropped, so
//! disk usage stays bounded.
//!
//! Records emitted through the `log` facade are captured as well.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Default size cap of the active log file
pub const DEFAULT_MAX_BYTES: u64 = 1024 * 1024;
/// Default number of rotated files kept next to the active one
pub const DEFAULT_MAX_FILES: usize = 3;

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("failed to open log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("a global logger is already installed")]
    AlreadyInitialized,
    #[error("logger not initialized")]
    NotInitialized,
}

/// Size-capped log file with numbered backups
pub struct RollingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    max_files: usize,
}

impl RollingFile {
    pub fn open(dir: &Path, app_name: &str, max_bytes: u64, max_files: usize) -> Result<Self, LoggerError> {
        fs::create_dir_all(dir).map_err(|source| LoggerError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(format!("{}.log", app_name));
        let file = open_append(&path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            path,
            file,
            written,
            max_bytes: max_bytes.max(1),
            max_files,
        })
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup(&self, n: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.max_files == 0 {
            self.file = File::create(&self.path)?;
        } else {
            let _ = fs::remove_file(self.backup(self.max_files));
            for n in (1..self.max_files).rev() {
                let from = self.backup(n);
                if from.exists() {
                    fs::rename(&from, self.backup(n + 1))?;
                }
            }
            fs::rename(&self.path, self.backup(1))?;
            self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        }
        self.written = 0;
        Ok(())
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> Result<File, LoggerError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggerError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Install the global logger at INFO with default limits
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), LoggerError> {
    init_logger_with(&log_dir, app_name, log::LevelFilter::Info, DEFAULT_MAX_BYTES, DEFAULT_MAX_FILES)
}

fn tracing_level(level: log::LevelFilter) -> LevelFilter {
    match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    }
}

/// Mark the start of a session in the log
fn write_session_header(out: &mut impl Write, path: &Path, app_name: &str) -> Result<(), LoggerError> {
    writeln!(
        out,
        "=== {} session started {} ===",
        app_name,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f")
    )
    .map_err(|source| LoggerError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Install the global logger
pub fn init_logger_with(
    log_dir: &Path,
    app_name: &str,
    level: log::LevelFilter,
    max_bytes: u64,
    max_files: usize,
) -> Result<(), LoggerError> {
    let mut file = RollingFile::open(log_dir, app_name, max_bytes, max_files)?;
    let path = file.path().to_path_buf();
    write_session_header(&mut file, &path, app_name)?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing_level(level))
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    let _ = LOG_FILE.set(path);
    Ok(())
}

/// Active log file, once initialized
pub fn log_file() -> Option<&'static Path> {
    LOG_FILE.get().map(PathBuf::as_path)
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    log_file().ok_or(LoggerError::NotInitialized)?;
    log::info!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    log_file().ok_or(LoggerError::NotInitialized)?;
    log::error!("{}", msg);
    Ok(())
}
