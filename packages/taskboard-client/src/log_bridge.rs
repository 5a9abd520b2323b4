use env_logger::Logger;
use log::{Log, Metadata, Record, SetLoggerError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

/// Append-only mirror of everything the console logger prints.
struct LogFile {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl LogFile {
    fn at(path: PathBuf) -> Self {
        let file = Self::open(&path).ok();
        Self {
            path,
            file: Mutex::new(file),
        }
    }

    fn open(path: &Path) -> io::Result<File> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    }

    fn append(&self, line: &str) {
        let mut guard = match self.file.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        if guard.is_none() {
            match Self::open(&self.path) {
                Ok(file) => *guard = Some(file),
                Err(_) => return,
            }
        }
        if let Some(file) = guard.as_mut() {
            let _ = file.write_all(line.as_bytes());
            let _ = file.write_all(b"\n");
            let _ = file.flush();
        }
    }
}

static LOG_FILE: LazyLock<LogFile> = LazyLock::new(|| {
    LogFile::at(
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskboard")
            .join("logs")
            .join("client.log"),
    )
});

fn format_log_line(timestamp_ms: u64, record: &Record<'_>) -> String {
    format!(
        "{} [{}] [{}] {}",
        timestamp_ms,
        record.level(),
        record.target(),
        record.args().to_string().replace('\n', "\\n")
    )
}

struct MirrorLogger {
    inner: Logger,
    file: &'static LogFile,
}

impl Log for MirrorLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.inner.matches(record) {
            return;
        }
        self.inner.log(record);

        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        self.file.append(&format_log_line(timestamp_ms, record));
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the process logger: `RUST_LOG` filtering (default `warn`) to
/// stderr, mirrored into `log_file_path()`.
pub fn init() -> Result<(), SetLoggerError> {
    let logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .build();
    let max_level = logger.filter();
    log::set_boxed_logger(Box::new(MirrorLogger {
        inner: logger,
        file: &LOG_FILE,
    }))?;
    log::set_max_level(max_level);
    Ok(())
}

pub fn log_file_path() -> String {
    LOG_FILE.path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use tempfile::TempDir;

    #[test]
    fn test_format_escapes_newlines() {
        let line = format_log_line(
            42,
            &Record::builder()
                .level(Level::Warn)
                .target("taskboard.commit")
                .args(format_args!("first\nsecond"))
                .build(),
        );
        assert_eq!(line, "42 [WARN] [taskboard.commit] first\\nsecond");
    }

    #[test]
    fn test_log_file_created_and_appended() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs").join("client.log");
        let file = LogFile::at(path.clone());

        file.append("one");
        file.append("two");
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_mirror_respects_filter() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("client.log");
        let file: &'static LogFile = Box::leak(Box::new(LogFile::at(path.clone())));
        let logger = MirrorLogger {
            inner: env_logger::Builder::new()
                .filter_level(log::LevelFilter::Warn)
                .is_test(true)
                .build(),
            file,
        };

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("taskboard.gesture")
                .args(format_args!("hidden"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Error)
                .target("taskboard.commit")
                .args(format_args!("shown"))
                .build(),
        );

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("hidden"));
        assert!(content.contains("[ERROR] [taskboard.commit] shown"));
    }
}
