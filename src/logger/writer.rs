//! Rotating file writer used by the file layer

use crate::logger::config::FileConfig;
use crate::logger::error::LoggerError;
use crate::logger::rotation::RotationManager;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// File writer with size based rotation.
///
/// When the file can no longer be written, output falls back to stderr for
/// the rest of the process lifetime.
#[derive(Clone)]
pub struct RotatingFileWriter {
    state: Arc<Mutex<WriterState>>,
    path: PathBuf,
}

struct WriterState {
    file: BufWriter<File>,
    current_size: u64,
    rotation_manager: RotationManager,
    fallback_mode: bool,
}

impl RotatingFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = open_log_file(&config.path, config.append)?;
        let current_size = if config.append {
            std::fs::metadata(&config.path).map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                file,
                current_size,
                rotation_manager: RotationManager::new(config.rotation.clone()),
                fallback_mode: false,
            })),
            path: config.path.clone(),
        })
    }

    pub fn is_in_fallback_mode(&self) -> bool {
        self.state.lock().map(|s| s.fallback_mode).unwrap_or(false)
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingWriterGuard {
            state: self.state.clone(),
            path: self.path.clone(),
        }
    }
}

/// Per-event handle returned to tracing-subscriber
pub struct RotatingWriterGuard {
    state: Arc<Mutex<WriterState>>,
    path: PathBuf,
}

impl Write for RotatingWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback_mode {
            return io::stderr().write(buf);
        }

        if state.rotation_manager.should_rotate(state.current_size) {
            if let Err(e) = rotate(&mut state, &self.path) {
                return fall_back(&mut state, buf, e);
            }
        }

        match state.file.write(buf) {
            Ok(written) => {
                state.current_size += written as u64;
                Ok(written)
            }
            Err(e) => fall_back(&mut state, buf, e),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback_mode {
            return io::stderr().flush();
        }

        state.file.flush()
    }
}

impl Drop for RotatingWriterGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            let _ = state.file.flush();
        }
    }
}

fn rotate(state: &mut WriterState, path: &Path) -> io::Result<()> {
    state.file.flush()?;
    state
        .rotation_manager
        .rotate(path)
        .map_err(|e| io::Error::other(e.to_string()))?;
    state.file = open_log_file(path, false)?;
    state.current_size = 0;
    Ok(())
}

fn fall_back(state: &mut WriterState, buf: &[u8], error: io::Error) -> io::Result<usize> {
    state.fallback_mode = true;
    eprintln!("[logger] file write failed, falling back to stderr: {}", error);
    io::stderr().write(buf)
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::config::{LogFormat, RotationConfig};
    use std::fs;
    use tempfile::tempdir;

    fn file_config(path: PathBuf, max_size: u64) -> FileConfig {
        FileConfig {
            enabled: true,
            path,
            append: true,
            format: LogFormat::Json,
            rotation: RotationConfig {
                max_size,
                max_files: 3,
                compress: false,
            },
        }
    }

    #[test]
    fn test_writer_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/warehouse.log");

        let writer = RotatingFileWriter::new(&file_config(path.clone(), 1024)).unwrap();
        let mut guard = writer.make_writer();
        guard.write_all(b"hello\n").unwrap();
        guard.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
        assert!(!writer.is_in_fallback_mode());
    }

    #[test]
    fn test_writer_rotates_when_size_reached() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("warehouse.log");
        let writer = RotatingFileWriter::new(&file_config(path.clone(), 8)).unwrap();

        {
            let mut guard = writer.make_writer();
            guard.write_all(b"0123456789\n").unwrap();
        }
        {
            let mut guard = writer.make_writer();
            guard.write_all(b"next\n").unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "next\n");
        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 2);
    }

    #[test]
    fn test_append_mode_counts_existing_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("warehouse.log");
        fs::write(&path, "0123456789").unwrap();

        let writer = RotatingFileWriter::new(&file_config(path.clone(), 5)).unwrap();
        let mut guard = writer.make_writer();
        guard.write_all(b"fresh\n").unwrap();
        guard.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fresh\n");
    }
}
