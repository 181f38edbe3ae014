//! Size based rotation of the active log file

use jiff::Zoned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logger::compression::compress_file;
use crate::logger::config::RotationConfig;
use crate::logger::error::LoggerError;

/// Decides when to rotate and keeps the number of rotated files bounded.
///
/// Rotated files are named `<stem>.<YYYYmmddTHHMMSS>-<seq>.<ext>[.gz]`, so a
/// lexical sort of the names is also the chronological order.
pub struct RotationManager {
    config: RotationConfig,
    sequence: u32,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            sequence: 0,
        }
    }

    pub fn should_rotate(&self, current_file_size: u64) -> bool {
        current_file_size >= self.config.max_size
    }

    /// Moves the active file aside, compresses it when enabled and prunes
    /// the oldest rotated files.
    pub fn rotate(&mut self, current_path: &Path) -> Result<(), LoggerError> {
        if current_path.exists() {
            let rotated_path = self.next_rotated_path(current_path);
            fs::rename(current_path, &rotated_path)?;

            if self.config.compress {
                compress_file(&rotated_path)?;
            }
        }

        self.cleanup_old_files(current_path)
    }

    fn next_rotated_path(&mut self, base_path: &Path) -> PathBuf {
        self.sequence = self.sequence.wrapping_add(1);
        let timestamp = Zoned::now().strftime("%Y%m%dT%H%M%S").to_string();
        rotated_file_name(base_path, &timestamp, self.sequence)
    }

    fn cleanup_old_files(&self, base_path: &Path) -> Result<(), LoggerError> {
        let parent = match base_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let prefix = rotated_prefix(base_path)
            .ok_or_else(|| LoggerError::rotation("Log file path has no file name"))?;

        let mut rotated_files: Vec<PathBuf> = fs::read_dir(parent)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path != base_path
                    && path
                        .file_name()
                        .map(|name| name.to_string_lossy().starts_with(&prefix))
                        .unwrap_or(false)
            })
            .collect();

        if rotated_files.len() <= self.config.max_files {
            return Ok(());
        }

        rotated_files.sort();
        let excess = rotated_files.len() - self.config.max_files;
        for oldest in rotated_files.into_iter().take(excess) {
            fs::remove_file(&oldest)?;
        }

        Ok(())
    }
}

fn rotated_prefix(base_path: &Path) -> Option<String> {
    let stem = base_path.file_stem()?.to_string_lossy();
    Some(format!("{}.", stem))
}

fn rotated_file_name(base_path: &Path, timestamp: &str, sequence: u32) -> PathBuf {
    let stem = base_path.file_stem().unwrap_or_default().to_string_lossy();
    let ext = base_path.extension().unwrap_or_default().to_string_lossy();

    let name = if ext.is_empty() {
        format!("{}.{}-{:04}", stem, timestamp, sequence)
    } else {
        format!("{}.{}-{:04}.{}", stem, timestamp, sequence, ext)
    };

    base_path.with_file_name(name)
}
