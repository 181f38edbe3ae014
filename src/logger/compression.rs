//! Gzip compression of rotated log files

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::logger::error::LoggerError;

/// Compresses `file_path` into `<file_path>.gz` and removes the original.
///
/// # Returns
/// Path of the compressed file
pub fn compress_file(file_path: &Path) -> Result<PathBuf, LoggerError> {
    let mut compressed_name = file_path.as_os_str().to_owned();
    compressed_name.push(".gz");
    let compressed_path = PathBuf::from(compressed_name);

    let mut input = File::open(file_path)?;
    let output = File::create(&compressed_path)?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder
        .finish()
        .map_err(|e| LoggerError::compression(format!("{}: {}", compressed_path.display(), e)))?;

    fs::remove_file(file_path)?;

    Ok(compressed_path)
}
