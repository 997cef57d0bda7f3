//! Spillover file for probes that exhausted their retries
//!
//! One URL per line, appended as failures happen. The pipeline never reads
//! the file back.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Append-only list of failed probe URLs
#[derive(Debug)]
pub struct Spillover {
    path: PathBuf,
    file: Mutex<File>,
}

impl Spillover {
    /// Opens the spillover file for appending, creating it (and its parent
    /// directory) if missing
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one URL as its own line
    pub fn append(&self, url: &str) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(file, "{}", url)?;
        file.flush()
    }
}
