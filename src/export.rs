//! Persisting finished documents.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::RenderError;

/// Receives finished document bytes under a file name.
pub trait ReportSink {
    fn persist(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, RenderError>;
}

/// Writes reports into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Fills a temp file in the target directory, then renames it over
    /// `file_name`. A failed fill leaves any existing file untouched.
    fn persist_with<W>(&self, file_name: &str, fill: W) -> Result<PathBuf, RenderError>
    where
        W: FnOnce(&mut NamedTempFile) -> io::Result<()>,
    {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
            return Err(RenderError::Write {
                path: self.dir.join(file_name),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file name must not contain path separators",
                ),
            });
        }

        std::fs::create_dir_all(&self.dir).map_err(|source| RenderError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(file_name);
        let write_err = |source| RenderError::Write {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        fill(&mut tmp)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        Ok(path)
    }
}

impl ReportSink for DirectorySink {
    fn persist(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, RenderError> {
        self.persist_with(file_name, |file| file.write_all(bytes))
    }
}

/// Keeps reports in memory. Later writes to the same name replace earlier ones.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<Vec<u8>> {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, bytes)| bytes.clone())
    }

    pub fn file_names(&self) -> Vec<String> {
        let files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.iter().map(|(name, _)| name.clone()).collect()
    }
}

impl ReportSink for MemorySink {
    fn persist(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, RenderError> {
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        files.retain(|(name, _)| name != file_name);
        files.push((file_name.to_owned(), bytes.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}

/// Replaces anything but ASCII alphanumerics, `-` and `_` with `-`.
pub fn safe_file_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
