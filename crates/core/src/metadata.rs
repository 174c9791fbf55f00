use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Metadata snapshot of one input file, taken when the file is discovered.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub dir: PathBuf,
    pub name: String,
    pub title: String,
    /// Extension including the leading dot, or empty.
    pub extension: String,
    pub len: u64,
    pub created: DateTime<Local>,
    pub modified: DateTime<Local>,
    pub accessed: DateTime<Local>,
}

impl FileRecord {
    pub fn capture(path: &Path) -> Result<Self> {
        let path = std::path::absolute(path)
            .with_context(|| format!("could not resolve absolute path: {}", path.display()))?;
        let meta = fs::metadata(&path)
            .with_context(|| format!("could not read file metadata: {}", path.display()))?;

        let modified: DateTime<Local> = meta
            .modified()
            .map(DateTime::from)
            .unwrap_or_else(|_| DateTime::from(SystemTime::UNIX_EPOCH));
        let created = meta.created().map(DateTime::from).unwrap_or(modified);
        let accessed = meta.accessed().map(DateTime::from).unwrap_or(modified);

        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("file has no parent directory: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .with_context(|| format!("file has no name: {}", path.display()))?;
        let title = path
            .file_stem()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|v| format!(".{}", v.to_string_lossy()))
            .unwrap_or_default();

        Ok(FileRecord {
            dir,
            name,
            title,
            extension,
            len: meta.len(),
            created,
            modified,
            accessed,
            path,
        })
    }
}
