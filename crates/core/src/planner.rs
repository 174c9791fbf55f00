use crate::config::Config;
use crate::metadata::FileRecord;
use crate::sanitize::{sanitize_file_name, sanitize_path};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Where one input file goes: the folder to create and the full target path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub source: PathBuf,
    pub folder: PathBuf,
    pub target: PathBuf,
}

/// Renders the three templates for `record`, sanitizes each when enabled,
/// and joins them as `folder_path/folder_name/file_name`.
pub fn plan_placement(record: &FileRecord, config: &Config) -> Result<Placement> {
    let mut folder_path = config
        .folder_path
        .render(record, config)
        .with_context(|| format!("could not render folder path \"{}\"", config.folder_path))?;
    let mut folder_name = config
        .folder_name
        .render(record, config)
        .with_context(|| format!("could not render folder name \"{}\"", config.folder_name))?;
    let mut file_name = config
        .file_name
        .render(record, config)
        .with_context(|| format!("could not render file name \"{}\"", config.file_name))?;

    if config.sanitize {
        folder_path = sanitize_path(&folder_path);
        folder_name = sanitize_file_name(&folder_name);
        file_name = sanitize_file_name(&file_name);
    }

    let folder = Path::new(&folder_path).join(folder_name);
    let target = folder.join(file_name);

    Ok(Placement {
        source: record.path.clone(),
        folder,
        target,
    })
}
