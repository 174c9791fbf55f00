use crate::apply::{execute, Outcome};
use crate::config::Config;
use crate::metadata::FileRecord;
use crate::planner::{plan_placement, Placement};
use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern, PatternError};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, debug_span};
use walkdir::WalkDir;

pub const DEFAULT_SEARCH_PATTERN: &str = "*.*";

/// Wildcard pattern matched against file names: `*` and `?` only, brackets
/// are literal. `*.*` keeps its legacy meaning of "every file", dotless
/// names included.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    source: String,
    pattern: Option<Pattern>,
}

impl SearchPattern {
    pub fn new(source: &str) -> Result<Self, PatternError> {
        let pattern = match source {
            "*" | "*.*" => None,
            other => Some(Pattern::new(&escape_brackets(other))?),
        };
        Ok(SearchPattern {
            source: source.to_string(),
            pattern,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, file_name: &OsStr) -> bool {
        let Some(pattern) = &self.pattern else {
            return true;
        };
        let options = MatchOptions {
            case_sensitive: !cfg!(windows),
            ..MatchOptions::new()
        };
        pattern.matches_with(&file_name.to_string_lossy(), options)
    }
}

impl Default for SearchPattern {
    fn default() -> Self {
        SearchPattern {
            source: DEFAULT_SEARCH_PATTERN.to_string(),
            pattern: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    Directory(PathBuf),
}

/// How a directory's matches are enumerated, decided once per directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enumeration {
    /// Walk lazily while processing; nothing leaves the tree.
    Streamed,
    /// Collect every match before the first file is copied or moved, so
    /// files leaving the tree cannot disturb the walk.
    Materialized,
}

impl Enumeration {
    pub fn for_config(config: &Config) -> Self {
        if config.transfers_file() {
            Enumeration::Materialized
        } else {
            Enumeration::Streamed
        }
    }
}

/// Progress of the pipeline, reported as it happens.
#[derive(Debug)]
pub enum Event<'a> {
    /// Absolute input path, sent before anything about the file is read.
    Input(&'a Path),
    Planned(&'a Placement),
    Applied {
        record: &'a FileRecord,
        placement: &'a Placement,
        outcome: Outcome,
    },
    /// A single file or directory entry failed; processing goes on.
    Failed {
        path: &'a Path,
        error: &'a anyhow::Error,
    },
}

pub fn process_target(target: &Target, config: &Config, on_event: &mut dyn FnMut(Event<'_>)) {
    match target {
        Target::File(path) => process_file(path, config, on_event),
        Target::Directory(dir) => process_directory(dir, config, on_event),
    }
}

pub fn process_directory(dir: &Path, config: &Config, on_event: &mut dyn FnMut(Event<'_>)) {
    let strategy = Enumeration::for_config(config);
    debug!(dir = %dir.display(), ?strategy, "scanning");

    let files = candidate_files(dir, config);
    match strategy {
        Enumeration::Streamed => {
            for entry in files {
                process_entry(dir, entry, config, on_event);
            }
        }
        Enumeration::Materialized => {
            let files: Vec<_> = files.collect();
            for entry in files {
                process_entry(dir, entry, config, on_event);
            }
        }
    }
}

/// Runs one file through render, sanitize and apply. Any failure is
/// reported as [`Event::Failed`] and does not propagate.
pub fn process_file(path: &Path, config: &Config, on_event: &mut dyn FnMut(Event<'_>)) {
    let _span = debug_span!("file", path = %path.display()).entered();
    if let Err(error) = place_file(path, config, on_event) {
        debug!(error = %error, "file failed");
        on_event(Event::Failed {
            path,
            error: &error,
        });
    }
}

/// Files directly in `dir`, or anywhere below it when recursive, whose name
/// matches the search pattern. Order is the filesystem's.
pub fn candidate_files<'a>(
    dir: &Path,
    config: &'a Config,
) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> + 'a {
    let max_depth = if config.recursive { usize::MAX } else { 1 };
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let is_file = entry.file_type().is_file()
                    || (entry.path_is_symlink() && entry.path().is_file());
                (is_file && config.search_pattern.matches(entry.file_name()))
                    .then(|| Ok(entry.into_path()))
            }
            Err(err) => Some(Err(err)),
        })
}

fn escape_brackets(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        match ch {
            '[' => out.push_str("[[]"),
            ']' => out.push_str("[]]"),
            _ => out.push(ch),
        }
    }
    out
}

fn process_entry(
    dir: &Path,
    entry: Result<PathBuf, walkdir::Error>,
    config: &Config,
    on_event: &mut dyn FnMut(Event<'_>),
) {
    match entry {
        Ok(path) => process_file(&path, config, on_event),
        Err(err) => {
            let path = err.path().unwrap_or(dir).to_path_buf();
            let error = anyhow::Error::from(err)
                .context(format!("could not scan folder: {}", dir.display()));
            on_event(Event::Failed {
                path: &path,
                error: &error,
            });
        }
    }
}

fn place_file(path: &Path, config: &Config, on_event: &mut dyn FnMut(Event<'_>)) -> Result<()> {
    let input = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    on_event(Event::Input(&input));

    let record = FileRecord::capture(path)?;

    let placement = plan_placement(&record, config)?;
    on_event(Event::Planned(&placement));

    let outcome = execute(&placement, config)
        .with_context(|| format!("could not place {}", record.path.display()))?;
    on_event(Event::Applied {
        record: &record,
        placement: &placement,
        outcome,
    });
    Ok(())
}
