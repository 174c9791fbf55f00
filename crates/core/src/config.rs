use crate::format::{DEFAULT_DATE_TIME_FORMAT, DEFAULT_NUMBER_FORMAT};
use crate::scan::{SearchPattern, Target};
use crate::template::Template;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_FOLDER_PATH_TEMPLATE: &str = "<DIR>";
pub const DEFAULT_FOLDER_NAME_TEMPLATE: &str = "<TITLE>";
pub const DEFAULT_FILE_NAME_TEMPLATE: &str = "<NAME>";

/// Options in force for one input. Built by folding [`Setting`]s over
/// [`Config::default`]; the value is never edited in place.
#[derive(Debug, Clone)]
pub struct Config {
    pub folder_path: Template,
    pub folder_name: Template,
    pub file_name: Template,
    pub number_format: String,
    pub date_time_format: String,
    pub search_pattern: SearchPattern,
    pub recursive: bool,
    pub move_file: bool,
    pub copy: bool,
    pub overwrite: bool,
    pub sanitize: bool,
    pub simulate: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            folder_path: Template::parse(DEFAULT_FOLDER_PATH_TEMPLATE),
            folder_name: Template::parse(DEFAULT_FOLDER_NAME_TEMPLATE),
            file_name: Template::parse(DEFAULT_FILE_NAME_TEMPLATE),
            number_format: DEFAULT_NUMBER_FORMAT.to_string(),
            date_time_format: DEFAULT_DATE_TIME_FORMAT.to_string(),
            search_pattern: SearchPattern::default(),
            recursive: false,
            move_file: false,
            copy: false,
            overwrite: false,
            sanitize: false,
            simulate: false,
            verbose: false,
            quiet: false,
            json: false,
        }
    }
}

impl Config {
    pub fn with(mut self, setting: Setting) -> Self {
        match setting {
            Setting::FolderPath(t) => self.folder_path = t,
            Setting::FolderName(t) => self.folder_name = t,
            Setting::FileName(t) => self.file_name = t,
            Setting::NumberFormat(f) => self.number_format = f,
            Setting::DateTimeFormat(f) => self.date_time_format = f,
            Setting::SearchPattern(p) => self.search_pattern = p,
            Setting::Flag(flag, on) => *self.flag_mut(flag) = on,
        }
        self
    }

    pub fn flag(&self, flag: Flag) -> bool {
        match flag {
            Flag::Recursive => self.recursive,
            Flag::Move => self.move_file,
            Flag::Copy => self.copy,
            Flag::Overwrite => self.overwrite,
            Flag::Sanitize => self.sanitize,
            Flag::Simulate => self.simulate,
            Flag::Verbose => self.verbose,
            Flag::Quiet => self.quiet,
            Flag::Json => self.json,
        }
    }

    /// False in directory-only mode.
    pub fn transfers_file(&self) -> bool {
        self.copy || self.move_file
    }

    fn flag_mut(&mut self, flag: Flag) -> &mut bool {
        match flag {
            Flag::Recursive => &mut self.recursive,
            Flag::Move => &mut self.move_file,
            Flag::Copy => &mut self.copy,
            Flag::Overwrite => &mut self.overwrite,
            Flag::Sanitize => &mut self.sanitize,
            Flag::Simulate => &mut self.simulate,
            Flag::Verbose => &mut self.verbose,
            Flag::Quiet => &mut self.quiet,
            Flag::Json => &mut self.json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Recursive,
    Move,
    Copy,
    Overwrite,
    Sanitize,
    Simulate,
    Verbose,
    Quiet,
    Json,
}

impl Flag {
    pub const ALL: [Flag; 9] = [
        Flag::Recursive,
        Flag::Move,
        Flag::Copy,
        Flag::Overwrite,
        Flag::Sanitize,
        Flag::Simulate,
        Flag::Verbose,
        Flag::Quiet,
        Flag::Json,
    ];

    /// Upper case switches the flag on, lower case switches it off.
    pub fn letter(self) -> char {
        match self {
            Flag::Recursive => 'R',
            Flag::Move => 'M',
            Flag::Copy => 'C',
            Flag::Overwrite => 'W',
            Flag::Sanitize => 'X',
            Flag::Simulate => 'S',
            Flag::Verbose => 'V',
            Flag::Quiet => 'Q',
            Flag::Json => 'J',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Flag::Recursive => "enable recursive subfolder search",
            Flag::Move => "move input file to output folder",
            Flag::Copy => "copy input file to output folder",
            Flag::Overwrite => "overwrite existing files",
            Flag::Sanitize => "sanitize output path and name",
            Flag::Simulate => "enable simulation mode",
            Flag::Verbose => "enable verbose mode",
            Flag::Quiet => "enable quiet mode",
            Flag::Json => "print one JSON line per processed file",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Setting {
    FolderPath(Template),
    FolderName(Template),
    FileName(Template),
    NumberFormat(String),
    DateTimeFormat(String),
    SearchPattern(SearchPattern),
    Flag(Flag, bool),
}

/// One classified command-line argument.
#[derive(Debug, Clone)]
pub enum Argument {
    Setting(Setting),
    Usage,
    Target(Target),
}

#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("Unrecognized argument '{arg}' at index {index}.")]
    Unrecognized { arg: String, index: usize },
    #[error("Invalid search pattern '{pattern}' at index {index}: {reason}")]
    InvalidPattern {
        pattern: String,
        index: usize,
        reason: glob::PatternError,
    },
}

impl Argument {
    /// Classifies `raw`. Paths are checked against the filesystem at the
    /// moment of the call, so arguments must be parsed in order as they are
    /// processed.
    pub fn parse(index: usize, raw: &str) -> Result<Argument, ArgumentError> {
        if let Some(value) = raw.strip_prefix("/D:") {
            return Ok(Argument::Setting(Setting::FolderPath(Template::parse(value))));
        }
        if let Some(value) = raw.strip_prefix("/F:") {
            return Ok(Argument::Setting(Setting::FolderName(Template::parse(value))));
        }
        if let Some(value) = raw.strip_prefix("/G:") {
            return Ok(Argument::Setting(Setting::FileName(Template::parse(value))));
        }
        if let Some(value) = raw.strip_prefix("/N:") {
            return Ok(Argument::Setting(Setting::NumberFormat(value.to_string())));
        }
        if let Some(value) = raw.strip_prefix("/T:") {
            return Ok(Argument::Setting(Setting::DateTimeFormat(value.to_string())));
        }
        if let Some(value) = raw.strip_prefix("/P:") {
            let pattern =
                SearchPattern::new(value).map_err(|reason| ArgumentError::InvalidPattern {
                    pattern: value.to_string(),
                    index,
                    reason,
                })?;
            return Ok(Argument::Setting(Setting::SearchPattern(pattern)));
        }
        if raw == "/?" {
            return Ok(Argument::Usage);
        }
        if let Some((flag, on)) = parse_flag(raw) {
            return Ok(Argument::Setting(Setting::Flag(flag, on)));
        }

        let path = Path::new(raw);
        if path.is_dir() {
            Ok(Argument::Target(Target::Directory(path.to_path_buf())))
        } else if path.is_file() {
            Ok(Argument::Target(Target::File(path.to_path_buf())))
        } else {
            Err(ArgumentError::Unrecognized {
                arg: raw.to_string(),
                index,
            })
        }
    }
}

/// Folds settings left to right over the defaults; later settings win.
pub fn fold_settings(settings: impl IntoIterator<Item = Setting>) -> Config {
    settings.into_iter().fold(Config::default(), Config::with)
}

fn parse_flag(raw: &str) -> Option<(Flag, bool)> {
    let mut chars = raw.strip_prefix('/')?.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let flag = Flag::ALL
        .into_iter()
        .find(|flag| flag.letter().eq_ignore_ascii_case(&letter))?;
    Some((flag, letter.is_ascii_uppercase()))
}
