mod apply;
mod config;
mod format;
mod metadata;
mod planner;
mod sanitize;
mod scan;
mod template;

pub use apply::{execute, ApplyError, Outcome};
pub use config::{
    fold_settings, Argument, ArgumentError, Config, Flag, Setting, DEFAULT_FILE_NAME_TEMPLATE,
    DEFAULT_FOLDER_NAME_TEMPLATE, DEFAULT_FOLDER_PATH_TEMPLATE,
};
pub use format::{
    format_number, format_timestamp, FormatError, DEFAULT_DATE_TIME_FORMAT, DEFAULT_NUMBER_FORMAT,
};
pub use metadata::FileRecord;
pub use planner::{plan_placement, Placement};
pub use sanitize::{
    is_invalid_file_name_char, is_invalid_path_char, sanitize, sanitize_file_name, sanitize_path,
};
pub use scan::{
    candidate_files, process_directory, process_file, process_target, Enumeration, Event,
    SearchPattern, Target, DEFAULT_SEARCH_PATTERN,
};
pub use template::{
    render_template, resolve_token, Template, TemplateError, TemplatePart, Token,
};
