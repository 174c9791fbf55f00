pub const REPLACEMENT: char = '_';

/// Replaces every character rejected by `is_invalid` with `_`.
pub fn sanitize(value: &str, is_invalid: impl Fn(char) -> bool) -> String {
    value
        .chars()
        .map(|ch| if is_invalid(ch) { REPLACEMENT } else { ch })
        .collect()
}

/// For the directory-path field, which may contain separators.
pub fn sanitize_path(value: &str) -> String {
    sanitize(value, is_invalid_path_char)
}

/// For single path components: the directory name and the file name.
pub fn sanitize_file_name(value: &str) -> String {
    sanitize(value, is_invalid_file_name_char)
}

#[cfg(windows)]
pub fn is_invalid_path_char(ch: char) -> bool {
    matches!(ch, '"' | '<' | '>' | '|') || ch.is_ascii_control()
}

#[cfg(windows)]
pub fn is_invalid_file_name_char(ch: char) -> bool {
    is_invalid_path_char(ch) || matches!(ch, '\\' | '/' | ':' | '*' | '?')
}

#[cfg(not(windows))]
pub fn is_invalid_path_char(ch: char) -> bool {
    ch == '\0'
}

#[cfg(not(windows))]
pub fn is_invalid_file_name_char(ch: char) -> bool {
    ch == '\0' || ch == '/'
}
