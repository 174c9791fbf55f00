use chrono::{DateTime, Local};
use std::fmt::Write;
use thiserror::Error;

pub const DEFAULT_NUMBER_FORMAT: &str = "g";
pub const DEFAULT_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unsupported number format: \"{0}\"")]
    Number(String),
    #[error("invalid date/time format: \"{0}\"")]
    DateTime(String),
}

/// Formats a byte count with a one-letter specifier and optional precision,
/// e.g. `g`, `D8`, `N0`, `x4`.
pub fn format_number(value: u64, spec: &str) -> Result<String, FormatError> {
    let mut chars = spec.chars();
    let kind = chars.next();
    let digits = chars.as_str();
    let precision = if digits.is_empty() {
        None
    } else {
        let parsed = digits
            .parse::<usize>()
            .ok()
            .filter(|p| *p <= 99)
            .ok_or_else(|| FormatError::Number(spec.to_string()))?;
        Some(parsed)
    };

    let formatted = match kind {
        None | Some('g' | 'G') => value.to_string(),
        Some('d' | 'D') => format!("{:0width$}", value, width = precision.unwrap_or(0)),
        Some('n' | 'N') => with_decimals(group_thousands(value), precision.unwrap_or(2)),
        Some('f' | 'F') => with_decimals(value.to_string(), precision.unwrap_or(2)),
        Some('x') => format!("{:0width$x}", value, width = precision.unwrap_or(0)),
        Some('X') => format!("{:0width$X}", value, width = precision.unwrap_or(0)),
        Some(_) => return Err(FormatError::Number(spec.to_string())),
    };
    Ok(formatted)
}

/// Formats a timestamp with strftime specifiers. Unknown specifiers are an
/// error rather than a panic.
pub fn format_timestamp(value: &DateTime<Local>, spec: &str) -> Result<String, FormatError> {
    let mut out = String::new();
    write!(out, "{}", value.format(spec)).map_err(|_| FormatError::DateTime(spec.to_string()))?;
    Ok(out)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn with_decimals(mut value: String, decimals: usize) -> String {
    if decimals > 0 {
        value.push('.');
        value.extend(std::iter::repeat('0').take(decimals));
    }
    value
}
