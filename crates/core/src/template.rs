use crate::config::Config;
use crate::format::{format_number, format_timestamp, FormatError};
use crate::metadata::FileRecord;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    /// Identifier found between `<` and `>`, as written.
    Placeholder(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Cwd,
    Dir,
    Title,
    Name,
    Path,
    Ext,
    Len,
    CTime,
    MTime,
    ATime,
}

impl Token {
    pub const ALL: [Token; 10] = [
        Token::Cwd,
        Token::Dir,
        Token::Title,
        Token::Ext,
        Token::Name,
        Token::Path,
        Token::Len,
        Token::CTime,
        Token::MTime,
        Token::ATime,
    ];

    /// Case-insensitive lookup of a placeholder identifier.
    pub fn from_name(name: &str) -> Option<Token> {
        Token::ALL
            .into_iter()
            .find(|token| token.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Token::Cwd => "CWD",
            Token::Dir => "DIR",
            Token::Title => "TITLE",
            Token::Name => "NAME",
            Token::Path => "PATH",
            Token::Ext => "EXT",
            Token::Len => "LEN",
            Token::CTime => "CTIME",
            Token::MTime => "MTIME",
            Token::ATime => "ATIME",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Token::Cwd => "current working directory",
            Token::Dir => "input file directory name",
            Token::Title => "input file title",
            Token::Name => "input file name",
            Token::Path => "input file full path",
            Token::Ext => "input file extension",
            Token::Len => "input file length",
            Token::CTime => "input file creation time",
            Token::MTime => "input file last write time",
            Token::ATime => "input file last access time",
        }
    }
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("could not read the current working directory")]
    CurrentDir(#[source] std::io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// A name template such as `<TITLE>_<MTIME><EXT>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    parts: Vec<TemplatePart>,
}

impl Template {
    /// Splits `input` into literal text and `<word>` placeholders. Parsing
    /// never fails: text that does not form a placeholder stays literal.
    pub fn parse(input: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = input;

        while let Some(open) = rest.find('<') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let name_len: usize = after
                .chars()
                .take_while(|ch| is_word_char(*ch))
                .map(char::len_utf8)
                .sum();

            if name_len > 0 && after[name_len..].starts_with('>') {
                if !literal.is_empty() {
                    parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                }
                parts.push(TemplatePart::Placeholder(after[..name_len].to_string()));
                rest = &after[name_len + 1..];
            } else {
                literal.push('<');
                rest = after;
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Template {
            source: input.to_string(),
            parts,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    pub fn render(&self, record: &FileRecord, config: &Config) -> Result<String, TemplateError> {
        let mut output = String::new();
        for part in &self.parts {
            match part {
                TemplatePart::Literal(s) => output.push_str(s),
                TemplatePart::Placeholder(name) => {
                    output.push_str(&resolve_token(name, record, config)?)
                }
            }
        }
        Ok(output)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

pub fn render_template(
    template: &str,
    record: &FileRecord,
    config: &Config,
) -> Result<String, TemplateError> {
    Template::parse(template).render(record, config)
}

/// Value of one placeholder for `record`. Unknown names come back as the
/// original `<name>` text.
pub fn resolve_token(
    name: &str,
    record: &FileRecord,
    config: &Config,
) -> Result<String, TemplateError> {
    let Some(token) = Token::from_name(name) else {
        return Ok(format!("<{name}>"));
    };

    let value = match token {
        Token::Cwd => std::env::current_dir()
            .map_err(TemplateError::CurrentDir)?
            .to_string_lossy()
            .to_string(),
        Token::Dir => record.dir.to_string_lossy().to_string(),
        Token::Title => record.title.clone(),
        Token::Name => record.name.clone(),
        Token::Path => record.path.to_string_lossy().to_string(),
        Token::Ext => record.extension.clone(),
        Token::Len => format_number(record.len, &config.number_format)?,
        Token::CTime => format_timestamp(&record.created, &config.date_time_format)?,
        Token::MTime => format_timestamp(&record.modified, &config.date_time_format)?,
        Token::ATime => format_timestamp(&record.accessed, &config.date_time_format)?,
    };
    Ok(value)
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}
