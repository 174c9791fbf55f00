use mkfolder_core::{Config, Flag, Token};
use std::fmt::Write;

/// Usage text showing the values currently in force.
pub fn render(config: &Config) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_usage(&mut out, config);
    out
}

fn write_usage(out: &mut String, config: &Config) -> std::fmt::Result {
    writeln!(out, "usage: [options...] [files or folders...]")?;
    writeln!(out, "options:")?;
    writeln!(
        out,
        "  /D:format             set output folder path format (current=\"{}\")",
        config.folder_path
    )?;
    writeln!(
        out,
        "  /F:format             set output folder name format (current=\"{}\")",
        config.folder_name
    )?;
    writeln!(
        out,
        "  /G:format             set output file name format (current=\"{}\")",
        config.file_name
    )?;
    writeln!(out, "                        format special symbols:")?;
    for token in Token::ALL {
        writeln!(
            out,
            "{:>21} - {}",
            format!("<{}>", token.name()),
            token.description()
        )?;
    }
    writeln!(
        out,
        "  /N:format             set number format, used with <LEN> (current=\"{}\")",
        config.number_format
    )?;
    writeln!(
        out,
        "  /T:format             set date/time format, used with <?TIME> (current=\"{}\")",
        config.date_time_format
    )?;
    writeln!(
        out,
        "  /P:pattern            set file search pattern (current=\"{}\")",
        config.search_pattern.as_str()
    )?;
    for flag in Flag::ALL {
        writeln!(
            out,
            "  /{}                    {} (current={})",
            flag.letter(),
            flag.description(),
            config.flag(flag)
        )?;
    }
    writeln!(out, "  /?                    show program usage")?;
    writeln!(
        out,
        "  lower-case /r /m /c /w /x /s /v /q /j switch the option off again"
    )?;
    writeln!(out, "examples:")?;
    writeln!(out, "  1. create subfolders only")?;
    writeln!(out, "     \"docs\"")?;
    writeln!(
        out,
        "  2. create subfolders, copying files over, renaming them \"folder\""
    )?;
    writeln!(out, "     /C /R \"/P:*.jpeg\" \"/G:folder<EXT>\" \"pics\"")?;
    Ok(())
}
