mod usage;

use clap::Parser;
use mkfolder_core::{process_target, Argument, Config, Event, FileRecord, Outcome};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "mkfolder-cli", version)]
#[command(about = "Creates folders named after files and optionally copies or moves the files into them")]
#[command(after_help = "Run without arguments or with /? to list the slash options.")]
struct Cli {
    /// Diagnostic log level written to stderr (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
    /// Slash options and input files or folders, applied in order
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    record: &'a FileRecord,
    folder: &'a Path,
    target: &'a Path,
    outcome: Outcome,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(&cli.log_level);
    run(&cli.args)
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &[String]) -> ExitCode {
    let mut config = Config::default();

    if args.is_empty() {
        print!("{}", usage::render(&config));
        return ExitCode::SUCCESS;
    }

    for (index, raw) in args.iter().enumerate() {
        match Argument::parse(index, raw) {
            Ok(Argument::Setting(setting)) => config = config.with(setting),
            Ok(Argument::Usage) => print!("{}", usage::render(&config)),
            Ok(Argument::Target(target)) => {
                process_target(&target, &config, &mut |event| report(&config, event));
            }
            Err(err) => {
                debug!(index, "aborting on argument error");
                if !config.quiet {
                    eprintln!("{err}");
                }
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn report(config: &Config, event: Event<'_>) {
    match event {
        Event::Input(path) => {
            if config.verbose {
                println!("in:  {}", path.display());
            }
        }
        Event::Planned(placement) => {
            if config.verbose {
                println!("out: {}", placement.folder.display());
                if config.transfers_file() {
                    println!("out: {}", placement.target.display());
                }
            }
        }
        Event::Applied {
            record,
            placement,
            outcome,
        } => {
            if config.json {
                let line = JsonLine {
                    record,
                    folder: &placement.folder,
                    target: &placement.target,
                    outcome,
                };
                match serde_json::to_string(&line) {
                    Ok(json) => println!("{json}"),
                    Err(err) => warn!(error = %err, "could not serialize report line"),
                }
            }
        }
        Event::Failed { path, error } => {
            if !config.quiet {
                eprintln!("{}: {error:#}", path.display());
            }
        }
    }
}
