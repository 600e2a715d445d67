mod cmd;
mod ctx;
mod error;
mod table;
mod view;

use std::{
    fmt,
    io::{self, IsTerminal as _, Write as _},
    path::PathBuf,
    process::ExitCode,
};

use clap::{
    ArgAction, Parser,
    builder::{BoolValueParser, TypedValueParser as _},
};
use cmd::{Commands, Success};
use comfy_table::{Cell, CellAlignment, Row};
use ctx::Ctx;
use error::{Error, Result};
use mc_config::{AppConfig, ConfigSources, KvAssignment};
use serde_json::Value;
use tracing::{error, trace};

/// A terminal chat client for tool-calling assistants.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten, next_help_heading = "Global Options")]
    globals: Globals,

    #[command(subcommand, next_help_heading = "Options")]
    command: Option<Commands>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct Globals {
    /// Override a configuration value for the duration of the command.
    ///
    /// Use `KEY:=JSON` to assign a JSON value.
    #[arg(short, long, value_name = "KEY=VALUE", global = true, action = ArgAction::Append)]
    config: Vec<String>,

    /// Load configuration from this file, on top of the global one.
    #[arg(long, value_name = "FILE", global = true)]
    config_file: Option<PathBuf>,

    /// Increase verbosity of logging.
    ///
    /// Can be specified multiple times to increase verbosity.
    ///
    /// Defaults to printing "error" messages. For each increase in verbosity,
    /// the log level is set to "warn", "info", "debug", and "trace"
    /// respectively.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all output, including errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[arg(
        long = "no-color",
        alias = "no-colors",
        global = true,
        default_value_t = false,
        value_parser = BoolValueParser::new().map(|v| !v),
        help = "Disable color in the output.",
    )]
    pub(crate) colors: bool,
}

impl fmt::Display for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entry(&"config", &self.globals.config)
            .entry(&"config_file", &self.globals.config_file)
            .entry(&"verbose", &self.globals.verbose)
            .entry(&"quiet", &self.globals.quiet)
            .finish()
    }
}

#[must_use]
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let is_tty = io::stdout().is_terminal();
    let quiet = cli.globals.quiet;

    configure_logging(cli.globals.verbose, quiet);
    trace!(
        command = cli.command.as_ref().map_or("chat", Commands::name),
        arguments = %cli,
        "Starting CLI run."
    );

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => {
            error!(%error, "Failed to start async runtime.");
            return ExitCode::FAILURE;
        }
    };

    let (code, output) = match runtime.block_on(run_inner(cli)) {
        Ok(output) if is_tty => (0, output_to_string(output)),
        Ok(output) => (0, parse_json_output(output)),
        Err(error) => parse_error(error, is_tty),
    };

    if !(output.is_empty() || (quiet && code != 0)) {
        let mut stdout = io::stdout().lock();
        if let Err(error) = writeln!(stdout, "{output}") {
            error!(%error, "Failed to write output.");
        }
    }

    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

async fn run_inner(cli: Cli) -> Result<Success> {
    let config = load_config(&cli.globals)?;
    let ctx = Ctx::new(cli.globals, config)?;

    cli.command
        .unwrap_or_default()
        .run(&ctx)
        .await
        .map_err(Into::into)
}

fn output_to_string(output: Success) -> String {
    match output {
        Success::Ok => String::new(),
        Success::Message(msg) => msg,
        Success::Table { header, rows } => table::list(header, rows),
        Success::Details { title, rows } => table::details(title.as_deref(), rows),
        Success::Json(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        }
    }
}

fn parse_json_output(output: Success) -> String {
    let value = match output {
        Success::Ok => serde_json::json!({}),
        Success::Message(msg) => {
            serde_json::json!({ "message": strip_ansi_escapes::strip_str(msg) })
        }
        Success::Table { header, rows } => table::list_json(&header, rows),
        Success::Details { title, rows } => table::details_json(title.as_deref(), rows),
        Success::Json(value) => value,
    };

    serde_json::to_string(&value).unwrap_or_else(|_| value.to_string())
}

fn parse_error(error: Error, is_tty: bool) -> (i32, String) {
    let cmd::Error {
        code,
        message,
        metadata,
    } = error.into();

    if is_tty {
        let rows = metadata
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(v) => v,
                    v => v.to_string(),
                };

                let mut row = Row::new();
                row.add_cell(Cell::new(k).set_alignment(CellAlignment::Right))
                    .add_cell(Cell::new(v).set_alignment(CellAlignment::Left));
                row
            })
            .collect::<Vec<_>>();

        return (code, table::details(message.as_deref(), rows));
    }

    let (causes, metadata): (Vec<_>, Vec<_>) =
        metadata.into_iter().partition(|(k, _)| k.is_empty());

    let mut error = serde_json::json!({
        "message": message.map(strip_ansi_escapes::strip_str),
        "metadata": metadata.into_iter().collect::<serde_json::Map<_, _>>(),
        "code": code,
    });
    if !causes.is_empty() {
        error["causes"] = causes.into_iter().map(|(_, v)| v).collect();
    }

    (code, error.to_string())
}

/// Build the configuration from the global file, `--config-file` and
/// `--config` overrides.
fn load_config(globals: &Globals) -> Result<AppConfig> {
    let overrides = globals
        .config
        .iter()
        .map(|field| field.parse::<KvAssignment>())
        .collect::<mc_config::Result<Vec<_>>>()?;
    trace!(overrides = ?globals.config, "Applying CLI config overrides.");

    let mut sources = ConfigSources::with_global().overrides(overrides);
    if let Some(path) = &globals.config_file {
        sources = sources.file(path);
    }

    mc_config::load(sources).map_err(Into::into)
}

fn configure_logging(verbose: u8, quiet: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::fmt;

    let mut level = match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        3 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    if quiet {
        level = LevelFilter::OFF;
    }

    let mut filter = vec!["off".to_owned()];
    for krate in ["api", "cli", "config", "conversation", "md", "session"] {
        filter.push(format!("mc_{krate}={level}"));
    }

    let format = fmt::format().with_target(false).compact();

    if level < LevelFilter::DEBUG {
        tracing_subscriber::fmt()
            .event_format(format)
            .without_time()
            .with_ansi(true)
            .with_target(false)
            .with_writer(io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    } else {
        tracing_subscriber::fmt()
            .event_format(format)
            .with_ansi(true)
            .with_target(false)
            .with_writer(io::stderr)
            .with_env_filter(filter.join(","))
            .init();
    }
}
