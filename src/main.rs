//! Purpose: `ujsonize` CLI entry point.
//! Role: Binary crate root; parses args, wires stdin/stdout to the conversion core.
//! Invariants: stdout carries only converted output, one newline-terminated line per unit.
//! Invariants: Fatal errors are emitted on stderr (human text on a TTY, JSON otherwise).
//! Invariants: Process exit code is derived from `core::error::to_exit_code`.
use std::error::Error as StdError;
use std::io::{self, BufWriter, IsTerminal, Write};

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};

mod command_dispatch;
mod logging;
mod stream;

use logging::{LogConfig, init_tracing};
use stream::{StreamConfig, StreamFailure, StreamMode, run_stream};
use ujsonize::convert::Direction;
use ujsonize::core::error::{Error, ErrorKind, to_exit_code};

const DEFAULT_MAX_SNIPPET_BYTES: usize = 120;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    init_tracing(&LogConfig {
        filter: cli.log_level,
    })
    .map_err(|err| (err, color_mode))?;

    command_dispatch::dispatch_command(cli.command)
        .map_err(add_io_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "ujsonize",
    version,
    about = "Encode URL query strings to JSON and decode JSON back to query strings",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Reads stdin, writes stdout. One result line per input (or per line with --byline).

Mental model:
  - `encode` turns `a=1&a=2` into {"a":["1","2"]}
  - `decode` turns {"a":["1","2"]} into `a=1&a=2` (keys sorted)
"#,
    after_help = r#"EXAMPLES
  $ echo 'a=1&a=2&b=3' | ujsonize encode
  {"a":["1","2"],"b":["3"]}
  $ echo '{"foo":["bar","baz"],"hoge":"fuga"}' | ujsonize decode
  foo=bar&foo=baz&hoge=fuga
  $ cat queries.txt | ujsonize encode --byline    # bad lines are logged and skipped

LEARN MORE
  $ ujsonize <command> --help"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,
    #[arg(
        long,
        value_name = "FILTER",
        help = "Log filter for stderr diagnostics (e.g. debug); defaults to RUST_LOG, then warn"
    )]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Encode a URL query string to a JSON object",
        long_about = r#"Parse stdin as a URL query string and print a JSON object.

Every key maps to an array of its values, in input order; keys are sorted.
Malformed percent escapes (e.g. %zz) and `;` separators are errors."#,
        after_help = r#"EXAMPLES
  $ echo 'q=rust+lang&tag=a&tag=b' | ujsonize encode
  {"q":["rust lang"],"tag":["a","b"]}"#
    )]
    Encode(ConvertArgs),
    #[command(
        about = "Decode a JSON object to a URL query string",
        long_about = r#"Parse stdin as a JSON object and print `key=value` pairs joined by `&`.

Array values produce one pair per element; strings are used unquoted; other values
(numbers, booleans, null, objects) use their JSON text. Keys are sorted, and keys
and values are form-encoded (`&` becomes %26, space becomes +)."#,
        after_help = r#"EXAMPLES
  $ echo '{"foo":["bar","baz"],"n":123}' | ujsonize decode
  foo=bar&foo=baz&n=123"#
    )]
    Decode(ConvertArgs),
    #[command(about = "Print shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Clone, Copy, Debug)]
struct ConvertArgs {
    #[arg(long, help = "Don't trim leading/trailing whitespace from each input")]
    no_trim: bool,
    #[arg(
        long = "byline",
        visible_alias = "by-line",
        help = "Convert each stdin line separately; failed lines are logged and skipped"
    )]
    byline: bool,
}

impl ConvertArgs {
    fn stream_config(self) -> StreamConfig {
        StreamConfig {
            mode: if self.byline {
                StreamMode::Lines
            } else {
                StreamMode::Whole
            },
            trim: !self.no_trim,
            max_snippet_bytes: DEFAULT_MAX_SNIPPET_BYTES,
        }
    }
}

fn convert_stdin(direction: Direction, args: ConvertArgs) -> Result<RunOutcome, Error> {
    let config = args.stream_config();
    tracing::debug!(
        direction = direction.label(),
        mode = ?config.mode,
        trim = config.trim,
        "reading stdin"
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let outcome = run_stream(
        io::stdin().lock(),
        config,
        |unit| {
            direction.convert(unit, &mut out)?;
            out.flush().map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to write output")
                    .with_source(err)
            })
        },
        |failure| log_skipped_line(direction, &failure),
    )
    .map_err(|err| add_direction_context(err, direction))?;

    if outcome.failed > 0 {
        tracing::warn!(
            total = outcome.records_total,
            ok = outcome.ok,
            failed = outcome.failed,
            "finished {} with {} skipped line{}",
            direction.label(),
            outcome.failed,
            if outcome.failed == 1 { "" } else { "s" }
        );
    }
    Ok(RunOutcome::ok())
}

fn log_skipped_line(direction: Direction, failure: &StreamFailure) {
    tracing::warn!(
        line = failure.line,
        kind = ?failure.error_kind,
        hint = failure.hint.as_deref().unwrap_or(""),
        snippet = %failure.snippet,
        "failed to {}: {}",
        direction.label(),
        failure.message
    );
}

fn add_direction_context(err: Error, direction: Direction) -> Error {
    let message = format!("failed to {}: {}", direction.label(), error_message(&err));
    err.with_message(message)
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Io || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check that stdin is readable and stdout is still open (e.g. not a closed pipe).")
}

#[derive(Copy, Clone, Debug)]
enum Label {
    Error,
    Hint,
    Cause,
}

impl Label {
    fn paint(self, use_color: bool) -> String {
        let (text, code) = match self {
            Label::Error => ("error:", "31"),
            Label::Hint => ("hint:", "33"),
            Label::Cause => ("caused by:", "33"),
        };
        if use_color {
            format!("\u{1b}[{code}m{text}\u{1b}[0m")
        } else {
            text.to_string()
        }
    }
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Parse => "parse error".to_string(),
        ErrorKind::Serialize => "serialization error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    std::iter::successors(err.source(), |&source| source.source())
        .map(|source| source.to_string())
        .collect()
}

fn error_json(err: &Error) -> Value {
    let mut body = Map::new();
    body.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    body.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        body.insert("hint".to_string(), json!(hint));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        body.insert("causes".to_string(), json!(causes));
    }
    json!({ "error": body })
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        Label::Error.paint(use_color),
        error_message(err)
    )];
    if let Some(hint) = err.hint() {
        lines.push(format!("{} {hint}", Label::Hint.paint(use_color)));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("{} {cause}", Label::Cause.paint(use_color)));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `ujsonize --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "ujsonize") else {
        return "Try `ujsonize --help`.".to_string();
    };

    let parts: Vec<&str> = tokens
        .iter()
        .skip(pos + 1)
        .take_while(|token| {
            !(token.starts_with('-') || token.starts_with('<') || token.starts_with('['))
        })
        .copied()
        .collect();

    if parts.is_empty() {
        return "Try `ujsonize --help`.".to_string();
    }
    format!("Try `ujsonize {} --help`.", parts.join(" "))
}
