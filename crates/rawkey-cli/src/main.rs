//! rawkey CLI: inspect raw keystrokes.
//!
//! `rawkey read` puts the terminal in raw mode and prints every decoded key;
//! `rawkey decode` runs the same decoder over a captured byte stream without
//! touching terminal modes.

// CLI-specific lint allowances (CLI binary, not library)
#![allow(missing_docs)]
#![allow(clippy::print_stdout)] // CLI must print to stdout
#![allow(clippy::print_stderr)] // CLI must print to stderr

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use miette::{IntoDiagnostic, Result, WrapErr};
use rawkey::{Key, KeyDecoder, KeyPress, ReaderOptions};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "RAWKEY_LOG";
/// Ctrl-C arrives as a plain byte once signal characters are disabled.
const CTRL_C: char = '\u{3}';
/// Ctrl-D (end of transmission).
const CTRL_D: char = '\u{4}';

/// Color output mode
#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and `NO_COLOR` env
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Debug, Parser)]
#[command(name = "rawkey", version, about = "Inspect raw terminal keystrokes")]
struct Cli {
    /// Control color output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorMode,

    /// Log decoder and mode changes to stderr (overrides `RAWKEY_LOG`)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct DecodeArgs {
    /// Emit one JSON object per key
    #[arg(long)]
    json: bool,
    /// Load reader options from a JSON file
    #[arg(long)]
    options: Option<PathBuf>,
    /// Override the input buffer capacity in bytes
    #[arg(long)]
    buffer_capacity: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read keys from the terminal in raw mode until Ctrl-C or Ctrl-D
    Read {
        #[command(flatten)]
        decode: DecodeArgs,
        /// Stop after this many keys
        #[arg(long)]
        count: Option<usize>,
    },
    /// Decode a captured byte stream (file or stdin) without changing terminal modes
    Decode {
        #[command(flatten)]
        decode: DecodeArgs,
        /// File holding the captured bytes (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        #[arg(value_enum, help = "Shell to generate completions for")]
        shell: Shell,
    },
}

/// Whether the key loop keeps going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Configure miette's graphical reporting based on color mode
fn configure_colors(mode: ColorMode) {
    let use_color = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            std::env::var_os("NO_COLOR").is_none()
                && supports_color::on(supports_color::Stream::Stderr).is_some()
        }
    };

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .color(use_color)
                .unicode(use_color)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rawkey=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    configure_colors(cli.color);
    init_logging(cli.verbose);
    match cli.command {
        Commands::Read { decode, count } => cmd_read(&decode, count),
        Commands::Decode { decode, input } => cmd_decode(&decode, input.as_deref()),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}

// =============================================================================
// Command Handlers
// =============================================================================

/// Handle the read command.
#[cfg(unix)]
fn cmd_read(args: &DecodeArgs, count: Option<usize>) -> Result<()> {
    use rawkey::{RuneReader, TtyControl};
    use std::fs::File;
    use std::io::IsTerminal;
    use std::os::fd::AsFd;

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(miette::miette!(
            help = "use `rawkey decode` for captured input",
            "stdin is not a terminal"
        ));
    }
    let options = load_options(args)?;

    // Read from a duplicate of fd 0 so std's stdin buffer never holds bytes
    // the decoder cannot see.
    let tty = stdin.as_fd().try_clone_to_owned().into_diagnostic()?;
    let input = File::from(tty.try_clone().into_diagnostic()?);
    let mut reader = RuneReader::with_options(input, TtyControl::new(tty), &options);
    let mut stdout = io::stdout().lock();

    reader.with_raw_mode(|session| {
        eprintln!("ready");
        let mut seen = 0usize;
        while !count.is_some_and(|limit| seen >= limit) {
            let outcome = session.read_key();
            let bytes = session.take_recorded();
            if report(&mut stdout, args.json, outcome, &bytes, true)? == Flow::Stop {
                break;
            }
            seen += 1;
        }
        Ok(())
    })?;
    Ok(())
}

#[cfg(not(unix))]
fn cmd_read(_args: &DecodeArgs, _count: Option<usize>) -> Result<()> {
    Err(miette::miette!(
        help = "use `rawkey decode` for captured input",
        "raw terminal mode is only supported on unix"
    ))
}

/// Handle the decode command.
///
/// A capture has no read bursts, so the whole stream is loaded first and
/// decoded from a single buffer. An escape sequence can then never be split
/// by a refill and mistaken for a lone Escape.
fn cmd_decode(args: &DecodeArgs, input: Option<&Path>) -> Result<()> {
    let mut options = load_options(args)?;
    let data = match input {
        Some(path) => fs::read(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to open {}", path.display()))?,
        None => {
            let mut data = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut data)
                .into_diagnostic()
                .wrap_err("failed to read stdin")?;
            data
        }
    };
    options.buffer_capacity = options.buffer_capacity.max(data.len());

    let mut decoder = KeyDecoder::with_options(data.as_slice(), &options);
    let mut stdout = io::stdout().lock();
    loop {
        let outcome = decoder.read_key();
        let bytes = decoder.input_mut().take_recorded();
        if report(&mut stdout, args.json, outcome, &bytes, false)? == Flow::Stop {
            break;
        }
    }
    stdout.flush().into_diagnostic()?;
    Ok(())
}

/// Handle the completions command.
fn cmd_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// Options from `--options`, with command-line overrides applied.
fn load_options(args: &DecodeArgs) -> Result<ReaderOptions> {
    let mut options = match args.options.as_deref() {
        Some(path) => {
            let data = fs::read(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to read options file {}", path.display()))?;
            serde_json::from_slice(&data)
                .into_diagnostic()
                .wrap_err_with(|| format!("invalid options file {}", path.display()))?
        }
        None => ReaderOptions::default(),
    };
    if let Some(capacity) = args.buffer_capacity {
        options.buffer_capacity = capacity;
    }
    tracing::debug!(?options, "reader options");
    Ok(options)
}

/// Print one decode outcome and decide whether to keep reading.
///
/// End of input stops the loop; unexpected escape sequences are printed and
/// skipped; any other error is returned.
fn report(
    out: &mut impl Write,
    json: bool,
    outcome: rawkey::Result<KeyPress>,
    bytes: &[u8],
    stop_on_control: bool,
) -> rawkey::Result<Flow> {
    let press = match outcome {
        Ok(press) => press,
        Err(err) if err.is_end_of_input() => return Ok(Flow::Stop),
        Err(err) if err.is_recoverable() => {
            if json {
                let line = serde_json::json!({ "error": err.to_string(), "bytes": bytes });
                writeln!(out, "{line}")?;
            } else {
                writeln!(out, "error: [{}] {err}", hex(bytes))?;
            }
            return Ok(Flow::Continue);
        }
        Err(err) => return Err(err),
    };

    if json {
        let line = serde_json::json!({
            "key": press.key,
            "width": press.width,
            "len": press.len,
            "bytes": bytes,
        });
        writeln!(out, "{line}")?;
    } else {
        writeln!(out, "key: [{}] {}", hex(bytes), press.key)?;
    }

    if stop_on_control && matches!(press.key, Key::Char(CTRL_C | CTRL_D)) {
        return Ok(Flow::Stop);
    }
    Ok(Flow::Continue)
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
