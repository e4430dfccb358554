use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use xmlsort::utils::write_atomic;
use xmlsort::{
    ConfigLoader, ConfigSource, FormatOutcome, Formatter, Options, ParseConfig, SortConfig,
    WriteConfig,
};

const DOCS_URL: &str = "https://github.com/pixincreate/xmlsort#readme";

#[derive(Debug, Parser)]
#[command(
    name = "xmlsort",
    version,
    about = "Sort XML elements and attributes by a project config",
    args_conflicts_with_subcommands = true
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
    /// Files to format (defaults to stdin, written to stdout)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,
    /// Sort config to use instead of the project's xmlformatter.cfg
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Project root holding xmlformatter.cfg (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,
    /// Rewrite the files in place
    #[arg(short, long, conflicts_with = "check")]
    write: bool,
    /// Exit with status 1 if any file would change
    #[arg(long)]
    check: bool,
    /// Spaces per nesting level (0 writes one line)
    #[arg(long, value_name = "N", default_value_t = 2)]
    indent: usize,
    /// Do not emit an XML declaration
    #[arg(long)]
    no_declaration: bool,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the documentation URL
    Docs,
}

/// A file whose formatted text is ready to be written
struct Formatted {
    path: PathBuf,
    text: String,
    changed: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(args: &Args) -> Result<ExitCode> {
    if let Some(Command::Docs) = args.command {
        println!("{DOCS_URL}");
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(args)?;
    let options = Options {
        parse: ParseConfig::default(),
        write: WriteConfig {
            indent: args.indent,
            declaration: !args.no_declaration,
        },
    };
    let formatter = Formatter::new(&config).with_options(options);

    if args.files.is_empty() {
        return run_stdin(args, &formatter);
    }

    // format everything before touching any file
    let mut formatted = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let input = read_input(Some(path))?;
        let text = format_one(&formatter, &input)
            .with_context(|| format!("failed to format {}", path.display()))?;
        let changed = text != input;
        debug!(path = %path.display(), changed, "formatted file");
        formatted.push(Formatted {
            path: path.clone(),
            text,
            changed,
        });
    }

    if args.check {
        let mut unformatted = false;
        for file in formatted.iter().filter(|file| file.changed) {
            println!("{}", file.path.display());
            unformatted = true;
        }
        return Ok(if unformatted {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    if args.write {
        for file in formatted.iter().filter(|file| file.changed) {
            write_atomic(&file.path, file.text.as_bytes())
                .with_context(|| format!("failed to write {}", file.path.display()))?;
            info!(path = %file.path.display(), "{}", xmlsort::format::SUCCESS_MESSAGE);
        }
        return Ok(ExitCode::SUCCESS);
    }

    for file in &formatted {
        write_output(file.text.as_bytes())?;
    }
    Ok(ExitCode::SUCCESS)
}

fn run_stdin(args: &Args, formatter: &Formatter<'_>) -> Result<ExitCode> {
    if args.write {
        bail!("--write needs at least one file");
    }

    let input = read_input(None)?;
    let text = format_one(formatter, &input)?;
    if args.check {
        return Ok(if text == input {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }
    write_output(text.as_bytes())?;
    Ok(ExitCode::SUCCESS)
}

fn format_one(formatter: &Formatter<'_>, input: &str) -> Result<String> {
    match formatter.format_edit(input) {
        FormatOutcome::Edit { text, .. } => Ok(text),
        outcome @ FormatOutcome::NoEdit { .. } => Err(anyhow!(outcome.message())),
    }
}

/// `--config` is read as given; otherwise the project config is loaded and
/// created with defaults when missing
fn load_config(args: &Args) -> Result<SortConfig> {
    if let Some(path) = &args.config {
        return ConfigLoader::new(path)
            .load_strict()
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    let root = match &args.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };
    let loaded = ConfigLoader::for_project(&root).load();
    match &loaded.source {
        ConfigSource::File(path) => debug!(path = %path.display(), "using project config"),
        ConfigSource::Defaulted {
            path, persisted, ..
        } => info!(path = %path.display(), persisted, "using default config"),
    }
    Ok(loaded.config)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(data: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(data).context("failed to write stdout")?;
    stdout.flush().context("failed to flush stdout")
}
