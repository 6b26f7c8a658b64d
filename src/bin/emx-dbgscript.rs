//! emx-dbgscript CLI
//!
//! Convert a small binary file into a debug.exe script that rebuilds it.

use anyhow::{Context, Result};
use clap::Parser;
use emx_dbgscript::config::{
    OptionValue, Settings, OPT_INPUT, OPT_LEGACY_TAIL, OPT_OUTPUT, OPT_VERBOSE,
};
use emx_dbgscript::{Encoder, TrailingRun};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "emx-dbgscript")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "Binary file to debug.exe script converter")]
struct Cli {
    /// Input binary file
    #[arg(short = 'i', long, required_unless_present = "config")]
    input: Option<PathBuf>,

    /// Output debug.exe script (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Drop a trailing run of nonzero bytes, as the original dbgtool did
    #[arg(long)]
    legacy_tail: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Command line values, to be laid over the configuration file
    fn overrides(&self) -> Settings {
        let mut settings = Settings::new();
        if let Some(input) = &self.input {
            settings.set(OPT_INPUT, OptionValue::String(input.display().to_string()));
        }
        if let Some(output) = &self.output {
            settings.set(OPT_OUTPUT, OptionValue::String(output.display().to_string()));
        }
        if self.legacy_tail {
            settings.set(OPT_LEGACY_TAIL, OptionValue::Boolean(true));
        }
        if self.verbose > 0 {
            settings.set(OPT_VERBOSE, OptionValue::Integer(i64::from(self.verbose)));
        }
        settings
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let overrides = cli.overrides();

    let settings = match &cli.config {
        Some(path) => Settings::load(path, &overrides)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => overrides,
    };

    init_logging(settings.get_int(OPT_VERBOSE).unwrap_or(0));

    let input = settings
        .get_str(OPT_INPUT)
        .map(PathBuf::from)
        .context("Missing the input file, -h for help")?;
    let output = settings.get_str(OPT_OUTPUT).map(PathBuf::from);
    let policy = if settings.get_bool(OPT_LEGACY_TAIL).unwrap_or(false) {
        TrailingRun::Drop
    } else {
        TrailingRun::Flush
    };

    convert(&input, output.as_deref(), policy)
}

fn init_logging(verbose: i64) {
    let level = match verbose {
        i64::MIN..=0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn convert(input: &Path, output: Option<&Path>, policy: TrailingRun) -> Result<()> {
    let encoder = Encoder::new().with_trailing_run(policy);
    let script = encoder
        .encode_path(input)
        .with_context(|| format!("Failed to convert: {}", input.display()))?;

    if let Some(output_path) = output {
        fs::write(output_path, &script)
            .with_context(|| format!("Failed to write: {}", output_path.display()))?;
        log::info!("Created: {}", output_path.display());
    } else {
        print!("{}", script);
    }

    Ok(())
}
