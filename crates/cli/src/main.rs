// crossmatch CLI - match Anchor accounts and contacts against Salesforce

mod exit_codes;
mod reconcile;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser, Debug)]
#[command(name = "crossmatch")]
#[command(about = "Match Anchor/Northstar accounts and contacts against a Salesforce extract")]
#[command(version)]
#[command(after_help = "\
Examples:
  crossmatch -a anchor.xlsx -n northstar.xlsx -s salesforce.xlsx -r out/result.xlsx
  crossmatch -a anchor.csv -n northstar.csv -s sf.csv -r result.xlsx -t 85 --json
  crossmatch -a anchor.xlsx -n ns.xlsx -s sf.xlsx -r result.xlsx -c columns.toml")]
pub struct Cli {
    /// Anchor accounts extract (xlsx, xls, xlsb, ods or csv)
    #[arg(short = 'a', long = "anchor-file")]
    pub anchor_file: PathBuf,

    /// Northstar users extract
    #[arg(short = 'n', long = "northstar-file")]
    pub northstar_file: PathBuf,

    /// Salesforce accounts/contacts extract
    #[arg(short = 's', long = "salesforce-file")]
    pub salesforce_file: PathBuf,

    /// Output workbook (parent directories are created)
    #[arg(short = 'r', long = "result-file")]
    pub result_file: PathBuf,

    /// Minimum company-name similarity (0-100) for a fuzzy match [default: 75]
    #[arg(
        short = 't',
        long = "account-name-match-ratio-threshold",
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub threshold: Option<u8>,

    /// TOML file with matching options and source column names
    #[arg(short = 'c', long = "config", env = "CROSSMATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the run summary as JSON to stdout
    #[arg(long)]
    pub json: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match reconcile::cmd_reconcile(&cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
