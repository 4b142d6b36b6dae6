//! `crossmatch` run: load the three extracts, reconcile, write the report.

use std::path::Path;

use crossmatch_io::{load_sources, write_report, IoError};
use crossmatch_recon::model::{ReconMeta, ReconSummary};
use crossmatch_recon::{MatchConfig, ReconError};
use serde::Serialize;

use crate::exit_codes::{io_exit_code, recon_exit_code, EXIT_CONFIG, EXIT_RECON};
use crate::{Cli, CliError};

pub const ACCOUNTS_SHEET: &str = "Accounts";
pub const CONTACTS_SHEET: &str = "Contacts";

/// JSON document printed with `--json`.
#[derive(Serialize)]
struct RunOutput<'a> {
    meta: &'a ReconMeta,
    summary: &'a ReconSummary,
    result_file: String,
}

fn io_err(e: IoError) -> CliError {
    let hint = match &e {
        IoError::MissingColumn { .. } => {
            Some("map the header under [sources.*] in a --config file")
        }
        IoError::Open { .. } => Some("check the path and that the file is not open elsewhere"),
        _ => None,
    };
    let err = CliError::new(io_exit_code(&e), e.to_string());
    match hint {
        Some(h) => err.with_hint(h),
        None => err,
    }
}

fn recon_err(e: ReconError) -> CliError {
    CliError::new(recon_exit_code(&e), e.to_string())
}

/// Config file (if any), then command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<MatchConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => MatchConfig::load(path).map_err(|e| {
            CliError::new(EXIT_CONFIG, format!("{}: {e}", path.display()))
        })?,
        None => MatchConfig::default(),
    };
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    config.validate().map_err(recon_err)?;
    Ok(config)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

pub fn cmd_reconcile(cli: &Cli) -> Result<(), CliError> {
    for input in [&cli.anchor_file, &cli.northstar_file, &cli.salesforce_file] {
        if same_file(input, &cli.result_file) {
            return Err(CliError::args(format!(
                "result file {} would overwrite an input",
                cli.result_file.display()
            )));
        }
    }

    let config = resolve_config(cli)?;

    let input = load_sources(
        &cli.anchor_file,
        &cli.northstar_file,
        &cli.salesforce_file,
        &config.sources,
    )
    .map_err(io_err)?;

    let result = crossmatch_recon::run(&config, &input).map_err(recon_err)?;

    write_report(
        &cli.result_file,
        &[(ACCOUNTS_SHEET, &result.accounts), (CONTACTS_SHEET, &result.contacts)],
    )
    .map_err(io_err)?;

    if cli.json {
        let output = RunOutput {
            meta: &result.meta,
            summary: &result.summary,
            result_file: cli.result_file.display().to_string(),
        };
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::new(EXIT_RECON, format!("JSON serialization error: {e}")))?;
        println!("{json}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "accounts: {} anchor account(s), {} row(s): {} by id, {} by license key, {} by name, {} without candidate",
        s.anchor_accounts,
        s.account_rows,
        s.cascade.by_id,
        s.cascade.by_license_key,
        s.cascade.by_name,
        s.cascade.without_candidate,
    );
    eprintln!(
        "contacts: {} row(s): {} matched, {} unmatched",
        s.contact_rows, s.contacts_matched, s.contacts_unmatched,
    );

    Ok(())
}
