//! Source loading: file → header/rows → record set shaped by a source schema.

use std::path::Path;

use crossmatch_recon::config::SourcesConfig;
use crossmatch_recon::model::ReconInput;
use crossmatch_recon::schema::SourceSchema;
use crossmatch_recon::{RecordSet, Value};

use crate::error::IoError;

/// Header row plus raw data rows, each padded to the header width.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    /// Keep the schema's source columns, renamed to the schema field names and
    /// in declaration order. Duplicate rows collapse to their first occurrence.
    pub fn select(&self, schema: &SourceSchema, file: &str) -> Result<RecordSet, IoError> {
        let mut columns = Vec::new();
        for spec in &schema.fields {
            let header = spec.source.as_str();
            let idx = self
                .headers
                .iter()
                .position(|h| h.trim() == header)
                .ok_or_else(|| IoError::MissingColumn {
                    file: file.to_string(),
                    column: header.to_string(),
                })?;
            columns.push(idx);
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(RecordSet::new(schema.field_names(), rows)?.deduplicate())
    }
}

/// Load one source extract. `.csv`/`.tsv`/`.txt` go through the CSV reader,
/// everything else through the spreadsheet reader.
pub fn load_source(path: &Path, schema: &SourceSchema) -> Result<RecordSet, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let table = match ext.as_str() {
        "csv" | "tsv" | "txt" => crate::csv::import(path)?,
        _ => crate::xlsx::import(path)?,
    };

    let file = path.display().to_string();
    let set = table.select(schema, &file)?;
    log::debug!(
        "{} source: {} distinct row(s) from {} raw row(s) in {file}",
        schema.origin,
        set.len(),
        table.rows.len()
    );
    Ok(set)
}

/// Load the three extracts with the configured column aliases.
pub fn load_sources(
    anchor: &Path,
    northstar: &Path,
    salesforce: &Path,
    sources: &SourcesConfig,
) -> Result<ReconInput, IoError> {
    let [anchor_schema, northstar_schema, salesforce_schema] = SourceSchema::all(sources);

    log::info!("Reading Anchor data from {}...", anchor.display());
    let anchor = load_source(anchor, &anchor_schema)?;
    log::info!("Reading Northstar data from {}...", northstar.display());
    let northstar = load_source(northstar, &northstar_schema)?;
    log::info!("Reading Salesforce data from {}...", salesforce.display());
    let salesforce = load_source(salesforce, &salesforce_schema)?;

    Ok(ReconInput { anchor, northstar, salesforce })
}
