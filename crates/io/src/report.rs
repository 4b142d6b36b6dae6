//! Report workbook writer.
//!
//! Each record set becomes one worksheet with a two-row header: row 1 holds
//! the field qualifiers (adjacent equal qualifiers merged and centred), row 2
//! the leaf names. Headers are frozen and row 2 carries the autofilter.

use std::path::Path;

use crossmatch_recon::{FieldName, RecordSet, Value};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::error::IoError;

const HEADER_ROWS: u32 = 2;
const MIN_WIDTH: f64 = 10.0;
const MAX_WIDTH: f64 = 50.0;
// Room for the autofilter button
const FILTER_ICON_WIDTH: f64 = 2.5;

/// Write `sheets` (name, record set) to a new workbook at `path`, replacing
/// any existing file. Missing parent directories are created.
pub fn write_report(path: &Path, sheets: &[(&str, &RecordSet)]) -> Result<(), IoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            IoError::Write(format!("cannot create directory {}: {e}", parent.display()))
        })?;
    }

    let mut workbook = Workbook::new();
    for (name, set) in sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(*name)
            .map_err(|e| IoError::Write(format!("failed to create sheet '{name}': {e}")))?;
        write_sheet(worksheet, set)?;
        log::debug!("sheet '{name}': {} row(s)", set.len());
    }

    workbook
        .save(path)
        .map_err(|e| IoError::Write(format!("failed to save {}: {e}", path.display())))?;
    log::info!("Report saved to {}", path.display());
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, set: &RecordSet) -> Result<(), IoError> {
    let schema = set.schema();
    if schema.is_empty() {
        return Ok(());
    }

    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let value_format = Format::new().set_border(FormatBorder::Thin);

    let mut widths = vec![0.0_f64; schema.len()];

    // Row 1: qualifier groups
    for (first, last, label) in qualifier_groups(schema) {
        if label.is_empty() {
            worksheet.write_blank(0, col(first), &header_format).map_err(write_err)?;
        } else if first == last {
            worksheet
                .write_string_with_format(0, col(first), label, &header_format)
                .map_err(write_err)?;
        } else {
            worksheet
                .merge_range(0, col(first), 0, col(last), label, &header_format)
                .map_err(write_err)?;
        }
        let span = (last - first + 1) as f64;
        for w in &mut widths[first..=last] {
            *w = w.max(label.chars().count() as f64 / span);
        }
    }

    // Row 2: leaf names
    for (i, field) in schema.iter().enumerate() {
        worksheet
            .write_string_with_format(1, col(i), &field.leaf, &header_format)
            .map_err(write_err)?;
        widths[i] = widths[i].max(field.leaf.chars().count() as f64);
    }

    for (r, record) in set.records().iter().enumerate() {
        let row = HEADER_ROWS + r as u32;
        for (i, value) in record.values.iter().enumerate() {
            let c = col(i);
            match value {
                Value::Null => worksheet.write_blank(row, c, &value_format),
                Value::Text(s) => worksheet.write_string_with_format(row, c, s, &value_format),
                Value::Number(n) => worksheet.write_number_with_format(row, c, n.0, &value_format),
                Value::Bool(b) => worksheet.write_boolean_with_format(row, c, *b, &value_format),
            }
            .map_err(write_err)?;
            widths[i] = widths[i].max(value.to_string().chars().count() as f64);
        }
    }

    for (i, chars) in widths.iter().enumerate() {
        worksheet
            .set_column_width(col(i), column_width(*chars))
            .map_err(write_err)?;
    }

    worksheet.set_freeze_panes(HEADER_ROWS, 0).map_err(write_err)?;
    worksheet
        .autofilter(HEADER_ROWS - 1, 0, HEADER_ROWS - 1, col(schema.len() - 1))
        .map_err(write_err)?;

    Ok(())
}

/// Runs of adjacent fields sharing a qualifier: (first index, last index, label).
/// Unqualified fields form single-column runs with an empty label.
fn qualifier_groups(schema: &[FieldName]) -> Vec<(usize, usize, &str)> {
    let mut groups: Vec<(usize, usize, &str)> = Vec::new();
    for (i, field) in schema.iter().enumerate() {
        let label = field.qualifier.as_deref();
        match groups.last_mut() {
            Some((_, last, prev)) if label.is_some() && Some(*prev) == label => *last = i,
            _ => groups.push((i, i, label.unwrap_or(""))),
        }
    }
    groups
}

fn column_width(chars: f64) -> f64 {
    (chars * 1.1 + FILTER_ICON_WIDTH).clamp(MIN_WIDTH, MAX_WIDTH)
}

fn col(i: usize) -> u16 {
    i as u16
}

fn write_err(e: rust_xlsxwriter::XlsxError) -> IoError {
    IoError::Write(e.to_string())
}
