// Excel import (xlsx, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use crossmatch_recon::Value;

use crate::error::IoError;
use crate::loader::RawTable;

/// Read the first worksheet: row 1 is the header, every following non-blank
/// row is data.
pub fn import(path: &Path) -> Result<RawTable, IoError> {
    let display = path.display().to_string();

    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| IoError::Open {
        path: display.clone(),
        message: e.to_string(),
    })?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(IoError::EmptyWorkbook { path: display });
    };

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| IoError::Open {
        path: display.clone(),
        message: format!("failed to read sheet '{sheet_name}': {e}"),
    })?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(IoError::EmptyWorkbook { path: display });
    };

    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| match cell_value(cell) {
            Value::Null => String::new(),
            v => v.to_string(),
        })
        .collect();

    let rows = rows
        .map(|row| {
            (0..headers.len())
                .map(|i| row.get(i).map_or(Value::Null, cell_value))
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.iter().all(Value::is_null))
        .collect();

    log::debug!("{display}: sheet '{sheet_name}', {} column(s)", headers.len());
    Ok(RawTable { headers, rows })
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::text(s.as_str()),
        Data::Float(n) => Value::number(*n),
        Data::Int(n) => Value::number(*n as f64),
        Data::Bool(b) => Value::Bool(*b),
        // Error cells carry no usable key or name
        Data::Error(_) => Value::Null,
        // Serial date number, as stored in the sheet
        Data::DateTime(dt) => Value::number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::text(s.as_str()),
    }
}
