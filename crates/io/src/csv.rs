// CSV/TSV import

use std::io::Read;
use std::path::Path;

use crossmatch_recon::Value;

use crate::error::IoError;
use crate::loader::RawTable;

/// Read a delimited file into a header row plus text cells. The delimiter is
/// sniffed; empty fields become nulls.
pub fn import(path: &Path) -> Result<RawTable, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

const SAMPLE_RECORDS: usize = 10;

/// Pick the delimiter whose first records agree on a field count of at least
/// two, weighted by that count. Records are parsed with the real reader, so a
/// quoted field spanning lines counts once. Ties go to the comma.
fn sniff_delimiter(content: &str) -> u8 {
    [b',', b';', b'\t', b'|']
        .into_iter()
        .filter_map(|delim| {
            let widths: Vec<usize> = csv::ReaderBuilder::new()
                .delimiter(delim)
                .has_headers(false)
                .flexible(true)
                .from_reader(content.as_bytes())
                .records()
                .take(SAMPLE_RECORDS)
                .map_while(Result::ok)
                .map(|r| r.len())
                .collect();
            let header = *widths.first()?;
            if header < 2 {
                return None;
            }
            let agreeing = widths.iter().filter(|&&w| w == header).count();
            Some((delim, agreeing * header))
        })
        .fold((b',', 0), |best, candidate| if candidate.1 > best.1 { candidate } else { best })
        .0
}

/// Read file and convert to UTF-8 if needed (CRM exports are often Windows-1252).
fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let open_err = |e: std::io::Error| IoError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    let mut file = std::fs::File::open(path).map_err(open_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(open_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(content: &str, delimiter: u8) -> Result<RawTable, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IoError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IoError::Csv(e.to_string()))?;
        let row = (0..headers.len())
            .map(|i| match record.get(i) {
                Some(field) if !field.is_empty() => Value::text(field),
                _ => Value::Null,
            })
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}
