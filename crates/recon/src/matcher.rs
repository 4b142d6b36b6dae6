use std::collections::HashMap;

use crate::error::ReconError;
use crate::model::{FieldName, Value};
use crate::table::{hstack, joined_schema, RecordSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
}

/// A joined set split on whether the right side was found.
#[derive(Debug, Clone)]
pub struct JoinOutput {
    pub matched: RecordSet,
    pub unmatched: RecordSet,
}

/// Join two sets by exact equality of one key field on each side.
///
/// Output rows follow left-row order, and right-row order within one left row.
/// Null keys never match. Left-outer keeps unmatched left rows with every
/// right field null. The result is de-duplicated.
pub fn join_exact_key(
    left: &RecordSet,
    right: &RecordSet,
    left_key: &FieldName,
    right_key: &FieldName,
    kind: JoinKind,
) -> Result<RecordSet, ReconError> {
    let li = left.index_of(left_key)?;
    let ri = right.index_of(right_key)?;

    let mut index: HashMap<&Value, Vec<usize>> = HashMap::new();
    for (pos, record) in right.records().iter().enumerate() {
        let key = &record.values[ri];
        if !key.is_null() {
            index.entry(key).or_default().push(pos);
        }
    }

    let nulls = right.null_values();
    let mut rows = Vec::with_capacity(left.len());

    for record in left.records() {
        let key = &record.values[li];
        let hits = if key.is_null() { None } else { index.get(key) };

        match hits {
            Some(positions) => {
                for &pos in positions {
                    rows.push(hstack(record, &right.records()[pos].values));
                }
            }
            None if kind == JoinKind::LeftOuter => rows.push(hstack(record, &nulls)),
            None => {}
        }
    }

    let joined = RecordSet::from_records(joined_schema(left, right), rows)?;
    Ok(joined.deduplicate())
}

/// Split `set` on whether `field` is non-null, preserving row order.
pub fn partition_on(set: &RecordSet, field: &FieldName) -> Result<JoinOutput, ReconError> {
    let idx = set.index_of(field)?;
    let matched = set.filter(|row| !row.record.values[idx].is_null());
    let unmatched = set.filter(|row| row.record.values[idx].is_null());
    Ok(JoinOutput { matched, unmatched })
}

/// Left-outer join followed by the matched/unmatched split on the right key.
pub fn match_exact_key(
    left: &RecordSet,
    right: &RecordSet,
    left_key: &FieldName,
    right_key: &FieldName,
) -> Result<JoinOutput, ReconError> {
    let joined = join_exact_key(left, right, left_key, right_key, JoinKind::LeftOuter)?;
    partition_on(&joined, right_key)
}
