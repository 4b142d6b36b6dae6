use crate::error::ReconError;
use crate::fuzzy::value_ratio;
use crate::model::{Annotated, FieldName, MatchAnnotation, Record, Value};
use crate::schema::{COMPANY_NAME, FUZZY_RATIO, LICENSE_KEY, MATCHES, SALESFORCE_ID};
use crate::table::RecordSet;

/// The left/right field pairs the annotation compares.
#[derive(Debug, Clone)]
pub struct AnnotationFields {
    pub left_id: FieldName,
    pub right_id: FieldName,
    pub left_key: FieldName,
    pub right_key: FieldName,
    pub left_name: FieldName,
    pub right_name: FieldName,
}

impl AnnotationFields {
    /// Salesforce ID, License Key and Company Name under two qualifiers.
    pub fn between(left: &str, right: &str) -> Self {
        Self {
            left_id: FieldName::qualified(left, SALESFORCE_ID),
            right_id: FieldName::qualified(right, SALESFORCE_ID),
            left_key: FieldName::qualified(left, LICENSE_KEY),
            right_key: FieldName::qualified(right, LICENSE_KEY),
            left_name: FieldName::qualified(left, COMPANY_NAME),
            right_name: FieldName::qualified(right, COMPANY_NAME),
        }
    }
}

/// Fill every unset annotation slot. Slots already set by a join stage,
/// including ones set to an undefined value, are left untouched, so running
/// this twice is a no-op.
pub fn annotate(set: &RecordSet, fields: &AnnotationFields) -> Result<RecordSet, ReconError> {
    let id = (set.index_of(&fields.left_id)?, set.index_of(&fields.right_id)?);
    let key = (set.index_of(&fields.left_key)?, set.index_of(&fields.right_key)?);
    let name = (set.index_of(&fields.left_name)?, set.index_of(&fields.right_name)?);

    let rows = set
        .records()
        .iter()
        .map(|record| {
            let v = &record.values;
            let mut matches = record.matches;
            matches.id_equal.fill_with(|| Some(v[id.0].key_eq(&v[id.1])));
            matches.key_equal.fill_with(|| Some(v[key.0].key_eq(&v[key.1])));
            matches.fuzzy_ratio.fill_with(|| value_ratio(&v[name.0], &v[name.1]));
            Record { values: record.values.clone(), matches }
        })
        .collect();

    RecordSet::from_records(set.schema().to_vec(), rows)
}

/// The `Matches` report fields, in materialisation order.
pub fn match_fields() -> [FieldName; 3] {
    [
        FieldName::qualified(MATCHES, SALESFORCE_ID),
        FieldName::qualified(MATCHES, LICENSE_KEY),
        FieldName::qualified(MATCHES, FUZZY_RATIO),
    ]
}

/// Append the annotation as `Matches` columns. Unset or undefined slots
/// become nulls.
pub fn materialize(set: &RecordSet) -> Result<RecordSet, ReconError> {
    set.with_fields(&match_fields(), |record| annotation_values(&record.matches))
}

fn annotation_values(m: &MatchAnnotation) -> Vec<Value> {
    vec![
        flag(m.id_equal),
        flag(m.key_equal),
        m.fuzzy_ratio.value().map_or(Value::Null, |r| Value::number(f64::from(r))),
    ]
}

fn flag(slot: Annotated<bool>) -> Value {
    slot.value().map_or(Value::Null, Value::Bool)
}
