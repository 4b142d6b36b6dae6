//! Tabular record sets: ordered rows over a named-field schema.
//!
//! Every operation returns a new set; nothing here mutates its receiver.

use std::collections::HashSet;

use crate::error::ReconError;
use crate::model::{FieldName, Record, RowRef, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    schema: Vec<FieldName>,
    rows: Vec<Record>,
}

impl RecordSet {
    /// Build a set from raw value rows. Annotations start unset.
    pub fn new(schema: Vec<FieldName>, rows: Vec<Vec<Value>>) -> Result<Self, ReconError> {
        Self::from_records(schema, rows.into_iter().map(Record::new).collect())
    }

    pub fn from_records(schema: Vec<FieldName>, rows: Vec<Record>) -> Result<Self, ReconError> {
        check_unique(&schema)?;
        if let Some(bad) = rows.iter().find(|r| r.values.len() != schema.len()) {
            return Err(ReconError::RowWidth {
                expected: schema.len(),
                found: bad.values.len(),
            });
        }
        Ok(Self { schema, rows })
    }

    pub fn empty(schema: Vec<FieldName>) -> Result<Self, ReconError> {
        Self::from_records(schema, Vec::new())
    }

    pub fn schema(&self) -> &[FieldName] {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_records(self) -> Vec<Record> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(|record| RowRef { schema: &self.schema, record })
    }

    pub fn index_of(&self, field: &FieldName) -> Result<usize, ReconError> {
        self.schema
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| ReconError::FieldNotFound { field: field.to_string() })
    }

    /// All values of one field, in row order.
    pub fn column(&self, field: &FieldName) -> Result<Vec<&Value>, ReconError> {
        let idx = self.index_of(field)?;
        Ok(self.rows.iter().map(|r| &r.values[idx]).collect())
    }

    /// Restrict to `fields`, in the given order.
    pub fn project(&self, fields: &[FieldName]) -> Result<Self, ReconError> {
        let indices = fields
            .iter()
            .map(|f| self.index_of(f))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self
            .rows
            .iter()
            .map(|r| Record {
                values: indices.iter().map(|&i| r.values[i].clone()).collect(),
                matches: r.matches,
            })
            .collect();

        Self::from_records(fields.to_vec(), rows)
    }

    /// Collapse exact duplicates, keeping the first occurrence.
    pub fn deduplicate(&self) -> Self {
        let mut seen: HashSet<&Record> = HashSet::with_capacity(self.rows.len());
        let rows = self
            .rows
            .iter()
            .filter(|r| seen.insert(*r))
            .cloned()
            .collect();
        Self { schema: self.schema.clone(), rows }
    }

    pub fn filter(&self, mut predicate: impl FnMut(RowRef<'_>) -> bool) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|record| predicate(RowRef { schema: &self.schema, record }))
            .cloned()
            .collect();
        Self { schema: self.schema.clone(), rows }
    }

    /// Rows of `self` followed by rows of `other`. Schemas must be identical.
    pub fn concat(&self, other: &RecordSet) -> Result<Self, ReconError> {
        if self.schema != other.schema {
            return Err(ReconError::SchemaMismatch {
                left: describe(&self.schema),
                right: describe(&other.schema),
            });
        }
        let mut rows = Vec::with_capacity(self.rows.len() + other.rows.len());
        rows.extend(self.rows.iter().cloned());
        rows.extend(other.rows.iter().cloned());
        Ok(Self { schema: self.schema.clone(), rows })
    }

    /// Re-qualify every field under `label`. Fails if two fields share a
    /// leaf name under different qualifiers.
    pub fn with_qualifier(&self, label: &str) -> Result<Self, ReconError> {
        let schema: Vec<FieldName> = self.schema.iter().map(|f| f.requalify(label)).collect();
        Self::from_records(schema, self.rows.clone())
    }

    /// Drop all qualifiers. Fails if two fields share a leaf name.
    pub fn unqualified(&self) -> Result<Self, ReconError> {
        let schema: Vec<FieldName> = self.schema.iter().map(FieldName::unqualified).collect();
        Self::from_records(schema, self.rows.clone())
    }

    /// Append fields computed per row.
    pub fn with_fields(
        &self,
        fields: &[FieldName],
        mut compute: impl FnMut(&Record) -> Vec<Value>,
    ) -> Result<Self, ReconError> {
        let mut schema = self.schema.clone();
        schema.extend(fields.iter().cloned());
        let rows = self
            .rows
            .iter()
            .map(|r| {
                let mut values = r.values.clone();
                values.extend(compute(r));
                Record { values, matches: r.matches }
            })
            .collect();
        Self::from_records(schema, rows)
    }

    /// A row of nulls matching this schema.
    pub fn null_values(&self) -> Vec<Value> {
        vec![Value::Null; self.schema.len()]
    }
}

/// Schema of a field-wise concatenation of `left` and `right` rows.
pub(crate) fn joined_schema(left: &RecordSet, right: &RecordSet) -> Vec<FieldName> {
    let mut schema = left.schema.clone();
    schema.extend(right.schema.iter().cloned());
    schema
}

/// Field-wise concatenation of a left record and right values. The left
/// record's annotation is carried over.
pub(crate) fn hstack(left: &Record, right: &[Value]) -> Record {
    let mut values = Vec::with_capacity(left.values.len() + right.len());
    values.extend(left.values.iter().cloned());
    values.extend(right.iter().cloned());
    Record { values, matches: left.matches }
}

fn check_unique(schema: &[FieldName]) -> Result<(), ReconError> {
    let mut seen = HashSet::with_capacity(schema.len());
    for field in schema {
        if !seen.insert(field) {
            return Err(ReconError::DuplicateField { field: field.to_string() });
        }
    }
    Ok(())
}

fn describe(schema: &[FieldName]) -> String {
    schema.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
}
