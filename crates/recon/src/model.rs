use std::borrow::Cow;
use std::fmt;

use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::table::RecordSet;

// ---------------------------------------------------------------------------
// Values + field names
// ---------------------------------------------------------------------------

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Null,
    Text(String),
    Number(OrderedFloat<f64>),
    Bool(bool),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn number(n: f64) -> Self {
        Self::Number(OrderedFloat(n))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text rendering used for name comparison. `None` for nulls.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Number(n) => Some(Cow::Owned(format_number(n.0))),
            Self::Bool(b) => Some(Cow::Borrowed(if *b { "TRUE" } else { "FALSE" })),
        }
    }

    /// Exact key equality: both non-null and equal.
    pub fn key_eq(&self, other: &Value) -> bool {
        !self.is_null() && self == other
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Option<&str>> for Value {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Self::Null, Self::from)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(s) => f.write_str(&s),
            None => Ok(()),
        }
    }
}

// Integers without decimals
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Field identity: an optional origin qualifier plus a leaf name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldName {
    pub qualifier: Option<String>,
    pub leaf: String,
}

impl FieldName {
    pub fn new(leaf: impl Into<String>) -> Self {
        Self { qualifier: None, leaf: leaf.into() }
    }

    pub fn qualified(qualifier: impl Into<String>, leaf: impl Into<String>) -> Self {
        Self { qualifier: Some(qualifier.into()), leaf: leaf.into() }
    }

    pub fn requalify(&self, qualifier: &str) -> Self {
        Self::qualified(qualifier, self.leaf.clone())
    }

    pub fn unqualified(&self) -> Self {
        Self::new(self.leaf.clone())
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{q} / {}", self.leaf),
            None => f.write_str(&self.leaf),
        }
    }
}

// ---------------------------------------------------------------------------
// Match annotation
// ---------------------------------------------------------------------------

/// An annotation slot. `Set(None)` is a computed-but-undefined value and is
/// never recomputed; only `Unset` slots are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotated<T> {
    Unset,
    Set(Option<T>),
}

impl<T> Default for Annotated<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T: Copy> Annotated<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn value(&self) -> Option<T> {
        match self {
            Self::Set(v) => *v,
            Self::Unset => None,
        }
    }

    /// Compute the slot if it is still unset. Returns true if it was filled.
    pub fn fill_with(&mut self, compute: impl FnOnce() -> Option<T>) -> bool {
        if self.is_set() {
            return false;
        }
        *self = Self::Set(compute());
        true
    }
}

/// How (and how well) a joined record matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MatchAnnotation {
    pub id_equal: Annotated<bool>,
    pub key_equal: Annotated<bool>,
    pub fuzzy_ratio: Annotated<u8>,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Values aligned to a record set's schema, plus the row's match annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub values: Vec<Value>,
    pub matches: MatchAnnotation,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values, matches: MatchAnnotation::default() }
    }
}

/// Borrowed view of one row together with its schema.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    pub schema: &'a [FieldName],
    pub record: &'a Record,
}

impl<'a> RowRef<'a> {
    pub fn get(&self, field: &FieldName) -> Option<&'a Value> {
        let idx = self.schema.iter().position(|f| f == field)?;
        self.record.values.get(idx)
    }

    /// Lookup by leaf name regardless of qualifier (first match).
    pub fn get_leaf(&self, leaf: &str) -> Option<&'a Value> {
        let idx = self.schema.iter().position(|f| f.leaf == leaf)?;
        self.record.values.get(idx)
    }
}

// ---------------------------------------------------------------------------
// Input + Output
// ---------------------------------------------------------------------------

/// Pre-loaded source datasets, as produced by the loaders.
#[derive(Debug, Clone)]
pub struct ReconInput {
    pub anchor: RecordSet,
    pub northstar: RecordSet,
    pub salesforce: RecordSet,
}

/// Rows accepted at each cascade stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeStats {
    pub by_id: usize,
    pub by_license_key: usize,
    pub by_name: usize,
    pub without_candidate: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub anchor_accounts: usize,
    pub account_rows: usize,
    pub cascade: CascadeStats,
    pub contact_rows: usize,
    pub contacts_matched: usize,
    pub contacts_unmatched: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub threshold: u8,
    pub candidate_limit: usize,
}

#[derive(Debug, Clone)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub accounts: RecordSet,
    pub contacts: RecordSet,
}
