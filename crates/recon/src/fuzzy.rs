//! Fuzzy company-name join.
//!
//! Every remaining left row is scored against every right row's name, so the
//! stage costs O(left x right) scorer calls. The scan runs in parallel across
//! left rows; `candidate_limit` caps how many rows one left row can expand into.

use std::borrow::Cow;

use rayon::prelude::*;

use crate::error::ReconError;
use crate::model::{Annotated, FieldName, Value};
use crate::table::{hstack, joined_schema, RecordSet};

pub const DEFAULT_THRESHOLD: u8 = 75;
pub const DEFAULT_CANDIDATE_LIMIT: usize = 10;

/// Lowercase, turn punctuation into spaces, collapse whitespace.
pub fn normalize(s: &str) -> String {
    let spaced: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Similarity ratio in 0..=100: `2 * lcs / (len_a + len_b)` over the
/// normalized names, i.e. one minus the normalized insert/delete distance.
/// Symmetric; two empty names score 100.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let score = 200.0 * lcs_len(&a, &b) as f64 / total as f64;
    score.round().clamp(0.0, 100.0) as u8
}

/// Longest common subsequence length, two-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &x in a {
        for (j, &y) in b.iter().enumerate() {
            cur[j + 1] = if x == y { prev[j] + 1 } else { prev[j + 1].max(cur[j]) };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// `ratio` over cell values; `None` when either side is null.
pub fn value_ratio(a: &Value, b: &Value) -> Option<u8> {
    Some(ratio(&a.as_text()?, &b.as_text()?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Position of the candidate in the choice list.
    pub index: usize,
    pub score: u8,
}

/// Best `limit` choices for `query`, by descending score; ties keep choice
/// order. Null choices are never returned.
pub fn extract_top<S>(query: &str, choices: &[Option<Cow<'_, str>>], limit: usize, scorer: &S) -> Vec<Candidate>
where
    S: Fn(&str, &str) -> u8,
{
    let mut scored: Vec<Candidate> = choices
        .iter()
        .enumerate()
        .filter_map(|(index, choice)| {
            let choice = choice.as_deref()?;
            Some(Candidate { index, score: scorer(query, choice) })
        })
        .collect();
    // Stable sort: equal scores stay in choice order
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}

/// Fuzzy name join stage.
#[derive(Debug, Clone)]
pub struct FuzzyJoin<S = fn(&str, &str) -> u8> {
    pub threshold: u8,
    pub candidate_limit: usize,
    scorer: S,
}

impl FuzzyJoin {
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            scorer: ratio,
        }
    }
}

impl Default for FuzzyJoin {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl<S> FuzzyJoin<S>
where
    S: Fn(&str, &str) -> u8 + Sync,
{
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }

    /// Replace the similarity function. It must be pure.
    pub fn with_scorer<T>(self, scorer: T) -> FuzzyJoin<T>
    where
        T: Fn(&str, &str) -> u8 + Sync,
    {
        FuzzyJoin {
            threshold: self.threshold,
            candidate_limit: self.candidate_limit,
            scorer,
        }
    }

    /// Candidates for one name that clear the threshold.
    pub fn candidates(&self, name: &Value, choices: &[Option<Cow<'_, str>>]) -> Vec<Candidate> {
        let Some(name) = name.as_text() else {
            return Vec::new();
        };
        extract_top(&name, choices, self.candidate_limit, &self.scorer)
            .into_iter()
            .filter(|c| c.score >= self.threshold)
            .collect()
    }

    /// Join every left row to the right rows whose names clear the threshold.
    ///
    /// One output row per surviving candidate, each carrying its own score as
    /// the fuzzy ratio. A left row with no survivor yields a single row with
    /// every right field null and an undefined ratio.
    pub fn join(
        &self,
        left: &RecordSet,
        right: &RecordSet,
        left_name: &FieldName,
        right_name: &FieldName,
    ) -> Result<RecordSet, ReconError> {
        let li = left.index_of(left_name)?;
        let ri = right.index_of(right_name)?;

        let choices: Vec<Option<Cow<'_, str>>> =
            right.records().iter().map(|r| r.values[ri].as_text()).collect();

        // Indexed parallel collect keeps left-row order
        let per_row: Vec<Vec<Candidate>> = left
            .records()
            .par_iter()
            .map(|record| self.candidates(&record.values[li], &choices))
            .collect();

        let nulls = right.null_values();
        let rows = left
            .records()
            .iter()
            .zip(per_row)
            .flat_map(|(record, candidates)| {
                if candidates.is_empty() {
                    let mut row = hstack(record, &nulls);
                    row.matches.fuzzy_ratio = Annotated::Set(None);
                    return vec![row];
                }
                candidates
                    .into_iter()
                    .map(|c| {
                        let mut row = hstack(record, &right.records()[c.index].values);
                        row.matches.fuzzy_ratio = Annotated::Set(Some(c.score));
                        row
                    })
                    .collect()
            })
            .collect();

        let joined = RecordSet::from_records(joined_schema(left, right), rows)?;
        Ok(joined.deduplicate())
    }
}
