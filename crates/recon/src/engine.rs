use log::{debug, info};

use crate::annotate::{annotate, materialize, AnnotationFields};
use crate::config::MatchConfig;
use crate::error::ReconError;
use crate::fuzzy::FuzzyJoin;
use crate::matcher::{join_exact_key, match_exact_key, JoinKind};
use crate::model::{Annotated, CascadeStats, FieldName, ReconInput, ReconMeta, ReconResult};
use crate::schema::{
    ReportSchema, ANCHOR, COMPANY_NAME, CONTACT_EMAIL, LICENSE_KEY, SALESFORCE, SALESFORCE_ID,
};
use crate::sources::merge_usage;
use crate::summary::compute_summary;
use crate::table::RecordSet;

/// Run both reconciliations over the loaded sources.
pub fn run(config: &MatchConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    config.validate()?;

    let anchor_ns = merge_usage(&input.anchor, &input.northstar, &config.excluded_user_role)?;
    let accounts = match_accounts(&anchor_ns, &input.salesforce, config)?;
    let contacts = match_contacts(&anchor_ns, &input.salesforce)?;
    let summary = compute_summary(&accounts, &contacts)?;

    Ok(ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            threshold: config.threshold,
            candidate_limit: config.candidate_limit,
        },
        summary,
        accounts: accounts.report,
        contacts,
    })
}

/// Account report plus what each cascade stage contributed.
#[derive(Debug, Clone)]
pub struct AccountMatches {
    pub report: RecordSet,
    pub anchor_accounts: usize,
    pub stats: CascadeStats,
}

/// Account matching cascade: Salesforce ID, then license key, then company
/// name similarity. Each stage only sees what the previous one left
/// unmatched; a row accepted by an earlier stage is never revisited.
pub fn match_accounts(
    anchor_ns: &RecordSet,
    salesforce: &RecordSet,
    config: &MatchConfig,
) -> Result<AccountMatches, ReconError> {
    let schema = ReportSchema::accounts();
    let left = prepare(anchor_ns, &schema, ANCHOR)?;
    let right = prepare(salesforce, &schema, SALESFORCE)?;
    let anchor_fields = left.schema().to_vec();

    info!("Joining Anchor/Salesforce accounts by Salesforce ID...");
    let by_id = match_exact_key(&left, &right, &anchor(SALESFORCE_ID), &sf(SALESFORCE_ID))?;
    let remainder = by_id.unmatched.project(&anchor_fields)?;

    info!("Joining Anchor/Salesforce accounts by license key...");
    let by_key = match_exact_key(&remainder, &right, &anchor(LICENSE_KEY), &sf(LICENSE_KEY))?;
    let remainder = by_key.unmatched.project(&anchor_fields)?;

    info!("Joining Anchor/Salesforce accounts by name fuzzy match...");
    let by_name = FuzzyJoin::new(config.threshold)
        .with_candidate_limit(config.candidate_limit)
        .join(&remainder, &right, &anchor(COMPANY_NAME), &sf(COMPANY_NAME))?;

    let without_candidate = by_name
        .records()
        .iter()
        .filter(|r| r.matches.fuzzy_ratio == Annotated::Set(None))
        .count();
    let stats = CascadeStats {
        by_id: by_id.matched.len(),
        by_license_key: by_key.matched.len(),
        by_name: by_name.len() - without_candidate,
        without_candidate,
    };
    debug!("account cascade: {stats:?}");

    info!("Finalizing result Anchor/Salesforce accounts...");
    let union = by_id.matched.concat(&by_key.matched)?.concat(&by_name)?;
    let annotated = annotate(&union, &AnnotationFields::between(ANCHOR, SALESFORCE))?;
    let report = schema.arrange(&materialize(&annotated)?)?;

    Ok(AccountMatches {
        report,
        anchor_accounts: left.len(),
        stats,
    })
}

/// Contact matching: one left-outer join on the exact e-mail address.
pub fn match_contacts(anchor_ns: &RecordSet, salesforce: &RecordSet) -> Result<RecordSet, ReconError> {
    let schema = ReportSchema::contacts();
    let left = prepare(anchor_ns, &schema, ANCHOR)?;
    let right = prepare(salesforce, &schema, SALESFORCE)?;

    info!("Joining Anchor/Salesforce contacts by e-mail...");
    let joined = join_exact_key(
        &left,
        &right,
        &anchor(CONTACT_EMAIL),
        &sf(CONTACT_EMAIL),
        JoinKind::LeftOuter,
    )?;
    schema.arrange(&joined)
}

/// Restrict a source to the report fields of one origin and qualify it.
fn prepare(set: &RecordSet, schema: &ReportSchema, origin: &str) -> Result<RecordSet, ReconError> {
    set.project(&schema.leaves(origin))?.deduplicate().with_qualifier(origin)
}

fn anchor(leaf: &str) -> FieldName {
    FieldName::qualified(ANCHOR, leaf)
}

fn sf(leaf: &str) -> FieldName {
    FieldName::qualified(SALESFORCE, leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use crate::schema::{
        CONTACT_FIRST_NAME, CONTACT_LAST_NAME, CONTACT_NAME, FUZZY_RATIO, MATCHES, PRODUCTS, STATUS,
        USER_ROLE,
    };

    const ANCHOR_NS_FIELDS: [&str; 7] = [
        SALESFORCE_ID,
        COMPANY_NAME,
        CONTACT_NAME,
        CONTACT_EMAIL,
        LICENSE_KEY,
        STATUS,
        USER_ROLE,
    ];

    const SF_FIELDS: [&str; 7] = [
        SALESFORCE_ID,
        COMPANY_NAME,
        PRODUCTS,
        CONTACT_FIRST_NAME,
        CONTACT_LAST_NAME,
        CONTACT_EMAIL,
        LICENSE_KEY,
    ];

    fn set(fields: &[&str], rows: &[&[Option<&str>]]) -> RecordSet {
        RecordSet::new(
            fields.iter().map(|f| FieldName::new(*f)).collect(),
            rows.iter().map(|r| r.iter().map(|v| Value::from(*v)).collect()).collect(),
        )
        .unwrap()
    }

    /// (id, company, license key) with fixed contact/status/role columns.
    fn anchor_rows(rows: &[(Option<&str>, Option<&str>, Option<&str>)]) -> RecordSet {
        let rows: Vec<Vec<Option<&str>>> = rows
            .iter()
            .map(|(id, name, key)| {
                vec![*id, *name, Some("Jo"), Some("jo@example.com"), *key, Some("Active"), Some("Admin")]
            })
            .collect();
        let refs: Vec<&[Option<&str>]> = rows.iter().map(|r| r.as_slice()).collect();
        set(&ANCHOR_NS_FIELDS, &refs)
    }

    /// (id, company, license key) with fixed contact/product columns.
    fn sf_rows(rows: &[(Option<&str>, Option<&str>, Option<&str>)]) -> RecordSet {
        let rows: Vec<Vec<Option<&str>>> = rows
            .iter()
            .map(|(id, name, key)| vec![*id, *name, Some("Anchor"), Some("Jo"), Some("Doe"), None, *key])
            .collect();
        let refs: Vec<&[Option<&str>]> = rows.iter().map(|r| r.as_slice()).collect();
        set(&SF_FIELDS, &refs)
    }

    fn cell<'a>(report: &'a RecordSet, row: usize, qualifier: &str, leaf: &str) -> &'a Value {
        let idx = report.index_of(&FieldName::qualified(qualifier, leaf)).unwrap();
        &report.records()[row].values[idx]
    }

    #[test]
    fn id_match_still_gets_full_annotation() {
        let left = anchor_rows(&[(Some("A1"), Some("Acme Corp"), Some("L1"))]);
        let right = sf_rows(&[
            (Some("A1"), Some("Acme Co"), Some("L9")),
            (None, Some("Ackme"), Some("L1")),
        ]);
        let out = match_accounts(&left, &right, &MatchConfig::default()).unwrap();
        assert_eq!(out.stats.by_id, 1);
        assert_eq!(out.report.len(), 1);

        let r = &out.report;
        assert_eq!(cell(r, 0, SALESFORCE, COMPANY_NAME), &Value::from("Acme Co"));
        assert_eq!(cell(r, 0, MATCHES, SALESFORCE_ID), &Value::Bool(true));
        assert_eq!(cell(r, 0, MATCHES, LICENSE_KEY), &Value::Bool(false));
        assert_eq!(cell(r, 0, MATCHES, FUZZY_RATIO), &Value::number(88.0));
    }

    #[test]
    fn cascade_falls_through_in_order() {
        let left = anchor_rows(&[
            (Some("A1"), Some("Acme"), Some("L1")),
            (Some("A9"), Some("Globex"), Some("L2")),
            (None, Some("Initech Inc"), None),
            (None, Some("Nobody Alike"), Some("L404")),
        ]);
        let right = sf_rows(&[
            (Some("A1"), Some("Acme"), Some("L1")),
            (Some("B2"), Some("Globex Corporation"), Some("L2")),
            (Some("C3"), Some("Initech Inc."), None),
        ]);
        let out = match_accounts(&left, &right, &MatchConfig::default()).unwrap();
        assert_eq!(
            out.stats,
            CascadeStats { by_id: 1, by_license_key: 1, by_name: 1, without_candidate: 1 }
        );
        assert_eq!(out.report.len(), 4);

        let r = &out.report;
        // Stage order, then left order within a stage
        assert_eq!(cell(r, 0, ANCHOR, COMPANY_NAME), &Value::from("Acme"));
        assert_eq!(cell(r, 1, ANCHOR, COMPANY_NAME), &Value::from("Globex"));
        assert_eq!(cell(r, 1, MATCHES, SALESFORCE_ID), &Value::Bool(false));
        assert_eq!(cell(r, 1, MATCHES, LICENSE_KEY), &Value::Bool(true));
        assert_eq!(cell(r, 2, SALESFORCE, SALESFORCE_ID), &Value::from("C3"));
        assert_eq!(cell(r, 2, MATCHES, FUZZY_RATIO), &Value::number(100.0));
        assert!(cell(r, 3, SALESFORCE, SALESFORCE_ID).is_null());
        assert!(cell(r, 3, MATCHES, FUZZY_RATIO).is_null());
    }

    #[test]
    fn report_columns_follow_display_order() {
        let left = anchor_rows(&[(Some("A1"), Some("Acme"), Some("L1"))]);
        let right = sf_rows(&[(Some("A1"), Some("Acme"), Some("L1"))]);
        let out = match_accounts(&left, &right, &MatchConfig::default()).unwrap();
        assert_eq!(out.report.schema(), ReportSchema::accounts().ordered_fields().as_slice());
    }

    #[test]
    fn null_name_remainder_yields_null_row() {
        let left = anchor_rows(&[(None, None, None)]);
        let right = sf_rows(&[(Some("A1"), Some("Acme"), Some("L1"))]);
        let config = MatchConfig { threshold: 0, ..MatchConfig::default() };
        let out = match_accounts(&left, &right, &config).unwrap();
        assert_eq!(out.report.len(), 1);
        assert!(cell(&out.report, 0, SALESFORCE, COMPANY_NAME).is_null());
        assert_eq!(out.stats.without_candidate, 1);
    }

    #[test]
    fn contacts_keep_unmatched_emails() {
        let mut left = anchor_rows(&[(Some("A1"), Some("Acme"), Some("L1"))]).into_records();
        let mut second = left[0].clone();
        second.values[3] = Value::from("nobody@example.com");
        left.push(second);
        let left = RecordSet::from_records(
            ANCHOR_NS_FIELDS.iter().map(|f| FieldName::new(*f)).collect(),
            left,
        )
        .unwrap();

        let right = set(
            &SF_FIELDS,
            &[
                &[Some("X"), Some("Completely Different"), None, Some("Jo"), Some("Doe"), Some("jo@example.com"), None],
                &[Some("Y"), Some("Acme"), None, Some("Al"), Some("Roe"), Some("JO@example.com"), None],
            ],
        );

        let out = match_contacts(&left, &right).unwrap();
        assert_eq!(out.schema(), ReportSchema::contacts().ordered_fields().as_slice());
        assert_eq!(out.len(), 2);
        // Exact, case-sensitive e-mail; no fuzzy fallback on the company name
        assert_eq!(cell(&out, 0, SALESFORCE, SALESFORCE_ID), &Value::from("X"));
        assert!(cell(&out, 1, SALESFORCE, SALESFORCE_ID).is_null());
        assert!(cell(&out, 1, SALESFORCE, COMPANY_NAME).is_null());
    }

    #[test]
    fn missing_report_field_is_fatal() {
        let left = set(&[SALESFORCE_ID], &[&[Some("A1")]]);
        let right = sf_rows(&[]);
        let err = match_accounts(&left, &right, &MatchConfig::default()).unwrap_err();
        assert!(matches!(err, ReconError::FieldNotFound { .. }));
    }
}
