use crossmatch_recon::config::SourcesConfig;
use crossmatch_recon::model::{ReconInput, Value};
use crossmatch_recon::schema::{
    SourceSchema, ANCHOR, COMPANY_NAME, CONTACT_EMAIL, FUZZY_RATIO, MATCHES, SALESFORCE, SALESFORCE_ID,
};
use crossmatch_recon::{run, FieldName, MatchConfig, RecordSet};

fn source(schema: &SourceSchema, rows: &[&[Option<&str>]]) -> RecordSet {
    RecordSet::new(
        schema.field_names(),
        rows.iter().map(|r| r.iter().map(|v| Value::from(*v)).collect()).collect(),
    )
    .unwrap()
}

/// Anchor: Salesforce ID, Company Name, Contact Name, Contact Email, License Key, Status
/// Northstar: License Key, User Role
/// Salesforce: Salesforce ID, Company Name, Billing Country, Brand ID, Products,
///             Contact First Name, Contact Last Name, Contact Email, License Key
fn sample_input() -> ReconInput {
    let [anchor, northstar, salesforce] = SourceSchema::all(&SourcesConfig::default());

    let anchor = source(
        &anchor,
        &[
            &[Some("001A"), Some("Acme Corp"), Some("Ann"), Some("ann@acme.test"), Some("LK-1"), Some("Active")],
            &[None, Some("Globex"), Some("Gus"), Some("gus@globex.test"), Some("LK-2"), Some("Active")],
            &[None, Some("Initech Inc"), Some("Ian"), Some("ian@initech.test"), Some("LK-3"), Some("Trial")],
            &[None, Some("Vandelay Industries"), Some("Art"), Some("art@vandelay.test"), Some("LK-4"), Some("Expired")],
            // No privileged Northstar user: dropped before matching
            &[Some("001Z"), Some("Hooli"), Some("Hal"), Some("hal@hooli.test"), Some("LK-5"), Some("Active")],
            // Exact duplicate of the first row
            &[Some("001A"), Some("Acme Corp"), Some("Ann"), Some("ann@acme.test"), Some("LK-1"), Some("Active")],
        ],
    );

    let northstar = source(
        &northstar,
        &[
            &[Some("LK-1"), Some("Administrator")],
            &[Some("LK-2"), Some("Owner")],
            &[Some("LK-3"), Some("Administrator")],
            &[Some("LK-4"), Some("Administrator")],
            &[Some("LK-5"), Some("Regular User")],
            &[Some("LK-5"), None],
        ],
    );

    let salesforce = source(
        &salesforce,
        &[
            &[Some("001A"), Some("Acme Co"), Some("US"), Some("B1"), Some("Anchor"), Some("Ann"), Some("Lee"), Some("ann@acme.test"), Some("LK-9")],
            &[Some("002B"), Some("Globex Corporation"), Some("DE"), Some("B2"), Some("Anchor"), Some("Gus"), Some("Ray"), Some("GUS@globex.test"), Some("LK-2")],
            &[Some("003C"), Some("Initech Inc. Ltd"), Some("US"), Some("B3"), Some("x360Sync"), Some("Ian"), Some("Poe"), None, None],
            &[Some("004C"), Some("Initech Inc"), Some("US"), Some("B3"), Some("Anchor"), Some("Ivy"), Some("Poe"), Some("ivy@initech.test"), None],
        ],
    );

    ReconInput { anchor, northstar, salesforce }
}

fn cell<'a>(set: &'a RecordSet, row: usize, qualifier: &str, leaf: &str) -> &'a Value {
    let idx = set.index_of(&FieldName::qualified(qualifier, leaf)).unwrap();
    &set.records()[row].values[idx]
}

#[test]
fn full_run_accounts() {
    let result = run(&MatchConfig::default(), &sample_input()).unwrap();
    let s = &result.summary;

    assert_eq!(s.anchor_accounts, 4);
    assert_eq!(s.cascade.by_id, 1);
    assert_eq!(s.cascade.by_license_key, 1);
    // Initech matches both Salesforce Initech rows
    assert_eq!(s.cascade.by_name, 2);
    assert_eq!(s.cascade.without_candidate, 1);
    assert_eq!(s.account_rows, 5);

    let accounts = &result.accounts;
    assert_eq!(cell(accounts, 0, SALESFORCE, SALESFORCE_ID), &Value::from("001A"));
    assert_eq!(cell(accounts, 1, SALESFORCE, SALESFORCE_ID), &Value::from("002B"));

    // Fuzzy candidates in descending score order
    assert_eq!(cell(accounts, 2, SALESFORCE, SALESFORCE_ID), &Value::from("004C"));
    assert_eq!(cell(accounts, 2, MATCHES, FUZZY_RATIO), &Value::number(100.0));
    assert_eq!(cell(accounts, 3, SALESFORCE, SALESFORCE_ID), &Value::from("003C"));
    assert_eq!(cell(accounts, 3, MATCHES, FUZZY_RATIO), &Value::number(85.0));

    assert_eq!(cell(accounts, 4, ANCHOR, COMPANY_NAME), &Value::from("Vandelay Industries"));
    assert!(cell(accounts, 4, SALESFORCE, COMPANY_NAME).is_null());
}

#[test]
fn full_run_contacts() {
    let result = run(&MatchConfig::default(), &sample_input()).unwrap();
    let contacts = &result.contacts;

    assert_eq!(result.summary.contact_rows, 4);
    assert_eq!(result.summary.contacts_matched, 1);
    assert_eq!(result.summary.contacts_unmatched, 3);

    assert_eq!(cell(contacts, 0, SALESFORCE, CONTACT_EMAIL), &Value::from("ann@acme.test"));
    // Case differs: no match
    assert!(cell(contacts, 1, SALESFORCE, CONTACT_EMAIL).is_null());
}

#[test]
fn cascade_covers_every_account() {
    // Every stage-three row is accepted, so each account yields at least one row
    for threshold in [0, 50, 75, 90, 100] {
        let config = MatchConfig { threshold, ..MatchConfig::default() };
        let result = run(&config, &sample_input()).unwrap();
        let s = &result.summary;
        assert!(s.account_rows >= s.anchor_accounts, "threshold {threshold}");
        assert_eq!(
            s.cascade.by_id + s.cascade.by_license_key + s.cascade.by_name + s.cascade.without_candidate,
            s.account_rows
        );
    }
}

#[test]
fn higher_threshold_drops_weaker_candidate() {
    let config = MatchConfig { threshold: 95, ..MatchConfig::default() };
    let result = run(&config, &sample_input()).unwrap();
    assert_eq!(result.summary.cascade.by_name, 1);
    assert_eq!(result.summary.account_rows, 4);
}

#[test]
fn run_is_deterministic() {
    let a = run(&MatchConfig::default(), &sample_input()).unwrap();
    let b = run(&MatchConfig::default(), &sample_input()).unwrap();
    assert_eq!(a.accounts, b.accounts);
    assert_eq!(a.contacts, b.contacts);
}

#[test]
fn invalid_config_rejected_before_matching() {
    let config = MatchConfig { candidate_limit: 0, ..MatchConfig::default() };
    assert!(run(&config, &sample_input()).is_err());
}
