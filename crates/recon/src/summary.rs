use crate::engine::AccountMatches;
use crate::error::ReconError;
use crate::model::{FieldName, ReconSummary};
use crate::schema::{CONTACT_EMAIL, SALESFORCE};
use crate::table::RecordSet;

/// Compute summary statistics for one run.
pub fn compute_summary(accounts: &AccountMatches, contacts: &RecordSet) -> Result<ReconSummary, ReconError> {
    let matched_email = FieldName::qualified(SALESFORCE, CONTACT_EMAIL);
    let contacts_matched = contacts
        .column(&matched_email)?
        .into_iter()
        .filter(|v| !v.is_null())
        .count();

    Ok(ReconSummary {
        anchor_accounts: accounts.anchor_accounts,
        account_rows: accounts.report.len(),
        cascade: accounts.stats,
        contact_rows: contacts.len(),
        contacts_matched,
        contacts_unmatched: contacts.len() - contacts_matched,
    })
}
