//! Source preparation: the combined Anchor/Northstar account dataset.

use log::{debug, info};

use crate::error::ReconError;
use crate::matcher::{join_exact_key, JoinKind};
use crate::model::{FieldName, Value};
use crate::schema::{ANCHOR, LICENSE_KEY, NORTHSTAR, USER_ROLE};
use crate::table::RecordSet;

/// Northstar users that administer their account: role present and not the
/// excluded (regular user) role.
pub fn privileged_users(northstar: &RecordSet, excluded_role: &str) -> Result<RecordSet, ReconError> {
    let role = northstar.index_of(&FieldName::new(USER_ROLE))?;
    Ok(northstar.filter(|row| match &row.record.values[role] {
        Value::Null => false,
        Value::Text(t) => t != excluded_role,
        _ => true,
    }))
}

/// Inner-join Anchor rows to privileged Northstar users by license key.
///
/// The result carries every Anchor field plus the Northstar `User Role`,
/// unqualified and de-duplicated.
pub fn merge_usage(
    anchor: &RecordSet,
    northstar: &RecordSet,
    excluded_role: &str,
) -> Result<RecordSet, ReconError> {
    let users = privileged_users(northstar, excluded_role)?;
    debug!(
        "northstar: {} of {} user(s) kept after role filter",
        users.len(),
        northstar.len()
    );

    info!("Joining Anchor/Northstar data by license key...");
    let joined = join_exact_key(
        &anchor.with_qualifier(ANCHOR)?,
        &users.with_qualifier(NORTHSTAR)?,
        &FieldName::qualified(ANCHOR, LICENSE_KEY),
        &FieldName::qualified(NORTHSTAR, LICENSE_KEY),
        JoinKind::Inner,
    )?;

    let mut keep: Vec<FieldName> = anchor.schema().iter().map(|f| f.requalify(ANCHOR)).collect();
    keep.push(FieldName::qualified(NORTHSTAR, USER_ROLE));

    Ok(joined.project(&keep)?.unqualified()?.deduplicate())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(fields: &[&str], rows: &[&[Option<&str>]]) -> RecordSet {
        RecordSet::new(
            fields.iter().map(|f| FieldName::new(*f)).collect(),
            rows.iter().map(|r| r.iter().map(|v| Value::from(*v)).collect()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn role_filter_drops_regular_and_missing() {
        let ns = set(
            &[LICENSE_KEY, USER_ROLE],
            &[
                &[Some("L1"), Some("Administrator")],
                &[Some("L1"), Some("Regular User")],
                &[Some("L2"), None],
            ],
        );
        let kept = privileged_users(&ns, "Regular User").unwrap();
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn merge_usage_inner_joins_on_license_key() {
        let anchor = set(
            &["Company Name", LICENSE_KEY],
            &[&[Some("Acme"), Some("L1")], &[Some("Globex"), Some("L2")], &[Some("Nokey"), None]],
        );
        let ns = set(
            &[LICENSE_KEY, USER_ROLE],
            &[
                &[Some("L1"), Some("Administrator")],
                &[Some("L1"), Some("Administrator")],
                &[Some("L2"), Some("Regular User")],
            ],
        );
        let merged = merge_usage(&anchor, &ns, "Regular User").unwrap();
        assert_eq!(
            merged.schema(),
            &[FieldName::new("Company Name"), FieldName::new(LICENSE_KEY), FieldName::new(USER_ROLE)]
        );
        // Duplicate Northstar users collapse; Globex only has a regular user
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.records()[0].values[2], Value::from("Administrator"));
    }
}
