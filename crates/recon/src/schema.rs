//! Schema descriptions for the source extracts and the two reports.
//!
//! A source schema names the fields a loader must produce and the spreadsheet
//! header each one is read from. A report schema lists the qualified output
//! fields with their display order.

use std::collections::HashSet;

use crate::config::{AnchorColumns, NorthstarColumns, SalesforceColumns, SourcesConfig};
use crate::error::ReconError;
use crate::model::FieldName;
use crate::table::RecordSet;

pub const SALESFORCE_ID: &str = "Salesforce ID";
pub const COMPANY_NAME: &str = "Company Name";
pub const CONTACT_NAME: &str = "Contact Name";
pub const CONTACT_EMAIL: &str = "Contact Email";
pub const CONTACT_FIRST_NAME: &str = "Contact First Name";
pub const CONTACT_LAST_NAME: &str = "Contact Last Name";
pub const LICENSE_KEY: &str = "License Key";
pub const STATUS: &str = "Status";
pub const USER_ROLE: &str = "User Role";
pub const BILLING_COUNTRY: &str = "Billing Country";
pub const BRAND_ID: &str = "Brand ID";
pub const PRODUCTS: &str = "Products";
pub const FUZZY_RATIO: &str = "Fuzzy ratio";

pub const ANCHOR: &str = "Anchor";
pub const NORTHSTAR: &str = "Northstar";
pub const SALESFORCE: &str = "Salesforce";
pub const MATCHES: &str = "Matches";

// ---------------------------------------------------------------------------
// Source schemas
// ---------------------------------------------------------------------------

/// One source field: the name it is loaded as and the spreadsheet header it
/// is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub source: String,
}

impl FieldSpec {
    fn aliased(name: &str, source: &str) -> Self {
        Self { name: name.into(), source: source.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSchema {
    pub origin: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl SourceSchema {
    pub fn anchor(cols: &AnchorColumns) -> Self {
        Self {
            origin: ANCHOR,
            fields: vec![
                FieldSpec::aliased(SALESFORCE_ID, &cols.salesforce_id),
                FieldSpec::aliased(COMPANY_NAME, &cols.company_name),
                FieldSpec::aliased(CONTACT_NAME, &cols.contact_name),
                FieldSpec::aliased(CONTACT_EMAIL, &cols.contact_email),
                FieldSpec::aliased(LICENSE_KEY, &cols.license_key),
                FieldSpec::aliased(STATUS, &cols.status),
            ],
        }
    }

    pub fn northstar(cols: &NorthstarColumns) -> Self {
        Self {
            origin: NORTHSTAR,
            fields: vec![
                FieldSpec::aliased(LICENSE_KEY, &cols.license_key),
                FieldSpec::aliased(USER_ROLE, &cols.user_role),
            ],
        }
    }

    pub fn salesforce(cols: &SalesforceColumns) -> Self {
        Self {
            origin: SALESFORCE,
            fields: vec![
                FieldSpec::aliased(SALESFORCE_ID, &cols.salesforce_id),
                FieldSpec::aliased(COMPANY_NAME, &cols.company_name),
                FieldSpec::aliased(BILLING_COUNTRY, &cols.billing_country),
                FieldSpec::aliased(BRAND_ID, &cols.brand_id),
                FieldSpec::aliased(PRODUCTS, &cols.products),
                FieldSpec::aliased(CONTACT_FIRST_NAME, &cols.contact_first_name),
                FieldSpec::aliased(CONTACT_LAST_NAME, &cols.contact_last_name),
                FieldSpec::aliased(CONTACT_EMAIL, &cols.contact_email),
                FieldSpec::aliased(LICENSE_KEY, &cols.license_key),
            ],
        }
    }

    pub fn all(sources: &SourcesConfig) -> [Self; 3] {
        [
            Self::anchor(&sources.anchor),
            Self::northstar(&sources.northstar),
            Self::salesforce(&sources.salesforce),
        ]
    }

    /// Loaded field names, in declaration order. Display order is a report
    /// concern; see [`ReportSchema`].
    pub fn field_names(&self) -> Vec<FieldName> {
        self.fields.iter().map(|f| FieldName::new(f.name.clone())).collect()
    }

    /// Aliases must be non-empty and distinct within one source.
    pub fn validate(&self) -> Result<(), ReconError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            let source = &field.source;
            if source.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{}: empty source column for '{}'",
                    self.origin, field.name
                )));
            }
            if !seen.insert(source.as_str()) {
                return Err(ReconError::ConfigValidation(format!(
                    "{}: source column '{source}' mapped more than once",
                    self.origin
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Report schemas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportField {
    pub field: FieldName,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSchema {
    pub fields: Vec<ReportField>,
}

impl ReportSchema {
    fn from_spec(spec: &[(&str, &str, i32)]) -> Self {
        Self {
            fields: spec
                .iter()
                .map(|(q, leaf, order)| ReportField {
                    field: FieldName::qualified(*q, *leaf),
                    order: *order,
                })
                .collect(),
        }
    }

    pub fn accounts() -> Self {
        Self::from_spec(&[
            (ANCHOR, SALESFORCE_ID, 0),
            (ANCHOR, COMPANY_NAME, 10),
            (ANCHOR, LICENSE_KEY, 30),
            (ANCHOR, STATUS, 40),
            (ANCHOR, USER_ROLE, 50),
            (SALESFORCE, SALESFORCE_ID, 60),
            (SALESFORCE, COMPANY_NAME, 70),
            (SALESFORCE, PRODUCTS, 80),
            (SALESFORCE, LICENSE_KEY, 90),
            (MATCHES, SALESFORCE_ID, 90),
            (MATCHES, LICENSE_KEY, 100),
            (MATCHES, FUZZY_RATIO, 110),
        ])
    }

    pub fn contacts() -> Self {
        Self::from_spec(&[
            (ANCHOR, SALESFORCE_ID, 0),
            (ANCHOR, COMPANY_NAME, 10),
            (ANCHOR, CONTACT_NAME, 20),
            (ANCHOR, CONTACT_EMAIL, 30),
            (ANCHOR, STATUS, 40),
            (ANCHOR, USER_ROLE, 50),
            (SALESFORCE, SALESFORCE_ID, 60),
            (SALESFORCE, COMPANY_NAME, 70),
            (SALESFORCE, CONTACT_FIRST_NAME, 80),
            (SALESFORCE, CONTACT_LAST_NAME, 90),
            (SALESFORCE, CONTACT_EMAIL, 100),
        ])
    }

    /// Unqualified leaf names declared under `qualifier`, in declaration order.
    pub fn leaves(&self, qualifier: &str) -> Vec<FieldName> {
        self.fields
            .iter()
            .filter(|f| f.field.qualifier.as_deref() == Some(qualifier))
            .map(|f| f.field.unqualified())
            .collect()
    }

    /// Qualified fields declared under `qualifier`, in declaration order.
    pub fn group(&self, qualifier: &str) -> Vec<FieldName> {
        self.fields
            .iter()
            .filter(|f| f.field.qualifier.as_deref() == Some(qualifier))
            .map(|f| f.field.clone())
            .collect()
    }

    /// Report columns in display order. Equal orders keep declaration order.
    pub fn ordered_fields(&self) -> Vec<FieldName> {
        let mut fields: Vec<&ReportField> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.order);
        fields.into_iter().map(|f| f.field.clone()).collect()
    }

    /// Restrict `set` to the report columns, in display order.
    pub fn arrange(&self, set: &RecordSet) -> Result<RecordSet, ReconError> {
        set.project(&self.ordered_fields())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_report_order_is_stable() {
        let fields = ReportSchema::accounts().ordered_fields();
        let labels: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        assert_eq!(labels[0], "Anchor / Salesforce ID");
        // Equal orders (90) keep declaration order
        assert_eq!(labels[8], "Salesforce / License Key");
        assert_eq!(labels[9], "Matches / Salesforce ID");
        assert_eq!(labels[11], "Matches / Fuzzy ratio");
    }

    #[test]
    fn leaves_strip_qualifier() {
        let leaves = ReportSchema::contacts().leaves(SALESFORCE);
        assert_eq!(leaves.len(), 5);
        assert_eq!(leaves[4], FieldName::new(CONTACT_EMAIL));
    }

    #[test]
    fn source_fields_keep_declaration_order() {
        let anchor = SourceSchema::anchor(&AnchorColumns::default());
        let names: Vec<String> = anchor.field_names().iter().map(|f| f.to_string()).collect();
        assert_eq!(
            names,
            vec![SALESFORCE_ID, COMPANY_NAME, CONTACT_NAME, CONTACT_EMAIL, LICENSE_KEY, STATUS]
        );
    }

    #[test]
    fn default_source_aliases() {
        let sf = SourceSchema::salesforce(&SalesforceColumns::default());
        let id = sf.fields.iter().find(|f| f.name == SALESFORCE_ID).unwrap();
        assert_eq!(id.source, "Account 18 digit Id");
        assert!(sf.validate().is_ok());
    }
}
