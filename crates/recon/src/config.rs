use std::path::Path;

use serde::Deserialize;

use crate::error::ReconError;
use crate::fuzzy::{DEFAULT_CANDIDATE_LIMIT, DEFAULT_THRESHOLD};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    /// Company names scoring at or above this ratio (0-100) are joined.
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    /// Best-scoring candidates retained per account before thresholding.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
    /// Northstar users with this role are not account admins and are dropped.
    #[serde(default = "default_excluded_role")]
    pub excluded_user_role: String,
    #[serde(default)]
    pub sources: SourcesConfig,
}

fn default_threshold() -> u8 {
    DEFAULT_THRESHOLD
}

fn default_candidate_limit() -> usize {
    DEFAULT_CANDIDATE_LIMIT
}

fn default_excluded_role() -> String {
    "Regular User".into()
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            candidate_limit: default_candidate_limit(),
            excluded_user_role: default_excluded_role(),
            sources: SourcesConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Source column aliases
// ---------------------------------------------------------------------------

/// Spreadsheet header names for each source. Every field defaults to the
/// header used by the standard exports.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    #[serde(default)]
    pub anchor: AnchorColumns,
    #[serde(default)]
    pub northstar: NorthstarColumns,
    #[serde(default)]
    pub salesforce: SalesforceColumns,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnchorColumns {
    pub salesforce_id: String,
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub license_key: String,
    pub status: String,
}

impl Default for AnchorColumns {
    fn default() -> Self {
        Self {
            salesforce_id: "Salesforce ID".into(),
            company_name: "Company".into(),
            contact_name: "Name".into(),
            contact_email: "Email".into(),
            license_key: "License Key".into(),
            status: "Status".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NorthstarColumns {
    pub license_key: String,
    pub user_role: String,
}

impl Default for NorthstarColumns {
    fn default() -> Self {
        Self {
            license_key: "license key".into(),
            user_role: "user role".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SalesforceColumns {
    pub salesforce_id: String,
    pub company_name: String,
    pub billing_country: String,
    pub brand_id: String,
    pub products: String,
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub contact_email: String,
    pub license_key: String,
}

impl Default for SalesforceColumns {
    fn default() -> Self {
        Self {
            salesforce_id: "Account 18 digit Id".into(),
            company_name: "Account Name".into(),
            billing_country: "Billing Country".into(),
            brand_id: "Brand ID".into(),
            products: "Current Products".into(),
            contact_first_name: "First Name".into(),
            contact_last_name: "Last Name".into(),
            contact_email: "Email".into(),
            license_key: "TPS License Information".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ReconError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.threshold > 100 {
            return Err(ReconError::ConfigValidation(format!(
                "threshold must be between 0 and 100, got {}",
                self.threshold
            )));
        }

        if self.candidate_limit == 0 {
            return Err(ReconError::ConfigValidation(
                "candidate_limit must be at least 1".into(),
            ));
        }

        let sources = crate::schema::SourceSchema::all(&self.sources);
        for source in &sources {
            source.validate()?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
