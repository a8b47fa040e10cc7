use serde::{Deserialize, Serialize};

use crate::entity::FieldErrors;

/// A physical address attached to a customer. Not an entity on its own;
/// it lives and dies with its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Apartment or suite number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Building number or name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Postal or ZIP code.
    #[serde(default)]
    pub post_code: String,

    #[serde(default)]
    pub country: String,
}

impl Address {
    /// Collects field errors under `prefix` (e.g. `addresses[0]`), so owners
    /// can report nested failures with full paths.
    pub fn validate_into(&self, prefix: &str, errors: &mut FieldErrors) {
        if self.post_code.trim().is_empty() {
            errors.push(format!("{prefix}.postCode"), "is required");
        }
        if self.country.trim().is_empty() {
            errors.push(format!("{prefix}.country"), "is required");
        }
    }
}
