use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{self, Entity, FieldErrors, Validate};
use crate::models::Address;

/// A customer of the storefront.
///
/// Identifier and audit timestamps are server-owned: values supplied by the
/// caller deserialize into placeholders and are overwritten before any write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,

    #[serde(default = "entity::epoch")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "entity::epoch")]
    pub updated_at: DateTime<Utc>,

    /// This customer's name.
    #[serde(default)]
    pub name: String,

    /// Addresses used by this customer.
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl Entity for Customer {
    fn id(&self) -> Uuid {
        self.id
    }
    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn set_created_at(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl Validate for Customer {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.push("name", "is required");
        }
        for (index, address) in self.addresses.iter().enumerate() {
            address.validate_into(&format!("addresses[{index}]"), &mut errors);
        }
        errors.into_result()
    }
}
