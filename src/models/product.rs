use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{self, Entity, FieldErrors, Validate};

/// A product offered by the storefront. Prices are decimals, not floats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,

    #[serde(default = "entity::epoch")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "entity::epoch")]
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub price: Decimal,
}

impl Entity for Product {
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

impl Validate for Product {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.push("name", "is required");
        }
        if self.price < Decimal::ZERO {
            errors.push("price", "must not be negative");
        }
        errors.into_result()
    }
}
