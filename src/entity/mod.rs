pub mod clock;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

pub use clock::MonotonicClock;

/// A persisted record with a unique identity and audit timestamps.
///
/// `created_at` is immutable after the first write; `updated_at` strictly
/// increases on every successful mutation (see [`MonotonicClock`]).
pub trait Entity {
    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);

    fn created_at(&self) -> DateTime<Utc>;
    fn set_created_at(&mut self, at: DateTime<Utc>);

    fn updated_at(&self) -> DateTime<Utc>;
    fn set_updated_at(&mut self, at: DateTime<Utc>);

    /// Opaque cache-validation token derived from the last-modified time.
    /// Two entities are the same version iff their tokens match, which holds
    /// iff their `updated_at` values are bit-identical.
    fn version_token(&self) -> String {
        format!("{:x}", self.updated_at().timestamp_nanos_opt().unwrap_or_default())
    }
}

/// Placeholder timestamp for caller-supplied fields the server overwrites.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Field-level validation failures, keyed by the field's wire name
/// (nested fields use `addresses[0].postCode` style keys).
#[derive(Debug, Clone, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }

    /// Ok when no errors were collected, Err(self) otherwise.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Model-level validation, checked before any store write.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Stamped {
        updated_at: DateTime<Utc>,
    }

    impl Entity for Stamped {
        fn id(&self) -> Uuid {
            Uuid::nil()
        }
        fn set_id(&mut self, _id: Uuid) {}
        fn created_at(&self) -> DateTime<Utc> {
            epoch()
        }
        fn set_created_at(&mut self, _at: DateTime<Utc>) {}
        fn updated_at(&self) -> DateTime<Utc> {
            self.updated_at
        }
        fn set_updated_at(&mut self, at: DateTime<Utc>) {
            self.updated_at = at;
        }
    }

    #[test]
    fn version_token_matches_iff_updated_at_matches() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let a = Stamped { updated_at: at };
        let b = Stamped { updated_at: at };
        assert_eq!(a.version_token(), b.version_token());

        let c = Stamped { updated_at: at + chrono::Duration::nanoseconds(1) };
        assert_ne!(a.version_token(), c.version_token());
    }

    #[test]
    fn field_errors_collects_and_converts() {
        let mut errors = FieldErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.push("name", "is required");
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.into_inner().get("name").map(String::as_str), Some("is required"));
    }
}
