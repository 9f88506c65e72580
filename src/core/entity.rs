//! Entity trait - common interface for all store records

use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::RecordKind;

/// Common trait for all records handed to us by the store
pub trait Entity: Serialize + DeserializeOwned {
    /// The record kind (e.g., PART, CAR)
    const KIND: RecordKind;

    /// Raw store key, used for natural (identity) ordering
    fn key(&self) -> i64;

    /// Short human-readable label for listings
    fn label(&self) -> String;

    /// Prefixed id, e.g. `PART-12`
    fn labelled_id(&self) -> String {
        format!("{}-{}", Self::KIND, self.key())
    }
}
