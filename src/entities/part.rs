//! PART record - a regulated, serial-numbered component

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{PartId, RecordKind};

/// Regulated component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Store key
    pub part_id: PartId,

    /// Category, e.g. "Gearbox", "Front Wing"
    pub part_type: String,

    /// Serial number (unique per manufactured unit)
    pub serial_number: String,

    /// Manufacturer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    /// Regulatory distance limit in km. Absent means the part is not lifecycle-tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fia_lifecycle_limit: Option<i64>,
}

impl Entity for Part {
    const KIND: RecordKind = RecordKind::Part;

    fn key(&self) -> i64 {
        self.part_id.get()
    }

    fn label(&self) -> String {
        format!("{} - {}", self.part_type, self.serial_number)
    }
}

impl Part {
    /// Create a part without manufacturer or limit
    pub fn new(
        part_id: PartId,
        part_type: impl Into<String>,
        serial_number: impl Into<String>,
    ) -> Self {
        Self {
            part_id,
            part_type: part_type.into(),
            serial_number: serial_number.into(),
            manufacturer: None,
            fia_lifecycle_limit: None,
        }
    }

    /// Set the lifecycle limit
    pub fn with_limit(mut self, limit_km: i64) -> Self {
        self.fia_lifecycle_limit = Some(limit_km);
        self
    }

    /// Set the manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_builder() {
        let part = Part::new(PartId(1), "Gearbox", "ABC-123")
            .with_limit(1000)
            .with_manufacturer("Xtrac");
        assert_eq!(part.fia_lifecycle_limit, Some(1000));
        assert_eq!(part.label(), "Gearbox - ABC-123");
        assert_eq!(part.labelled_id(), "PART-1");
    }

    #[test]
    fn test_part_without_limit_omits_field() {
        let part = Part::new(PartId(2), "Brake", "BR-9");
        let yaml = serde_yml::to_string(&part).unwrap();
        assert!(!yaml.contains("fia_lifecycle_limit"));
        assert!(!yaml.contains("manufacturer"));
    }
}
