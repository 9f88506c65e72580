//! INST record - an installation of a part on a car for a time interval

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{CarId, CarPartId, PartId, RecordKind};

/// Installation record linking one part to one car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarPart {
    /// Store key
    pub car_part_id: CarPartId,

    /// Car the part is (or was) installed on
    pub car: CarId,

    /// Installed part
    pub part: PartId,

    /// Installation time
    pub installed_at: DateTime<Utc>,

    /// Removal time; absent while installed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_at: Option<DateTime<Utc>>,

    /// Distance (km) accumulated during this interval; absent until recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<i64>,

    /// Store's own notion of "currently installed", trusted when present.
    /// Read models emit the resolved flag instead, see [`CarPart::is_active`].
    #[serde(default, rename = "is_active", skip_serializing)]
    pub reported_active: Option<bool>,
}

impl Entity for CarPart {
    const KIND: RecordKind = RecordKind::Inst;

    fn key(&self) -> i64 {
        self.car_part_id.get()
    }

    fn label(&self) -> String {
        format!("{} on {}", self.part.labelled(), self.car.labelled())
    }
}

impl CarPart {
    /// Create an open (currently installed) record
    pub fn installed(
        car_part_id: CarPartId,
        car: CarId,
        part: PartId,
        installed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            car_part_id,
            car,
            part,
            installed_at,
            removed_at: None,
            mileage: None,
            reported_active: None,
        }
    }

    /// Close the record at `removed_at`
    pub fn with_removed_at(mut self, removed_at: DateTime<Utc>) -> Self {
        self.removed_at = Some(removed_at);
        self
    }

    /// Record this interval's mileage
    pub fn with_mileage(mut self, mileage: i64) -> Self {
        self.mileage = Some(mileage);
        self
    }

    /// Whether this installation is current.
    ///
    /// The store's reported flag wins over the timestamps: a removal may be
    /// recorded while the final mileage is still being settled.
    pub fn is_active(&self) -> bool {
        self.reported_active.unwrap_or(self.removed_at.is_none())
    }

    /// Mileage counted toward cumulative totals (absent counts as 0)
    pub fn counted_mileage(&self) -> i64 {
        self.mileage.unwrap_or(0)
    }
}
