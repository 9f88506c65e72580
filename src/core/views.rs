//! Annotated read models
//!
//! Store records joined with their related records and annotated with the
//! derived lifecycle fields. These are what listings, timelines and the
//! warnings dashboard operate on.

use serde::Serialize;

use crate::core::identity::{CarId, CarPartId};
use crate::core::integrity::{check_record, check_single_active, IntegrityIssue};
use crate::core::lifecycle::{
    cumulative_mileage, effective_limit, lifecycle_percentage, Lifecycle, LifecycleTier,
};
use crate::entities::{Car, CarPart, CarStatusClass, Part, Team};

/// Part with cumulative usage and lifecycle status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartView {
    #[serde(flatten)]
    pub part: Part,

    /// Sum of mileage over every installation; absent if any interval is invalid
    pub current_mileage: Option<i64>,

    /// `current_mileage` against the limit; absent without a limit or usable mileage
    pub lifecycle_percentage: Option<f64>,

    pub lifecycle_tier: LifecycleTier,

    pub needs_replacement: bool,

    /// Exactly one active installation exists
    pub is_installed: bool,

    /// The active installation, when there is exactly one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_on: Option<CarId>,

    /// Number of installation records, active and historical
    pub installation_count: usize,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<IntegrityIssue>,
}

impl PartView {
    /// Annotate `part` from its installation records.
    ///
    /// Records belonging to other parts are ignored, so the whole collection
    /// may be passed in.
    pub fn build<'a, I>(part: &Part, records: I) -> Self
    where
        I: IntoIterator<Item = &'a CarPart>,
    {
        let installs: Vec<&CarPart> = records
            .into_iter()
            .filter(|r| r.part == part.part_id)
            .collect();

        let mut issues: Vec<IntegrityIssue> =
            installs.iter().flat_map(|r| check_record(r)).collect();
        issues.extend(check_single_active(installs.iter().copied()));

        let active: Vec<&CarPart> = installs.iter().copied().filter(|r| r.is_active()).collect();
        let installed_on = match active.as_slice() {
            [only] => Some(only.car),
            _ => None,
        };

        let lifecycle = cumulative_mileage(installs.iter().copied())
            .and_then(|mileage| Lifecycle::compute(mileage, part.fia_lifecycle_limit));

        let (current_mileage, lifecycle_percentage, lifecycle_tier, needs_replacement) =
            match lifecycle {
                Ok(lc) => (Some(lc.mileage), lc.percentage, lc.tier, lc.needs_replacement),
                Err(err) => {
                    tracing::warn!(part = %part.part_id, error = %err, "lifecycle unavailable");
                    (None, None, LifecycleTier::Unknown, false)
                }
            };

        Self {
            part: part.clone(),
            current_mileage,
            lifecycle_percentage,
            lifecycle_tier,
            needs_replacement,
            is_installed: installed_on.is_some(),
            installed_on,
            installation_count: installs.len(),
            issues,
        }
    }

    /// Full lifecycle assessment, when one could be made
    pub fn lifecycle(&self) -> Option<Lifecycle> {
        self.current_mileage
            .and_then(|m| Lifecycle::compute(m, self.part.fia_lifecycle_limit).ok())
    }
}

/// Installation record joined with its car and part
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarPartView {
    #[serde(flatten)]
    pub record: CarPart,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chassis_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fia_lifecycle_limit: Option<i64>,

    /// This interval's mileage against the part's limit (not the cumulative figure)
    pub lifecycle_percentage: Option<f64>,

    pub lifecycle_tier: LifecycleTier,

    pub is_active: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<IntegrityIssue>,
}

impl CarPartView {
    /// Join `record` with its car and part. Missing relations are reported, not fatal.
    pub fn build(record: &CarPart, car: Option<&Car>, part: Option<&Part>) -> Self {
        let mut issues = check_record(record);
        if car.is_none() {
            issues.push(IntegrityIssue::MissingCar {
                car_part: record.car_part_id,
                car: record.car,
            });
        }
        if part.is_none() {
            issues.push(IntegrityIssue::MissingPart {
                car_part: record.car_part_id,
                part: record.part,
            });
        }

        let limit = part.and_then(|p| effective_limit(p.fia_lifecycle_limit));
        let lifecycle_percentage = record
            .mileage
            .and_then(|m| lifecycle_percentage(m, limit).ok().flatten());

        Self {
            record: record.clone(),
            car_number: car.map(|c| c.car_number),
            chassis_number: car.map(|c| c.chassis_number.clone()),
            part_type: part.map(|p| p.part_type.clone()),
            serial_number: part.map(|p| p.serial_number.clone()),
            manufacturer: part.and_then(|p| p.manufacturer.clone()),
            fia_lifecycle_limit: part.and_then(|p| p.fia_lifecycle_limit),
            lifecycle_percentage,
            lifecycle_tier: LifecycleTier::classify(lifecycle_percentage),
            is_active: record.is_active(),
            issues,
        }
    }

    pub fn id(&self) -> CarPartId {
        self.record.car_part_id
    }
}

/// Installation record with the full car and part it joins, as served for a
/// single-record lookup. `part` carries the part's cumulative lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarPartDetail {
    #[serde(flatten)]
    pub view: CarPartView,

    #[serde(rename = "car_details", skip_serializing_if = "Option::is_none")]
    pub car: Option<CarView>,

    #[serde(rename = "part_details", skip_serializing_if = "Option::is_none")]
    pub part: Option<PartView>,
}

/// Car joined with its team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarView {
    #[serde(flatten)]
    pub car: Car,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,

    pub status_class: CarStatusClass,
}

impl CarView {
    pub fn build(car: &Car, team: Option<&Team>) -> Self {
        Self {
            car: car.clone(),
            team_name: team.map(|t| t.name.clone()),
            status_class: car.status_class(),
        }
    }
}
