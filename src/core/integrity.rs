//! Data-integrity checks over store records
//!
//! These checks only report. Records are never repaired or dropped; the
//! caller decides what to do with an inconsistent snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::core::identity::{CarId, CarPartId, PartId, TeamId};
use crate::entities::{Car, CarPart, Part, Team};

/// A detected inconsistency in the store's records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// An installation recorded a negative distance
    NegativeMileage { car_part: CarPartId, mileage: i64 },

    /// An installation was closed before it was opened
    RemovedBeforeInstalled {
        car_part: CarPartId,
        installed_at: DateTime<Utc>,
        removed_at: DateTime<Utc>,
    },

    /// One part is currently installed more than once
    MultipleActiveInstallations {
        part: PartId,
        car_parts: Vec<CarPartId>,
    },

    /// Two installations of the same part type on one car overlap in time
    OverlappingInstallations {
        car: CarId,
        part_type: String,
        first: CarPartId,
        second: CarPartId,
    },

    /// An installation references a part that is not in the snapshot
    MissingPart { car_part: CarPartId, part: PartId },

    /// An installation references a car that is not in the snapshot
    MissingCar { car_part: CarPartId, car: CarId },

    /// A car references a team that is not in the snapshot
    MissingTeam { car: CarId, team: TeamId },
}

impl IntegrityIssue {
    /// Installation records implicated by this issue
    pub fn car_parts(&self) -> Vec<CarPartId> {
        match self {
            IntegrityIssue::NegativeMileage { car_part, .. }
            | IntegrityIssue::RemovedBeforeInstalled { car_part, .. }
            | IntegrityIssue::MissingPart { car_part, .. }
            | IntegrityIssue::MissingCar { car_part, .. } => vec![*car_part],
            IntegrityIssue::MultipleActiveInstallations { car_parts, .. } => car_parts.clone(),
            IntegrityIssue::OverlappingInstallations { first, second, .. } => {
                vec![*first, *second]
            }
            IntegrityIssue::MissingTeam { .. } => Vec::new(),
        }
    }

    /// Whether this issue concerns the given installation record
    pub fn involves_car_part(&self, id: CarPartId) -> bool {
        self.car_parts().contains(&id)
    }
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::NegativeMileage { car_part, mileage } => {
                write!(f, "{} has negative mileage ({} km)", car_part.labelled(), mileage)
            }
            IntegrityIssue::RemovedBeforeInstalled {
                car_part,
                installed_at,
                removed_at,
            } => write!(
                f,
                "{} removed at {} before it was installed at {}",
                car_part.labelled(),
                removed_at.to_rfc3339(),
                installed_at.to_rfc3339()
            ),
            IntegrityIssue::MultipleActiveInstallations { part, car_parts } => {
                let ids: Vec<String> = car_parts.iter().map(|id| id.labelled()).collect();
                write!(
                    f,
                    "{} is actively installed {} times ({})",
                    part.labelled(),
                    car_parts.len(),
                    ids.join(", ")
                )
            }
            IntegrityIssue::OverlappingInstallations {
                car,
                part_type,
                first,
                second,
            } => write!(
                f,
                "{} has overlapping '{}' installations {} and {}",
                car.labelled(),
                part_type,
                first.labelled(),
                second.labelled()
            ),
            IntegrityIssue::MissingPart { car_part, part } => write!(
                f,
                "{} references unknown part {}",
                car_part.labelled(),
                part.labelled()
            ),
            IntegrityIssue::MissingCar { car_part, car } => write!(
                f,
                "{} references unknown car {}",
                car_part.labelled(),
                car.labelled()
            ),
            IntegrityIssue::MissingTeam { car, team } => write!(
                f,
                "{} references unknown team {}",
                car.labelled(),
                team.labelled()
            ),
        }
    }
}

/// Per-record checks: negative mileage, removal before installation
pub fn check_record(record: &CarPart) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    if let Some(mileage) = record.mileage.filter(|m| *m < 0) {
        issues.push(IntegrityIssue::NegativeMileage {
            car_part: record.car_part_id,
            mileage,
        });
    }

    if let Some(removed_at) = record.removed_at {
        if removed_at < record.installed_at {
            issues.push(IntegrityIssue::RemovedBeforeInstalled {
                car_part: record.car_part_id,
                installed_at: record.installed_at,
                removed_at,
            });
        }
    }

    issues
}

/// Parts with more than one active installation
pub fn check_single_active<'a, I>(records: I) -> Vec<IntegrityIssue>
where
    I: IntoIterator<Item = &'a CarPart>,
{
    let mut active: BTreeMap<PartId, Vec<CarPartId>> = BTreeMap::new();
    for record in records.into_iter().filter(|r| r.is_active()) {
        active.entry(record.part).or_default().push(record.car_part_id);
    }

    active
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(part, mut car_parts)| {
            car_parts.sort();
            IntegrityIssue::MultipleActiveInstallations { part, car_parts }
        })
        .collect()
}

/// All per-record and cross-record checks over installation records
pub fn check_car_parts(records: &[CarPart]) -> Vec<IntegrityIssue> {
    let mut issues: Vec<IntegrityIssue> = records.iter().flat_map(check_record).collect();
    issues.extend(check_single_active(records));
    issues
}

/// Dangling references between record kinds
pub fn check_references(
    teams: &[Team],
    cars: &[Car],
    parts: &[Part],
    car_parts: &[CarPart],
) -> Vec<IntegrityIssue> {
    let team_ids: HashSet<TeamId> = teams.iter().map(|t| t.team_id).collect();
    let car_ids: HashSet<CarId> = cars.iter().map(|c| c.car_id).collect();
    let part_ids: HashSet<PartId> = parts.iter().map(|p| p.part_id).collect();

    let mut issues = Vec::new();
    for car in cars {
        if !team_ids.contains(&car.team) {
            issues.push(IntegrityIssue::MissingTeam {
                car: car.car_id,
                team: car.team,
            });
        }
    }
    for record in car_parts {
        if !car_ids.contains(&record.car) {
            issues.push(IntegrityIssue::MissingCar {
                car_part: record.car_part_id,
                car: record.car,
            });
        }
        if !part_ids.contains(&record.part) {
            issues.push(IntegrityIssue::MissingPart {
                car_part: record.car_part_id,
                part: record.part,
            });
        }
    }
    issues
}
