//! Installation history reconstruction
//!
//! Orders a car's installation records into a timeline, most recent install
//! first, and flags slots where two installations of the same part type
//! overlap in time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::identity::CarId;
use crate::core::integrity::IntegrityIssue;
use crate::core::views::CarPartView;

/// A car's installation timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    /// Every input record, ordered by `installed_at` descending
    pub entries: Vec<CarPartView>,

    /// Record-level issues carried by the entries plus slot overlaps
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<IntegrityIssue>,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries the store reports as currently installed
    pub fn active(&self) -> impl Iterator<Item = &CarPartView> {
        self.entries.iter().filter(|e| e.is_active)
    }

    /// Whether the reconstruction found any data-integrity problem
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Build a timeline from an unordered set of installation records.
///
/// Ties on `installed_at` break by `car_part_id` descending. The `is_active`
/// flag of each record is used as given.
pub fn reconstruct(mut records: Vec<CarPartView>) -> Timeline {
    records.sort_by(|a, b| {
        b.record
            .installed_at
            .cmp(&a.record.installed_at)
            .then_with(|| b.record.car_part_id.cmp(&a.record.car_part_id))
    });

    let mut issues: Vec<IntegrityIssue> = Vec::new();
    for issue in records.iter().flat_map(|e| e.issues.iter()) {
        if !issues.contains(issue) {
            issues.push(issue.clone());
        }
    }
    issues.extend(slot_overlaps(&records));

    tracing::debug!(
        entries = records.len(),
        issues = issues.len(),
        "reconstructed installation timeline"
    );

    Timeline {
        entries: records,
        issues,
    }
}

/// Half-open occupancy interval `[start, end)`; `None` end is still installed
fn occupancy(entry: &CarPartView) -> Option<(DateTime<Utc>, Option<DateTime<Utc>>)> {
    let start = entry.record.installed_at;
    let end = if entry.is_active {
        None
    } else {
        entry.record.removed_at
    };
    match end {
        // Inverted intervals are reported separately and occupy nothing
        Some(end) if end < start => None,
        _ => Some((start, end)),
    }
}

fn overlaps(
    a: (DateTime<Utc>, Option<DateTime<Utc>>),
    b: (DateTime<Utc>, Option<DateTime<Utc>>),
) -> bool {
    let a_before_b_ends = b.1.map_or(true, |b_end| a.0 < b_end);
    let b_before_a_ends = a.1.map_or(true, |a_end| b.0 < a_end);
    a_before_b_ends && b_before_a_ends
}

fn slot_overlaps(entries: &[CarPartView]) -> Vec<IntegrityIssue> {
    let mut slots: BTreeMap<(CarId, &str), Vec<&CarPartView>> = BTreeMap::new();
    for entry in entries {
        if let Some(part_type) = entry.part_type.as_deref() {
            slots
                .entry((entry.record.car, part_type))
                .or_default()
                .push(entry);
        }
    }

    let mut issues = Vec::new();
    for ((car, part_type), mut slot) in slots {
        slot.sort_by_key(|e| (e.record.installed_at, e.record.car_part_id));
        for (i, first) in slot.iter().enumerate() {
            let Some(first_span) = occupancy(first) else {
                continue;
            };
            for second in &slot[i + 1..] {
                let Some(second_span) = occupancy(second) else {
                    continue;
                };
                if overlaps(first_span, second_span) {
                    issues.push(IntegrityIssue::OverlappingInstallations {
                        car,
                        part_type: part_type.to_string(),
                        first: first.id(),
                        second: second.id(),
                    });
                }
            }
        }
    }

    if !issues.is_empty() {
        tracing::warn!(count = issues.len(), "overlapping installations in timeline");
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{CarPartId, PartId, TeamId};
    use crate::entities::{Car, CarPart, Part};
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn car() -> Car {
        Car {
            car_id: CarId(1),
            car_number: 1,
            chassis_number: "CH-1".to_string(),
            status: "active".to_string(),
            team: TeamId(1),
        }
    }

    fn view(record: CarPart, part: &Part) -> CarPartView {
        CarPartView::build(&record, Some(&car()), Some(part))
    }

    fn gearbox() -> Part {
        Part::new(PartId(1), "Gearbox", "GB-1").with_limit(1000)
    }

    fn ids(timeline: &Timeline) -> Vec<i64> {
        timeline.entries.iter().map(|e| e.id().get()).collect()
    }

    #[test]
    fn test_orders_most_recent_first() {
        let part = gearbox();
        let a = CarPart::installed(CarPartId(1), CarId(1), PartId(1), at(2024, 1, 1))
            .with_removed_at(at(2024, 3, 1))
            .with_mileage(500);
        let b = CarPart::installed(CarPartId(2), CarId(1), PartId(1), at(2024, 3, 2))
            .with_mileage(200);

        let timeline = reconstruct(vec![view(a, &part), view(b, &part)]);
        assert_eq!(ids(&timeline), vec![2, 1]);
        assert!(timeline.entries[0].is_active);
        assert!(!timeline.entries[1].is_active);
        assert_eq!(timeline.active().count(), 1);
        assert!(!timeline.has_issues());
    }

    #[test]
    fn test_ties_break_by_id_descending() {
        let part = gearbox();
        let wing = Part::new(PartId(2), "Front Wing", "FW-1");
        let records = vec![
            view(CarPart::installed(CarPartId(4), CarId(1), PartId(1), at(2024, 2, 1)), &part),
            view(CarPart::installed(CarPartId(9), CarId(1), PartId(2), at(2024, 2, 1)), &wing),
            view(CarPart::installed(CarPartId(6), CarId(1), PartId(2), at(2023, 2, 1))
                .with_removed_at(at(2023, 6, 1)), &wing),
        ];
        let timeline = reconstruct(records);
        assert_eq!(ids(&timeline), vec![9, 4, 6]);
    }

    #[test]
    fn test_output_is_total_and_sorted() {
        let part = gearbox();
        let mut records = Vec::new();
        for i in 0..20i64 {
            let day = (i * 7 % 28 + 1) as u32;
            let record = CarPart::installed(CarPartId(i + 1), CarId(1), PartId(1), at(2024, 1, day))
                .with_removed_at(at(2024, 1, day));
            records.push(view(record, &part));
        }
        let timeline = reconstruct(records);
        assert_eq!(timeline.len(), 20);

        let mut seen: Vec<i64> = ids(&timeline);
        seen.sort();
        assert_eq!(seen, (1..=20).collect::<Vec<_>>());

        for pair in timeline.entries.windows(2) {
            assert!(pair[0].record.installed_at >= pair[1].record.installed_at);
        }
    }

    #[test]
    fn test_two_active_in_same_slot_is_flagged() {
        let part = gearbox();
        let other = Part::new(PartId(2), "Gearbox", "GB-2");
        let timeline = reconstruct(vec![
            view(CarPart::installed(CarPartId(1), CarId(1), PartId(1), at(2024, 1, 1)), &part),
            view(CarPart::installed(CarPartId(2), CarId(1), PartId(2), at(2024, 2, 1)), &other),
        ]);

        // Both records are kept, neither is repaired
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.active().count(), 2);
        assert_eq!(
            timeline.issues,
            vec![IntegrityIssue::OverlappingInstallations {
                car: CarId(1),
                part_type: "Gearbox".to_string(),
                first: CarPartId(1),
                second: CarPartId(2),
            }]
        );
    }

    #[test]
    fn test_back_to_back_installs_do_not_overlap() {
        let part = gearbox();
        let other = Part::new(PartId(2), "Gearbox", "GB-2");
        let timeline = reconstruct(vec![
            view(CarPart::installed(CarPartId(1), CarId(1), PartId(1), at(2024, 1, 1))
                .with_removed_at(at(2024, 2, 1)), &part),
            view(CarPart::installed(CarPartId(2), CarId(1), PartId(2), at(2024, 2, 1)), &other),
        ]);
        assert!(!timeline.has_issues());
    }

    #[test]
    fn test_historical_overlap_is_flagged() {
        let part = gearbox();
        let other = Part::new(PartId(2), "Gearbox", "GB-2");
        let timeline = reconstruct(vec![
            view(CarPart::installed(CarPartId(1), CarId(1), PartId(1), at(2024, 1, 1))
                .with_removed_at(at(2024, 3, 1)), &part),
            view(CarPart::installed(CarPartId(2), CarId(1), PartId(2), at(2024, 2, 1))
                .with_removed_at(at(2024, 4, 1)), &other),
        ]);
        assert_eq!(timeline.issues.len(), 1);
    }

    #[test]
    fn test_different_types_do_not_conflict() {
        let timeline = reconstruct(vec![
            view(CarPart::installed(CarPartId(1), CarId(1), PartId(1), at(2024, 1, 1)), &gearbox()),
            view(CarPart::installed(CarPartId(2), CarId(1), PartId(2), at(2024, 1, 1)),
                &Part::new(PartId(2), "Front Wing", "FW-1")),
        ]);
        assert!(!timeline.has_issues());
    }

    #[test]
    fn test_inverted_interval_reported_once() {
        let part = gearbox();
        let record = CarPart::installed(CarPartId(1), CarId(1), PartId(1), at(2024, 3, 1))
            .with_removed_at(at(2024, 1, 1));
        let timeline = reconstruct(vec![view(record, &part)]);
        assert_eq!(timeline.issues.len(), 1);
        assert!(matches!(
            timeline.issues[0],
            IntegrityIssue::RemovedBeforeInstalled { .. }
        ));
    }

    #[test]
    fn test_empty_history() {
        let timeline = reconstruct(Vec::new());
        assert!(timeline.is_empty());
        assert!(!timeline.has_issues());
    }
}
