//! Query and filter engine
//!
//! Pure predicates over snapshots of records: text search across a
//! configurable set of fields, exact-match field filters, the lifecycle
//! warning selection, ordering and pagination. All constraints AND together.
//!
//! An absent filter value means "no constraint". Empty strings are treated
//! the same way, never as "match the empty string".

use serde::Serialize;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

use crate::core::identity::{CarId, PartId, TeamId};
use crate::core::lifecycle::{is_lifecycle_warning, needs_replacement};
use crate::core::views::{CarPartView, CarView, PartView};
use crate::entities::Team;

/// Default number of results per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Errors raised while building or applying a query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("cannot order {record} by '{field}' (allowed: {})", allowed.join(", "))]
    UnknownOrderingField {
        record: &'static str,
        field: String,
        allowed: &'static [&'static str],
    },

    #[error("cannot search {record} by '{field}' (allowed: {})", allowed.join(", "))]
    UnknownSearchField {
        record: &'static str,
        field: String,
        allowed: &'static [&'static str],
    },

    #[error("invalid page request: page {page}, page size {page_size} (both start at 1)")]
    InvalidPage { page: usize, page_size: usize },
}

/// Ordering key: a field name, `-` prefix for descending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Parse `"field"` / `"-field"`; blank input means natural order
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.strip_prefix('-') {
            Some(field) if !field.is_empty() => Some(Self::descending(field)),
            Some(_) => None,
            None if s.is_empty() => None,
            None => Some(Self::ascending(s)),
        }
    }
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid ordering: '{}'", s))
    }
}

impl std::fmt::Display for OrderBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            write!(f, "{}", self.field)
        }
    }
}

/// Records the engine can search and sort
pub trait Queryable {
    /// Record name used in error messages
    const RECORD: &'static str;

    /// Every field `field_text` understands
    const SEARCHABLE_FIELDS: &'static [&'static str];

    /// Fields searched when the query does not name any
    const DEFAULT_SEARCH_FIELDS: &'static [&'static str];

    /// Fields accepted as ordering keys
    const ORDERING_FIELDS: &'static [&'static str];

    /// Identity key for the natural (fallback) order
    fn natural_key(&self) -> i64;

    /// Text of a searchable field; `None` when the value is absent
    fn field_text(&self, field: &str) -> Option<Cow<'_, str>>;

    /// Compare two records on an ordering field (only called with a known field)
    fn compare_field(&self, other: &Self, field: &str) -> Ordering;
}

/// A field-level predicate for records of type `T`
pub trait RecordFilter<T> {
    fn matches(&self, record: &T) -> bool;
}

/// Case-insensitive substring match over `fields`; a blank term matches everything
pub fn matches_search<T: Queryable>(record: &T, term: Option<&str>, fields: &[&str]) -> bool {
    let term = match term.map(str::trim) {
        None | Some("") => return true,
        Some(t) => t.to_lowercase(),
    };
    fields.iter().any(|field| {
        record
            .field_text(field)
            .is_some_and(|text| text.to_lowercase().contains(&term))
    })
}

/// Exact match; absent or empty `wanted` is no constraint
fn exact(wanted: &Option<String>, actual: Option<&str>) -> bool {
    match wanted.as_deref() {
        None | Some("") => true,
        Some(w) => actual == Some(w),
    }
}

/// Absent sorts after present, as the store's SQL ordering does
fn cmp_nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_f64_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Search + filter + ordering, generic over the filter type
#[derive(Debug, Clone, Default)]
pub struct Query<F> {
    pub filter: F,

    /// Search term (case-insensitive substring)
    pub search: Option<String>,

    /// Fields to search; the record's defaults when `None`
    pub search_fields: Option<Vec<String>>,

    /// Ordering key; natural (ascending id) order when `None`
    pub ordering: Option<OrderBy>,
}

impl<F> Query<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            search: None,
            search_fields: None,
            ordering: None,
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ordering(mut self, ordering: OrderBy) -> Self {
        self.ordering = Some(ordering);
        self
    }

    /// Select and order matching records. Sorting is stable.
    pub fn apply<'a, T>(&self, records: &'a [T]) -> Result<Vec<&'a T>, QueryError>
    where
        T: Queryable,
        F: RecordFilter<T>,
    {
        let fields: Vec<&str> = match &self.search_fields {
            Some(fields) => {
                for field in fields {
                    if !T::SEARCHABLE_FIELDS.contains(&field.as_str()) {
                        return Err(QueryError::UnknownSearchField {
                            record: T::RECORD,
                            field: field.clone(),
                            allowed: T::SEARCHABLE_FIELDS,
                        });
                    }
                }
                fields.iter().map(String::as_str).collect()
            }
            None => T::DEFAULT_SEARCH_FIELDS.to_vec(),
        };

        if let Some(ordering) = &self.ordering {
            if !T::ORDERING_FIELDS.contains(&ordering.field.as_str()) {
                return Err(QueryError::UnknownOrderingField {
                    record: T::RECORD,
                    field: ordering.field.clone(),
                    allowed: T::ORDERING_FIELDS,
                });
            }
        }

        let mut selected: Vec<&T> = records
            .iter()
            .filter(|r| self.filter.matches(r))
            .filter(|r| matches_search(*r, self.search.as_deref(), &fields))
            .collect();

        match &self.ordering {
            Some(OrderBy { field, descending }) => {
                if *descending {
                    selected.sort_by(|a, b| b.compare_field(a, field));
                } else {
                    selected.sort_by(|a, b| a.compare_field(b, field));
                }
            }
            None => selected.sort_by_key(|r| r.natural_key()),
        }

        tracing::debug!(
            record = T::RECORD,
            total = records.len(),
            selected = selected.len(),
            "query applied"
        );
        Ok(selected)
    }
}

/// No field filters (teams are only searched and ordered)
#[derive(Debug, Clone, Copy, Default)]
pub struct TeamFilter;

impl RecordFilter<Team> for TeamFilter {
    fn matches(&self, _record: &Team) -> bool {
        true
    }
}

/// Car field filters
#[derive(Debug, Clone, Default)]
pub struct CarFilter {
    pub team: Option<TeamId>,
    /// Exact match on the raw status string
    pub status: Option<String>,
}

impl RecordFilter<CarView> for CarFilter {
    fn matches(&self, view: &CarView) -> bool {
        self.team.map_or(true, |team| view.car.team == team)
            && exact(&self.status, Some(&view.car.status))
    }
}

/// Part field filters
#[derive(Debug, Clone, Default)]
pub struct PartFilter {
    pub part_type: Option<String>,
    pub manufacturer: Option<String>,
    pub serial_number: Option<String>,
}

impl RecordFilter<PartView> for PartFilter {
    fn matches(&self, view: &PartView) -> bool {
        exact(&self.part_type, Some(&view.part.part_type))
            && exact(&self.manufacturer, view.part.manufacturer.as_deref())
            && exact(&self.serial_number, Some(&view.part.serial_number))
    }
}

/// Installation record field filters
#[derive(Debug, Clone, Default)]
pub struct CarPartFilter {
    pub car: Option<CarId>,
    pub part: Option<PartId>,
    pub is_active: Option<bool>,
    pub part_type: Option<String>,
    pub manufacturer: Option<String>,
}

impl RecordFilter<CarPartView> for CarPartFilter {
    fn matches(&self, view: &CarPartView) -> bool {
        self.car.map_or(true, |car| view.record.car == car)
            && self.part.map_or(true, |part| view.record.part == part)
            && self.is_active.map_or(true, |active| view.is_active == active)
            && exact(&self.part_type, view.part_type.as_deref())
            && exact(&self.manufacturer, view.manufacturer.as_deref())
    }
}

pub type TeamQuery = Query<TeamFilter>;
pub type CarQuery = Query<CarFilter>;
pub type PartQuery = Query<PartFilter>;
pub type CarPartQuery = Query<CarPartFilter>;

impl Queryable for Team {
    const RECORD: &'static str = "teams";
    const SEARCHABLE_FIELDS: &'static [&'static str] = &["name", "country", "principal_name"];
    const DEFAULT_SEARCH_FIELDS: &'static [&'static str] = &["name", "country"];
    const ORDERING_FIELDS: &'static [&'static str] = &["name", "country"];

    fn natural_key(&self) -> i64 {
        self.team_id.get()
    }

    fn field_text(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "name" => Some(Cow::Borrowed(&self.name)),
            "country" => self.country.as_deref().map(Cow::Borrowed),
            "principal_name" => self.principal_name.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "name" => self.name.cmp(&other.name),
            "country" => cmp_nulls_last(self.country.as_deref(), other.country.as_deref()),
            _ => Ordering::Equal,
        }
    }
}

impl Queryable for CarView {
    const RECORD: &'static str = "cars";
    const SEARCHABLE_FIELDS: &'static [&'static str] =
        &["chassis_number", "car_number", "status", "team_name"];
    const DEFAULT_SEARCH_FIELDS: &'static [&'static str] = &["chassis_number", "car_number"];
    const ORDERING_FIELDS: &'static [&'static str] = &["car_number", "status", "chassis_number"];

    fn natural_key(&self) -> i64 {
        self.car.car_id.get()
    }

    fn field_text(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "chassis_number" => Some(Cow::Borrowed(&self.car.chassis_number)),
            "car_number" => Some(Cow::Owned(self.car.car_number.to_string())),
            "status" => Some(Cow::Borrowed(&self.car.status)),
            "team_name" => self.team_name.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "car_number" => self.car.car_number.cmp(&other.car.car_number),
            "status" => self.car.status.cmp(&other.car.status),
            "chassis_number" => self.car.chassis_number.cmp(&other.car.chassis_number),
            _ => Ordering::Equal,
        }
    }
}

impl Queryable for PartView {
    const RECORD: &'static str = "parts";
    const SEARCHABLE_FIELDS: &'static [&'static str] =
        &["serial_number", "part_type", "manufacturer"];
    const DEFAULT_SEARCH_FIELDS: &'static [&'static str] =
        &["serial_number", "part_type", "manufacturer"];
    const ORDERING_FIELDS: &'static [&'static str] = &[
        "part_type",
        "manufacturer",
        "fia_lifecycle_limit",
        "serial_number",
        "current_mileage",
        "lifecycle_percentage",
    ];

    fn natural_key(&self) -> i64 {
        self.part.part_id.get()
    }

    fn field_text(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "serial_number" => Some(Cow::Borrowed(&self.part.serial_number)),
            "part_type" => Some(Cow::Borrowed(&self.part.part_type)),
            "manufacturer" => self.part.manufacturer.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "part_type" => self.part.part_type.cmp(&other.part.part_type),
            "manufacturer" => cmp_nulls_last(
                self.part.manufacturer.as_deref(),
                other.part.manufacturer.as_deref(),
            ),
            "fia_lifecycle_limit" => {
                cmp_nulls_last(self.part.fia_lifecycle_limit, other.part.fia_lifecycle_limit)
            }
            "serial_number" => self.part.serial_number.cmp(&other.part.serial_number),
            "current_mileage" => cmp_nulls_last(self.current_mileage, other.current_mileage),
            "lifecycle_percentage" => {
                cmp_f64_nulls_last(self.lifecycle_percentage, other.lifecycle_percentage)
            }
            _ => Ordering::Equal,
        }
    }
}

impl Queryable for CarPartView {
    const RECORD: &'static str = "car parts";
    const SEARCHABLE_FIELDS: &'static [&'static str] =
        &["chassis_number", "serial_number", "part_type", "manufacturer"];
    const DEFAULT_SEARCH_FIELDS: &'static [&'static str] =
        &["chassis_number", "serial_number", "part_type"];
    const ORDERING_FIELDS: &'static [&'static str] = &["installed_at", "removed_at", "mileage"];

    fn natural_key(&self) -> i64 {
        self.record.car_part_id.get()
    }

    fn field_text(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "chassis_number" => self.chassis_number.as_deref().map(Cow::Borrowed),
            "serial_number" => self.serial_number.as_deref().map(Cow::Borrowed),
            "part_type" => self.part_type.as_deref().map(Cow::Borrowed),
            "manufacturer" => self.manufacturer.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }

    fn compare_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "installed_at" => self.record.installed_at.cmp(&other.record.installed_at),
            "removed_at" => cmp_nulls_last(self.record.removed_at, other.record.removed_at),
            "mileage" => cmp_nulls_last(self.record.mileage, other.record.mileage),
            _ => Ordering::Equal,
        }
    }
}

/// Parts at or above the operational warning threshold, most worn first.
///
/// Parts without a limit never qualify.
pub fn lifecycle_warnings(parts: &[PartView]) -> Vec<&PartView> {
    let mut warnings: Vec<&PartView> = parts
        .iter()
        .filter(|p| is_lifecycle_warning(p.lifecycle_percentage))
        .collect();
    warnings.sort_by(|a, b| {
        cmp_f64_nulls_last(b.lifecycle_percentage, a.lifecycle_percentage)
            .then_with(|| a.part.part_id.cmp(&b.part.part_id))
    });
    warnings
}

/// Parts at or beyond the regulatory limit
pub fn needing_replacement(parts: &[PartView]) -> Vec<&PartView> {
    parts
        .iter()
        .filter(|p| needs_replacement(p.lifecycle_percentage))
        .collect()
}

/// Page selection (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Result<Self, QueryError> {
        if page == 0 || page_size == 0 {
            return Err(QueryError::InvalidPage { page, page_size });
        }
        Ok(Self { page, page_size })
    }

    /// One page holding everything
    pub fn all() -> Self {
        Self {
            page: 1,
            page_size: usize::MAX,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

/// One page of results plus the total count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<usize>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Cut the requested page out of the full result list
    pub fn from_items(items: Vec<T>, request: PageRequest) -> Self {
        let count = items.len();
        let start = request.page.saturating_sub(1).saturating_mul(request.page_size);
        let results: Vec<T> = items
            .into_iter()
            .skip(start)
            .take(request.page_size)
            .collect();
        let end = start.saturating_add(results.len());

        Self {
            count,
            page: request.page,
            page_size: request.page_size,
            next: (end < count && !results.is_empty()).then_some(request.page + 1),
            previous: (request.page > 1).then(|| request.page - 1),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::CarPartId;
    use crate::entities::{Car, CarPart, Part};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn part_view(id: i64, part_type: &str, serial: &str, limit: Option<i64>, mileage: i64) -> PartView {
        let mut part = Part::new(PartId(id), part_type, serial);
        part.fia_lifecycle_limit = limit;
        let record = CarPart::installed(CarPartId(id), CarId(1), PartId(id), at(2024, 1, 1))
            .with_mileage(mileage);
        PartView::build(&part, [&record])
    }

    fn car_part_view(id: i64, part: &Part, active: bool) -> CarPartView {
        let car = Car {
            car_id: CarId(1),
            car_number: 4,
            chassis_number: "MCL-004".to_string(),
            status: "active".to_string(),
            team: TeamId(1),
        };
        let mut record = CarPart::installed(CarPartId(id), CarId(1), part.part_id, at(2024, 1, id as u32));
        if !active {
            record = record.with_removed_at(at(2024, 2, 1));
        }
        CarPartView::build(&record, Some(&car), Some(part))
    }

    #[test]
    fn test_order_by_parse() {
        assert_eq!(OrderBy::parse("installed_at"), Some(OrderBy::ascending("installed_at")));
        assert_eq!(OrderBy::parse("-installed_at"), Some(OrderBy::descending("installed_at")));
        assert_eq!(OrderBy::parse(""), None);
        assert_eq!(OrderBy::parse("-"), None);
        assert_eq!(OrderBy::descending("mileage").to_string(), "-mileage");
    }

    #[test]
    fn test_type_filter_and_search_compose() {
        let gearbox = Part::new(PartId(1), "Gearbox", "ABC-123");
        let brake = Part::new(PartId(2), "Brake", "ABC-999");
        let records = vec![car_part_view(1, &gearbox, true), car_part_view(2, &brake, true)];

        let query = CarPartQuery::new(CarPartFilter {
            part_type: Some("Gearbox".to_string()),
            ..Default::default()
        })
        .with_search("ABC");

        let result = query.apply(&records).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), CarPartId(1));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let parts = vec![
            part_view(1, "Gearbox", "ABC-123", Some(1000), 0),
            part_view(2, "Front Wing", "FW-7", Some(1000), 0),
        ];
        let result = PartQuery::default().with_search("abc").apply(&parts).unwrap();
        assert_eq!(result.len(), 1);

        let result = PartQuery::default().with_search("wing").apply(&parts).unwrap();
        assert_eq!(result[0].part.part_id, PartId(2));
    }

    #[test]
    fn test_empty_search_and_filters_match_everything() {
        let parts = vec![
            part_view(1, "Gearbox", "ABC-123", Some(1000), 0),
            part_view(2, "Front Wing", "FW-7", None, 0),
        ];
        let query = PartQuery::new(PartFilter {
            part_type: Some(String::new()),
            manufacturer: None,
            serial_number: None,
        })
        .with_search("  ");
        assert_eq!(query.apply(&parts).unwrap().len(), 2);
    }

    #[test]
    fn test_manufacturer_filter_does_not_match_absent_manufacturer() {
        let mut with = part_view(1, "Gearbox", "GB-1", None, 0);
        with.part.manufacturer = Some("Xtrac".to_string());
        let without = part_view(2, "Gearbox", "GB-2", None, 0);
        let parts = vec![with, without];

        let query = PartQuery::new(PartFilter {
            manufacturer: Some("Xtrac".to_string()),
            ..Default::default()
        });
        let result = query.apply(&parts).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].part.part_id, PartId(1));
    }

    #[test]
    fn test_field_filter_is_exact() {
        let parts = vec![
            part_view(1, "Gearbox", "GB-1", None, 0),
            part_view(2, "Gearbox Casing", "GC-1", None, 0),
        ];
        let query = PartQuery::new(PartFilter {
            part_type: Some("Gearbox".to_string()),
            ..Default::default()
        });
        assert_eq!(query.apply(&parts).unwrap().len(), 1);
    }

    #[test]
    fn test_active_filter() {
        let gearbox = Part::new(PartId(1), "Gearbox", "GB-1");
        let records = vec![car_part_view(1, &gearbox, false), car_part_view(2, &gearbox, true)];

        let active = CarPartQuery::new(CarPartFilter {
            is_active: Some(true),
            ..Default::default()
        });
        let result = active.apply(&records).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), CarPartId(2));

        let inactive = CarPartQuery::new(CarPartFilter {
            is_active: Some(false),
            ..Default::default()
        });
        assert_eq!(inactive.apply(&records).unwrap()[0].id(), CarPartId(1));
    }

    #[test]
    fn test_car_part_manufacturer_filter() {
        let xtrac = Part::new(PartId(1), "Gearbox", "GB-1").with_manufacturer("Xtrac");
        let plain = Part::new(PartId(2), "Gearbox", "GB-2");
        let records = vec![car_part_view(1, &xtrac, true), car_part_view(2, &plain, true)];

        let query = CarPartQuery::new(CarPartFilter {
            manufacturer: Some("Xtrac".to_string()),
            ..Default::default()
        });
        let ids: Vec<CarPartId> = query.apply(&records).unwrap().iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec![CarPartId(1)]);

        let blank = CarPartQuery::new(CarPartFilter {
            manufacturer: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(blank.apply(&records).unwrap().len(), 2);
    }

    #[test]
    fn test_natural_order_by_default() {
        let parts = vec![
            part_view(3, "Gearbox", "GB-3", None, 0),
            part_view(1, "Gearbox", "GB-1", None, 0),
            part_view(2, "Gearbox", "GB-2", None, 0),
        ];
        let ids: Vec<i64> = PartQuery::default()
            .apply(&parts)
            .unwrap()
            .iter()
            .map(|p| p.part.part_id.get())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_descending_ordering_is_stable() {
        let parts = vec![
            part_view(1, "Brake", "B-1", Some(1000), 100),
            part_view(2, "Gearbox", "G-1", Some(1000), 200),
            part_view(3, "Brake", "B-2", Some(1000), 300),
        ];
        let ids: Vec<i64> = PartQuery::default()
            .with_ordering(OrderBy::descending("part_type"))
            .apply(&parts)
            .unwrap()
            .iter()
            .map(|p| p.part.part_id.get())
            .collect();
        // Equal keys keep their input order
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_absent_values_sort_last_ascending() {
        let parts = vec![
            part_view(1, "Gearbox", "G-1", None, 100),
            part_view(2, "Gearbox", "G-2", Some(2000), 200),
            part_view(3, "Gearbox", "G-3", Some(1000), 300),
        ];
        let ids: Vec<i64> = PartQuery::default()
            .with_ordering(OrderBy::ascending("fia_lifecycle_limit"))
            .apply(&parts)
            .unwrap()
            .iter()
            .map(|p| p.part.part_id.get())
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_unknown_ordering_field_rejected() {
        let parts = vec![part_view(1, "Gearbox", "G-1", None, 0)];
        let err = PartQuery::default()
            .with_ordering(OrderBy::ascending("colour"))
            .apply(&parts)
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownOrderingField { .. }));
        assert!(err.to_string().contains("part_type"));
    }

    #[test]
    fn test_configurable_search_fields() {
        let parts = vec![part_view(1, "Gearbox", "ABC-123", None, 0)];
        let query = PartQuery::default()
            .with_search("gear")
            .with_search_fields(["serial_number"]);
        assert!(query.apply(&parts).unwrap().is_empty());

        let bad = PartQuery::default().with_search_fields(["colour"]);
        assert!(matches!(
            bad.apply(&parts).unwrap_err(),
            QueryError::UnknownSearchField { .. }
        ));
    }

    #[test]
    fn test_warning_selection() {
        let parts = vec![
            part_view(1, "Gearbox", "G-1", Some(1000), 800),
            part_view(2, "Gearbox", "G-2", Some(1000), 799),
            part_view(3, "Gearbox", "G-3", None, 5000),
            part_view(4, "Gearbox", "G-4", Some(1000), 850),
            part_view(5, "Gearbox", "G-5", Some(0), 5000),
        ];
        let ids: Vec<i64> = lifecycle_warnings(&parts)
            .iter()
            .map(|p| p.part.part_id.get())
            .collect();
        assert_eq!(ids, vec![4, 1]);
    }

    #[test]
    fn test_needing_replacement() {
        let parts = vec![
            part_view(1, "Gearbox", "G-1", Some(1000), 1000),
            part_view(2, "Gearbox", "G-2", Some(1000), 950),
        ];
        let result = needing_replacement(&parts);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].part.part_id, PartId(1));
    }

    #[test]
    fn test_pagination() {
        let items: Vec<i32> = (1..=25).collect();
        let page = Page::from_items(items.clone(), PageRequest::new(2, 10).unwrap());
        assert_eq!(page.count, 25);
        assert_eq!(page.results, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));

        let last = Page::from_items(items.clone(), PageRequest::new(3, 10).unwrap());
        assert_eq!(last.results.len(), 5);
        assert_eq!(last.next, None);

        let beyond = Page::from_items(items, PageRequest::new(9, 10).unwrap());
        assert_eq!(beyond.count, 25);
        assert!(beyond.results.is_empty());
        assert_eq!(beyond.next, None);
    }

    #[test]
    fn test_invalid_page_request() {
        assert!(matches!(
            PageRequest::new(0, 10).unwrap_err(),
            QueryError::InvalidPage { .. }
        ));
        assert!(PageRequest::new(1, 0).is_err());
    }

    #[test]
    fn test_page_zero_is_treated_as_first_page() {
        let request = PageRequest { page: 0, page_size: 2 };
        let page = Page::from_items(vec![1, 2, 3], request);
        assert_eq!(page.results, vec![1, 2]);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_page_request_accessors() {
        let request = PageRequest::default();
        assert_eq!(request.page(), 1);
        assert_eq!(request.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_page_all() {
        let page = Page::from_items(vec![1, 2, 3], PageRequest::all());
        assert_eq!(page.results.len(), 3);
        assert_eq!(page.next, None);
    }
}
