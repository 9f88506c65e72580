//! In-memory snapshot of the record store
//!
//! A `Snapshot` holds one consistent read of every record kind and answers
//! the fetch operations listings and reports are built on. It never writes.

use std::collections::HashMap;

use crate::core::history::{reconstruct, Timeline};
use crate::core::identity::{CarId, CarPartId, PartId, TeamId};
use crate::core::integrity::{check_car_parts, check_references, IntegrityIssue};
use crate::core::query::{
    lifecycle_warnings, CarPartFilter, CarPartQuery, CarQuery, Page, PageRequest, PartQuery,
    QueryError, TeamQuery,
};
use crate::core::views::{CarPartDetail, CarPartView, CarView, PartView};
use crate::entities::{Car, CarPart, Part, Team};

/// Immutable set of store records
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    teams: Vec<Team>,
    cars: Vec<Car>,
    parts: Vec<Part>,
    car_parts: Vec<CarPart>,

    team_index: HashMap<TeamId, usize>,
    car_index: HashMap<CarId, usize>,
    part_index: HashMap<PartId, usize>,

    // Derived once: part annotation needs every installation of the part
    part_views: Vec<PartView>,
}

impl Snapshot {
    pub fn new(teams: Vec<Team>, cars: Vec<Car>, parts: Vec<Part>, car_parts: Vec<CarPart>) -> Self {
        let team_index = teams.iter().enumerate().map(|(i, t)| (t.team_id, i)).collect();
        let car_index = cars.iter().enumerate().map(|(i, c)| (c.car_id, i)).collect();
        let part_index = parts.iter().enumerate().map(|(i, p)| (p.part_id, i)).collect();

        let mut by_part: HashMap<PartId, Vec<&CarPart>> = HashMap::new();
        for record in &car_parts {
            by_part.entry(record.part).or_default().push(record);
        }
        let part_views = parts
            .iter()
            .map(|part| {
                let records = by_part.get(&part.part_id).map(Vec::as_slice).unwrap_or(&[]);
                PartView::build(part, records.iter().copied())
            })
            .collect();

        tracing::debug!(
            teams = teams.len(),
            cars = cars.len(),
            parts = parts.len(),
            car_parts = car_parts.len(),
            "snapshot built"
        );

        Self {
            teams,
            cars,
            parts,
            car_parts,
            team_index,
            car_index,
            part_index,
            part_views,
        }
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn car_parts(&self) -> &[CarPart] {
        &self.car_parts
    }

    /// Annotated parts in store order
    pub fn part_views(&self) -> &[PartView] {
        &self.part_views
    }

    pub fn get_team(&self, id: TeamId) -> Option<&Team> {
        self.team_index.get(&id).map(|&i| &self.teams[i])
    }

    fn car(&self, id: CarId) -> Option<&Car> {
        self.car_index.get(&id).map(|&i| &self.cars[i])
    }

    fn part(&self, id: PartId) -> Option<&Part> {
        self.part_index.get(&id).map(|&i| &self.parts[i])
    }

    pub fn get_car(&self, id: CarId) -> Option<CarView> {
        self.car(id)
            .map(|car| CarView::build(car, self.get_team(car.team)))
    }

    pub fn get_part(&self, id: PartId) -> Option<&PartView> {
        self.part_index.get(&id).map(|&i| &self.part_views[i])
    }

    /// One installation with its car and annotated part
    pub fn get_car_part(&self, id: CarPartId) -> Option<CarPartDetail> {
        self.car_parts
            .iter()
            .find(|r| r.car_part_id == id)
            .map(|r| CarPartDetail {
                view: self.car_part_view(r),
                car: self.get_car(r.car),
                part: self.get_part(r.part).cloned(),
            })
    }

    fn car_part_view(&self, record: &CarPart) -> CarPartView {
        CarPartView::build(record, self.car(record.car), self.part(record.part))
    }

    fn car_views(&self) -> Vec<CarView> {
        self.cars
            .iter()
            .map(|car| CarView::build(car, self.get_team(car.team)))
            .collect()
    }

    fn car_part_views(&self) -> Vec<CarPartView> {
        self.car_parts.iter().map(|r| self.car_part_view(r)).collect()
    }

    pub fn list_teams(&self, query: &TeamQuery, page: PageRequest) -> Result<Page<Team>, QueryError> {
        let selected = query.apply(&self.teams)?;
        Ok(Page::from_items(selected.into_iter().cloned().collect(), page))
    }

    pub fn list_cars(&self, query: &CarQuery, page: PageRequest) -> Result<Page<CarView>, QueryError> {
        let views = self.car_views();
        let selected = query.apply(&views)?;
        Ok(Page::from_items(selected.into_iter().cloned().collect(), page))
    }

    pub fn list_parts(&self, query: &PartQuery, page: PageRequest) -> Result<Page<PartView>, QueryError> {
        let selected = query.apply(&self.part_views)?;
        Ok(Page::from_items(selected.into_iter().cloned().collect(), page))
    }

    pub fn list_car_parts(
        &self,
        query: &CarPartQuery,
        page: PageRequest,
    ) -> Result<Page<CarPartView>, QueryError> {
        let views = self.car_part_views();
        let selected = query.apply(&views)?;
        Ok(Page::from_items(selected.into_iter().cloned().collect(), page))
    }

    /// Currently installed records
    pub fn active_car_parts(&self, page: PageRequest) -> Result<Page<CarPartView>, QueryError> {
        let query = CarPartQuery::new(CarPartFilter {
            is_active: Some(true),
            ..Default::default()
        });
        self.list_car_parts(&query, page)
    }

    /// Paginated history of one car, in timeline order
    pub fn car_history_page(&self, car: CarId, page: PageRequest) -> Page<CarPartView> {
        Page::from_items(self.car_part_history(car).entries, page)
    }

    /// Full installation timeline of one car
    pub fn car_part_history(&self, car: CarId) -> Timeline {
        let records = self
            .car_parts
            .iter()
            .filter(|r| r.car == car)
            .map(|r| self.car_part_view(r))
            .collect();
        reconstruct(records)
    }

    /// Parts at or past the warning threshold, most worn first
    pub fn lifecycle_warnings(&self) -> Vec<&PartView> {
        lifecycle_warnings(&self.part_views)
    }

    /// Every integrity issue in the snapshot, including slot overlaps on every car
    pub fn check(&self) -> Vec<IntegrityIssue> {
        let mut issues = check_references(&self.teams, &self.cars, &self.parts, &self.car_parts);
        issues.extend(check_car_parts(&self.car_parts));

        let mut cars: Vec<CarId> = self.car_parts.iter().map(|r| r.car).collect();
        cars.sort();
        cars.dedup();
        for car in cars {
            issues.extend(
                self.car_part_history(car)
                    .issues
                    .into_iter()
                    .filter(|i| matches!(i, IntegrityIssue::OverlappingInstallations { .. })),
            );
        }

        if !issues.is_empty() {
            tracing::warn!(count = issues.len(), "snapshot has integrity issues");
        }
        issues
    }
}
