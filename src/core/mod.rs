//! Core module - record identity, lifecycle rules and the query engine

pub mod config;
pub mod entity;
pub mod history;
pub mod identity;
pub mod integrity;
pub mod lifecycle;
pub mod loader;
pub mod project;
pub mod query;
pub mod store;
pub mod views;

pub use config::Config;
pub use entity::Entity;
pub use history::{reconstruct, Timeline};
pub use identity::{CarId, CarPartId, IdParseError, PartId, RecordKind, TeamId};
pub use integrity::IntegrityIssue;
pub use lifecycle::{Lifecycle, LifecycleError, LifecycleTier};
pub use loader::{load_snapshot, LoadError, LoadedSnapshot, SkippedFile};
pub use project::{Project, ProjectError};
pub use query::{
    CarFilter, CarPartFilter, CarPartQuery, CarQuery, OrderBy, Page, PageRequest, PartFilter,
    PartQuery, QueryError, TeamFilter, TeamQuery,
};
pub use store::Snapshot;
pub use views::{CarPartDetail, CarPartView, CarView, PartView};
