//! Record type definitions
//!
//! The store hands us four kinds of records:
//!
//! - [`Team`] - racing team (reference entity)
//! - [`Car`] - chassis owned by a team, with a free-form status
//! - [`Part`] - regulated component with an optional FIA distance limit
//! - [`CarPart`] - installation of a part on a car for a time interval

pub mod car;
pub mod car_part;
pub mod part;
pub mod team;

pub use car::{Car, CarStatusClass};
pub use car_part::CarPart;
pub use part::Part;
pub use team::Team;
