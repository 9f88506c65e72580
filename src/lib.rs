//! Pitlane: regulated race car part lifecycle tracking
//!
//! Reads a snapshot of teams, cars, parts and installation records and
//! answers lifecycle questions about it: how worn each part is against its
//! FIA limit, what was fitted to a car and when, and which parts are due.

pub mod cli;
pub mod core;
pub mod entities;
