//! CLI command implementations

pub mod car;
pub mod completions;
pub mod init;
pub mod install;
pub mod part;
pub mod status;
pub mod team;
pub mod validate;
