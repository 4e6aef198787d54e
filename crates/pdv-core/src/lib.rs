pub mod config;
pub mod logging;

pub mod api;
pub mod bugs;
pub mod checksum;
pub mod cleanup;
pub mod fetch;
pub mod pulp;
pub mod verify;
pub mod version;
