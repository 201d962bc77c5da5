// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod config;
pub mod events;
pub mod extract;
pub mod output;
pub mod schedule;
pub mod stats;
