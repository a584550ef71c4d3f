//! Application services of the persisted grant context.

pub mod command_handlers;
pub mod query_handlers;
