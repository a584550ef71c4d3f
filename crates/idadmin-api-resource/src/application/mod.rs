//! Application services of the API resource context.

pub mod command_handlers;
pub mod query_handlers;
