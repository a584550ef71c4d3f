//! Application services of the identity resource context.

pub mod command_handlers;
pub mod query_handlers;
