//! Application services of the client context.

pub mod command_handlers;
pub mod query_handlers;
