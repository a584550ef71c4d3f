//! Domain model of the client context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod repository;
