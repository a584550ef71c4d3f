//! Domain model of the API resource context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod repository;
