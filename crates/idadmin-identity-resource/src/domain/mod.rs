//! Domain model of the identity resource context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod repository;
