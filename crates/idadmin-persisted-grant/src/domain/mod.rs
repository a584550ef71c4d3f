//! Domain model of the persisted grant context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod repository;
