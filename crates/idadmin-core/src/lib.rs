//! idadmin core: the command processing pipeline.
//!
//! Every administrative mutation flows through the same protocol:
//! validate, load, check invariants, mutate, commit, publish. This crate
//! defines that protocol and the primitives it is built from. It contains
//! no persistence code; repositories and the unit of work are traits that
//! the store crate implements.

pub mod bus;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod notification;
pub mod pipeline;
pub mod secret;
pub mod unit_of_work;
pub mod validation;
