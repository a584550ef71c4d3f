//! idadmin: API resource context.
//!
//! Protected APIs, the secrets they introspect with, and the scopes they
//! expose to clients.

pub mod application;
pub mod domain;
