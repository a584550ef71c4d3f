//! idadmin: client context.
//!
//! Applications registered with the identity provider, with their secrets,
//! the claims added to their tokens, and free-form properties.

pub mod application;
pub mod domain;
